// Copyright 2024-2026, NVIDIA CORPORATION & AFFILIATES. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions
// are met:
//  * Redistributions of source code must retain the above copyright
//    notice, this list of conditions and the following disclaimer.
//  * Redistributions in binary form must reproduce the above copyright
//    notice, this list of conditions and the following disclaimer in the
//    documentation and/or other materials provided with the distribution.
//  * Neither the name of NVIDIA CORPORATION nor the names of its
//    contributors may be used to endorse or promote products derived
//    from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS ``AS IS'' AND ANY
// EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED.  IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY
// OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! The physical HTTP exchange used by [`HttpClient`](crate::http::HttpClient).
//!
//! The HTTP client only frames requests and parses responses; moving bytes
//! is delegated to an [`HttpTransport`]. The default, [`UreqTransport`],
//! drives a blocking `ureq` agent from tokio's blocking pool. Tests and
//! callers with special needs (proxies, custom TLS roots, disabled
//! certificate checks) can supply their own implementation.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result, TransportErrorKind};

/// HTTP method of an [`HttpRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully framed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body; empty for `GET`.
    pub body: Vec<u8>,
    /// Overall deadline for the exchange, enforced by the transport itself
    /// so that an abandoned request does not keep running.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Returns the first header named `name`, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A raw HTTP response. Any status code, including errors, is a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns the first header named `name`, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Sends one HTTP request and returns the server's response.
///
/// Implementations report failures to reach the server as
/// [`Error::Transport`]. Non-2xx statuses are ordinary responses.
#[async_trait]
pub trait HttpTransport: fmt::Debug + Send + Sync {
    /// Performs the exchange.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Default transport backed by a pooled, blocking `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    request_timeout: Option<Duration>,
}

impl UreqTransport {
    /// Creates an agent with the given connect and read/write timeouts.
    #[must_use]
    pub fn new(connect_timeout: Option<Duration>, request_timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = connect_timeout {
            builder = builder.timeout_connect(timeout);
        }
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            request_timeout,
        }
    }

    /// The tighter of the per-request deadline and the agent-wide timeout.
    fn effective_timeout(&self, request: &HttpRequest) -> Option<Duration> {
        match (request.timeout, self.request_timeout) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn send_blocking(
        agent: &ureq::Agent,
        timeout: Option<Duration>,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        let mut call = agent.request(request.method.as_str(), &request.url);
        if let Some(timeout) = timeout {
            call = call.timeout(timeout);
        }
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        let outcome = match request.method {
            Method::Get => call.call(),
            Method::Post => call.send_bytes(&request.body),
        };
        let response = match outcome {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => return Err(map_transport(&transport)),
        };

        let status = response.status();
        let headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = response.header(&name)?.to_owned();
                Some((name, value))
            })
            .collect();
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| io_error(&e))?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Some(crate::client::DEFAULT_CONNECT_TIMEOUT), None)
    }
}

#[async_trait]
impl HttpTransport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let agent = self.agent.clone();
        let timeout = self.effective_timeout(&request);
        tokio::task::spawn_blocking(move || Self::send_blocking(&agent, timeout, request))
            .await
            .map_err(|e| Error::transport(TransportErrorKind::Io, format!("HTTP worker failed: {e}")))?
    }
}

fn io_error(err: &std::io::Error) -> Error {
    let kind = match err.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => TransportErrorKind::Timeout,
        _ => TransportErrorKind::Io,
    };
    Error::transport(kind, err.to_string())
}

fn map_transport(transport: &ureq::Transport) -> Error {
    let timed_out = std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .is_some_and(|io| {
            matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        });
    let kind = match transport.kind() {
        _ if timed_out => TransportErrorKind::Timeout,
        ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => TransportErrorKind::Connect,
        ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
            return Error::Configuration(transport.to_string());
        }
        _ => TransportErrorKind::Io,
    };
    Error::transport(kind, transport.to_string())
}
