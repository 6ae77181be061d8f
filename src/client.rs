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

//! The protocol-neutral client contract and its configuration.
//!
//! [`InferenceClient`] is implemented by both [`HttpClient`](crate::http::HttpClient)
//! and [`GrpcClient`](crate::grpc::GrpcClient). Code written against the
//! trait runs unchanged over either protocol; the protocol is chosen once,
//! when the client is constructed.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> tritonclient::error::Result<()> {
//! use std::time::Duration;
//! use tritonclient::client::{ClientOptions, InferenceClient};
//! use tritonclient::context::CallContext;
//! use tritonclient::datatype::DataType;
//! use tritonclient::grpc::GrpcClient;
//! use tritonclient::http::HttpClient;
//! use tritonclient::infer::{InferInput, InferRequestBuilder};
//!
//! let options = ClientOptions::default().connect_timeout(Duration::from_secs(2));
//! let client: Box<dyn InferenceClient> = if std::env::var("USE_GRPC").is_ok() {
//!     Box::new(GrpcClient::connect_with_options("localhost:8001", options).await?)
//! } else {
//!     Box::new(HttpClient::new("localhost:8000", options)?)
//! };
//!
//! let ctx = CallContext::new().timeout(Duration::from_secs(5));
//! let request = InferRequestBuilder::new("simple")
//!     .input(InferInput::new("INPUT0", vec![1, 16], DataType::Int32)?.with_data(vec![1i32; 16])?)
//!     .output("OUTPUT0")
//!     .build()?;
//! let result = client.infer(request, &ctx).await?;
//! println!("{:?}", result.as_i32("OUTPUT0")?);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::infer::InferRequest;
use crate::response::{InferResult, ModelIndex, ModelMetadata, ServerMetadata};

/// Default maximum message size for gRPC (128 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 128 * 1024 * 1024;

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Operations common to the HTTP/REST and gRPC clients.
///
/// Each call performs exactly one attempt under the given [`CallContext`];
/// retry policy is left to the caller.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Runs one inference request.
    async fn infer(&self, request: InferRequest, ctx: &CallContext) -> Result<InferResult>;

    /// Checks whether the server process is live.
    async fn is_server_live(&self, ctx: &CallContext) -> Result<bool>;

    /// Checks whether the server is ready to accept inference requests.
    async fn is_server_ready(&self, ctx: &CallContext) -> Result<bool>;

    /// Checks whether a model is ready. Pass `""` for the default version.
    async fn is_model_ready(
        &self,
        model_name: &str,
        model_version: &str,
        ctx: &CallContext,
    ) -> Result<bool>;

    /// Retrieves server name, version and extensions.
    async fn server_metadata(&self, ctx: &CallContext) -> Result<ServerMetadata>;

    /// Retrieves a model's input and output descriptions.
    async fn model_metadata(
        &self,
        model_name: &str,
        model_version: &str,
        ctx: &CallContext,
    ) -> Result<ModelMetadata>;

    /// Lists the models in the server's repository.
    async fn repository_index(&self, ctx: &CallContext) -> Result<Vec<ModelIndex>>;

    /// Loads or reloads a model.
    async fn load_model(&self, model_name: &str, ctx: &CallContext) -> Result<()>;

    /// Unloads a model.
    async fn unload_model(&self, model_name: &str, ctx: &CallContext) -> Result<()>;
}

/// Options for configuring a client connection.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tritonclient::client::ClientOptions;
///
/// let options = ClientOptions::default()
///     .connect_timeout(Duration::from_secs(10))
///     .request_timeout(Duration::from_secs(30))
///     .tls(true)
///     .verbose(true);
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) max_message_size: usize,
    pub(crate) keep_alive_interval: Option<Duration>,
    pub(crate) keep_alive_timeout: Option<Duration>,
    pub(crate) tls: bool,
    pub(crate) verify_tls: bool,
    pub(crate) verbose: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            request_timeout: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            keep_alive_interval: None,
            keep_alive_timeout: None,
            tls: false,
            verify_tls: true,
            verbose: false,
        }
    }
}

impl ClientOptions {
    /// Sets the timeout for establishing the initial connection.
    #[must_use]
    pub fn connect_timeout(self, timeout: Duration) -> Self {
        Self {
            connect_timeout: Some(timeout),
            ..self
        }
    }

    /// Sets the read/write timeout applied to each request.
    #[must_use]
    pub fn request_timeout(self, timeout: Duration) -> Self {
        Self {
            request_timeout: Some(timeout),
            ..self
        }
    }

    /// Sets the maximum gRPC message size in bytes.
    ///
    /// Default: 128 MiB.
    #[must_use]
    pub fn max_message_size(self, size: usize) -> Self {
        Self {
            max_message_size: size,
            ..self
        }
    }

    /// Sets the HTTP/2 keep-alive interval.
    #[must_use]
    pub fn keep_alive_interval(self, interval: Duration) -> Self {
        Self {
            keep_alive_interval: Some(interval),
            ..self
        }
    }

    /// Sets the HTTP/2 keep-alive timeout.
    #[must_use]
    pub fn keep_alive_timeout(self, timeout: Duration) -> Self {
        Self {
            keep_alive_timeout: Some(timeout),
            ..self
        }
    }

    /// Connects over TLS. URLs without a scheme then default to `https`.
    #[must_use]
    pub fn tls(self, tls: bool) -> Self {
        Self { tls, ..self }
    }

    /// Controls server certificate verification. Default: `true`.
    ///
    /// The built-in transports always verify; turning this off requires a
    /// custom [`HttpTransport`](crate::transport::HttpTransport) or a
    /// pre-built channel.
    #[must_use]
    pub fn verify_tls(self, verify: bool) -> Self {
        Self {
            verify_tls: verify,
            ..self
        }
    }

    /// Logs request and response framing at `INFO` instead of `DEBUG`.
    #[must_use]
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    /// Returns whether TLS is enabled.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Returns whether verbose logging is enabled.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Checks the options for the built-in transports.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_message_size == 0 {
            return Err(Error::Configuration(
                "max_message_size must be greater than zero".into(),
            ));
        }
        if self.tls && !self.verify_tls {
            return Err(Error::Configuration(
                "certificate verification cannot be disabled on the built-in transports; \
                 inject a custom transport instead"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Turns `url` into an absolute base URL without a trailing slash.
    ///
    /// A bare `host:port` gets `http://` or `https://` according to
    /// [`tls`](Self::tls).
    pub(crate) fn resolve_url(&self, url: &str) -> Result<String> {
        let url = url.trim();
        let expected = if self.tls { "https" } else { "http" };
        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => (expected.to_owned(), url),
        };
        let rest = rest.trim_end_matches('/');
        if rest.is_empty() {
            return Err(Error::Configuration(format!("invalid URL '{url}': missing host")));
        }
        if scheme != "http" && scheme != "https" {
            return Err(Error::Configuration(format!(
                "invalid URL '{url}': unsupported scheme '{scheme}'"
            )));
        }
        if scheme != expected {
            return Err(Error::Configuration(format!(
                "URL '{url}' uses {scheme} but TLS is {}",
                if self.tls { "enabled" } else { "disabled" }
            )));
        }
        Ok(format!("{scheme}://{rest}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_options_default() {
        let opts = ClientOptions::default();
        assert_eq!(opts.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert!(opts.request_timeout.is_none());
        assert_eq!(opts.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert!(!opts.tls);
        assert!(opts.verify_tls);
        assert!(!opts.verbose);
    }

    #[test]
    fn client_options_builder() {
        let opts = ClientOptions::default()
            .connect_timeout(Duration::from_secs(10))
            .request_timeout(Duration::from_secs(30))
            .max_message_size(256)
            .keep_alive_interval(Duration::from_secs(60))
            .keep_alive_timeout(Duration::from_secs(20))
            .tls(true)
            .verbose(true);

        assert_eq!(opts.connect_timeout, Some(Duration::from_secs(10)));
        assert_eq!(opts.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(opts.max_message_size, 256);
        assert_eq!(opts.keep_alive_interval, Some(Duration::from_secs(60)));
        assert_eq!(opts.keep_alive_timeout, Some(Duration::from_secs(20)));
        assert!(opts.is_tls());
        assert!(opts.is_verbose());
    }

    #[test]
    fn url_scheme_follows_tls() {
        let plain = ClientOptions::default();
        assert_eq!(plain.resolve_url("localhost:8000").unwrap(), "http://localhost:8000");
        assert_eq!(plain.resolve_url("http://host:8000/").unwrap(), "http://host:8000");

        let tls = ClientOptions::default().tls(true);
        assert_eq!(tls.resolve_url("host:443").unwrap(), "https://host:443");
        assert_eq!(tls.resolve_url("HTTPS://host").unwrap(), "https://host");
    }

    #[test]
    fn conflicting_or_bad_urls_are_configuration_errors() {
        let plain = ClientOptions::default();
        assert!(matches!(plain.resolve_url("https://host"), Err(Error::Configuration(_))));
        assert!(matches!(plain.resolve_url("ftp://host"), Err(Error::Configuration(_))));
        assert!(matches!(plain.resolve_url(""), Err(Error::Configuration(_))));
        assert!(matches!(plain.resolve_url("http://"), Err(Error::Configuration(_))));
    }

    #[test]
    fn unverified_tls_is_rejected() {
        let opts = ClientOptions::default().tls(true).verify_tls(false);
        assert!(matches!(opts.validate(), Err(Error::Configuration(_))));
        assert!(ClientOptions::default().verify_tls(false).validate().is_ok());
        assert!(ClientOptions::default().max_message_size(0).validate().is_err());
    }
}
