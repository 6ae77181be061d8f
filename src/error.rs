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

//! Error types for the Triton client library.
//!
//! This module defines [`Error`] -- the unified error type returned by all
//! fallible operations -- along with the [`Result`] type alias used throughout
//! the crate.
//!
//! The variants are split so callers can branch on the origin of a failure:
//! their own data ([`Error::ShapeMismatch`], [`Error::TypeMismatch`],
//! [`Error::InvalidInput`]), the network ([`Error::Transport`]), a payload
//! that contradicts its own header ([`Error::MalformedResponse`]), or a
//! request the server rejected ([`Error::Server`]).

use std::fmt;

/// Convenience alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may occur when building requests for, or communicating with,
/// a Triton Inference Server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client was configured with inconsistent or malformed options.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An inference input or request was constructed with invalid parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The number of supplied elements does not match the declared shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Values cannot be represented losslessly by the requested data type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// The response does not contain an output with the requested name.
    #[error("output not found: {0}")]
    NotFound(String),

    /// The response payload is inconsistent with its declared header.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request never produced a response (connection, I/O, deadline or
    /// cancellation failure).
    #[error("transport error ({kind}): {message}")]
    Transport {
        /// What went wrong on the wire.
        kind: TransportErrorKind,
        /// Human readable detail.
        message: String,
    },

    /// The server returned a well-formed error response.
    #[error("server error ({code}): {message}")]
    Server {
        /// HTTP status or gRPC code reported by the server.
        code: ServerCode,
        /// The error message from the server, unmodified.
        message: String,
    },

    /// A streaming inference response contained an error message.
    #[error("stream inference error: {0}")]
    StreamInference(String),
}

/// Classification of [`Error::Transport`] failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection could not be established.
    Connect,
    /// Reading or writing the request failed after connecting.
    Io,
    /// The call deadline elapsed before a response arrived.
    Timeout,
    /// The caller cancelled the call.
    Cancelled,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Io => "io",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Status attached to an [`Error::Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerCode {
    /// HTTP status code from the REST endpoint.
    Http(u16),
    /// gRPC status code from the gRPC endpoint.
    Grpc(tonic::Code),
}

impl fmt::Display for ServerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(status) => write!(f, "http {status}"),
            Self::Grpc(code) => write!(f, "grpc {code:?}"),
        }
    }
}

impl Error {
    pub(crate) fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Returns `true` if the call was cancelled or its deadline elapsed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                kind: TransportErrorKind::Cancelled | TransportErrorKind::Timeout,
                ..
            }
        )
    }

    /// Returns `true` for failures caused by the caller's own tensor data.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::ShapeMismatch(_) | Self::TypeMismatch(_)
        )
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(err: tonic::transport::Error) -> Self {
        Self::transport(TransportErrorKind::Connect, err.to_string())
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_owned();
        match status.code() {
            tonic::Code::DeadlineExceeded => Self::transport(TransportErrorKind::Timeout, message),
            tonic::Code::Cancelled => Self::transport(TransportErrorKind::Cancelled, message),
            // Statuses decoded from a server response never carry a source;
            // channel failures do.
            tonic::Code::Unavailable | tonic::Code::Unknown
                if std::error::Error::source(&status).is_some() =>
            {
                Self::transport(TransportErrorKind::Connect, message)
            }
            code => Self::Server {
                code: ServerCode::Grpc(code),
                message,
            },
        }
    }
}
