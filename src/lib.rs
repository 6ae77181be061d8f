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

//! Rust client library for NVIDIA Triton Inference Server.
//!
//! This crate talks to [Triton Inference Server](https://github.com/triton-inference-server/server)
//! over either of its two wire protocols, HTTP/REST with binary tensor
//! framing or gRPC, through one async [`InferenceClient`] trait. Most of the
//! work happens in the typed tensor layer: inputs are validated against
//! their data type and shape before anything is sent, and outputs are
//! decoded from the server's raw little-endian bytes with exact length
//! checks.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tritonclient::{CallContext, ClientOptions, HttpClient, InferenceClient};
//! use tritonclient::datatype::DataType;
//! use tritonclient::infer::{InferInput, InferRequestBuilder};
//!
//! # async fn example() -> tritonclient::error::Result<()> {
//! let client = HttpClient::new("localhost:8000", ClientOptions::default())?;
//! let ctx = CallContext::new();
//!
//! // Check server health
//! assert!(client.is_server_live(&ctx).await?);
//! assert!(client.is_server_ready(&ctx).await?);
//!
//! // Build an inference request
//! let input = InferInput::new("input0", vec![1, 16], DataType::Fp32)?
//!     .with_data(vec![0.0f32; 16])?;
//!
//! let request = InferRequestBuilder::new("my_model")
//!     .model_version("1")
//!     .input(input)
//!     .output("output0")
//!     .build()?;
//!
//! // Run inference
//! let result = client.infer(request, &ctx).await?;
//! let output_data = result.as_f32("output0")?;
//! println!("Output: {:?}", output_data);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`datatype`] -- Tensor data types, element widths and value checks.
//! - [`infer`] -- Input tensors, requested outputs and the request builder.
//! - [`response`] -- [`InferResult`](response::InferResult) and its typed
//!   accessors, plus metadata types.
//! - [`client`] -- The [`InferenceClient`] trait and [`ClientOptions`].
//! - [`http`] / [`grpc`] -- The two protocol implementations.
//! - [`transport`] -- The pluggable HTTP transport.
//! - [`context`] -- Per-call deadlines and cancellation.
//! - [`pooling`] -- Masked mean pooling over decoded hidden states.
//! - [`error`] -- Error types and the [`Result`](error::Result) alias.
//! - [`generated`] -- Raw protobuf/gRPC types for advanced usage.

pub mod client;
pub mod context;
pub mod datatype;
pub mod error;
pub mod generated;
pub mod grpc;
pub mod http;
pub mod infer;
pub mod pooling;
pub mod response;
pub mod transport;

pub use client::{ClientOptions, InferenceClient};
pub use context::{CallContext, CancelToken};
pub use grpc::GrpcClient;
pub use http::HttpClient;
