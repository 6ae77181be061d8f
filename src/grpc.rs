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

//! gRPC client for Triton Inference Server.
//!
//! [`GrpcClient`] speaks the KServe v2 gRPC protocol over a tonic channel.
//! Inputs always travel in `raw_input_contents`; outputs are decoded from
//! `raw_output_contents` when the server uses it, or from the typed
//! `contents` field otherwise.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> tritonclient::error::Result<()> {
//! use tritonclient::client::InferenceClient;
//! use tritonclient::context::CallContext;
//! use tritonclient::grpc::GrpcClient;
//!
//! let client = GrpcClient::connect("localhost:8001").await?;
//! let ctx = CallContext::new();
//! let metadata = client.server_metadata(&ctx).await?;
//! println!("Server: {} v{}", metadata.name, metadata.version);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio_stream::{Stream, StreamExt};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::client::{ClientOptions, InferenceClient};
use crate::context::{CallContext, CancelToken};
use crate::datatype::DataType;
use crate::error::{Error, Result, TransportErrorKind};
use crate::generated::inference::{
    self, grpc_inference_service_client::GrpcInferenceServiceClient,
    infer_parameter::ParameterChoice,
};
use crate::infer::{InferRequest, ParameterValue, Parameters};
use crate::response::{
    InferResult, ModelIndex, ModelMetadata, OutputData, OutputTensor, Scalar, ServerMetadata,
    TensorMetadata,
};

/// A client for communicating with Triton Inference Server via gRPC.
///
/// The client is cheaply cloneable; clones share the same underlying gRPC
/// channel and can be used concurrently from multiple tasks.
#[derive(Debug, Clone)]
pub struct GrpcClient {
    inner: GrpcInferenceServiceClient,
    request_timeout: Option<Duration>,
    verbose: bool,
}

impl GrpcClient {
    /// Connects to a server at `url` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a malformed URL and
    /// [`Error::Transport`] if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_options(url, ClientOptions::default()).await
    }

    /// Connects to a server at `url` with custom options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a malformed URL or inconsistent
    /// options, and [`Error::Transport`] if the connection cannot be
    /// established.
    pub async fn connect_with_options(url: &str, options: ClientOptions) -> Result<Self> {
        options.validate()?;
        let url = options.resolve_url(url)?;
        let mut endpoint = Endpoint::from_shared(url.clone())
            .map_err(|e| Error::Configuration(format!("invalid URL '{url}': {e}")))?;

        if options.tls {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| Error::Configuration(format!("TLS setup failed: {e}")))?;
        }
        if let Some(timeout) = options.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }
        if let Some(timeout) = options.request_timeout {
            endpoint = endpoint.timeout(timeout);
        }
        if let Some(interval) = options.keep_alive_interval {
            endpoint = endpoint
                .keep_alive_while_idle(true)
                .http2_keep_alive_interval(interval);
        }
        if let Some(timeout) = options.keep_alive_timeout {
            endpoint = endpoint.keep_alive_timeout(timeout);
        }

        tracing::debug!(%url, tls = options.tls, "connecting gRPC channel");
        let channel = endpoint.connect().await?;
        Ok(Self::from_channel(channel, &options))
    }

    /// Wraps an already-configured channel, e.g. one with custom TLS
    /// settings or interceptors.
    #[must_use]
    pub fn from_channel(channel: Channel, options: &ClientOptions) -> Self {
        let inner = GrpcInferenceServiceClient::new(channel)
            .max_decoding_message_size(options.max_message_size)
            .max_encoding_message_size(options.max_message_size);
        Self {
            inner,
            request_timeout: options.request_timeout,
            verbose: options.verbose,
        }
    }

    /// Performs streaming inference over `ModelStreamInfer`.
    ///
    /// Each request yields zero or more responses; decoupled models may
    /// produce several per request. The stream is not bounded by a
    /// [`CallContext`]; drop it to cancel.
    ///
    /// # Errors
    ///
    /// Returns an error if a request cannot be encoded or the stream cannot
    /// be established. Individual stream items carry their own errors.
    pub async fn infer_stream(
        &self,
        requests: impl IntoIterator<Item = InferRequest>,
    ) -> Result<impl Stream<Item = Result<InferResult>>> {
        let messages = requests
            .into_iter()
            .map(encode_request)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(requests = messages.len(), "opening inference stream");

        let response = self
            .inner
            .clone()
            .model_stream_infer(tokio_stream::iter(messages))
            .await?;

        Ok(response.into_inner().map(|item| {
            let response = item?;
            if !response.error_message.is_empty() {
                return Err(Error::StreamInference(response.error_message));
            }
            let infer_response = response.infer_response.ok_or_else(|| {
                Error::MalformedResponse("stream response has no infer_response".into())
            })?;
            decode_response(infer_response)
        }))
    }

    async fn unary<M, R, F, Fut>(
        &self,
        operation: &'static str,
        ctx: &CallContext,
        message: M,
        call: F,
    ) -> Result<R>
    where
        F: FnOnce(GrpcInferenceServiceClient, tonic::Request<M>) -> Fut,
        Fut: Future<Output = std::result::Result<tonic::Response<R>, tonic::Status>>,
    {
        let mut request = tonic::Request::new(message);
        if let Some(deadline) = ctx.deadline() {
            request.set_timeout(deadline);
        }
        let pending = call(self.inner.clone(), request);
        let response = ctx
            .run(operation, async move { pending.await.map_err(Error::from) })
            .await
            .map_err(|e| self.classify_cancelled(ctx, e))
            .inspect_err(|e| tracing::warn!(operation, error = %e, "gRPC call failed"))?;
        Ok(response.into_inner())
    }

    /// tonic reports an elapsed client-side deadline as `CANCELLED`. Unless
    /// the caller actually fired its token, that is a timeout.
    fn classify_cancelled(&self, ctx: &CallContext, err: Error) -> Error {
        let deadline_applies = ctx.deadline().is_some() || self.request_timeout.is_some();
        let caller_cancelled = ctx.token().is_some_and(CancelToken::is_cancelled);
        match err {
            Error::Transport {
                kind: TransportErrorKind::Cancelled,
                message,
            } if deadline_applies && !caller_cancelled => {
                Error::transport(TransportErrorKind::Timeout, message)
            }
            other => other,
        }
    }
}

#[async_trait]
impl InferenceClient for GrpcClient {
    async fn infer(&self, request: InferRequest, ctx: &CallContext) -> Result<InferResult> {
        let message = encode_request(request)?;
        let payload: usize = message.raw_input_contents.iter().map(Vec::len).sum();
        if self.verbose {
            tracing::info!(
                model = %message.model_name,
                inputs = message.inputs.len(),
                outputs = message.outputs.len(),
                payload,
                "ModelInfer request"
            );
        } else {
            tracing::debug!(model = %message.model_name, payload, "ModelInfer request");
        }

        let response = self
            .unary("ModelInfer", ctx, message, |mut client, request| async move {
                client.model_infer(request).await
            })
            .await?;
        decode_response(response)
    }

    async fn is_server_live(&self, ctx: &CallContext) -> Result<bool> {
        let response = self
            .unary("ServerLive", ctx, inference::ServerLiveRequest {}, |mut c, r| async move {
                c.server_live(r).await
            })
            .await?;
        Ok(response.live)
    }

    async fn is_server_ready(&self, ctx: &CallContext) -> Result<bool> {
        let response = self
            .unary("ServerReady", ctx, inference::ServerReadyRequest {}, |mut c, r| async move {
                c.server_ready(r).await
            })
            .await?;
        Ok(response.ready)
    }

    async fn is_model_ready(
        &self,
        model_name: &str,
        model_version: &str,
        ctx: &CallContext,
    ) -> Result<bool> {
        let message = inference::ModelReadyRequest {
            name: model_name.to_owned(),
            version: model_version.to_owned(),
        };
        let response = self
            .unary("ModelReady", ctx, message, |mut c, r| async move {
                c.model_ready(r).await
            })
            .await?;
        Ok(response.ready)
    }

    async fn server_metadata(&self, ctx: &CallContext) -> Result<ServerMetadata> {
        let md = self
            .unary(
                "ServerMetadata",
                ctx,
                inference::ServerMetadataRequest {},
                |mut c, r| async move { c.server_metadata(r).await },
            )
            .await?;
        Ok(ServerMetadata {
            name: md.name,
            version: md.version,
            extensions: md.extensions,
        })
    }

    async fn model_metadata(
        &self,
        model_name: &str,
        model_version: &str,
        ctx: &CallContext,
    ) -> Result<ModelMetadata> {
        let message = inference::ModelMetadataRequest {
            name: model_name.to_owned(),
            version: model_version.to_owned(),
        };
        let md = self
            .unary("ModelMetadata", ctx, message, |mut c, r| async move {
                c.model_metadata(r).await
            })
            .await?;
        let tensor = |t: inference::model_metadata_response::TensorMetadata| TensorMetadata {
            name: t.name,
            datatype: t.datatype,
            shape: t.shape,
        };
        Ok(ModelMetadata {
            name: md.name,
            versions: md.versions,
            platform: md.platform,
            inputs: md.inputs.into_iter().map(tensor).collect(),
            outputs: md.outputs.into_iter().map(tensor).collect(),
        })
    }

    async fn repository_index(&self, ctx: &CallContext) -> Result<Vec<ModelIndex>> {
        let message = inference::RepositoryIndexRequest {
            repository_name: String::new(),
            ready: false,
        };
        let response = self
            .unary("RepositoryIndex", ctx, message, |mut c, r| async move {
                c.repository_index(r).await
            })
            .await?;
        Ok(response
            .models
            .into_iter()
            .map(|m| ModelIndex {
                name: m.name,
                version: m.version,
                state: m.state,
                reason: m.reason,
            })
            .collect())
    }

    async fn load_model(&self, model_name: &str, ctx: &CallContext) -> Result<()> {
        let message = inference::RepositoryModelLoadRequest {
            repository_name: String::new(),
            model_name: model_name.to_owned(),
            parameters: HashMap::new(),
        };
        self.unary("RepositoryModelLoad", ctx, message, |mut c, r| async move {
            c.repository_model_load(r).await
        })
        .await?;
        Ok(())
    }

    async fn unload_model(&self, model_name: &str, ctx: &CallContext) -> Result<()> {
        let message = inference::RepositoryModelUnloadRequest {
            repository_name: String::new(),
            model_name: model_name.to_owned(),
            parameters: HashMap::new(),
        };
        self.unary("RepositoryModelUnload", ctx, message, |mut c, r| async move {
            c.repository_model_unload(r).await
        })
        .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Message conversion
// ---------------------------------------------------------------------------

fn to_proto_parameters(parameters: Parameters) -> HashMap<String, inference::InferParameter> {
    parameters
        .into_iter()
        .map(|(key, value)| {
            let choice = match value {
                ParameterValue::Bool(v) => ParameterChoice::BoolParam(v),
                ParameterValue::Int64(v) => ParameterChoice::Int64Param(v),
                ParameterValue::Uint64(v) => ParameterChoice::Uint64Param(v),
                ParameterValue::Double(v) => ParameterChoice::DoubleParam(v),
                ParameterValue::String(v) => ParameterChoice::StringParam(v),
            };
            let parameter = inference::InferParameter {
                parameter_choice: Some(choice),
            };
            (key, parameter)
        })
        .collect()
}

fn from_proto_parameters(parameters: HashMap<String, inference::InferParameter>) -> Parameters {
    parameters
        .into_iter()
        .filter_map(|(key, parameter)| {
            let value = match parameter.parameter_choice? {
                ParameterChoice::BoolParam(v) => ParameterValue::Bool(v),
                ParameterChoice::Int64Param(v) => ParameterValue::Int64(v),
                ParameterChoice::Uint64Param(v) => ParameterValue::Uint64(v),
                ParameterChoice::DoubleParam(v) => ParameterValue::Double(v),
                ParameterChoice::StringParam(v) => ParameterValue::String(v),
            };
            Some((key, value))
        })
        .collect()
}

/// Builds a `ModelInferRequest` carrying every input in
/// `raw_input_contents`.
pub(crate) fn encode_request(request: InferRequest) -> Result<inference::ModelInferRequest> {
    let mut inputs = Vec::with_capacity(request.inputs.len());
    let mut raw_input_contents = Vec::with_capacity(request.inputs.len());
    for input in request.inputs {
        let wire = input.into_wire()?;
        inputs.push(inference::model_infer_request::InferInputTensor {
            name: wire.name,
            datatype: wire.datatype.as_str().to_owned(),
            shape: wire.shape,
            parameters: to_proto_parameters(wire.parameters),
            contents: None,
        });
        raw_input_contents.push(wire.raw);
    }

    let outputs = request
        .outputs
        .into_iter()
        .map(|output| {
            let mut parameters = output.parameters().clone();
            if let Some(count) = output.requested_class_count() {
                parameters.insert("classification".into(), ParameterValue::Int64(count.into()));
            }
            inference::model_infer_request::InferRequestedOutputTensor {
                name: output.name().to_owned(),
                parameters: to_proto_parameters(parameters),
            }
        })
        .collect();

    Ok(inference::ModelInferRequest {
        model_name: request.model_name,
        model_version: request.model_version,
        id: request.id,
        parameters: to_proto_parameters(request.parameters),
        inputs,
        outputs,
        raw_input_contents,
    })
}

/// Converts a `ModelInferResponse` into an [`InferResult`].
pub(crate) fn decode_response(response: inference::ModelInferResponse) -> Result<InferResult> {
    let mut raw = response.raw_output_contents;
    if !raw.is_empty() && raw.len() != response.outputs.len() {
        return Err(Error::MalformedResponse(format!(
            "{} outputs but {} raw_output_contents entries",
            response.outputs.len(),
            raw.len()
        )));
    }
    raw.reverse();

    let outputs = response
        .outputs
        .into_iter()
        .map(|output| {
            let datatype = DataType::parse(&output.datatype).ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "output '{}' has unknown datatype '{}'",
                    output.name, output.datatype
                ))
            })?;
            let data = match raw.pop() {
                Some(bytes) => OutputData::Raw(bytes),
                None => typed_contents(&output.name, datatype, output.contents.unwrap_or_default())?,
            };
            Ok(OutputTensor::new(
                output.name,
                datatype,
                output.shape,
                from_proto_parameters(output.parameters),
                data,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(InferResult::new(
        response.model_name,
        response.model_version,
        response.id,
        from_proto_parameters(response.parameters),
        outputs,
    ))
}

/// Reads the typed `contents` field matching `datatype`.
fn typed_contents(
    name: &str,
    datatype: DataType,
    contents: inference::InferTensorContents,
) -> Result<OutputData> {
    let signed = |values: Vec<i64>| -> Result<OutputData> {
        if let Some((min, max)) = datatype.integer_range() {
            if let Some(v) = values.iter().find(|&&v| i128::from(v) < min || i128::from(v) > max) {
                return Err(Error::MalformedResponse(format!(
                    "output '{name}' value {v} is out of range for {datatype}"
                )));
            }
        }
        Ok(OutputData::Values(values.into_iter().map(Scalar::Int).collect()))
    };
    let unsigned = |values: Vec<u64>| -> Result<OutputData> {
        if let Some((_, max)) = datatype.integer_range() {
            if let Some(v) = values.iter().find(|&&v| i128::from(v) > max) {
                return Err(Error::MalformedResponse(format!(
                    "output '{name}' value {v} is out of range for {datatype}"
                )));
            }
        }
        Ok(OutputData::Values(values.into_iter().map(Scalar::Uint).collect()))
    };

    match datatype {
        DataType::Bool => Ok(OutputData::Values(
            contents.bool_contents.into_iter().map(Scalar::Bool).collect(),
        )),
        DataType::Int8 | DataType::Int16 | DataType::Int32 => {
            signed(contents.int_contents.into_iter().map(i64::from).collect())
        }
        DataType::Int64 => signed(contents.int64_contents),
        DataType::Uint8 | DataType::Uint16 | DataType::Uint32 => {
            unsigned(contents.uint_contents.into_iter().map(u64::from).collect())
        }
        DataType::Uint64 => unsigned(contents.uint64_contents),
        DataType::Fp16 | DataType::Bf16 | DataType::Fp32 => Ok(OutputData::Values(
            contents
                .fp32_contents
                .into_iter()
                .map(|v| Scalar::Float(f64::from(v)))
                .collect(),
        )),
        DataType::Fp64 => Ok(OutputData::Values(
            contents.fp64_contents.into_iter().map(Scalar::Float).collect(),
        )),
        DataType::Bytes => Ok(OutputData::Strings(contents.bytes_contents)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
