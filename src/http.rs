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

//! HTTP/REST client for Triton Inference Server.
//!
//! [`HttpClient`] speaks the KServe v2 REST protocol with Triton's binary
//! tensor extension. An inference request body is a JSON header optionally
//! followed by the raw bytes of every binary input, in input order; the
//! `Inference-Header-Content-Length` header tells the server where the JSON
//! ends. Responses use the same framing, and each binary output declares its
//! segment length in `parameters.binary_data_size`.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> tritonclient::error::Result<()> {
//! use tritonclient::client::{ClientOptions, InferenceClient};
//! use tritonclient::context::CallContext;
//! use tritonclient::datatype::DataType;
//! use tritonclient::http::HttpClient;
//! use tritonclient::infer::{InferInput, InferRequestBuilder};
//!
//! let client = HttpClient::new("localhost:8000", ClientOptions::default())?;
//! let ctx = CallContext::new();
//!
//! let input = InferInput::new("INPUT0", vec![1, 4], DataType::Fp16)?
//!     .with_data(vec![0.5f32, 1.0, 1.5, 2.0])?;
//! let request = InferRequestBuilder::new("fp16_model").input(input).build()?;
//!
//! let result = client.infer(request, &ctx).await?;
//! let values: Vec<f32> = result.as_f32("OUTPUT0")?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::client::{ClientOptions, InferenceClient};
use crate::context::CallContext;
use crate::datatype::DataType;
use crate::error::{Error, Result, ServerCode};
use crate::infer::{InferInput, InferRequest, ParameterValue, Parameters, TensorData, TensorValues};
use crate::response::{
    InferResult, ModelIndex, ModelMetadata, OutputData, OutputTensor, Scalar, ServerMetadata,
};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, UreqTransport};

/// Header carrying the byte length of the JSON part of a binary body.
pub const HEADER_CONTENT_LENGTH: &str = "Inference-Header-Content-Length";

const BINARY_DATA_SIZE: &str = "binary_data_size";

/// A client for communicating with Triton Inference Server via HTTP/REST.
///
/// Cloning is cheap; clones share the transport and its connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    verbose: bool,
}

impl HttpClient {
    /// Creates a client for `url` using the built-in `ureq` transport.
    ///
    /// No connection is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a malformed URL or inconsistent
    /// options.
    pub fn new(url: &str, options: ClientOptions) -> Result<Self> {
        options.validate()?;
        let transport = UreqTransport::new(options.connect_timeout, options.request_timeout);
        Self::with_transport(url, &options, Arc::new(transport))
    }

    /// Creates a client that sends every request through `transport`.
    ///
    /// Timeouts and TLS verification are then the transport's concern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a malformed URL.
    pub fn with_transport(
        url: &str,
        options: &ClientOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: options.resolve_url(url)?,
            transport,
            verbose: options.verbose,
        })
    }

    /// Returns the resolved base URL, e.g. `http://localhost:8000`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(
        &self,
        operation: &'static str,
        ctx: &CallContext,
        mut request: HttpRequest,
    ) -> Result<HttpResponse> {
        request.timeout = ctx.deadline();
        tracing::debug!(operation, method = %request.method, url = %request.url, "sending request");
        ctx.run(operation, self.transport.send(request)).await
    }

    async fn get(&self, operation: &'static str, ctx: &CallContext, path: &str) -> Result<HttpResponse> {
        let request = HttpRequest {
            method: Method::Get,
            url: self.url(path),
            headers: Vec::new(),
            body: Vec::new(),
            timeout: None,
        };
        self.execute(operation, ctx, request).await
    }

    async fn post_json(
        &self,
        operation: &'static str,
        ctx: &CallContext,
        path: &str,
        body: &Value,
    ) -> Result<HttpResponse> {
        let request = HttpRequest {
            method: Method::Post,
            url: self.url(path),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.to_string().into_bytes(),
            timeout: None,
        };
        let response = self.execute(operation, ctx, request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(server_error(operation, &response))
        }
    }

    /// Health endpoints answer with a bare status: 200 means yes.
    async fn probe(&self, operation: &'static str, ctx: &CallContext, path: &str) -> Result<bool> {
        let response = self.get(operation, ctx, path).await?;
        Ok(response.status == 200)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        ctx: &CallContext,
        path: &str,
    ) -> Result<T> {
        let response = self.get(operation, ctx, path).await?;
        if !response.is_success() {
            return Err(server_error(operation, &response));
        }
        parse_json(&response.body)
    }
}

fn model_path(model_name: &str, model_version: &str) -> String {
    if model_version.is_empty() {
        format!("/v2/models/{model_name}")
    } else {
        format!("/v2/models/{model_name}/versions/{model_version}")
    }
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::MalformedResponse(format!("invalid JSON response: {e}")))
}

/// Converts a non-2xx response into [`Error::Server`], keeping the server's
/// message verbatim.
fn server_error(operation: &str, response: &HttpResponse) -> Error {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let message = match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(body) => body.error,
        Err(_) if response.body.is_empty() => format!("HTTP status {}", response.status),
        Err(_) => String::from_utf8_lossy(&response.body).into_owned(),
    };
    tracing::warn!(operation, status = response.status, %message, "server returned an error");
    Error::Server {
        code: ServerCode::Http(response.status),
        message,
    }
}

#[async_trait]
impl InferenceClient for HttpClient {
    async fn infer(&self, request: InferRequest, ctx: &CallContext) -> Result<InferResult> {
        let path = format!(
            "{}/infer",
            model_path(request.model_name(), request.model_version())
        );
        let (body, json_len) = encode_request(&request)?;
        if self.verbose {
            tracing::info!(
                model = request.model_name(),
                inputs = request.inputs().len(),
                json_bytes = json_len.unwrap_or(body.len()),
                binary_bytes = json_len.map_or(0, |len| body.len() - len),
                "infer request"
            );
        } else {
            tracing::debug!(model = request.model_name(), bytes = body.len(), "infer request");
        }

        let headers = match json_len {
            Some(len) => vec![
                (HEADER_CONTENT_LENGTH.into(), len.to_string()),
                ("Content-Type".into(), "application/octet-stream".into()),
            ],
            None => vec![("Content-Type".into(), "application/json".into())],
        };
        let http_request = HttpRequest {
            method: Method::Post,
            url: self.url(&path),
            headers,
            body,
            timeout: None,
        };

        let response = self.execute("infer", ctx, http_request).await?;
        if !response.is_success() {
            return Err(server_error("infer", &response));
        }
        let result = decode_response(&response)?;
        if self.verbose {
            tracing::info!(
                model = result.model_name(),
                outputs = result.outputs().len(),
                bytes = response.body.len(),
                "infer response"
            );
        }
        Ok(result)
    }

    async fn is_server_live(&self, ctx: &CallContext) -> Result<bool> {
        self.probe("server_live", ctx, "/v2/health/live").await
    }

    async fn is_server_ready(&self, ctx: &CallContext) -> Result<bool> {
        self.probe("server_ready", ctx, "/v2/health/ready").await
    }

    async fn is_model_ready(
        &self,
        model_name: &str,
        model_version: &str,
        ctx: &CallContext,
    ) -> Result<bool> {
        let path = format!("{}/ready", model_path(model_name, model_version));
        self.probe("model_ready", ctx, &path).await
    }

    async fn server_metadata(&self, ctx: &CallContext) -> Result<ServerMetadata> {
        self.get_json("server_metadata", ctx, "/v2").await
    }

    async fn model_metadata(
        &self,
        model_name: &str,
        model_version: &str,
        ctx: &CallContext,
    ) -> Result<ModelMetadata> {
        self.get_json("model_metadata", ctx, &model_path(model_name, model_version))
            .await
    }

    async fn repository_index(&self, ctx: &CallContext) -> Result<Vec<ModelIndex>> {
        let response = self
            .post_json("repository_index", ctx, "/v2/repository/index", &Value::Object(Map::new()))
            .await?;
        parse_json(&response.body)
    }

    async fn load_model(&self, model_name: &str, ctx: &CallContext) -> Result<()> {
        let path = format!("/v2/repository/models/{model_name}/load");
        self.post_json("load_model", ctx, &path, &Value::Object(Map::new()))
            .await?;
        Ok(())
    }

    async fn unload_model(&self, model_name: &str, ctx: &CallContext) -> Result<()> {
        let path = format!("/v2/repository/models/{model_name}/unload");
        self.post_json("unload_model", ctx, &path, &Value::Object(Map::new()))
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Request framing
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RequestHeader<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    id: &'a str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    parameters: Map<String, Value>,
    inputs: Vec<InputHeader<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<OutputHeader<'a>>,
}

#[derive(Serialize)]
struct InputHeader<'a> {
    name: &'a str,
    shape: &'a [i64],
    datatype: &'static str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    parameters: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Serialize)]
struct OutputHeader<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    parameters: Map<String, Value>,
}

fn parameter_to_json(key: &str, value: &ParameterValue) -> Result<Value> {
    Ok(match value {
        ParameterValue::Bool(v) => Value::Bool(*v),
        ParameterValue::Int64(v) => Value::from(*v),
        ParameterValue::Uint64(v) => Value::from(*v),
        ParameterValue::Double(v) => Number::from_f64(*v).map(Value::Number).ok_or_else(|| {
            Error::InvalidInput(format!("parameter '{key}' is not a finite number"))
        })?,
        ParameterValue::String(v) => Value::String(v.clone()),
    })
}

fn parameters_to_json(parameters: &Parameters) -> Result<Map<String, Value>> {
    parameters
        .iter()
        .map(|(key, value)| Ok((key.clone(), parameter_to_json(key, value)?)))
        .collect()
}

fn parameters_from_json(parameters: Map<String, Value>) -> Parameters {
    parameters
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Bool(v) => ParameterValue::Bool(v),
                Value::String(v) => ParameterValue::String(v),
                Value::Number(n) => {
                    if let Some(v) = n.as_i64() {
                        ParameterValue::Int64(v)
                    } else if let Some(v) = n.as_u64() {
                        ParameterValue::Uint64(v)
                    } else {
                        ParameterValue::Double(n.as_f64()?)
                    }
                }
                _ => return None,
            };
            Some((key, value))
        })
        .collect()
}

/// Renders typed values as the JSON `data` array, rounding floats to the
/// precision of `datatype` so both encodings carry the same numbers.
#[allow(clippy::cast_possible_truncation)]
fn values_to_json(input: &InferInput, values: &TensorValues) -> Result<Value> {
    let datatype = input.datatype();
    let items: Vec<Value> = match values {
        TensorValues::Bool(v) => v.iter().copied().map(Value::Bool).collect(),
        TensorValues::Bytes(items) => items
            .iter()
            .map(|item| {
                std::str::from_utf8(item)
                    .map(|s| Value::String(s.to_owned()))
                    .map_err(|_| {
                        Error::TypeMismatch(format!(
                            "input '{}' has non-UTF-8 BYTES; send it as binary data",
                            input.name()
                        ))
                    })
            })
            .collect::<Result<_>>()?,
        TensorValues::Float32(_) | TensorValues::Float64(_) => values
            .floats()
            .map(|v| {
                let v = match datatype {
                    DataType::Fp16 => half::f16::from_f64(v).to_f64(),
                    DataType::Bf16 => half::bf16::from_f64(v).to_f64(),
                    DataType::Fp32 => f64::from(v as f32),
                    _ => v,
                };
                Number::from_f64(v).map(Value::Number).ok_or_else(|| {
                    Error::TypeMismatch(format!(
                        "input '{}' holds {v}, which JSON cannot carry; send it as binary data",
                        input.name()
                    ))
                })
            })
            .collect::<Result<_>>()?,
        _ => values
            .integers()
            .map(|v| match i64::try_from(v) {
                Ok(v) => Value::from(v),
                // Validated against an integer range, so at most u64::MAX.
                Err(_) => Value::from(u64::try_from(v).unwrap_or(u64::MAX)),
            })
            .collect(),
    };
    Ok(Value::Array(items))
}

/// Frames `request` as a JSON header plus binary trailer.
///
/// Returns the body and, when a trailer was appended, the JSON header
/// length for [`HEADER_CONTENT_LENGTH`].
pub(crate) fn encode_request(request: &InferRequest) -> Result<(Vec<u8>, Option<usize>)> {
    let mut trailer = Vec::new();
    let mut inputs = Vec::with_capacity(request.inputs().len());

    for input in request.inputs() {
        let mut parameters = parameters_to_json(input.parameters())?;
        let data = match input.data() {
            Some(TensorData::Values(values)) if !input.is_binary() => {
                Some(values_to_json(input, values)?)
            }
            _ => {
                let raw = input.to_raw_bytes()?;
                parameters.insert(BINARY_DATA_SIZE.into(), Value::from(raw.len()));
                trailer.extend_from_slice(&raw);
                None
            }
        };
        inputs.push(InputHeader {
            name: input.name(),
            shape: input.shape(),
            datatype: input.datatype().as_str(),
            parameters,
            data,
        });
    }

    let outputs = request
        .outputs()
        .iter()
        .map(|output| {
            let mut parameters = parameters_to_json(output.parameters())?;
            parameters.insert("binary_data".into(), Value::Bool(output.is_binary()));
            if let Some(count) = output.requested_class_count() {
                parameters.insert("classification".into(), Value::from(count));
            }
            Ok(OutputHeader {
                name: output.name(),
                parameters,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut parameters = parameters_to_json(request.parameters())?;
    if outputs.is_empty() {
        parameters.insert("binary_data_output".into(), Value::Bool(true));
    }

    let header = RequestHeader {
        id: request.id(),
        parameters,
        inputs,
        outputs,
    };
    let mut body = serde_json::to_vec(&header)
        .map_err(|e| Error::InvalidInput(format!("cannot serialize request header: {e}")))?;

    if trailer.is_empty() {
        Ok((body, None))
    } else {
        let json_len = body.len();
        body.append(&mut trailer);
        Ok((body, Some(json_len)))
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ResponseHeader {
    #[serde(default)]
    model_name: String,
    #[serde(default)]
    model_version: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    parameters: Map<String, Value>,
    #[serde(default)]
    outputs: Vec<ResponseOutput>,
}

#[derive(Deserialize)]
struct ResponseOutput {
    name: String,
    datatype: String,
    shape: Vec<i64>,
    #[serde(default)]
    parameters: Map<String, Value>,
    #[serde(default)]
    data: Option<Value>,
}

/// Splits a successful response into its JSON header and binary segments.
pub(crate) fn decode_response(response: &HttpResponse) -> Result<InferResult> {
    let body = response.body.as_slice();
    let (json, mut trailer) = match response.header(HEADER_CONTENT_LENGTH) {
        Some(value) => {
            let len: usize = value.trim().parse().map_err(|_| {
                Error::MalformedResponse(format!("invalid {HEADER_CONTENT_LENGTH} '{value}'"))
            })?;
            if len > body.len() {
                return Err(Error::MalformedResponse(format!(
                    "{HEADER_CONTENT_LENGTH} is {len} but the body has {} bytes",
                    body.len()
                )));
            }
            body.split_at(len)
        }
        None => (body, &[][..]),
    };
    let header: ResponseHeader = parse_json(json)?;

    let mut outputs = Vec::with_capacity(header.outputs.len());
    for output in header.outputs {
        let datatype = DataType::parse(&output.datatype).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "output '{}' has unknown datatype '{}'",
                output.name, output.datatype
            ))
        })?;

        let binary_size = match output.parameters.get(BINARY_DATA_SIZE) {
            Some(size) => Some(
                size.as_u64()
                    .and_then(|size| usize::try_from(size).ok())
                    .ok_or_else(|| {
                        Error::MalformedResponse(format!(
                            "output '{}' has invalid {BINARY_DATA_SIZE} {size}",
                            output.name
                        ))
                    })?,
            ),
            None => None,
        };

        let data = match (binary_size, output.data) {
            (Some(size), _) => {
                if size > trailer.len() {
                    return Err(Error::MalformedResponse(format!(
                        "output '{}' declares {size} binary bytes but only {} remain",
                        output.name,
                        trailer.len()
                    )));
                }
                let (segment, rest) = trailer.split_at(size);
                trailer = rest;
                OutputData::Raw(segment.to_vec())
            }
            (None, Some(data)) => json_output_data(&output.name, datatype, data)?,
            (None, None) => OutputData::Values(Vec::new()),
        };

        outputs.push(OutputTensor::new(
            output.name,
            datatype,
            output.shape,
            parameters_from_json(output.parameters),
            data,
        ));
    }

    if !trailer.is_empty() {
        return Err(Error::MalformedResponse(format!(
            "{} unclaimed bytes after the last binary output",
            trailer.len()
        )));
    }

    Ok(InferResult::new(
        header.model_name,
        header.model_version,
        header.id,
        parameters_from_json(header.parameters),
        outputs,
    ))
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|item| flatten_into(item, out)),
        scalar => out.push(scalar),
    }
}

/// Converts a (possibly nested) JSON `data` array to typed output data.
fn json_output_data(name: &str, datatype: DataType, data: Value) -> Result<OutputData> {
    let mut flat = Vec::new();
    flatten_into(data, &mut flat);
    let bad = |value: &Value| {
        Error::MalformedResponse(format!("output '{name}' has {value} in a {datatype} tensor"))
    };

    if datatype == DataType::Bytes {
        return flat
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Ok(s.into_bytes()),
                other => Err(bad(&other)),
            })
            .collect::<Result<_>>()
            .map(OutputData::Strings);
    }

    flat.iter()
        .map(|value| {
            let scalar = match datatype {
                DataType::Bool => value.as_bool().map(Scalar::Bool),
                dt if dt.is_float() => value.as_f64().map(Scalar::Float),
                dt => {
                    let scalar = value
                        .as_i64()
                        .map(Scalar::Int)
                        .or_else(|| value.as_u64().map(Scalar::Uint));
                    let in_range = |v: i128| {
                        dt.integer_range()
                            .is_some_and(|(min, max)| (min..=max).contains(&v))
                    };
                    scalar.filter(|s| match *s {
                        Scalar::Int(v) => in_range(i128::from(v)),
                        Scalar::Uint(v) => in_range(i128::from(v)),
                        _ => false,
                    })
                }
            };
            scalar.ok_or_else(|| bad(value))
        })
        .collect::<Result<_>>()
        .map(OutputData::Values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
