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

//! Integration tests for the Triton client library.
//!
//! Tests that require a running Triton server are gated behind the
//! `TRITON_TEST_URL` environment variable (an HTTP endpoint such as
//! `localhost:8000`; `TRITON_GRPC_URL` selects the gRPC endpoint). When the
//! variables are not set, only offline tests are executed: builders, the
//! decoder, and the HTTP client against a scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{json, Value};

use tritonclient::datatype::{DataType, ALL_DATA_TYPES};
use tritonclient::error::{Error, Result, ServerCode, TransportErrorKind};
use tritonclient::infer::{
    InferInput, InferRequestBuilder, InferRequestedOutput, Parameters, TensorValues,
};
use tritonclient::pooling::mean_pool;
use tritonclient::response::{InferResult, OutputData, OutputTensor};
use tritonclient::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use tritonclient::{
    CallContext, CancelToken, ClientOptions, GrpcClient, HttpClient, InferenceClient,
};

/// Helper to get the Triton HTTP URL from the environment.
fn triton_url() -> Option<String> {
    std::env::var("TRITON_TEST_URL").ok()
}

/// Helper to get the Triton gRPC URL from the environment.
fn triton_grpc_url() -> Option<String> {
    std::env::var("TRITON_GRPC_URL").ok()
}

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

/// Replays canned responses in order and records every request.
#[derive(Debug, Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }))
    }
}

fn http_client(transport: Arc<ScriptedTransport>) -> HttpClient {
    HttpClient::with_transport("localhost:8000", &ClientOptions::default(), transport).unwrap()
}

fn status(code: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status: code,
        headers: Vec::new(),
        body: body.as_bytes().to_vec(),
    }
}

fn binary_response(header: &Value, trailer: &[u8]) -> HttpResponse {
    let mut body = serde_json::to_vec(header).unwrap();
    let len = body.len();
    body.extend_from_slice(trailer);
    HttpResponse {
        status: 200,
        headers: vec![("Inference-Header-Content-Length".into(), len.to_string())],
        body,
    }
}

fn raw_result(datatype: DataType, shape: Vec<i64>, raw: Vec<u8>) -> InferResult {
    let output = OutputTensor::new("y".into(), datatype, shape, Parameters::new(), OutputData::Raw(raw));
    InferResult::new("m", "1", "", Parameters::new(), vec![output])
}

// ---------------------------------------------------------------------------
// Offline tests (no server required)
// ---------------------------------------------------------------------------

#[test]
fn error_display_messages() {
    let err = Error::Configuration("bad url".into());
    assert!(format!("{err}").contains("bad url"));

    let err = Error::ShapeMismatch("6 != 5".into());
    assert!(err.is_data_error());

    let err = Error::Server {
        code: ServerCode::Http(400),
        message: "unknown model".into(),
    };
    assert!(format!("{err}").contains("http 400"));
    assert!(format!("{err}").contains("unknown model"));

    let err = Error::Transport {
        kind: TransportErrorKind::Timeout,
        message: "deadline".into(),
    };
    assert!(err.is_cancelled());
    assert!(format!("{err}").contains("timeout"));
}

#[test]
fn error_from_tonic_status() {
    let err: Error = tonic::Status::not_found("model not found").into();
    match &err {
        Error::Server { code, message } => {
            assert_eq!(*code, ServerCode::Grpc(tonic::Code::NotFound));
            assert_eq!(message, "model not found");
        }
        other => panic!("expected Server error, got: {other}"),
    }

    let err: Error = tonic::Status::deadline_exceeded("slow").into();
    assert!(matches!(
        err,
        Error::Transport {
            kind: TransportErrorKind::Timeout,
            ..
        }
    ));
}

#[test]
fn data_type_completeness() {
    for dt in ALL_DATA_TYPES {
        let s = dt.as_str();
        assert!(!s.is_empty());
        assert_eq!(DataType::parse(s), Some(dt));
        assert_eq!(dt.element_size().is_none(), dt == DataType::Bytes);
    }
}

#[test]
fn infer_input_builder_chain() {
    let input = InferInput::new("features", vec![1, 768], DataType::Fp32)
        .unwrap()
        .with_data(vec![0.1f32; 768])
        .unwrap()
        .with_string_parameter("key", "value")
        .with_int_parameter("priority", 5)
        .with_bool_parameter("flag", false);

    assert_eq!(input.name(), "features");
    assert_eq!(input.shape(), &[1, 768]);
    assert_eq!(input.datatype(), DataType::Fp32);
    assert_eq!(input.parameters().len(), 3);
    assert_eq!(input.byte_size(), Some(768 * 4));
}

#[test]
fn string_tensor_serialization() {
    let input = InferInput::new("text", vec![3], DataType::Bytes)
        .unwrap()
        .with_data(vec!["a", "bb", "ccc"])
        .unwrap();
    let raw = input.to_raw_bytes().unwrap();
    assert_eq!(raw.len(), 3 * 4 + 1 + 2 + 3);

    let result = raw_result(DataType::Bytes, vec![3], raw);
    assert_eq!(result.as_strings("y").unwrap(), vec!["a", "bb", "ccc"]);
}

#[test]
fn fp16_special_values_round_trip() {
    let subnormal = 2f32.powi(-20);
    let input = InferInput::new("h", vec![4], DataType::Fp16)
        .unwrap()
        .with_data(vec![1.0f32, 0.0, -0.0, subnormal])
        .unwrap();
    let result = raw_result(DataType::Fp16, vec![4], input.to_raw_bytes().unwrap());
    let decoded = result.as_f32("y").unwrap();

    assert_eq!(decoded[0], 1.0);
    assert_eq!(decoded[1].to_bits(), 0.0f32.to_bits());
    assert_eq!(decoded[2].to_bits(), (-0.0f32).to_bits());
    // 2^-20 is exactly representable as an FP16 subnormal.
    assert_eq!(decoded[3], subnormal);
}

#[test]
fn malformed_response_is_never_truncated() {
    let result = raw_result(DataType::Fp32, vec![2, 3], vec![0; 20]);
    assert!(matches!(result.as_f32("y"), Err(Error::MalformedResponse(_))));
    assert!(matches!(result.as_f64("y"), Err(Error::MalformedResponse(_))));
}

#[test]
fn mean_pool_examples() {
    let tensor = vec![vec![vec![1.0, 1.0], vec![3.0, 3.0]]];
    assert_eq!(mean_pool(&tensor, &[vec![1, 0]]).unwrap(), vec![vec![1.0, 1.0]]);
    assert_eq!(mean_pool(&tensor, &[vec![0, 0]]).unwrap(), vec![vec![0.0, 0.0]]);
    assert!(matches!(
        mean_pool(&tensor, &[vec![1, 0, 1]]),
        Err(Error::ShapeMismatch(_))
    ));
}

// ---------------------------------------------------------------------------
// HTTP client against the scripted transport
// ---------------------------------------------------------------------------

#[tokio::test]
async fn http_infer_frames_request_and_decodes_response() {
    let header = json!({
        "model_name": "simple",
        "model_version": "1",
        "id": "req-9",
        "outputs": [
            {"name": "OUTPUT0", "datatype": "INT32", "shape": [1, 2],
             "parameters": {"binary_data_size": 8}},
            {"name": "OUTPUT1", "datatype": "BYTES", "shape": [1],
             "parameters": {"binary_data_size": 6}}
        ]
    });
    let mut trailer = Vec::new();
    trailer.extend_from_slice(&5i32.to_le_bytes());
    trailer.extend_from_slice(&(-6i32).to_le_bytes());
    trailer.extend_from_slice(&2u32.to_le_bytes());
    trailer.extend_from_slice(b"ok");

    let transport = ScriptedTransport::new([binary_response(&header, &trailer)]);
    let client = http_client(transport.clone());

    let request = InferRequestBuilder::new("simple")
        .model_version("1")
        .request_id("req-9")
        .input(
            InferInput::new("INPUT0", vec![1, 2], DataType::Int32)
                .unwrap()
                .with_data(vec![2i32, 3])
                .unwrap(),
        )
        .output("OUTPUT0")
        .output("OUTPUT1")
        .build()
        .unwrap();

    let result = client.infer(request, &CallContext::new()).await.unwrap();
    assert_eq!(result.id(), "req-9");
    assert_eq!(result.as_i32("OUTPUT0").unwrap(), vec![5, -6]);
    assert_eq!(result.shape("OUTPUT0").unwrap(), &[1, 2]);
    assert_eq!(result.as_strings("OUTPUT1").unwrap(), vec!["ok"]);

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    let request = &sent[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, "http://localhost:8000/v2/models/simple/versions/1/infer");
    let json_len: usize = request
        .header("inference-header-content-length")
        .unwrap()
        .parse()
        .unwrap();
    let (json, binary) = request.body.split_at(json_len);
    let json: Value = serde_json::from_slice(json).unwrap();
    assert_eq!(json["inputs"][0]["parameters"]["binary_data_size"], 8);
    assert_eq!(binary, &[2, 0, 0, 0, 3, 0, 0, 0]);
}

#[tokio::test]
async fn http_server_error_keeps_remote_message() {
    let transport = ScriptedTransport::new([status(
        400,
        r#"{"error":"inference input 'X' data-type is 'FP32', but model 'm' expects 'INT32'"}"#,
    )]);
    let client = http_client(transport);
    let request = InferRequestBuilder::new("m")
        .input(
            InferInput::new("X", vec![1], DataType::Fp32)
                .unwrap()
                .with_data(vec![1.0f32])
                .unwrap(),
        )
        .build()
        .unwrap();

    match client.infer(request, &CallContext::new()).await {
        Err(Error::Server { code, message }) => {
            assert_eq!(code, ServerCode::Http(400));
            assert!(message.starts_with("inference input 'X'"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_short_binary_payload_is_malformed() {
    let header = json!({
        "model_name": "m",
        "outputs": [{"name": "y", "datatype": "FP32", "shape": [2, 3],
                     "parameters": {"binary_data_size": 24}}]
    });
    let transport = ScriptedTransport::new([binary_response(&header, &[0; 20])]);
    let client = http_client(transport);
    let request = InferRequestBuilder::new("m")
        .input(
            InferInput::new("x", vec![1], DataType::Int8)
                .unwrap()
                .with_data(vec![1i8])
                .unwrap(),
        )
        .build()
        .unwrap();
    let err = client.infer(request, &CallContext::new()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)), "{err}");
}

#[tokio::test]
async fn http_health_and_management_calls() {
    let transport = ScriptedTransport::new([
        status(200, ""),
        status(400, ""),
        status(200, ""),
        status(200, r#"{"name":"triton","version":"2.50.0","extensions":["binary_tensor_data"]}"#),
        status(200, r#"[{"name":"simple","version":"1","state":"READY"}]"#),
        status(200, ""),
        status(400, r#"{"error":"failed to unload 'missing'"}"#),
    ]);
    let client = http_client(transport.clone());
    let ctx = CallContext::new();

    assert!(client.is_server_live(&ctx).await.unwrap());
    assert!(!client.is_server_ready(&ctx).await.unwrap());
    assert!(client.is_model_ready("simple", "", &ctx).await.unwrap());

    let metadata = client.server_metadata(&ctx).await.unwrap();
    assert_eq!(metadata.name, "triton");
    assert_eq!(metadata.extensions, vec!["binary_tensor_data"]);

    let index = client.repository_index(&ctx).await.unwrap();
    assert_eq!(index[0].state, "READY");
    assert!(index[0].reason.is_empty());

    client.load_model("simple", &ctx).await.unwrap();
    let err = client.unload_model("missing", &ctx).await.unwrap_err();
    assert!(err.to_string().contains("failed to unload 'missing'"));

    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            "http://localhost:8000/v2/health/live",
            "http://localhost:8000/v2/health/ready",
            "http://localhost:8000/v2/models/simple/ready",
            "http://localhost:8000/v2",
            "http://localhost:8000/v2/repository/index",
            "http://localhost:8000/v2/repository/models/simple/load",
            "http://localhost:8000/v2/repository/models/missing/unload",
        ]
    );
}

#[tokio::test]
async fn http_call_honors_deadline() {
    let transport = ScriptedTransport::slow(Duration::from_secs(30));
    let client = http_client(transport.clone());
    let ctx = CallContext::new().timeout(Duration::from_millis(50));

    let started = std::time::Instant::now();
    let err = client.is_server_live(&ctx).await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(5));
    // The transport is handed the same deadline so its worker stops too.
    assert_eq!(transport.requests()[0].timeout, Some(Duration::from_millis(50)));
    assert!(matches!(
        err,
        Error::Transport {
            kind: TransportErrorKind::Timeout,
            ..
        }
    ));
}

#[tokio::test]
async fn http_call_honors_cancellation() {
    let client = http_client(ScriptedTransport::slow(Duration::from_secs(30)));
    let token = CancelToken::new();
    let ctx = CallContext::new().cancel_token(token.clone());

    let call = tokio::spawn(async move { client.is_server_ready(&ctx).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let err = call.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        Error::Transport {
            kind: TransportErrorKind::Cancelled,
            ..
        }
    ));
}

#[tokio::test]
async fn clients_are_interchangeable_behind_the_trait() {
    let transport = ScriptedTransport::new([status(200, "")]);
    let client: Box<dyn InferenceClient> = Box::new(http_client(transport));
    assert!(client.is_server_live(&CallContext::new()).await.unwrap());
}

#[tokio::test]
async fn connect_to_unroutable_address_fails() {
    // TEST-NET (RFC 5737) address, guaranteed non-routable.
    let options = ClientOptions::default().connect_timeout(Duration::from_millis(200));
    let result = GrpcClient::connect_with_options("http://192.0.2.1:1", options).await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// `n` zero values of a host type `datatype` accepts.
fn zeros(datatype: DataType, n: usize) -> TensorValues {
    match datatype {
        DataType::Bool => vec![false; n].into(),
        DataType::Bytes => vec![""; n].into(),
        dt if dt.is_float() => vec![0.0f32; n].into(),
        _ => vec![0u8; n].into(),
    }
}

proptest! {
    #[test]
    fn element_count_mismatch_is_shape_error(
        dims in prop::collection::vec(0i64..5, 0..4),
        extra in 1usize..4,
        fewer in any::<bool>(),
        datatype in prop::sample::select(ALL_DATA_TYPES.to_vec()),
    ) {
        let count: usize = dims.iter().map(|&d| d as usize).product();
        let supplied = if fewer && count > 0 { count - 1 } else { count + extra };
        let mut input = InferInput::new("x", dims, datatype).unwrap();
        let err = input.set_data(zeros(datatype, supplied), true).unwrap_err();
        prop_assert!(matches!(err, Error::ShapeMismatch(_)), "{datatype}: {err}");
        prop_assert!(input.data().is_none());
    }

    #[test]
    fn i64_values_round_trip(values in prop::collection::vec(any::<i64>(), 0..64)) {
        let input = InferInput::new("x", vec![values.len() as i64], DataType::Int64)
            .unwrap()
            .with_data(values.clone())
            .unwrap();
        let result = raw_result(DataType::Int64, vec![values.len() as i64], input.to_raw_bytes().unwrap());
        prop_assert_eq!(result.as_i64("y").unwrap(), values);
    }

    #[test]
    fn f32_values_round_trip(values in prop::collection::vec(any::<f32>().prop_filter("not NaN", |v| !v.is_nan()), 0..64)) {
        let input = InferInput::new("x", vec![values.len() as i64], DataType::Fp32)
            .unwrap()
            .with_data(values.clone())
            .unwrap();
        let result = raw_result(DataType::Fp32, vec![values.len() as i64], input.to_raw_bytes().unwrap());
        prop_assert_eq!(result.as_f32("y").unwrap(), values);
    }

    #[test]
    fn u16_values_widen_losslessly(values in prop::collection::vec(any::<u16>(), 0..64)) {
        let input = InferInput::new("x", vec![values.len() as i64], DataType::Uint16)
            .unwrap()
            .with_data(values.clone())
            .unwrap();
        let result = raw_result(DataType::Uint16, vec![values.len() as i64], input.to_raw_bytes().unwrap());
        let widened: Vec<u64> = values.iter().map(|&v| u64::from(v)).collect();
        prop_assert_eq!(result.as_u64("y").unwrap(), widened);
    }

    #[test]
    fn fp16_round_trip_within_one_ulp(value in -65504.0f32..65504.0) {
        let input = InferInput::new("x", vec![1], DataType::Fp16)
            .unwrap()
            .with_data(vec![value])
            .unwrap();
        let result = raw_result(DataType::Fp16, vec![1], input.to_raw_bytes().unwrap());
        let decoded = result.as_f32("y").unwrap()[0];
        let ulp = half::f16::from_f32(decoded).to_f32().abs().max(2f32.powi(-14)) * 2f32.powi(-10);
        prop_assert!((decoded - value).abs() <= ulp, "{value} -> {decoded}");
    }
}

// ---------------------------------------------------------------------------
// Online tests (require TRITON_TEST_URL / TRITON_GRPC_URL)
// ---------------------------------------------------------------------------

async fn online_clients() -> Vec<Box<dyn InferenceClient>> {
    let mut clients: Vec<Box<dyn InferenceClient>> = Vec::new();
    if let Some(url) = triton_url() {
        clients.push(Box::new(HttpClient::new(&url, ClientOptions::default()).unwrap()));
    }
    if let Some(url) = triton_grpc_url() {
        clients.push(Box::new(GrpcClient::connect(&url).await.unwrap()));
    }
    clients
}

#[tokio::test]
async fn online_server_health() {
    let clients = online_clients().await;
    if clients.is_empty() {
        eprintln!("Skipping online test: TRITON_TEST_URL not set");
        return;
    }
    let ctx = CallContext::new().timeout(Duration::from_secs(10));
    for client in clients {
        assert!(client.is_server_live(&ctx).await.unwrap(), "Expected server to be live");
        assert!(client.is_server_ready(&ctx).await.unwrap(), "Expected server to be ready");
        let metadata = client.server_metadata(&ctx).await.unwrap();
        assert!(!metadata.name.is_empty(), "Server name should not be empty");
    }
}

#[tokio::test]
async fn online_infer_identity_fp32() {
    let clients = online_clients().await;
    if clients.is_empty() {
        eprintln!("Skipping online test: TRITON_TEST_URL not set");
        return;
    }
    let ctx = CallContext::new().timeout(Duration::from_secs(30));
    let input_data: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, 5.0];

    for client in clients {
        let request = InferRequestBuilder::new("identity_fp32")
            .model_version("1")
            .request_id("integration-test-001")
            .input(
                InferInput::new("INPUT0", vec![5], DataType::Fp32)
                    .unwrap()
                    .with_data(input_data.clone())
                    .unwrap(),
            )
            .output_with(InferRequestedOutput::new("OUTPUT0").unwrap())
            .build()
            .unwrap();

        let result = client.infer(request, &ctx).await.unwrap();
        assert_eq!(result.model_name(), "identity_fp32");
        assert_eq!(
            result.as_f32("OUTPUT0").unwrap(),
            input_data,
            "Identity model should return input unchanged"
        );
    }
}

#[tokio::test]
async fn online_model_metadata() {
    let clients = online_clients().await;
    if clients.is_empty() {
        eprintln!("Skipping online test: TRITON_TEST_URL not set");
        return;
    }
    let ctx = CallContext::new().timeout(Duration::from_secs(10));
    for client in clients {
        assert!(client.is_model_ready("identity_fp32", "1", &ctx).await.unwrap());
        let metadata = client.model_metadata("identity_fp32", "1", &ctx).await.unwrap();
        assert_eq!(metadata.name, "identity_fp32");
        assert!(!metadata.inputs.is_empty(), "Model should have inputs");
        assert!(!metadata.outputs.is_empty(), "Model should have outputs");
    }
}
