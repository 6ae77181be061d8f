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

//! Protocol buffer types for the KServe v2 / Triton gRPC inference protocol.
//!
//! Only the messages and RPCs the client uses are declared. Field tags match
//! `grpc_service.proto` so the types interoperate with any conforming server.

#![allow(missing_docs)]

/// Messages and the client stub of the `inference` protobuf package.
pub mod inference {
    use std::collections::HashMap;

    // -----------------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------------

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct ServerLiveRequest {}

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct ServerLiveResponse {
        #[prost(bool, tag = "1")]
        pub live: bool,
    }

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct ServerReadyRequest {}

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct ServerReadyResponse {
        #[prost(bool, tag = "1")]
        pub ready: bool,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ModelReadyRequest {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, tag = "2")]
        pub version: String,
    }

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct ModelReadyResponse {
        #[prost(bool, tag = "1")]
        pub ready: bool,
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct ServerMetadataRequest {}

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ServerMetadataResponse {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, tag = "2")]
        pub version: String,
        #[prost(string, repeated, tag = "3")]
        pub extensions: Vec<String>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ModelMetadataRequest {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, tag = "2")]
        pub version: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ModelMetadataResponse {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, repeated, tag = "2")]
        pub versions: Vec<String>,
        #[prost(string, tag = "3")]
        pub platform: String,
        #[prost(message, repeated, tag = "4")]
        pub inputs: Vec<model_metadata_response::TensorMetadata>,
        #[prost(message, repeated, tag = "5")]
        pub outputs: Vec<model_metadata_response::TensorMetadata>,
    }

    pub mod model_metadata_response {
        #[derive(Clone, PartialEq, prost::Message)]
        pub struct TensorMetadata {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub datatype: String,
            #[prost(int64, repeated, tag = "3")]
            pub shape: Vec<i64>,
        }
    }

    // -----------------------------------------------------------------------
    // Inference
    // -----------------------------------------------------------------------

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct InferParameter {
        #[prost(oneof = "infer_parameter::ParameterChoice", tags = "1, 2, 3, 4, 5")]
        pub parameter_choice: Option<infer_parameter::ParameterChoice>,
    }

    pub mod infer_parameter {
        #[derive(Clone, PartialEq, prost::Oneof)]
        pub enum ParameterChoice {
            #[prost(bool, tag = "1")]
            BoolParam(bool),
            #[prost(int64, tag = "2")]
            Int64Param(i64),
            #[prost(string, tag = "3")]
            StringParam(String),
            #[prost(double, tag = "4")]
            DoubleParam(f64),
            #[prost(uint64, tag = "5")]
            Uint64Param(u64),
        }
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct InferTensorContents {
        #[prost(bool, repeated, tag = "1")]
        pub bool_contents: Vec<bool>,
        #[prost(int32, repeated, tag = "2")]
        pub int_contents: Vec<i32>,
        #[prost(int64, repeated, tag = "3")]
        pub int64_contents: Vec<i64>,
        #[prost(uint32, repeated, tag = "4")]
        pub uint_contents: Vec<u32>,
        #[prost(uint64, repeated, tag = "5")]
        pub uint64_contents: Vec<u64>,
        #[prost(float, repeated, tag = "6")]
        pub fp32_contents: Vec<f32>,
        #[prost(double, repeated, tag = "7")]
        pub fp64_contents: Vec<f64>,
        #[prost(bytes = "vec", repeated, tag = "8")]
        pub bytes_contents: Vec<Vec<u8>>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ModelInferRequest {
        #[prost(string, tag = "1")]
        pub model_name: String,
        #[prost(string, tag = "2")]
        pub model_version: String,
        #[prost(string, tag = "3")]
        pub id: String,
        #[prost(map = "string, message", tag = "4")]
        pub parameters: HashMap<String, InferParameter>,
        #[prost(message, repeated, tag = "5")]
        pub inputs: Vec<model_infer_request::InferInputTensor>,
        #[prost(message, repeated, tag = "6")]
        pub outputs: Vec<model_infer_request::InferRequestedOutputTensor>,
        #[prost(bytes = "vec", repeated, tag = "7")]
        pub raw_input_contents: Vec<Vec<u8>>,
    }

    pub mod model_infer_request {
        use std::collections::HashMap;

        #[derive(Clone, PartialEq, prost::Message)]
        pub struct InferInputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub datatype: String,
            #[prost(int64, repeated, tag = "3")]
            pub shape: Vec<i64>,
            #[prost(map = "string, message", tag = "4")]
            pub parameters: HashMap<String, super::InferParameter>,
            #[prost(message, optional, tag = "5")]
            pub contents: Option<super::InferTensorContents>,
        }

        #[derive(Clone, PartialEq, prost::Message)]
        pub struct InferRequestedOutputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(map = "string, message", tag = "2")]
            pub parameters: HashMap<String, super::InferParameter>,
        }
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ModelInferResponse {
        #[prost(string, tag = "1")]
        pub model_name: String,
        #[prost(string, tag = "2")]
        pub model_version: String,
        #[prost(string, tag = "3")]
        pub id: String,
        #[prost(map = "string, message", tag = "4")]
        pub parameters: HashMap<String, InferParameter>,
        #[prost(message, repeated, tag = "5")]
        pub outputs: Vec<model_infer_response::InferOutputTensor>,
        #[prost(bytes = "vec", repeated, tag = "6")]
        pub raw_output_contents: Vec<Vec<u8>>,
    }

    pub mod model_infer_response {
        use std::collections::HashMap;

        #[derive(Clone, PartialEq, prost::Message)]
        pub struct InferOutputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub datatype: String,
            #[prost(int64, repeated, tag = "3")]
            pub shape: Vec<i64>,
            #[prost(map = "string, message", tag = "4")]
            pub parameters: HashMap<String, super::InferParameter>,
            #[prost(message, optional, tag = "5")]
            pub contents: Option<super::InferTensorContents>,
        }
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ModelStreamInferResponse {
        #[prost(string, tag = "1")]
        pub error_message: String,
        #[prost(message, optional, tag = "2")]
        pub infer_response: Option<ModelInferResponse>,
    }

    // -----------------------------------------------------------------------
    // Model repository
    // -----------------------------------------------------------------------

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct RepositoryIndexRequest {
        #[prost(string, tag = "1")]
        pub repository_name: String,
        #[prost(bool, tag = "2")]
        pub ready: bool,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct RepositoryIndexResponse {
        #[prost(message, repeated, tag = "1")]
        pub models: Vec<repository_index_response::ModelIndex>,
    }

    pub mod repository_index_response {
        #[derive(Clone, PartialEq, prost::Message)]
        pub struct ModelIndex {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub version: String,
            #[prost(string, tag = "3")]
            pub state: String,
            #[prost(string, tag = "4")]
            pub reason: String,
        }
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ModelRepositoryParameter {
        #[prost(oneof = "model_repository_parameter::ParameterChoice", tags = "1, 2, 3, 4")]
        pub parameter_choice: Option<model_repository_parameter::ParameterChoice>,
    }

    pub mod model_repository_parameter {
        #[derive(Clone, PartialEq, prost::Oneof)]
        pub enum ParameterChoice {
            #[prost(bool, tag = "1")]
            BoolParam(bool),
            #[prost(int64, tag = "2")]
            Int64Param(i64),
            #[prost(string, tag = "3")]
            StringParam(String),
            #[prost(bytes, tag = "4")]
            BytesParam(Vec<u8>),
        }
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct RepositoryModelLoadRequest {
        #[prost(string, tag = "1")]
        pub repository_name: String,
        #[prost(string, tag = "2")]
        pub model_name: String,
        #[prost(map = "string, message", tag = "3")]
        pub parameters: HashMap<String, ModelRepositoryParameter>,
    }

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct RepositoryModelLoadResponse {}

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct RepositoryModelUnloadRequest {
        #[prost(string, tag = "1")]
        pub repository_name: String,
        #[prost(string, tag = "2")]
        pub model_name: String,
        #[prost(map = "string, message", tag = "3")]
        pub parameters: HashMap<String, ModelRepositoryParameter>,
    }

    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct RepositoryModelUnloadResponse {}

    // -----------------------------------------------------------------------
    // Client stub
    // -----------------------------------------------------------------------

    /// Client for the `inference.GRPCInferenceService` service.
    pub mod grpc_inference_service_client {
        use tonic::codegen::http::uri::PathAndQuery;
        use tonic::transport::Channel;

        const SERVICE: &str = "inference.GRPCInferenceService";

        macro_rules! unary_rpc {
            ($($fn_name:ident => $method:literal ($req:ident) -> $resp:ident;)*) => {$(
                pub async fn $fn_name(
                    &mut self,
                    request: impl tonic::IntoRequest<super::$req>,
                ) -> Result<tonic::Response<super::$resp>, tonic::Status> {
                    self.ready().await?;
                    let path = PathAndQuery::from_static(concat!(
                        "/inference.GRPCInferenceService/",
                        $method
                    ));
                    let mut request = request.into_request();
                    request
                        .extensions_mut()
                        .insert(tonic::GrpcMethod::new(SERVICE, $method));
                    self.inner
                        .unary(request, path, tonic::codec::ProstCodec::default())
                        .await
                }
            )*};
        }

        #[derive(Debug, Clone)]
        pub struct GrpcInferenceServiceClient {
            inner: tonic::client::Grpc<Channel>,
        }

        impl GrpcInferenceServiceClient {
            pub fn new(channel: Channel) -> Self {
                Self {
                    inner: tonic::client::Grpc::new(channel),
                }
            }

            #[must_use]
            pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
                self.inner = self.inner.max_decoding_message_size(limit);
                self
            }

            #[must_use]
            pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
                self.inner = self.inner.max_encoding_message_size(limit);
                self
            }

            async fn ready(&mut self) -> Result<(), tonic::Status> {
                self.inner.ready().await.map_err(|e| {
                    tonic::Status::from_error(Box::new(e))
                })
            }

            unary_rpc! {
                server_live => "ServerLive" (ServerLiveRequest) -> ServerLiveResponse;
                server_ready => "ServerReady" (ServerReadyRequest) -> ServerReadyResponse;
                model_ready => "ModelReady" (ModelReadyRequest) -> ModelReadyResponse;
                server_metadata => "ServerMetadata" (ServerMetadataRequest) -> ServerMetadataResponse;
                model_metadata => "ModelMetadata" (ModelMetadataRequest) -> ModelMetadataResponse;
                model_infer => "ModelInfer" (ModelInferRequest) -> ModelInferResponse;
                repository_index => "RepositoryIndex" (RepositoryIndexRequest) -> RepositoryIndexResponse;
                repository_model_load => "RepositoryModelLoad" (RepositoryModelLoadRequest) -> RepositoryModelLoadResponse;
                repository_model_unload => "RepositoryModelUnload" (RepositoryModelUnloadRequest) -> RepositoryModelUnloadResponse;
            }

            pub async fn model_stream_infer(
                &mut self,
                request: impl tonic::IntoStreamingRequest<Message = super::ModelInferRequest>,
            ) -> Result<
                tonic::Response<tonic::codec::Streaming<super::ModelStreamInferResponse>>,
                tonic::Status,
            > {
                self.ready().await?;
                let path =
                    PathAndQuery::from_static("/inference.GRPCInferenceService/ModelStreamInfer");
                let mut request = request.into_streaming_request();
                request
                    .extensions_mut()
                    .insert(tonic::GrpcMethod::new(SERVICE, "ModelStreamInfer"));
                self.inner
                    .streaming(request, path, tonic::codec::ProstCodec::default())
                    .await
            }
        }
    }
}
