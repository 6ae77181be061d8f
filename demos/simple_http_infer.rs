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

//! Simple HTTP/REST inference example.
//!
//! Sends the same request to the `simple` model twice: once with binary
//! tensor data and once with JSON-encoded inputs. Both must give the same
//! answer.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=tritonclient=info cargo run --example simple_http_infer -- localhost:8000
//! ```

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use tritonclient::datatype::DataType;
use tritonclient::error::Result;
use tritonclient::infer::{InferInput, InferRequestBuilder, InferRequestedOutput};
use tritonclient::{CallContext, ClientOptions, HttpClient, InferenceClient};

fn build_request(binary: bool) -> Result<tritonclient::infer::InferRequest> {
    let mut input0 = InferInput::new("INPUT0", vec![1, 16], DataType::Int32)?;
    input0.set_data((0..16).collect::<Vec<i32>>(), binary)?;
    let mut input1 = InferInput::new("INPUT1", vec![1, 16], DataType::Int32)?;
    input1.set_data(vec![1i32; 16], binary)?;

    InferRequestBuilder::new("simple")
        .input(input0)
        .input(input1)
        .output_with(InferRequestedOutput::new("OUTPUT0")?.binary_data(binary))
        .output_with(InferRequestedOutput::new("OUTPUT1")?.binary_data(binary))
        .build()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "localhost:8000".to_owned());
    let options = ClientOptions::default()
        .connect_timeout(Duration::from_secs(2))
        .request_timeout(Duration::from_secs(10))
        .verbose(true);
    let client = HttpClient::new(&url, options)?;
    let ctx = CallContext::new();

    if !client.is_model_ready("simple", "", &ctx).await? {
        println!("Model 'simple' is not ready.");
        return Ok(());
    }

    let binary = client.infer(build_request(true)?, &ctx).await?;
    let json = client.infer(build_request(false)?, &ctx).await?;

    for name in ["OUTPUT0", "OUTPUT1"] {
        let from_binary = binary.as_i32(name)?;
        let from_json = json.as_i32(name)?;
        assert_eq!(from_binary, from_json, "{name} differs between encodings");
        println!("{name} {:?}: {from_binary:?}", binary.shape(name)?);
    }

    println!("\nDone!");
    Ok(())
}
