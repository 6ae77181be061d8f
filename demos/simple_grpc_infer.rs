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

//! Simple gRPC inference example.
//!
//! Demonstrates connecting to a Triton Inference Server, checking health,
//! querying model metadata, and running a basic inference request.
//!
//! This example assumes a Triton server is running at `localhost:8001` with
//! a model named `simple` that accepts two INT32 inputs (`INPUT0`, `INPUT1`)
//! of shape `[1, 16]` and produces two INT32 outputs (`OUTPUT0`, `OUTPUT1`).
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=tritonclient=debug cargo run --example simple_grpc_infer
//! ```
//!
//! Optionally pass a custom server URL:
//!
//! ```bash
//! cargo run --example simple_grpc_infer -- triton-server:8001
//! ```

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use tritonclient::datatype::DataType;
use tritonclient::error::Result;
use tritonclient::infer::{InferInput, InferRequestBuilder};
use tritonclient::{CallContext, ClientOptions, GrpcClient, InferenceClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "localhost:8001".to_owned());

    println!("Connecting to Triton at {url}...");
    let options = ClientOptions::default().connect_timeout(Duration::from_secs(2));
    let client = GrpcClient::connect_with_options(&url, options).await?;
    let ctx = CallContext::new().timeout(Duration::from_secs(10));

    // -- Health checks -------------------------------------------------------

    println!("Server live: {}", client.is_server_live(&ctx).await?);
    println!("Server ready: {}", client.is_server_ready(&ctx).await?);

    let metadata = client.server_metadata(&ctx).await?;
    println!(
        "Server: {} v{} (extensions: {:?})",
        metadata.name, metadata.version, metadata.extensions
    );

    // -- Model metadata ------------------------------------------------------

    let model_name = "simple";
    let model_ready = client.is_model_ready(model_name, "", &ctx).await?;
    println!("\nModel '{model_name}' ready: {model_ready}");
    if !model_ready {
        println!("Model is not ready, skipping inference.");
        return Ok(());
    }

    let model_meta = client.model_metadata(model_name, "", &ctx).await?;
    for input in &model_meta.inputs {
        println!("  Input: {} ({}) {:?}", input.name, input.datatype, input.shape);
    }
    for output in &model_meta.outputs {
        println!("  Output: {} ({}) {:?}", output.name, output.datatype, output.shape);
    }

    // -- Inference -----------------------------------------------------------

    let input0_data: Vec<i32> = (0..16).collect();
    let input1_data = vec![1i32; 16];

    let request = InferRequestBuilder::new(model_name)
        .request_id("example-001")
        .input(InferInput::new("INPUT0", vec![1, 16], DataType::Int32)?.with_data(input0_data.clone())?)
        .input(InferInput::new("INPUT1", vec![1, 16], DataType::Int32)?.with_data(input1_data.clone())?)
        .output("OUTPUT0")
        .output("OUTPUT1")
        .build()?;

    println!("\nRunning inference...");
    let result = client.infer(request, &ctx).await?;
    println!("Response id: {}", result.id());

    let sum = result.as_i32("OUTPUT0")?;
    let diff = result.as_i32("OUTPUT1")?;
    for i in 0..input0_data.len() {
        println!(
            "{} + {} = {}    {} - {} = {}",
            input0_data[i], input1_data[i], sum[i], input0_data[i], input1_data[i], diff[i]
        );
    }

    println!("\nDone!");
    Ok(())
}
