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

//! Sentence embedding with masked mean pooling.
//!
//! Sends pre-tokenized input ids and an attention mask to a transformer
//! encoder (default model name `all_minilm`) that returns its last hidden
//! state as `[batch, sequence, hidden]`, then pools the token vectors into
//! one normalized embedding per sentence.
//!
//! Tokenization is outside the scope of this crate, so the ids below are
//! fixed. Pass `--grpc` to use the gRPC endpoint instead of HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example embedding_mean_pool -- [--grpc] [model_name]
//! ```

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use tritonclient::datatype::DataType;
use tritonclient::error::Result;
use tritonclient::infer::{InferInput, InferRequestBuilder};
use tritonclient::pooling::{l2_normalize, mean_pool};
use tritonclient::{CallContext, ClientOptions, GrpcClient, HttpClient, InferenceClient};

/// Two sentences padded to the same length; zeros in the mask are padding.
const INPUT_IDS: [[i64; 8]; 2] = [
    [101, 7592, 2088, 102, 0, 0, 0, 0],
    [101, 1996, 4937, 2938, 2006, 1996, 13523, 102],
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let use_grpc = args.iter().any(|a| a == "--grpc");
    let model = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "all_minilm".to_owned());

    let options = ClientOptions::default().connect_timeout(Duration::from_secs(2));
    let client: Box<dyn InferenceClient> = if use_grpc {
        Box::new(GrpcClient::connect_with_options("localhost:8001", options).await?)
    } else {
        Box::new(HttpClient::new("localhost:8000", options)?)
    };

    let batch = INPUT_IDS.len();
    let sequence = INPUT_IDS[0].len();
    let ids: Vec<i64> = INPUT_IDS.iter().flatten().copied().collect();
    let mask: Vec<Vec<i64>> = INPUT_IDS
        .iter()
        .map(|row| row.iter().map(|&id| i64::from(id != 0)).collect())
        .collect();
    let shape = vec![batch as i64, sequence as i64];

    let request = InferRequestBuilder::new(&model)
        .input(InferInput::new("input_ids", shape.clone(), DataType::Int64)?.with_data(ids)?)
        .input(
            InferInput::new("attention_mask", shape, DataType::Int64)?
                .with_data(mask.iter().flatten().copied().collect::<Vec<i64>>())?,
        )
        .output("last_hidden_state")
        .build()?;

    let ctx = CallContext::new().timeout(Duration::from_secs(30));
    let result = client.infer(request, &ctx).await?;
    let hidden = result.as_tensor3_f32("last_hidden_state")?;

    let pooled = mean_pool(&hidden, &mask)?;
    for (i, embedding) in pooled.iter().enumerate() {
        let embedding = l2_normalize(embedding);
        println!(
            "sentence {i}: dim={} head={:?}",
            embedding.len(),
            &embedding[..embedding.len().min(4)]
        );
    }
    Ok(())
}
