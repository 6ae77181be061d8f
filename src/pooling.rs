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

//! Post-processing of decoded output tensors.
//!
//! Sentence-embedding models return token-level hidden states shaped
//! `[batch, sequence, hidden]`. [`mean_pool`] reduces the sequence axis to
//! one vector per batch row, weighting each token by its attention mask.

use crate::datatype::element_count;
use crate::error::{Error, Result};

/// A nested `[batch][sequence][hidden]` float tensor.
pub type Tensor3 = Vec<Vec<Vec<f32>>>;

/// Denominator floor used by [`mean_pool`] for all-zero mask rows.
pub const DEFAULT_EPSILON: f32 = 1e-9;

/// Reshapes a flat row-major buffer into a nested rank-3 tensor.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if `shape` is not rank 3 or its element
/// count differs from `flat.len()`.
pub fn reshape_3d(flat: Vec<f32>, shape: &[i64]) -> Result<Tensor3> {
    let &[batch, sequence, hidden] = shape else {
        return Err(Error::ShapeMismatch(format!(
            "expected a rank-3 shape, got {shape:?}"
        )));
    };
    let count = element_count(shape).map_err(|e| Error::ShapeMismatch(e.to_string()))?;
    if count != flat.len() {
        return Err(Error::ShapeMismatch(format!(
            "shape {shape:?} needs {count} elements, got {}",
            flat.len()
        )));
    }
    // Non-negative and non-overflowing: element_count succeeded.
    let (batch, sequence, hidden) = (batch as usize, sequence as usize, hidden as usize);

    let mut rows = flat.into_iter();
    Ok((0..batch)
        .map(|_| {
            (0..sequence)
                .map(|_| rows.by_ref().take(hidden).collect())
                .collect()
        })
        .collect())
}

/// Masked mean pooling with the default epsilon.
///
/// See [`mean_pool_with_epsilon`].
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] on inconsistent dimensions.
pub fn mean_pool(tensor: &[Vec<Vec<f32>>], mask: &[Vec<i64>]) -> Result<Vec<Vec<f32>>> {
    mean_pool_with_epsilon(tensor, mask, DEFAULT_EPSILON)
}

/// Averages `tensor[b][s][h]` over `s`, weighting each token by `mask[b][s]`.
///
/// Any non-zero mask value counts as 1. For each batch row the result is
/// `sum(value * mask) / max(sum(mask), epsilon)`, so a row whose mask is all
/// zeros pools to a zero vector.
///
/// ```rust
/// use tritonclient::pooling::mean_pool;
///
/// let hidden = vec![vec![vec![1.0, 1.0], vec![3.0, 3.0]]];
/// let pooled = mean_pool(&hidden, &[vec![1, 0]]).unwrap();
/// assert_eq!(pooled, vec![vec![1.0, 1.0]]);
/// ```
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the mask's batch or sequence length
/// differs from the tensor's, or if the tensor is ragged.
pub fn mean_pool_with_epsilon(
    tensor: &[Vec<Vec<f32>>],
    mask: &[Vec<i64>],
    epsilon: f32,
) -> Result<Vec<Vec<f32>>> {
    if tensor.len() != mask.len() {
        return Err(Error::ShapeMismatch(format!(
            "tensor batch is {} but mask batch is {}",
            tensor.len(),
            mask.len()
        )));
    }
    let hidden = tensor
        .iter()
        .flatten()
        .next()
        .map_or(0, Vec::len);

    tensor
        .iter()
        .zip(mask)
        .enumerate()
        .map(|(b, (tokens, weights))| {
            if tokens.len() != weights.len() {
                return Err(Error::ShapeMismatch(format!(
                    "batch row {b}: tensor sequence is {} but mask sequence is {}",
                    tokens.len(),
                    weights.len()
                )));
            }
            let mut sum = vec![0.0f32; hidden];
            let mut total = 0.0f32;
            for (s, (token, &weight)) in tokens.iter().zip(weights).enumerate() {
                if token.len() != hidden {
                    return Err(Error::ShapeMismatch(format!(
                        "token [{b}][{s}] has {} values, expected {hidden}",
                        token.len()
                    )));
                }
                if weight == 0 {
                    continue;
                }
                for (acc, value) in sum.iter_mut().zip(token) {
                    *acc += value;
                }
                total += 1.0;
            }
            let denom = total.max(epsilon);
            sum.iter_mut().for_each(|v| *v /= denom);
            Ok(sum)
        })
        .collect()
}

/// Scales `v` to unit Euclidean length. A zero vector is returned unchanged.
#[must_use]
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
