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

//! Inference results and server metadata.
//!
//! [`InferResult`] is what both clients return from `infer`. It owns the
//! decoded response header (per-output data type and shape) and each
//! output's payload, and exposes typed accessors that check the payload
//! against the header before handing out values.
//!
//! ```rust
//! # use tritonclient::response::InferResult;
//! # fn example(result: &InferResult) -> tritonclient::error::Result<()> {
//! let logits: Vec<f32> = result.as_f32("logits")?;
//! let shape = result.shape("logits")?;
//! // Width-aware widening: FP16/FP32 outputs can be read as f64.
//! let wide: Vec<f64> = result.as_slice::<f64>("logits")?;
//! # Ok(())
//! # }
//! ```

use half::{bf16, f16};

use crate::datatype::{element_count, DataType};
use crate::error::{Error, Result};
use crate::infer::Parameters;
use crate::pooling::{reshape_3d, Tensor3};

// ---------------------------------------------------------------------------
// Scalar / Element
// ---------------------------------------------------------------------------

/// A single decoded tensor element, widened to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// A `BOOL` element.
    Bool(bool),
    /// A signed integer element.
    Int(i64),
    /// An unsigned integer element.
    Uint(u64),
    /// A floating-point element.
    Float(f64),
}

/// Host types that output tensors can be decoded into.
///
/// Each implementation accepts the wire types whose whole value range it can
/// hold: `f64` reads every float type, `f32` reads FP16/BF16/FP32, `i64`
/// reads every signed type plus UINT8..UINT32, and so on. Bytes are always
/// read at the declared wire width and then converted.
pub trait Element: Copy + Sized {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Returns `true` if values of `datatype` convert losslessly to `Self`.
    fn accepts(datatype: DataType) -> bool;

    /// Converts one decoded element, or `None` if it does not fit.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

macro_rules! integer_element {
    ($($ty:ty),* $(,)?) => {$(
        impl Element for $ty {
            const NAME: &'static str = stringify!($ty);

            fn accepts(datatype: DataType) -> bool {
                datatype.integer_range().is_some_and(|(lo, hi)| {
                    lo >= i128::from(<$ty>::MIN) && hi <= i128::from(<$ty>::MAX)
                })
            }

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::Int(v) => Self::try_from(v).ok(),
                    Scalar::Uint(v) => Self::try_from(v).ok(),
                    _ => None,
                }
            }
        }
    )*};
}

integer_element!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Element for f32 {
    const NAME: &'static str = "f32";

    fn accepts(datatype: DataType) -> bool {
        matches!(datatype, DataType::Fp16 | DataType::Bf16 | DataType::Fp32)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            // Exact: accepted types are at most 32 bits wide.
            Scalar::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl Element for f64 {
    const NAME: &'static str = "f64";

    fn accepts(datatype: DataType) -> bool {
        datatype.is_float()
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for bool {
    const NAME: &'static str = "bool";

    fn accepts(datatype: DataType) -> bool {
        datatype == DataType::Bool
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Bool(v) => Some(v),
            _ => None,
        }
    }
}

/// Reads one little-endian element of `datatype` from `chunk`, which must be
/// exactly `datatype.element_size()` bytes long. Returns `None` for the
/// variable-length `BYTES` type.
fn read_scalar(datatype: DataType, chunk: &[u8]) -> Option<Scalar> {
    let mut buf = [0u8; 8];
    buf[..chunk.len()].copy_from_slice(chunk);
    let [b0, b1, b2, b3, ..] = buf;
    let scalar = match datatype {
        DataType::Bool => Scalar::Bool(b0 != 0),
        DataType::Uint8 => Scalar::Uint(u64::from(b0)),
        DataType::Uint16 => Scalar::Uint(u64::from(u16::from_le_bytes([b0, b1]))),
        DataType::Uint32 => Scalar::Uint(u64::from(u32::from_le_bytes([b0, b1, b2, b3]))),
        DataType::Uint64 => Scalar::Uint(u64::from_le_bytes(buf)),
        DataType::Int8 => Scalar::Int(i64::from(i8::from_le_bytes([b0]))),
        DataType::Int16 => Scalar::Int(i64::from(i16::from_le_bytes([b0, b1]))),
        DataType::Int32 => Scalar::Int(i64::from(i32::from_le_bytes([b0, b1, b2, b3]))),
        DataType::Int64 => Scalar::Int(i64::from_le_bytes(buf)),
        DataType::Fp16 => Scalar::Float(f16::from_le_bytes([b0, b1]).to_f64()),
        DataType::Bf16 => Scalar::Float(bf16::from_le_bytes([b0, b1]).to_f64()),
        DataType::Fp32 => Scalar::Float(f64::from(f32::from_le_bytes([b0, b1, b2, b3]))),
        DataType::Fp64 => Scalar::Float(f64::from_le_bytes(buf)),
        DataType::Bytes => return None,
    };
    Some(scalar)
}

/// Splits a length-prefixed `BYTES` payload into exactly `count` elements.
///
/// Each element is a 4-byte little-endian length followed by that many
/// bytes. Missing or trailing bytes are reported as an error string so the
/// caller can pick the error kind.
pub(crate) fn decode_bytes_elements(
    raw: &[u8],
    count: usize,
) -> std::result::Result<Vec<Vec<u8>>, String> {
    let mut items = Vec::with_capacity(count.min(raw.len() / 4));
    let mut rest = raw;
    for index in 0..count {
        let Some((prefix, tail)) = rest.split_first_chunk::<4>() else {
            return Err(format!(
                "element {index} of {count}: {} bytes left, need a 4-byte length prefix",
                rest.len()
            ));
        };
        let len = u32::from_le_bytes(*prefix) as usize;
        if tail.len() < len {
            return Err(format!(
                "element {index} of {count}: declares {len} bytes but only {} remain",
                tail.len()
            ));
        }
        let (item, tail) = tail.split_at(len);
        items.push(item.to_vec());
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(format!("{} trailing bytes after {count} elements", rest.len()));
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// OutputTensor
// ---------------------------------------------------------------------------

/// Payload of an output tensor as it arrived on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputData {
    /// Raw little-endian bytes (binary trailer or `raw_output_contents`).
    Raw(Vec<u8>),
    /// Values parsed from JSON `data` or typed gRPC `contents`.
    Values(Vec<Scalar>),
    /// `BYTES` elements parsed from JSON `data` or typed gRPC `contents`.
    Strings(Vec<Vec<u8>>),
}

/// One output tensor of an [`InferResult`].
#[derive(Debug, Clone)]
pub struct OutputTensor {
    name: String,
    datatype: DataType,
    shape: Vec<i64>,
    parameters: Parameters,
    data: OutputData,
}

impl OutputTensor {
    /// Creates an output tensor from already-decoded parts.
    #[must_use]
    pub fn new(
        name: String,
        datatype: DataType,
        shape: Vec<i64>,
        parameters: Parameters,
        data: OutputData,
    ) -> Self {
        Self {
            name,
            datatype,
            shape,
            parameters,
            data,
        }
    }

    /// Returns the tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared data type.
    #[must_use]
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Returns the declared shape.
    #[must_use]
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Returns the output parameters reported by the server.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the payload as received.
    #[must_use]
    pub fn data(&self) -> &OutputData {
        &self.data
    }

    /// Returns the raw bytes if the output was delivered as binary data.
    #[must_use]
    pub fn raw(&self) -> Option<&[u8]> {
        match &self.data {
            OutputData::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    /// Returns the element count implied by the declared shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the shape is invalid.
    pub fn element_count(&self) -> Result<usize> {
        element_count(&self.shape).map_err(|e| self.malformed(e.to_string()))
    }

    /// Decodes the output as a flat, row-major sequence of `T`.
    ///
    /// # Errors
    ///
    /// * [`Error::TypeMismatch`] if `T` cannot hold the declared type.
    /// * [`Error::MalformedResponse`] if the payload size does not match
    ///   `element_count * element_size` exactly.
    pub fn as_slice<T: Element>(&self) -> Result<Vec<T>> {
        if !T::accepts(self.datatype) {
            return Err(Error::TypeMismatch(format!(
                "output '{}' is {} and cannot be read as {}",
                self.name,
                self.datatype,
                T::NAME
            )));
        }
        let count = self.element_count()?;
        let convert = |scalar: Scalar| {
            T::from_scalar(scalar).ok_or_else(|| {
                self.malformed(format!("element {scalar:?} does not fit {}", T::NAME))
            })
        };

        match &self.data {
            OutputData::Raw(raw) => {
                let Some(width) = self.datatype.element_size() else {
                    return Err(self.malformed("carries raw bytes for a variable-length type".into()));
                };
                let expected = count.checked_mul(width);
                if expected != Some(raw.len()) {
                    return Err(self.malformed(format!(
                        "declares {count} {} elements ({} bytes) but carries {} bytes",
                        self.datatype,
                        count.saturating_mul(width),
                        raw.len()
                    )));
                }
                raw.chunks_exact(width)
                    .map(|chunk| {
                        read_scalar(self.datatype, chunk)
                            .ok_or_else(|| self.malformed("has no fixed-width element layout".into()))
                            .and_then(convert)
                    })
                    .collect()
            }
            OutputData::Values(values) => {
                if values.len() != count {
                    return Err(self.malformed(format!(
                        "declares {count} elements but carries {}",
                        values.len()
                    )));
                }
                values.iter().copied().map(convert).collect()
            }
            OutputData::Strings(_) => {
                Err(self.malformed("carries BYTES elements under a numeric type".into()))
            }
        }
    }

    /// Decodes a `BYTES` output into its elements.
    ///
    /// # Errors
    ///
    /// * [`Error::TypeMismatch`] if the output is not `BYTES`.
    /// * [`Error::MalformedResponse`] if the length prefixes are truncated or
    ///   do not produce exactly `element_count` elements.
    pub fn as_bytes(&self) -> Result<Vec<Vec<u8>>> {
        if self.datatype != DataType::Bytes {
            return Err(Error::TypeMismatch(format!(
                "output '{}' is {} and cannot be read as bytes",
                self.name, self.datatype
            )));
        }
        let count = self.element_count()?;
        match &self.data {
            OutputData::Raw(raw) => {
                decode_bytes_elements(raw, count).map_err(|detail| self.malformed(detail))
            }
            OutputData::Strings(items) if items.len() == count => Ok(items.clone()),
            OutputData::Strings(items) => Err(self.malformed(format!(
                "declares {count} elements but carries {}",
                items.len()
            ))),
            OutputData::Values(_) => {
                Err(self.malformed("carries numeric values under BYTES".into()))
            }
        }
    }

    /// Decodes a `BYTES` output into UTF-8 strings.
    ///
    /// # Errors
    ///
    /// As [`as_bytes`](Self::as_bytes), plus [`Error::TypeMismatch`] if an
    /// element is not valid UTF-8.
    pub fn as_strings(&self) -> Result<Vec<String>> {
        self.as_bytes()?
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                String::from_utf8(item).map_err(|_| {
                    Error::TypeMismatch(format!(
                        "element {index} of output '{}' is not valid UTF-8",
                        self.name
                    ))
                })
            })
            .collect()
    }

    fn malformed(&self, detail: String) -> Error {
        Error::MalformedResponse(format!("output '{}' {detail}", self.name))
    }
}

// ---------------------------------------------------------------------------
// InferResult
// ---------------------------------------------------------------------------

/// The decoded result of an inference request.
///
/// Constructed once by a client from the server's response and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct InferResult {
    model_name: String,
    model_version: String,
    id: String,
    parameters: Parameters,
    outputs: Vec<OutputTensor>,
}

impl InferResult {
    /// Creates a result from already-decoded parts.
    ///
    /// This is useful for testing post-processing code without a server.
    #[must_use]
    pub fn new(
        model_name: impl Into<String>,
        model_version: impl Into<String>,
        id: impl Into<String>,
        parameters: Parameters,
        outputs: Vec<OutputTensor>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: model_version.into(),
            id: id.into(),
            parameters,
            outputs,
        }
    }

    /// Returns the model name that produced this response.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model version that produced this response.
    #[must_use]
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Returns the request identifier, if one was set in the request.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the response-level parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the output tensors in response order.
    #[must_use]
    pub fn outputs(&self) -> &[OutputTensor] {
        &self.outputs
    }

    /// Finds an output tensor by name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&OutputTensor> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Finds an output tensor by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such output.
    pub fn require(&self, name: &str) -> Result<&OutputTensor> {
        self.output(name)
            .ok_or_else(|| Error::NotFound(format!("no output named '{name}' in response")))
    }

    /// Returns the shape of the named output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such output.
    pub fn shape(&self, name: &str) -> Result<&[i64]> {
        Ok(self.require(name)?.shape())
    }

    /// Returns the data type of the named output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such output.
    pub fn datatype(&self, name: &str) -> Result<DataType> {
        Ok(self.require(name)?.datatype())
    }

    /// Returns the raw bytes of the named output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such output, or
    /// [`Error::TypeMismatch`] if it was not delivered as binary data.
    pub fn raw(&self, name: &str) -> Result<&[u8]> {
        self.require(name)?.raw().ok_or_else(|| {
            Error::TypeMismatch(format!("output '{name}' was not returned as binary data"))
        })
    }

    /// Decodes the named output as a flat sequence of `T`.
    ///
    /// # Errors
    ///
    /// See [`OutputTensor::as_slice`]; additionally [`Error::NotFound`].
    pub fn as_slice<T: Element>(&self, name: &str) -> Result<Vec<T>> {
        self.require(name)?.as_slice()
    }

    /// Decodes the named output as `f32` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_f32(&self, name: &str) -> Result<Vec<f32>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `f64` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_f64(&self, name: &str) -> Result<Vec<f64>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `i32` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_i32(&self, name: &str) -> Result<Vec<i32>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `i64` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_i64(&self, name: &str) -> Result<Vec<i64>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `u32` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_u32(&self, name: &str) -> Result<Vec<u32>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `u64` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_u64(&self, name: &str) -> Result<Vec<u64>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `i8` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_i8(&self, name: &str) -> Result<Vec<i8>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `i16` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_i16(&self, name: &str) -> Result<Vec<i16>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `u8` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_u8(&self, name: &str) -> Result<Vec<u8>> {
        self.as_slice(name)
    }

    /// Decodes the named output as `u16` values.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_u16(&self, name: &str) -> Result<Vec<u16>> {
        self.as_slice(name)
    }

    /// Decodes the named output as booleans.
    ///
    /// # Errors
    ///
    /// See [`as_slice`](Self::as_slice).
    pub fn as_bool(&self, name: &str) -> Result<Vec<bool>> {
        self.as_slice(name)
    }

    /// Decodes the named `BYTES` output.
    ///
    /// # Errors
    ///
    /// See [`OutputTensor::as_bytes`]; additionally [`Error::NotFound`].
    pub fn as_bytes(&self, name: &str) -> Result<Vec<Vec<u8>>> {
        self.require(name)?.as_bytes()
    }

    /// Decodes the named `BYTES` output as UTF-8 strings.
    ///
    /// # Errors
    ///
    /// See [`OutputTensor::as_strings`]; additionally [`Error::NotFound`].
    pub fn as_strings(&self, name: &str) -> Result<Vec<String>> {
        self.require(name)?.as_strings()
    }

    /// Decodes a rank-3 float output into a `[batch][sequence][hidden]`
    /// nested tensor, ready for [`mean_pool`](crate::pooling::mean_pool).
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if the output is not rank 3, plus the errors
    /// of [`as_slice`](Self::as_slice).
    pub fn as_tensor3_f32(&self, name: &str) -> Result<Tensor3> {
        let output = self.require(name)?;
        let flat = output.as_slice::<f32>()?;
        reshape_3d(flat, output.shape())
    }
}

// ---------------------------------------------------------------------------
// Response wrapper types
// ---------------------------------------------------------------------------

/// Metadata about the Triton Inference Server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ServerMetadata {
    /// The server name.
    pub name: String,
    /// The server version.
    pub version: String,
    /// The protocol extensions supported by the server.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Metadata about a specific model hosted on the server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ModelMetadata {
    /// The model name.
    pub name: String,
    /// The available model versions.
    #[serde(default)]
    pub versions: Vec<String>,
    /// The model platform (e.g. `"tensorrt_plan"`, `"onnxruntime_onnx"`).
    #[serde(default)]
    pub platform: String,
    /// Input tensor metadata.
    #[serde(default)]
    pub inputs: Vec<TensorMetadata>,
    /// Output tensor metadata.
    #[serde(default)]
    pub outputs: Vec<TensorMetadata>,
}

/// Metadata for a single tensor (input or output).
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct TensorMetadata {
    /// The tensor name.
    pub name: String,
    /// The tensor data type as a string (e.g. `"FP32"`, `"INT64"`).
    pub datatype: String,
    /// The tensor shape. Variable-size dimensions are represented as `-1`.
    pub shape: Vec<i64>,
}

/// An entry in the model repository index.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ModelIndex {
    /// The model name.
    pub name: String,
    /// The model version.
    #[serde(default)]
    pub version: String,
    /// The model state (e.g. `"READY"`, `"UNAVAILABLE"`).
    #[serde(default)]
    pub state: String,
    /// The reason for the current state, if any.
    #[serde(default)]
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_output(name: &str, datatype: DataType, shape: Vec<i64>, raw: Vec<u8>) -> OutputTensor {
        OutputTensor::new(
            name.into(),
            datatype,
            shape,
            Parameters::new(),
            OutputData::Raw(raw),
        )
    }

    fn result_with(outputs: Vec<OutputTensor>) -> InferResult {
        InferResult::new("test_model", "1", "req-001", Parameters::new(), outputs)
    }

    #[test]
    fn infer_result_accessors() {
        let raw: Vec<u8> = [1.0f32, 2.0, 3.0, 4.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let result = result_with(vec![raw_output("output0", DataType::Fp32, vec![1, 4], raw)]);

        assert_eq!(result.model_name(), "test_model");
        assert_eq!(result.model_version(), "1");
        assert_eq!(result.id(), "req-001");
        assert_eq!(result.outputs().len(), 1);
        assert!(result.output("output0").is_some());
        assert!(result.output("nonexistent").is_none());
        assert_eq!(result.shape("output0").unwrap(), &[1, 4]);
        assert_eq!(result.datatype("output0").unwrap(), DataType::Fp32);
        assert_eq!(result.raw("output0").unwrap().len(), 16);
        assert_eq!(result.as_f32("output0").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn missing_output_is_not_found() {
        let result = result_with(vec![]);
        assert!(matches!(result.as_f32("nope"), Err(Error::NotFound(_))));
        assert!(matches!(result.shape("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn short_payload_is_malformed() {
        // [2, 3] FP32 expects 24 bytes.
        let result = result_with(vec![raw_output("y", DataType::Fp32, vec![2, 3], vec![0; 20])]);
        let err = result.as_f32("y").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)), "{err}");
    }

    #[test]
    fn fixed_width_reader_has_no_bytes_layout() {
        assert_eq!(read_scalar(DataType::Bytes, &[]), None);
        assert_eq!(read_scalar(DataType::Bytes, &[1, 0, 0, 0]), None);
        assert_eq!(read_scalar(DataType::Int16, &[0xFE, 0xFF]), Some(Scalar::Int(-2)));
        assert_eq!(read_scalar(DataType::Bool, &[2]), Some(Scalar::Bool(true)));

        let result = result_with(vec![raw_output("s", DataType::Bytes, vec![1], vec![0; 5])]);
        assert!(matches!(result.as_i64("s"), Err(Error::TypeMismatch(_))));
        assert!(matches!(result.as_u8("s"), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn excess_payload_is_malformed() {
        let result = result_with(vec![raw_output("y", DataType::Int32, vec![1], vec![0; 8])]);
        assert!(matches!(result.as_i32("y"), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn widening_reads_use_declared_width() {
        let raw: Vec<u8> = [1.5f32, -2.25].iter().flat_map(|v| v.to_le_bytes()).collect();
        let result = result_with(vec![raw_output("y", DataType::Fp32, vec![2], raw)]);
        assert_eq!(result.as_f64("y").unwrap(), vec![1.5, -2.25]);

        let raw: Vec<u8> = [-7i16, 300].iter().flat_map(|v| v.to_le_bytes()).collect();
        let result = result_with(vec![raw_output("y", DataType::Int16, vec![2], raw)]);
        assert_eq!(result.as_i64("y").unwrap(), vec![-7, 300]);
        assert_eq!(result.as_i32("y").unwrap(), vec![-7, 300]);
    }

    #[test]
    fn incompatible_accessors_are_type_mismatch() {
        let raw: Vec<u8> = [1.0f64].iter().flat_map(|v| v.to_le_bytes()).collect();
        let result = result_with(vec![raw_output("y", DataType::Fp64, vec![1], raw)]);
        assert!(matches!(result.as_f32("y"), Err(Error::TypeMismatch(_))));
        assert!(matches!(result.as_i64("y"), Err(Error::TypeMismatch(_))));
        assert!(matches!(result.as_strings("y"), Err(Error::TypeMismatch(_))));

        let result = result_with(vec![raw_output("u", DataType::Uint64, vec![1], vec![0; 8])]);
        assert!(matches!(result.as_i64("u"), Err(Error::TypeMismatch(_))));
        assert_eq!(result.as_u64("u").unwrap(), vec![0]);
    }

    #[test]
    fn fp16_decoding_covers_special_values() {
        // 1.0, 0.0, -0.0, smallest subnormal, +inf, NaN
        let raw = vec![
            0x00, 0x3C, 0x00, 0x00, 0x00, 0x80, 0x01, 0x00, 0x00, 0x7C, 0x01, 0x7E,
        ];
        let result = result_with(vec![raw_output("h", DataType::Fp16, vec![6], raw)]);
        let values = result.as_f64("h").unwrap();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1].to_bits(), 0.0f64.to_bits());
        assert_eq!(values[2].to_bits(), (-0.0f64).to_bits());
        assert_eq!(values[3], 2f64.powi(-24));
        assert_eq!(values[4], f64::INFINITY);
        assert!(values[5].is_nan());
    }

    #[test]
    fn bool_and_bf16_decoding() {
        let result = result_with(vec![
            raw_output("b", DataType::Bool, vec![3], vec![1, 0, 2]),
            raw_output("bf", DataType::Bf16, vec![2], vec![0x80, 0x3F, 0x00, 0x40]),
        ]);
        assert_eq!(result.as_bool("b").unwrap(), vec![true, false, true]);
        assert_eq!(result.as_f32("bf").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn bytes_output_decoding() {
        let mut raw = Vec::new();
        for s in ["a", "bb", "ccc"] {
            raw.extend_from_slice(&(s.len() as u32).to_le_bytes());
            raw.extend_from_slice(s.as_bytes());
        }
        let result = result_with(vec![raw_output("s", DataType::Bytes, vec![3], raw.clone())]);
        assert_eq!(result.as_strings("s").unwrap(), vec!["a", "bb", "ccc"]);

        raw.pop();
        let result = result_with(vec![raw_output("s", DataType::Bytes, vec![3], raw)]);
        assert!(matches!(result.as_bytes("s"), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn bytes_output_rejects_trailing_data() {
        let mut raw = 1u32.to_le_bytes().to_vec();
        raw.extend_from_slice(b"x");
        raw.push(0);
        assert!(decode_bytes_elements(&raw, 1).is_err());
        assert_eq!(decode_bytes_elements(&raw[..5], 1).unwrap(), vec![b"x".to_vec()]);
    }

    #[test]
    fn zero_element_output_decodes_empty() {
        let result = result_with(vec![raw_output("e", DataType::Fp32, vec![0, 4], vec![])]);
        assert!(result.as_f32("e").unwrap().is_empty());
    }

    #[test]
    fn json_values_are_checked_against_shape() {
        let output = OutputTensor::new(
            "v".into(),
            DataType::Int32,
            vec![2],
            Parameters::new(),
            OutputData::Values(vec![Scalar::Int(4), Scalar::Int(-5)]),
        );
        assert_eq!(output.as_slice::<i32>().unwrap(), vec![4, -5]);
        assert_eq!(output.as_slice::<i64>().unwrap(), vec![4, -5]);

        let output = OutputTensor::new(
            "v".into(),
            DataType::Int32,
            vec![3],
            Parameters::new(),
            OutputData::Values(vec![Scalar::Int(4)]),
        );
        assert!(matches!(output.as_slice::<i32>(), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn tensor3_reshape() {
        let raw: Vec<u8> = (0..8).flat_map(|v| (v as f32).to_le_bytes()).collect();
        let result = result_with(vec![raw_output("h", DataType::Fp32, vec![1, 2, 4], raw)]);
        let tensor = result.as_tensor3_f32("h").unwrap();
        assert_eq!(tensor.len(), 1);
        assert_eq!(tensor[0][1], vec![4.0, 5.0, 6.0, 7.0]);

        let result = result_with(vec![raw_output("f", DataType::Fp32, vec![2], vec![0; 8])]);
        assert!(matches!(result.as_tensor3_f32("f"), Err(Error::ShapeMismatch(_))));
    }
}
