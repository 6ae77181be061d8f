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

//! Builder types for constructing inference requests.
//!
//! This module provides an ergonomic, type-safe API for building inference
//! requests. The main entry points are [`InferInput`] for describing input
//! tensors, [`InferRequestedOutput`] for declaring the outputs to return, and
//! [`InferRequestBuilder`] for assembling a complete, protocol-neutral
//! [`InferRequest`] that either client can send.
//!
//! # Example
//!
//! ```rust
//! use tritonclient::datatype::DataType;
//! use tritonclient::infer::{InferInput, InferRequestBuilder};
//!
//! # fn example() -> tritonclient::error::Result<()> {
//! let input = InferInput::new("input0", vec![1, 16], DataType::Fp32)?
//!     .with_data(vec![1.0_f32; 16])?;
//!
//! let request = InferRequestBuilder::new("my_model")
//!     .model_version("1")
//!     .request_id("req-001")
//!     .input(input)
//!     .output("output0")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::datatype::{element_count, DataType};
use crate::error::{Error, Result};
use crate::response::decode_bytes_elements;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// A request, input or output parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Boolean parameter.
    Bool(bool),
    /// Signed 64-bit integer parameter.
    Int64(i64),
    /// Unsigned 64-bit integer parameter.
    Uint64(u64),
    /// Double-precision parameter.
    Double(f64),
    /// String parameter.
    String(String),
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<u64> for ParameterValue {
    fn from(value: u64) -> Self {
        Self::Uint64(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Free-form parameter mapping attached to requests, inputs and outputs.
pub type Parameters = HashMap<String, ParameterValue>;

// ---------------------------------------------------------------------------
// TensorValues
// ---------------------------------------------------------------------------

/// Typed host values for an input tensor, flattened in row-major order.
///
/// Any of the `From` conversions below can be passed to
/// [`InferInput::set_data`]. The data type the values end up encoded as is
/// decided by the tensor, not by the host type: `i64` values can fill an
/// `INT8` tensor as long as each value fits.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValues {
    /// Boolean values.
    Bool(Vec<bool>),
    /// `u8` values.
    Uint8(Vec<u8>),
    /// `u16` values.
    Uint16(Vec<u16>),
    /// `u32` values.
    Uint32(Vec<u32>),
    /// `u64` values.
    Uint64(Vec<u64>),
    /// `i8` values.
    Int8(Vec<i8>),
    /// `i16` values.
    Int16(Vec<i16>),
    /// `i32` values.
    Int32(Vec<i32>),
    /// `i64` values.
    Int64(Vec<i64>),
    /// `f32` values.
    Float32(Vec<f32>),
    /// `f64` values.
    Float64(Vec<f64>),
    /// Variable-length byte strings.
    Bytes(Vec<Vec<u8>>),
}

macro_rules! tensor_values_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {$(
        impl From<Vec<$ty>> for TensorValues {
            fn from(values: Vec<$ty>) -> Self {
                Self::$variant(values)
            }
        }

        impl From<&[$ty]> for TensorValues {
            fn from(values: &[$ty]) -> Self {
                Self::$variant(values.to_vec())
            }
        }
    )*};
}

tensor_values_from! {
    Bool => bool,
    Uint8 => u8,
    Uint16 => u16,
    Uint32 => u32,
    Uint64 => u64,
    Int8 => i8,
    Int16 => i16,
    Int32 => i32,
    Int64 => i64,
    Float32 => f32,
    Float64 => f64,
    Bytes => Vec<u8>,
}

impl From<Vec<String>> for TensorValues {
    fn from(values: Vec<String>) -> Self {
        Self::Bytes(values.into_iter().map(String::into_bytes).collect())
    }
}

impl From<Vec<&str>> for TensorValues {
    fn from(values: Vec<&str>) -> Self {
        Self::Bytes(values.into_iter().map(|s| s.as_bytes().to_vec()).collect())
    }
}

impl From<&[&str]> for TensorValues {
    fn from(values: &[&str]) -> Self {
        Self::Bytes(values.iter().map(|s| s.as_bytes().to_vec()).collect())
    }
}

impl TensorValues {
    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Uint8(v) => v.len(),
            Self::Uint16(v) => v.len(),
            Self::Uint32(v) => v.len(),
            Self::Uint64(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Bytes(v) => v.len(),
        }
    }

    /// Returns `true` if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn host_type(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Uint8(_) => "u8",
            Self::Uint16(_) => "u16",
            Self::Uint32(_) => "u32",
            Self::Uint64(_) => "u64",
            Self::Int8(_) => "i8",
            Self::Int16(_) => "i16",
            Self::Int32(_) => "i32",
            Self::Int64(_) => "i64",
            Self::Float32(_) => "f32",
            Self::Float64(_) => "f64",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Integer values widened to `i128`; empty for non-integer variants.
    pub(crate) fn integers(&self) -> Box<dyn Iterator<Item = i128> + '_> {
        match self {
            Self::Uint8(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            Self::Uint16(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            Self::Uint32(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            Self::Uint64(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            Self::Int8(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            Self::Int16(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            Self::Int32(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            Self::Int64(v) => Box::new(v.iter().map(|&x| i128::from(x))),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Float values widened to `f64`; empty for non-float variants.
    pub(crate) fn floats(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Self::Float32(v) => Box::new(v.iter().map(|&x| f64::from(x))),
            Self::Float64(v) => Box::new(v.iter().copied()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Serialized size in bytes under `datatype`.
    fn byte_size(&self, datatype: DataType) -> usize {
        match (self, datatype.element_size()) {
            (Self::Bytes(items), _) => items.iter().map(|i| 4 + i.len()).sum(),
            (_, Some(width)) => width * self.len(),
            (_, None) => 0,
        }
    }

    /// Appends the little-endian wire encoding of these values, as
    /// `datatype`, to `out`. The values must already have passed
    /// [`DataType::validate`].
    fn encode_into(&self, datatype: DataType, out: &mut Vec<u8>) {
        match self {
            Self::Bool(values) => out.extend(values.iter().map(|&b| u8::from(b))),
            Self::Bytes(items) => {
                for item in items {
                    // Lengths were bounded to u32 by validation.
                    #[allow(clippy::cast_possible_truncation)]
                    out.extend_from_slice(&(item.len() as u32).to_le_bytes());
                    out.extend_from_slice(item);
                }
            }
            Self::Float32(_) | Self::Float64(_) => {
                for value in self.floats() {
                    put_float(out, datatype, value);
                }
            }
            _ => {
                for value in self.integers() {
                    put_integer(out, datatype, value);
                }
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn put_integer(out: &mut Vec<u8>, datatype: DataType, value: i128) {
    match datatype {
        DataType::Uint8 => out.push(value as u8),
        DataType::Int8 => out.push(value as i8 as u8),
        DataType::Uint16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
        DataType::Int16 => out.extend_from_slice(&(value as i16).to_le_bytes()),
        DataType::Uint32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
        DataType::Int32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
        DataType::Uint64 => out.extend_from_slice(&(value as u64).to_le_bytes()),
        DataType::Int64 => out.extend_from_slice(&(value as i64).to_le_bytes()),
        _ => {}
    }
}

#[allow(clippy::cast_possible_truncation)]
fn put_float(out: &mut Vec<u8>, datatype: DataType, value: f64) {
    match datatype {
        DataType::Fp16 => out.extend_from_slice(&half::f16::from_f64(value).to_le_bytes()),
        DataType::Bf16 => out.extend_from_slice(&half::bf16::from_f64(value).to_le_bytes()),
        DataType::Fp32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
        DataType::Fp64 => out.extend_from_slice(&value.to_le_bytes()),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// InferInput
// ---------------------------------------------------------------------------

/// The payload of an [`InferInput`]: either typed host values that are
/// serialized on demand, or bytes that are already in wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// Typed values, validated against the tensor's data type and shape.
    Values(TensorValues),
    /// Pre-serialized little-endian / length-prefixed bytes.
    Raw(Vec<u8>),
}

/// Describes an input tensor for an inference request.
///
/// # Example
///
/// ```rust
/// use tritonclient::datatype::DataType;
/// use tritonclient::infer::InferInput;
///
/// # fn example() -> tritonclient::error::Result<()> {
/// let input = InferInput::new("images", vec![1, 3, 224, 224], DataType::Fp32)?
///     .with_data(vec![0.0_f32; 3 * 224 * 224])?;
/// assert_eq!(input.byte_size(), Some(3 * 224 * 224 * 4));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InferInput {
    name: String,
    shape: Vec<i64>,
    datatype: DataType,
    data: Option<TensorData>,
    binary_data: bool,
    parameters: Parameters,
}

impl InferInput {
    /// Creates a new inference input descriptor.
    ///
    /// # Arguments
    ///
    /// * `name` -- The tensor name as defined in the model configuration.
    /// * `shape` -- The shape of the tensor (e.g. `vec![1, 3, 224, 224]`). A
    ///   zero dimension describes an empty batch.
    /// * `datatype` -- The element data type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is empty or the shape has
    /// a negative dimension.
    pub fn new(name: impl Into<String>, shape: Vec<i64>, datatype: DataType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidInput("input name must not be empty".into()));
        }
        element_count(&shape)?;
        Ok(Self {
            name,
            shape,
            datatype,
            data: None,
            binary_data: true,
            parameters: Parameters::new(),
        })
    }

    /// Replaces the tensor payload with typed values.
    ///
    /// `binary_data` selects raw binary transport. The gRPC client always
    /// sends raw bytes; the HTTP client sends non-binary inputs as a JSON
    /// `data` array.
    ///
    /// # Errors
    ///
    /// * [`Error::ShapeMismatch`] if the number of values differs from the
    ///   element count implied by the shape.
    /// * [`Error::TypeMismatch`] if the values cannot be represented
    ///   losslessly by the tensor's data type.
    ///
    /// On error the previous payload is left untouched.
    pub fn set_data(&mut self, values: impl Into<TensorValues>, binary_data: bool) -> Result<()> {
        let values = values.into();
        let expected = element_count(&self.shape)?;
        if values.len() != expected {
            return Err(Error::ShapeMismatch(format!(
                "input '{}' with shape {:?} expects {expected} elements, got {}",
                self.name,
                self.shape,
                values.len()
            )));
        }
        self.datatype.validate(&values)?;
        self.data = Some(TensorData::Values(values));
        self.binary_data = binary_data;
        Ok(())
    }

    /// Attaches typed values for binary transport.
    ///
    /// # Errors
    ///
    /// See [`set_data`](Self::set_data).
    pub fn with_data(mut self, values: impl Into<TensorValues>) -> Result<Self> {
        self.set_data(values, true)?;
        Ok(self)
    }

    /// Replaces the tensor payload with bytes already in wire format.
    ///
    /// This is the most general form and is useful for FP16 and BF16 data
    /// produced elsewhere. Fixed-width types must supply exactly
    /// `element_count * element_size` bytes; `BYTES` tensors must supply one
    /// well-formed length-prefixed element per shape element. Raw payloads
    /// always travel as binary data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the byte layout does not match the
    /// shape.
    pub fn set_raw_data(&mut self, raw: Vec<u8>) -> Result<()> {
        let count = element_count(&self.shape)?;
        match self.datatype.element_size() {
            Some(width) => {
                if Some(raw.len()) != count.checked_mul(width) {
                    return Err(Error::ShapeMismatch(format!(
                        "input '{}' with shape {:?} expects {} bytes of {}, got {}",
                        self.name,
                        self.shape,
                        count.saturating_mul(width),
                        self.datatype,
                        raw.len()
                    )));
                }
            }
            None => {
                decode_bytes_elements(&raw, count).map_err(|detail| {
                    Error::ShapeMismatch(format!("input '{}': {detail}", self.name))
                })?;
            }
        }
        self.data = Some(TensorData::Raw(raw));
        self.binary_data = true;
        Ok(())
    }

    /// Attaches raw byte data.
    ///
    /// # Errors
    ///
    /// See [`set_raw_data`](Self::set_raw_data).
    pub fn with_raw_data(mut self, raw: Vec<u8>) -> Result<Self> {
        self.set_raw_data(raw)?;
        Ok(self)
    }

    /// Adds a parameter to this input tensor.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Adds a string parameter to this input tensor.
    #[must_use]
    pub fn with_string_parameter(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_parameter(key, ParameterValue::String(value.into()))
    }

    /// Adds an integer parameter to this input tensor.
    #[must_use]
    pub fn with_int_parameter(self, key: impl Into<String>, value: i64) -> Self {
        self.with_parameter(key, value)
    }

    /// Adds a boolean parameter to this input tensor.
    #[must_use]
    pub fn with_bool_parameter(self, key: impl Into<String>, value: bool) -> Self {
        self.with_parameter(key, value)
    }

    /// Returns the tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tensor shape.
    #[must_use]
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Returns the tensor data type.
    #[must_use]
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Returns the tensor parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the payload, if one has been set.
    #[must_use]
    pub fn data(&self) -> Option<&TensorData> {
        self.data.as_ref()
    }

    /// Returns `true` if the payload travels as raw binary data.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary_data
    }

    /// Returns the serialized payload size in bytes, or `None` if no data
    /// has been set.
    #[must_use]
    pub fn byte_size(&self) -> Option<usize> {
        match self.data.as_ref()? {
            TensorData::Values(values) => Some(values.byte_size(self.datatype)),
            TensorData::Raw(raw) => Some(raw.len()),
        }
    }

    /// Serializes the payload into the wire's raw byte encoding.
    ///
    /// Fixed-width numbers are packed little-endian (FP16/BF16 converted with
    /// round-to-nearest-even), booleans take one byte each, and `BYTES`
    /// elements are written as a 4-byte little-endian length followed by the
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if no data has been set.
    pub fn to_raw_bytes(&self) -> Result<Vec<u8>> {
        match &self.data {
            Some(TensorData::Values(values)) => {
                let mut out = Vec::with_capacity(values.byte_size(self.datatype));
                values.encode_into(self.datatype, &mut out);
                Ok(out)
            }
            Some(TensorData::Raw(raw)) => Ok(raw.clone()),
            None => Err(self.missing_data()),
        }
    }

    /// Splits the input into its descriptor and serialized payload without
    /// copying raw payloads.
    pub(crate) fn into_wire(mut self) -> Result<WireInput> {
        let raw = match self.data.take() {
            Some(TensorData::Raw(raw)) => raw,
            Some(TensorData::Values(values)) => {
                let mut out = Vec::with_capacity(values.byte_size(self.datatype));
                values.encode_into(self.datatype, &mut out);
                out
            }
            None => return Err(self.missing_data()),
        };
        Ok(WireInput {
            name: self.name,
            shape: self.shape,
            datatype: self.datatype,
            parameters: self.parameters,
            raw,
        })
    }

    fn missing_data(&self) -> Error {
        Error::InvalidInput(format!("input '{}' has no data", self.name))
    }
}

/// An input reduced to what goes on the wire.
pub(crate) struct WireInput {
    pub(crate) name: String,
    pub(crate) shape: Vec<i64>,
    pub(crate) datatype: DataType,
    pub(crate) parameters: Parameters,
    pub(crate) raw: Vec<u8>,
}

// ---------------------------------------------------------------------------
// InferRequestedOutput
// ---------------------------------------------------------------------------

/// Describes a requested output tensor for an inference request.
///
/// Specifying outputs is optional. When no outputs are requested, the server
/// returns all outputs defined in the model configuration.
#[derive(Debug, Clone)]
pub struct InferRequestedOutput {
    name: String,
    binary_data: bool,
    class_count: Option<u32>,
    parameters: Parameters,
}

impl InferRequestedOutput {
    /// Creates a new requested output for the tensor with the given name.
    ///
    /// Outputs are requested as binary data by default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let output = Self::unchecked(name);
        output.validate()?;
        Ok(output)
    }

    fn unchecked(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binary_data: true,
            class_count: None,
            parameters: Parameters::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidInput("output name must not be empty".into()));
        }
        Ok(())
    }

    /// Selects binary (`true`) or JSON (`false`) encoding of this output on
    /// the HTTP protocol. gRPC always returns binary data.
    #[must_use]
    pub fn binary_data(self, binary_data: bool) -> Self {
        Self {
            binary_data,
            ..self
        }
    }

    /// Requests the top `count` classification results instead of the raw
    /// tensor.
    #[must_use]
    pub fn class_count(self, count: u32) -> Self {
        Self {
            class_count: Some(count),
            ..self
        }
    }

    /// Adds a parameter to this output request.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Adds a string parameter to this output request.
    #[must_use]
    pub fn with_string_parameter(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_parameter(key, ParameterValue::String(value.into()))
    }

    /// Returns the output tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if binary encoding was requested.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary_data
    }

    /// Returns the requested classification count.
    #[must_use]
    pub fn requested_class_count(&self) -> Option<u32> {
        self.class_count
    }

    /// Returns the output parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

// ---------------------------------------------------------------------------
// InferRequestBuilder
// ---------------------------------------------------------------------------

/// A validated inference request, ready to be framed by either protocol.
#[derive(Debug, Clone)]
pub struct InferRequest {
    pub(crate) model_name: String,
    pub(crate) model_version: String,
    pub(crate) id: String,
    pub(crate) inputs: Vec<InferInput>,
    pub(crate) outputs: Vec<InferRequestedOutput>,
    pub(crate) parameters: Parameters,
}

impl InferRequest {
    /// Returns the target model name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the target model version (empty for the server default).
    #[must_use]
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Returns the request identifier (may be empty).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the input tensors.
    #[must_use]
    pub fn inputs(&self) -> &[InferInput] {
        &self.inputs
    }

    /// Returns the requested outputs.
    #[must_use]
    pub fn outputs(&self) -> &[InferRequestedOutput] {
        &self.outputs
    }

    /// Returns the request-level parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

/// Builder for constructing [`InferRequest`]s.
///
/// # Example
///
/// ```rust
/// use tritonclient::datatype::DataType;
/// use tritonclient::infer::{InferInput, InferRequestBuilder};
///
/// # fn example() -> tritonclient::error::Result<()> {
/// let request = InferRequestBuilder::new("resnet50")
///     .model_version("1")
///     .request_id("batch-001")
///     .input(
///         InferInput::new("input", vec![1, 3, 224, 224], DataType::Fp32)?
///             .with_data(vec![0.0_f32; 3 * 224 * 224])?,
///     )
///     .output("output")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InferRequestBuilder {
    model_name: String,
    model_version: String,
    request_id: String,
    inputs: Vec<InferInput>,
    outputs: Vec<InferRequestedOutput>,
    parameters: Parameters,
}

impl InferRequestBuilder {
    /// Creates a new builder targeting the specified model.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: String::new(),
            request_id: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Parameters::new(),
        }
    }

    /// Sets the model version to use for inference.
    ///
    /// If not set, the server uses the latest version according to its policy.
    #[must_use]
    pub fn model_version(self, version: impl Into<String>) -> Self {
        Self {
            model_version: version.into(),
            ..self
        }
    }

    /// Sets an optional request identifier.
    ///
    /// When specified, the server echoes this identifier in the response.
    #[must_use]
    pub fn request_id(self, id: impl Into<String>) -> Self {
        Self {
            request_id: id.into(),
            ..self
        }
    }

    /// Adds an input tensor to the request.
    #[must_use]
    pub fn input(mut self, input: InferInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Adds multiple input tensors to the request.
    #[must_use]
    pub fn inputs(mut self, inputs: impl IntoIterator<Item = InferInput>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Adds a requested output by name, encoded as binary data.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(InferRequestedOutput::unchecked(name));
        self
    }

    /// Adds a fully-configured requested output.
    #[must_use]
    pub fn output_with(mut self, output: InferRequestedOutput) -> Self {
        self.outputs.push(output);
        self
    }

    /// Adds a request parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Adds a string inference parameter.
    #[must_use]
    pub fn string_parameter(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter(key, ParameterValue::String(value.into()))
    }

    /// Adds an integer inference parameter.
    #[must_use]
    pub fn int_parameter(self, key: impl Into<String>, value: i64) -> Self {
        self.parameter(key, value)
    }

    /// Adds a boolean inference parameter.
    #[must_use]
    pub fn bool_parameter(self, key: impl Into<String>, value: bool) -> Self {
        self.parameter(key, value)
    }

    /// Tags the request as part of the sequence with the given correlation
    /// id, for stateful models.
    #[must_use]
    pub fn sequence_id(self, id: u64) -> Self {
        self.parameter("sequence_id", id)
    }

    /// Marks the request as the first of its sequence.
    #[must_use]
    pub fn sequence_start(self, start: bool) -> Self {
        self.parameter("sequence_start", start)
    }

    /// Marks the request as the last of its sequence.
    #[must_use]
    pub fn sequence_end(self, end: bool) -> Self {
        self.parameter("sequence_end", end)
    }

    /// Sets the scheduling priority. Lower values are higher priority; `0`
    /// uses the model's default.
    #[must_use]
    pub fn priority(self, priority: u64) -> Self {
        self.parameter("priority", priority)
    }

    /// Sets the server-side queueing timeout for this request.
    ///
    /// This is enforced by the server's scheduler and is independent of the
    /// client-side deadline in [`CallContext`](crate::context::CallContext).
    #[must_use]
    pub fn server_timeout(self, timeout: Duration) -> Self {
        let micros = u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX);
        self.parameter("timeout", micros)
    }

    /// Validates and produces an [`InferRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the model name or any output name
    /// is empty, or any input has no data.
    pub fn build(self) -> Result<InferRequest> {
        if self.model_name.is_empty() {
            return Err(Error::InvalidInput("model name must not be empty".into()));
        }
        if let Some(input) = self.inputs.iter().find(|i| i.data.is_none()) {
            return Err(input.missing_data());
        }
        for output in &self.outputs {
            output.validate()?;
        }

        Ok(InferRequest {
            model_name: self.model_name,
            model_version: self.model_version,
            id: self.request_id,
            inputs: self.inputs,
            outputs: self.outputs,
            parameters: self.parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_input_with_f32_data() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0];
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32)
            .unwrap()
            .with_data(data)
            .unwrap();

        assert_eq!(input.name(), "input0");
        assert_eq!(input.shape(), &[1, 4]);
        assert_eq!(input.datatype(), DataType::Fp32);
        assert_eq!(input.byte_size(), Some(16)); // 4 floats * 4 bytes

        let raw = input.to_raw_bytes().unwrap();
        assert_eq!(&raw[4..8], &2.0f32.to_le_bytes());
    }

    #[test]
    fn infer_input_rejects_empty_name_and_negative_dims() {
        assert!(InferInput::new("", vec![1], DataType::Fp32).is_err());
        assert!(InferInput::new("x", vec![1, -1], DataType::Fp32).is_err());
    }

    #[test]
    fn infer_input_zero_dimension_is_empty_batch() {
        let input = InferInput::new("x", vec![0, 8], DataType::Int32)
            .unwrap()
            .with_data(Vec::<i32>::new())
            .unwrap();
        assert!(input.to_raw_bytes().unwrap().is_empty());
    }

    #[test]
    fn infer_input_shape_mismatch() {
        let mut input = InferInput::new("x", vec![2, 2], DataType::Int64).unwrap();
        let err = input.set_data(vec![1i64, 2, 3], true).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
        assert!(input.data().is_none());
    }

    #[test]
    fn infer_input_set_data_replaces_payload() {
        let mut input = InferInput::new("x", vec![2], DataType::Int32).unwrap();
        input.set_data(vec![1i32, 2], true).unwrap();
        input.set_data(vec![3i32, 4], false).unwrap();
        assert_eq!(input.data(), Some(&TensorData::Values(TensorValues::Int32(vec![3, 4]))));
        assert!(!input.is_binary());
    }

    #[test]
    fn infer_input_narrows_integers_in_range() {
        let input = InferInput::new("ids", vec![3], DataType::Int8)
            .unwrap()
            .with_data(vec![-128i64, 0, 127])
            .unwrap();
        assert_eq!(input.to_raw_bytes().unwrap(), vec![0x80, 0x00, 0x7f]);

        let err = InferInput::new("ids", vec![1], DataType::Uint16)
            .unwrap()
            .with_data(vec![-1i32])
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn infer_input_with_bool_data() {
        let input = InferInput::new("mask", vec![1, 3], DataType::Bool)
            .unwrap()
            .with_data(vec![true, false, true])
            .unwrap();
        assert_eq!(input.to_raw_bytes().unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn infer_input_fp16_encoding() {
        let input = InferInput::new("half", vec![4], DataType::Fp16)
            .unwrap()
            .with_data(vec![1.0f32, 2.0, -0.0, 65504.0])
            .unwrap();
        assert_eq!(
            input.to_raw_bytes().unwrap(),
            vec![0x00, 0x3C, 0x00, 0x40, 0x00, 0x80, 0xFF, 0x7B]
        );
    }

    #[test]
    fn infer_input_fp16_rounds_to_nearest_even() {
        // 1 + 2^-11 lies exactly between 1.0 and the next binary16 value
        // (1 + 2^-10); ties go to the even mantissa, i.e. 1.0.
        let tie = 1.0f64 + 2f64.powi(-11);
        let input = InferInput::new("half", vec![1], DataType::Fp16)
            .unwrap()
            .with_data(vec![tie])
            .unwrap();
        assert_eq!(input.to_raw_bytes().unwrap(), vec![0x00, 0x3C]);
    }

    #[test]
    fn infer_input_rejects_values_that_overflow_narrow_floats() {
        let input = InferInput::new("x", vec![1], DataType::Fp32).unwrap();
        let err = input.with_data(vec![1e300f64]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));

        let input = InferInput::new("half", vec![2], DataType::Fp16).unwrap();
        let err = input.with_data(vec![1.0f32, 100_000.0]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));

        let input = InferInput::new("brain", vec![1], DataType::Bf16).unwrap();
        assert!(input.with_data(vec![1e39f64]).is_err());
    }

    #[test]
    fn infer_input_narrow_floats_keep_explicit_infinity() {
        let input = InferInput::new("half", vec![2], DataType::Fp16)
            .unwrap()
            .with_data(vec![f32::INFINITY, f32::NEG_INFINITY])
            .unwrap();
        assert_eq!(input.to_raw_bytes().unwrap(), vec![0x00, 0x7C, 0x00, 0xFC]);
    }

    #[test]
    fn infer_input_with_bytes_data() {
        let input = InferInput::new("text", vec![3], DataType::Bytes)
            .unwrap()
            .with_data(vec!["a", "bb", "ccc"])
            .unwrap();

        let raw = input.to_raw_bytes().unwrap();
        assert_eq!(raw.len(), 3 * 4 + 1 + 2 + 3);
        assert_eq!(input.byte_size(), Some(raw.len()));
        assert_eq!(&raw[..4], &1u32.to_le_bytes());
        assert_eq!(&raw[4..5], b"a");
        assert_eq!(&raw[5..9], &2u32.to_le_bytes());
    }

    #[test]
    fn infer_input_bytes_count_must_match_shape() {
        let err = InferInput::new("text", vec![2, 2], DataType::Bytes)
            .unwrap()
            .with_data(vec!["a", "b", "c"])
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn infer_input_raw_data() {
        let raw_fp16: Vec<u8> = vec![0x00, 0x3C, 0x00, 0x40]; // FP16: 1.0, 2.0
        let input = InferInput::new("input", vec![1, 2], DataType::Fp16)
            .unwrap()
            .with_raw_data(raw_fp16.clone())
            .unwrap();
        assert_eq!(input.to_raw_bytes().unwrap(), raw_fp16);
        assert!(input.is_binary());

        let err = InferInput::new("input", vec![1, 3], DataType::Fp16)
            .unwrap()
            .with_raw_data(raw_fp16)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn infer_input_raw_bytes_tensor_is_checked() {
        let mut raw = 2u32.to_le_bytes().to_vec();
        raw.extend_from_slice(b"hi");
        let input = InferInput::new("text", vec![1], DataType::Bytes).unwrap();
        assert!(input.clone().with_raw_data(raw.clone()).is_ok());

        raw.truncate(5);
        assert!(input.with_raw_data(raw).is_err());
    }

    #[test]
    fn infer_input_with_parameters() {
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32)
            .unwrap()
            .with_string_parameter("key", "value")
            .with_int_parameter("count", 42)
            .with_bool_parameter("flag", true);

        assert_eq!(input.parameters().len(), 3);
        assert_eq!(input.parameters()["count"], ParameterValue::Int64(42));
    }

    #[test]
    fn infer_request_builder_basic() {
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32)
            .unwrap()
            .with_data(vec![1.0f32; 4])
            .unwrap();

        let request = InferRequestBuilder::new("my_model")
            .model_version("1")
            .request_id("test-001")
            .input(input)
            .output("output0")
            .build()
            .unwrap();

        assert_eq!(request.model_name(), "my_model");
        assert_eq!(request.model_version(), "1");
        assert_eq!(request.id(), "test-001");
        assert_eq!(request.inputs().len(), 1);
        assert_eq!(request.outputs().len(), 1);
        assert!(request.outputs()[0].is_binary());
    }

    #[test]
    fn infer_request_builder_no_data_fails() {
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32).unwrap();
        let err = InferRequestBuilder::new("model").input(input).build().unwrap_err();
        assert!(err.to_string().contains("input0"));
    }

    #[test]
    fn infer_request_builder_rejects_empty_names() {
        assert!(InferRequestBuilder::new("").build().is_err());
        assert!(InferRequestBuilder::new("model").output("").build().is_err());
    }

    #[test]
    fn infer_request_builder_with_parameters() {
        let request = InferRequestBuilder::new("model")
            .string_parameter("tag", "abc")
            .sequence_id(42)
            .sequence_start(true)
            .sequence_end(false)
            .priority(1)
            .server_timeout(Duration::from_millis(5))
            .build()
            .unwrap();

        let params = request.parameters();
        assert_eq!(params.len(), 6);
        assert_eq!(params["sequence_id"], ParameterValue::Uint64(42));
        assert_eq!(params["timeout"], ParameterValue::Uint64(5_000));
    }

    #[test]
    fn requested_output_options() {
        let output = InferRequestedOutput::new("output0")
            .unwrap()
            .binary_data(false)
            .class_count(3)
            .with_string_parameter("custom", "x");

        assert_eq!(output.name(), "output0");
        assert!(!output.is_binary());
        assert_eq!(output.requested_class_count(), Some(3));
        assert_eq!(output.parameters().len(), 1);
        assert!(InferRequestedOutput::new("").is_err());
    }
}
