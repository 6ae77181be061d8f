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

//! Tensor element types understood by the inference protocol.
//!
//! [`DataType`] is the registry of wire types: it knows each type's protocol
//! name, its element width, and which host values may be stored under it.

use crate::error::{Error, Result};
use crate::infer::TensorValues;

/// Triton data types corresponding to the protocol's tensor data types.
///
/// These map to the string representations expected by both the HTTP/REST
/// and gRPC protocols (e.g. `"FP32"`, `"INT64"`, `"BYTES"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean values.
    Bool,
    /// Unsigned 8-bit integers.
    Uint8,
    /// Unsigned 16-bit integers.
    Uint16,
    /// Unsigned 32-bit integers.
    Uint32,
    /// Unsigned 64-bit integers.
    Uint64,
    /// Signed 8-bit integers.
    Int8,
    /// Signed 16-bit integers.
    Int16,
    /// Signed 32-bit integers.
    Int32,
    /// Signed 64-bit integers.
    Int64,
    /// IEEE 754 half-precision (16-bit) floating point.
    Fp16,
    /// IEEE 754 single-precision (32-bit) floating point.
    Fp32,
    /// IEEE 754 double-precision (64-bit) floating point.
    Fp64,
    /// Variable-length byte sequences (strings).
    Bytes,
    /// Brain floating point (16-bit).
    Bf16,
}

/// Every data type, in protocol declaration order.
pub const ALL_DATA_TYPES: [DataType; 14] = [
    DataType::Bool,
    DataType::Uint8,
    DataType::Uint16,
    DataType::Uint32,
    DataType::Uint64,
    DataType::Int8,
    DataType::Int16,
    DataType::Int32,
    DataType::Int64,
    DataType::Fp16,
    DataType::Fp32,
    DataType::Fp64,
    DataType::Bytes,
    DataType::Bf16,
];

impl DataType {
    /// Returns the Triton protocol string representation of this data type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tritonclient::datatype::DataType;
    /// assert_eq!(DataType::Fp32.as_str(), "FP32");
    /// assert_eq!(DataType::Int64.as_str(), "INT64");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Uint8 => "UINT8",
            Self::Uint16 => "UINT16",
            Self::Uint32 => "UINT32",
            Self::Uint64 => "UINT64",
            Self::Int8 => "INT8",
            Self::Int16 => "INT16",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::Fp16 => "FP16",
            Self::Fp32 => "FP32",
            Self::Fp64 => "FP64",
            Self::Bytes => "BYTES",
            Self::Bf16 => "BF16",
        }
    }

    /// Parses a Triton data type string into a [`DataType`].
    ///
    /// Returns `None` if the string does not correspond to a known type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tritonclient::datatype::DataType;
    /// assert_eq!(DataType::parse("FP32"), Some(DataType::Fp32));
    /// assert_eq!(DataType::parse("UNKNOWN"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        ALL_DATA_TYPES.into_iter().find(|dt| dt.as_str() == s)
    }

    /// Returns the width in bytes of one element, or `None` for the
    /// variable-length `BYTES` type.
    ///
    /// ```rust
    /// use tritonclient::datatype::DataType;
    /// assert_eq!(DataType::Fp16.element_size(), Some(2));
    /// assert_eq!(DataType::Bytes.element_size(), None);
    /// ```
    #[must_use]
    pub const fn element_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Uint8 | Self::Int8 => Some(1),
            Self::Uint16 | Self::Int16 | Self::Fp16 | Self::Bf16 => Some(2),
            Self::Uint32 | Self::Int32 | Self::Fp32 => Some(4),
            Self::Uint64 | Self::Int64 | Self::Fp64 => Some(8),
            Self::Bytes => None,
        }
    }

    /// Returns `true` for the floating-point types.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Fp16 | Self::Fp32 | Self::Fp64 | Self::Bf16)
    }

    /// Returns `true` for the signed and unsigned integer types.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
        )
    }

    /// Inclusive value range of an integer type, widened to `i128`.
    pub(crate) const fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Uint8 => Some((0, u8::MAX as i128)),
            Self::Uint16 => Some((0, u16::MAX as i128)),
            Self::Uint32 => Some((0, u32::MAX as i128)),
            Self::Uint64 => Some((0, u64::MAX as i128)),
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            _ => None,
        }
    }

    /// Whether narrowing the finite `value` to this float type overflows to
    /// infinity under round-to-nearest-even.
    #[allow(clippy::cast_possible_truncation)]
    fn overflows(self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            Self::Fp16 => half::f16::from_f64(value).is_infinite(),
            Self::Bf16 => half::bf16::from_f64(value).is_infinite(),
            Self::Fp32 => (value as f32).is_infinite(),
            _ => false,
        }
    }

    /// Checks that `values` can be stored under this data type without loss.
    ///
    /// Integer values may target any integer type provided every value lies
    /// in that type's range. Floating-point values may target any float type;
    /// narrowing to `FP16`/`BF16`/`FP32` rounds to nearest-even, and a finite
    /// value that would round to infinity is rejected. Booleans only
    /// map to `BOOL` and byte strings only to `BYTES`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when the host representation is
    /// incompatible or a value falls outside the type's range.
    pub fn validate(self, values: &TensorValues) -> Result<()> {
        let compatible = match values {
            TensorValues::Bool(_) => self == Self::Bool,
            TensorValues::Bytes(items) => {
                if self == Self::Bytes {
                    if let Some(item) = items.iter().find(|i| u32::try_from(i.len()).is_err()) {
                        return Err(Error::TypeMismatch(format!(
                            "BYTES element of {} bytes exceeds the 4-byte length prefix",
                            item.len()
                        )));
                    }
                }
                self == Self::Bytes
            }
            TensorValues::Float32(_) | TensorValues::Float64(_) => self.is_float(),
            _ => self.is_integer(),
        };
        if !compatible {
            return Err(Error::TypeMismatch(format!(
                "{} values cannot be stored as {self}",
                values.host_type()
            )));
        }

        if let Some(value) = values.floats().find(|v| self.overflows(*v)) {
            return Err(Error::TypeMismatch(format!(
                "value {value} is out of range for {self}"
            )));
        }
        if let Some((min, max)) = self.integer_range() {
            if let Some(value) = values.integers().find(|v| *v < min || *v > max) {
                return Err(Error::TypeMismatch(format!(
                    "value {value} is out of range for {self}"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown data type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDataTypeError(String);

impl std::fmt::Display for ParseDataTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown Triton data type: {}", self.0)
    }
}

impl std::error::Error for ParseDataTypeError {}

impl std::str::FromStr for DataType {
    type Err = ParseDataTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DataType::parse(s).ok_or_else(|| ParseDataTypeError(s.to_owned()))
    }
}

/// Returns the number of elements described by `shape`.
///
/// A shape containing a zero dimension describes an empty tensor; the empty
/// shape describes a scalar.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a dimension is negative or the product
/// overflows `usize`.
pub fn element_count(shape: &[i64]) -> Result<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| {
        let dim = usize::try_from(dim)
            .map_err(|_| Error::InvalidInput(format!("shape {shape:?} has a negative dimension")))?;
        acc.checked_mul(dim)
            .ok_or_else(|| Error::InvalidInput(format!("shape {shape:?} overflows element count")))
    })
}
