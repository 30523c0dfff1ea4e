use derive_more::Display;
use thiserror::Error;

use super::Endianness;

/// A dataset element data type.
///
/// Only the numeric kinds that an editor can create are supported.
/// Each has a canonical name (e.g. `float32`) and a Zarr V2 typestring (e.g. `<f4`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum DataType {
    /// `uint8` (`|u1`).
    #[display("uint8")]
    UInt8,
    /// `uint16` (`<u2`).
    #[display("uint16")]
    UInt16,
    /// `uint32` (`<u4`).
    #[display("uint32")]
    UInt32,
    /// `uint64` (`<u8`).
    #[display("uint64")]
    UInt64,
    /// `int8` (`|i1`).
    #[display("int8")]
    Int8,
    /// `int16` (`<i2`).
    #[display("int16")]
    Int16,
    /// `int32` (`<i4`).
    #[display("int32")]
    Int32,
    /// `int64` (`<i8`).
    #[display("int64")]
    Int64,
    /// `float32` (`<f4`).
    #[display("float32")]
    Float32,
    /// `float64` (`<f8`).
    #[display("float64")]
    Float64,
}

/// A data type error.
#[derive(Debug, Error)]
pub enum DataTypeError {
    /// The data type name is not one of the canonical names.
    #[error("unsupported data type {0}")]
    UnsupportedDataType(String),
    /// The Zarr V2 typestring is invalid or unsupported.
    #[error("unsupported V2 data type {0}")]
    UnsupportedTypestring(String),
}

impl DataType {
    /// Create a data type from its canonical name (`uint8`, ..., `float64`).
    ///
    /// # Errors
    /// Returns [`DataTypeError::UnsupportedDataType`] if `name` is not a canonical name.
    pub fn from_name(name: &str) -> Result<Self, DataTypeError> {
        match name {
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            _ => Err(DataTypeError::UnsupportedDataType(name.to_string())),
        }
    }

    /// Parse a Zarr V2 typestring (e.g. `<f4`, `>i2`, `|u1`).
    ///
    /// Single byte types have no endianness and are reported as little endian.
    ///
    /// # Errors
    /// Returns [`DataTypeError::UnsupportedTypestring`] if the typestring is not a supported numeric type.
    pub fn from_typestring(typestring: &str) -> Result<(Self, Endianness), DataTypeError> {
        let err = || DataTypeError::UnsupportedTypestring(typestring.to_string());
        let mut chars = typestring.chars();
        let endianness = match chars.next() {
            Some('<' | '|') => Endianness::Little,
            Some('>') => Endianness::Big,
            _ => return Err(err()),
        };
        let data_type = match chars.as_str() {
            "u1" => Self::UInt8,
            "u2" => Self::UInt16,
            "u4" => Self::UInt32,
            "u8" => Self::UInt64,
            "i1" => Self::Int8,
            "i2" => Self::Int16,
            "i4" => Self::Int32,
            "i8" => Self::Int64,
            "f4" => Self::Float32,
            "f8" => Self::Float64,
            _ => return Err(err()),
        };
        if data_type.size() == 1 && typestring.starts_with('>') {
            return Err(err());
        }
        Ok((data_type, endianness))
    }

    /// The size of an element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::UInt8 | Self::Int8 => 1,
            Self::UInt16 | Self::Int16 => 2,
            Self::UInt32 | Self::Int32 | Self::Float32 => 4,
            Self::UInt64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    const fn kind(self) -> char {
        match self {
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => 'u',
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => 'i',
            Self::Float32 | Self::Float64 => 'f',
        }
    }

    /// The little endian Zarr V2 typestring of the data type, e.g. `<u2`.
    ///
    /// Single byte types use the `|` (not applicable) byte order.
    #[must_use]
    pub fn typestring(self) -> String {
        let byte_order = if self.size() == 1 {
            '|'
        } else {
            Endianness::Little.typestring_char()
        };
        format!("{byte_order}{}{}", self.kind(), self.size())
    }
}
