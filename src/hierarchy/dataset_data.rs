use crate::metadata::{DataType, Endianness};

/// The elements of a dataset, or a slice of a dataset, in C order.
#[derive(Clone, PartialEq, Debug)]
pub enum DatasetData {
    /// `uint8` elements.
    UInt8(Vec<u8>),
    /// `uint16` elements.
    UInt16(Vec<u16>),
    /// `uint32` elements.
    UInt32(Vec<u32>),
    /// `uint64` elements.
    UInt64(Vec<u64>),
    /// `int8` elements.
    Int8(Vec<i8>),
    /// `int16` elements.
    Int16(Vec<i16>),
    /// `int32` elements.
    Int32(Vec<i32>),
    /// `int64` elements.
    Int64(Vec<i64>),
    /// `float32` elements.
    Float32(Vec<f32>),
    /// `float64` elements.
    Float64(Vec<f64>),
}

macro_rules! from_bytes {
    ( $bytes:expr, $endianness:expr, $type:ty ) => {{
        const SIZE: usize = core::mem::size_of::<$type>();
        $bytes
            .chunks_exact(SIZE)
            .map(|element| {
                let mut array = [0u8; SIZE];
                array.copy_from_slice(element);
                match $endianness {
                    Endianness::Little => <$type>::from_le_bytes(array),
                    Endianness::Big => <$type>::from_be_bytes(array),
                }
            })
            .collect()
    }};
}

macro_rules! to_le_bytes {
    ( $elements:expr ) => {
        $elements
            .iter()
            .flat_map(|element| element.to_le_bytes())
            .collect()
    };
}

impl DatasetData {
    /// Decode `bytes` holding elements of `data_type` with `endianness`.
    ///
    /// Trailing bytes that do not form a whole element are ignored.
    #[must_use]
    pub fn from_bytes(data_type: DataType, endianness: Endianness, bytes: &[u8]) -> Self {
        match data_type {
            DataType::UInt8 => Self::UInt8(bytes.to_vec()),
            DataType::UInt16 => Self::UInt16(from_bytes!(bytes, endianness, u16)),
            DataType::UInt32 => Self::UInt32(from_bytes!(bytes, endianness, u32)),
            DataType::UInt64 => Self::UInt64(from_bytes!(bytes, endianness, u64)),
            DataType::Int8 => Self::Int8(from_bytes!(bytes, endianness, i8)),
            DataType::Int16 => Self::Int16(from_bytes!(bytes, endianness, i16)),
            DataType::Int32 => Self::Int32(from_bytes!(bytes, endianness, i32)),
            DataType::Int64 => Self::Int64(from_bytes!(bytes, endianness, i64)),
            DataType::Float32 => Self::Float32(from_bytes!(bytes, endianness, f32)),
            DataType::Float64 => Self::Float64(from_bytes!(bytes, endianness, f64)),
        }
    }

    /// Encode the elements as little endian bytes.
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::UInt8(elements) => elements.clone(),
            Self::UInt16(elements) => to_le_bytes!(elements),
            Self::UInt32(elements) => to_le_bytes!(elements),
            Self::UInt64(elements) => to_le_bytes!(elements),
            Self::Int8(elements) => to_le_bytes!(elements),
            Self::Int16(elements) => to_le_bytes!(elements),
            Self::Int32(elements) => to_le_bytes!(elements),
            Self::Int64(elements) => to_le_bytes!(elements),
            Self::Float32(elements) => to_le_bytes!(elements),
            Self::Float64(elements) => to_le_bytes!(elements),
        }
    }

    /// The data type of the elements.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::UInt8(_) => DataType::UInt8,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
        }
    }

    /// The number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::UInt8(elements) => elements.len(),
            Self::UInt16(elements) => elements.len(),
            Self::UInt32(elements) => elements.len(),
            Self::UInt64(elements) => elements.len(),
            Self::Int8(elements) => elements.len(),
            Self::Int16(elements) => elements.len(),
            Self::Int32(elements) => elements.len(),
            Self::Int64(elements) => elements.len(),
            Self::Float32(elements) => elements.len(),
            Self::Float64(elements) => elements.len(),
        }
    }

    /// Returns true if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert 64-bit integer elements to `float64`. Other data is returned unchanged.
    ///
    /// Integers with a magnitude above 2^53 lose precision.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn big_int_to_float64(self) -> Self {
        match self {
            Self::UInt64(elements) => {
                Self::Float64(elements.into_iter().map(|element| element as f64).collect())
            }
            Self::Int64(elements) => {
                Self::Float64(elements.into_iter().map(|element| element as f64).collect())
            }
            data => data,
        }
    }
}
