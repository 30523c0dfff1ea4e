use derive_more::Display;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AdditionalFields, DataType, DataTypeError, Endianness, MetadataV2};

/// Zarr array metadata (storage specification v2).
///
/// An example `JSON` document for a Zarr V2 array:
/// ```json
/// {
///     "chunks": [
///         1000,
///         1000
///     ],
///     "compressor": {
///         "id": "zlib",
///         "level": 1
///     },
///     "dtype": "<f8",
///     "fill_value": "NaN",
///     "filters": null,
///     "order": "C",
///     "shape": [
///         10000,
///         10000
///     ],
///     "zarr_format": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV2 {
    /// An integer defining the version of the storage specification to which the array adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// An array of integers providing the length of each dimension of the Zarr array.
    pub shape: Vec<u64>,
    /// A list of integers defining the length of each dimension of a chunk of the array.
    pub chunks: Vec<u64>,
    /// The data type of the Zarr array as a typestring, e.g. `<f4`.
    pub dtype: String,
    /// A JSON object identifying the primary compression codec and providing configuration parameters, or null if no compressor is to be used.
    pub compressor: Option<MetadataV2>,
    /// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
    pub fill_value: FillValueMetadataV2,
    /// Either “C” or “F”, defining the layout of bytes within each chunk of the array.
    pub order: ArrayMetadataV2Order,
    /// A list of JSON objects providing codec configurations, or null if no filters are to be applied.
    #[serde(default)]
    pub filters: Option<Vec<MetadataV2>>,
    /// If present, either the string "." or "/" defining the separator placed between the dimensions of a chunk.
    #[serde(
        default = "chunk_key_separator_default_zarr_v2",
        skip_serializing_if = "ChunkKeySeparator::is_default"
    )]
    pub dimension_separator: ChunkKeySeparator,
    /// Additional fields.
    ///
    /// These are not part of Zarr V2, but are retained for compatibility/flexibility.
    #[serde(flatten)]
    pub additional_fields: AdditionalFields,
}

const fn chunk_key_separator_default_zarr_v2() -> ChunkKeySeparator {
    ChunkKeySeparator::Dot
}

/// The number of elements in an array of `shape`, or [`None`] if it exceeds [`u64::MAX`].
#[must_use]
pub fn num_elements(shape: &[u64]) -> Option<u64> {
    shape.iter().try_fold(1u64, |count, &size| count.checked_mul(size))
}

impl ArrayMetadataV2 {
    /// Create metadata for an uncompressed array stored as a single chunk spanning the whole `shape`.
    ///
    /// The fill value is `0`, the order is `C`, and the data type is little endian.
    #[must_use]
    pub fn new_single_chunk(shape: Vec<u64>, data_type: DataType) -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
            chunks: shape.clone(),
            shape,
            dtype: data_type.typestring(),
            compressor: None,
            fill_value: FillValueMetadataV2::Number(0.into()),
            order: ArrayMetadataV2Order::C,
            filters: None,
            dimension_separator: ChunkKeySeparator::Dot,
            additional_fields: AdditionalFields::default(),
        }
    }

    /// Return the data type and endianness of the array.
    ///
    /// # Errors
    /// Returns [`DataTypeError`] if the `dtype` is not a supported typestring.
    pub fn data_type(&self) -> Result<(DataType, Endianness), DataTypeError> {
        DataType::from_typestring(&self.dtype)
    }

    /// Return the number of elements in the array, or [`None`] if it exceeds [`u64::MAX`].
    #[must_use]
    pub fn num_elements(&self) -> Option<u64> {
        num_elements(&self.shape)
    }

    /// Encode the key of the chunk at `chunk_indices`, e.g. `1.0` or `1/0`.
    ///
    /// A zero dimensional array has the single chunk `0`.
    #[must_use]
    pub fn chunk_key(&self, chunk_indices: &[u64]) -> String {
        if chunk_indices.is_empty() {
            "0".to_string()
        } else {
            chunk_indices
                .iter()
                .join(&self.dimension_separator.to_string())
        }
    }
}

/// The separator placed between the dimensions of a chunk key.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ChunkKeySeparator {
    /// The slash '/' character.
    #[serde(rename = "/")]
    #[display("/")]
    Slash,
    /// The dot '.' character.
    #[serde(rename = ".")]
    #[display(".")]
    Dot,
}

impl ChunkKeySeparator {
    fn is_default(&self) -> bool {
        *self == chunk_key_separator_default_zarr_v2()
    }
}

/// The layout of bytes within each chunk of the array.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ArrayMetadataV2Order {
    /// Row-major order. The last dimension varies fastest.
    C,
    /// Column-major order. The first dimension varies fastest.
    F,
}

/// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FillValueMetadataV2 {
    /// No fill value.
    Null,
    /// NaN (not-a-number).
    NaN,
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegInfinity,
    /// A number.
    Number(serde_json::Number),
}

impl<'de> serde::Deserialize<'de> for FillValueMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FillValueMetadataV2Type {
            String(String),
            Number(serde_json::Number),
            Null,
        }
        let fill_value = FillValueMetadataV2Type::deserialize(d)?;
        match fill_value {
            FillValueMetadataV2Type::String(string) => match string.as_str() {
                "NaN" => Ok(Self::NaN),
                "Infinity" => Ok(Self::Infinity),
                "-Infinity" => Ok(Self::NegInfinity),
                _ => Err(serde::de::Error::custom("unsupported fill value")),
            },
            FillValueMetadataV2Type::Number(number) => Ok(Self::Number(number)),
            FillValueMetadataV2Type::Null => Ok(Self::Null),
        }
    }
}

impl Serialize for FillValueMetadataV2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::NaN => serializer.serialize_str("NaN"),
            Self::Infinity => serializer.serialize_str("Infinity"),
            Self::NegInfinity => serializer.serialize_str("-Infinity"),
            Self::Number(number) => number.serialize(serializer),
        }
    }
}

/// A fill value that cannot be represented by the data type of an array.
#[derive(Debug, Error)]
#[error("fill value {fill_value:?} is incompatible with data type {data_type}")]
pub struct IncompatibleFillValueError {
    data_type: DataType,
    fill_value: FillValueMetadataV2,
}

macro_rules! endian_bytes {
    ( $value:expr, $endianness:expr ) => {
        match $endianness {
            Endianness::Little => $value.to_le_bytes().to_vec(),
            Endianness::Big => $value.to_be_bytes().to_vec(),
        }
    };
}

impl FillValueMetadataV2 {
    /// Encode the fill value as the bytes of a single element of `data_type` with `endianness`.
    ///
    /// A null fill value is encoded as zeros.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the fill value is out of range or non-finite for an integer data type.
    pub fn to_element_bytes(
        &self,
        data_type: DataType,
        endianness: Endianness,
    ) -> Result<Vec<u8>, IncompatibleFillValueError> {
        let err = || IncompatibleFillValueError {
            data_type,
            fill_value: self.clone(),
        };
        let float = match self {
            Self::Null => return Ok(vec![0; data_type.size()]),
            Self::NaN => f64::NAN,
            Self::Infinity => f64::INFINITY,
            Self::NegInfinity => f64::NEG_INFINITY,
            Self::Number(number) => number.as_f64().ok_or_else(err)?,
        };
        let int = || match self {
            Self::Number(number) => number.as_i64().ok_or_else(err),
            _ => Err(err()),
        };
        let bytes = match data_type {
            DataType::Float32 => {
                #[allow(clippy::cast_possible_truncation)]
                let value = float as f32;
                endian_bytes!(value, endianness)
            }
            DataType::Float64 => endian_bytes!(float, endianness),
            DataType::UInt64 => {
                let Self::Number(number) = self else {
                    return Err(err());
                };
                endian_bytes!(number.as_u64().ok_or_else(err)?, endianness)
            }
            DataType::UInt8 => endian_bytes!(u8::try_from(int()?).map_err(|_| err())?, endianness),
            DataType::UInt16 => {
                endian_bytes!(u16::try_from(int()?).map_err(|_| err())?, endianness)
            }
            DataType::UInt32 => {
                endian_bytes!(u32::try_from(int()?).map_err(|_| err())?, endianness)
            }
            DataType::Int8 => endian_bytes!(i8::try_from(int()?).map_err(|_| err())?, endianness),
            DataType::Int16 => {
                endian_bytes!(i16::try_from(int()?).map_err(|_| err())?, endianness)
            }
            DataType::Int32 => {
                endian_bytes!(i32::try_from(int()?).map_err(|_| err())?, endianness)
            }
            DataType::Int64 => endian_bytes!(int()?, endianness),
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_metadata_v2() {
        let json = r#"{
            "chunks": [2, 2],
            "compressor": {"id": "zlib", "level": 1},
            "dtype": ">i2",
            "fill_value": 7,
            "filters": null,
            "order": "C",
            "shape": [3, 4],
            "dimension_separator": "/",
            "zarr_format": 2
        }"#;
        let metadata: ArrayMetadataV2 = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.shape, vec![3, 4]);
        assert_eq!(metadata.compressor.as_ref().unwrap().id(), "zlib");
        assert_eq!(
            metadata.data_type().unwrap(),
            (DataType::Int16, Endianness::Big)
        );
        assert_eq!(metadata.dimension_separator, ChunkKeySeparator::Slash);
        assert_eq!(metadata.chunk_key(&[1, 0]), "1/0");
        assert_eq!(
            metadata
                .fill_value
                .to_element_bytes(DataType::Int16, Endianness::Big)
                .unwrap(),
            vec![0, 7]
        );
    }

    #[test]
    fn array_metadata_v2_invalid_zarr_format() {
        let json = r#"{
            "chunks": [2],
            "compressor": null,
            "dtype": "<f4",
            "fill_value": null,
            "order": "C",
            "shape": [3],
            "zarr_format": 3
        }"#;
        assert!(serde_json::from_str::<ArrayMetadataV2>(json).is_err());
    }

    #[test]
    fn array_metadata_v2_single_chunk() {
        let metadata = ArrayMetadataV2::new_single_chunk(vec![2, 3], DataType::UInt16);
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "zarr_format": 2,
                "shape": [2, 3],
                "chunks": [2, 3],
                "dtype": "<u2",
                "compressor": null,
                "fill_value": 0,
                "order": "C",
                "filters": null
            })
        );
        assert_eq!(metadata.num_elements(), Some(6));
        assert_eq!(metadata.chunk_key(&[0, 0]), "0.0");

        let scalar = ArrayMetadataV2::new_single_chunk(vec![], DataType::Float64);
        assert_eq!(scalar.num_elements(), Some(1));
        assert_eq!(scalar.chunk_key(&[]), "0");
    }

    #[test]
    fn array_metadata_v2_num_elements_overflow() {
        assert_eq!(num_elements(&[1 << 63, 2]), None);
        assert_eq!(num_elements(&[1 << 32, 1 << 31]), Some(1 << 63));
        assert_eq!(num_elements(&[u64::MAX, 0]), Some(0));
    }

    #[test]
    fn fill_value_v2_element_bytes() {
        let nan: FillValueMetadataV2 = serde_json::from_str(r#""NaN""#).unwrap();
        assert!(f32::from_le_bytes(
            nan.to_element_bytes(DataType::Float32, Endianness::Little)
                .unwrap()
                .try_into()
                .unwrap()
        )
        .is_nan());
        assert!(nan
            .to_element_bytes(DataType::Int32, Endianness::Little)
            .is_err());
        assert_eq!(
            FillValueMetadataV2::Null
                .to_element_bytes(DataType::Float64, Endianness::Little)
                .unwrap(),
            vec![0; 8]
        );
        let negative = FillValueMetadataV2::Number((-1).into());
        assert!(negative
            .to_element_bytes(DataType::UInt8, Endianness::Little)
            .is_err());
        assert_eq!(
            negative
                .to_element_bytes(DataType::Int8, Endianness::Little)
                .unwrap(),
            vec![0xff]
        );
        assert_eq!(
            serde_json::to_string(&FillValueMetadataV2::NegInfinity).unwrap(),
            r#""-Infinity""#
        );
    }
}
