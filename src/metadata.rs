//! Zarr V2 metadata.
//!
//! Array (`.zarray`), group (`.zgroup`) and consolidated (`.zmetadata`) metadata documents,
//! and the numeric [`DataType`]s that an array can hold.
//!
//! User attributes (`.zattrs`) are an arbitrary JSON object, see [`Attributes`].

mod array_metadata_v2;
mod consolidated;
mod data_type;
mod endianness;
mod group_metadata_v2;
mod metadata_v2;

pub use array_metadata_v2::{
    num_elements, ArrayMetadataV2, ArrayMetadataV2Order, ChunkKeySeparator, FillValueMetadataV2,
    IncompatibleFillValueError,
};
pub use consolidated::{ChunkRef, ConsolidatedMetadata};
pub use data_type::{DataType, DataTypeError};
pub use endianness::Endianness;
pub use group_metadata_v2::GroupMetadataV2;
pub use metadata_v2::MetadataV2;

/// User defined attributes, stored in `.zattrs`.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Additional fields in metadata which are not part of Zarr V2.
pub type AdditionalFields = serde_json::Map<String, serde_json::Value>;

/// Metadata file name of a Zarr V2 array.
pub const ZARRAY: &str = ".zarray";

/// Metadata file name of a Zarr V2 group.
pub const ZGROUP: &str = ".zgroup";

/// Metadata file name of Zarr V2 user attributes.
pub const ZATTRS: &str = ".zattrs";

/// Returns true if `file_name` is one of the Zarr V2 metadata file names (`.zarray`, `.zgroup`, `.zattrs`).
#[must_use]
pub fn is_metadata_file_name(file_name: &str) -> bool {
    matches!(file_name, ZARRAY | ZGROUP | ZATTRS)
}
