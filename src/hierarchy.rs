//! The read-only base hierarchy.
//!
//! A base group is an immutable node of a remote Zarr V2 hierarchy, accessed through [`BaseGroupTraits`].
//! It exposes snapshots of its direct child groups and datasets and its attributes, and accessors for child groups,
//! datasets, and dataset data.
//!
//! [`StoreGroup`] implements [`BaseGroupTraits`] over any [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits) store
//! with consolidated metadata.

mod dataset_data;
mod store_group;

use std::{ops::Range, sync::Arc};

use thiserror::Error;

pub use dataset_data::DatasetData;
pub use store_group::StoreGroup;

use crate::{
    metadata::{
        ArrayMetadataV2, Attributes, DataType, DataTypeError, Endianness,
        IncompatibleFillValueError,
    },
    node::NodePath,
    storage::StorageError,
};

/// [`Arc`] wrapped base group.
pub type BaseGroup = Arc<dyn BaseGroupTraits>;

/// The interface of an immutable group of a base hierarchy.
///
/// `name` arguments are relative to the group, e.g. `b` for the child `/a/b` of `/a`.
/// A missing node is [`None`], not an error.
pub trait BaseGroupTraits: Send + Sync {
    /// The path of the group.
    fn path(&self) -> &NodePath;

    /// The attributes of the group.
    fn attrs(&self) -> Attributes;

    /// The direct child groups.
    fn subgroups(&self) -> Vec<SubgroupInfo>;

    /// The direct child datasets.
    fn datasets(&self) -> Vec<DatasetInfo>;

    /// Get the child group `name`.
    ///
    /// # Errors
    /// Returns a [`HierarchyError`] if there is an underlying storage or metadata error.
    fn get_group(&self, name: &str) -> Result<Option<BaseGroup>, HierarchyError>;

    /// Get the descriptor of the child dataset `name`.
    ///
    /// # Errors
    /// Returns a [`HierarchyError`] if there is an underlying storage or metadata error.
    fn get_dataset(&self, name: &str) -> Result<Option<DatasetInfo>, HierarchyError>;

    /// Read the elements of the child dataset `name`, optionally restricted to a slice.
    ///
    /// # Errors
    /// Returns a [`HierarchyError`] if the slice is invalid, the dataset is encoded in an unsupported way,
    /// or there is an underlying storage or metadata error.
    fn get_dataset_data(
        &self,
        name: &str,
        options: &DatasetDataOptions,
    ) -> Result<Option<DatasetData>, HierarchyError>;
}

/// A child group descriptor.
#[derive(Clone, PartialEq, Debug)]
pub struct SubgroupInfo {
    /// The name of the group.
    pub name: String,
    /// The path of the group.
    pub path: NodePath,
    /// The attributes of the group.
    pub attrs: Attributes,
}

/// A dataset descriptor.
#[derive(Clone, PartialEq, Debug)]
pub struct DatasetInfo {
    /// The name of the dataset.
    pub name: String,
    /// The path of the dataset.
    pub path: NodePath,
    /// The shape of the dataset.
    pub shape: Vec<u64>,
    /// The Zarr V2 typestring of the dataset, e.g. `<f4`.
    pub dtype: String,
    /// The attributes of the dataset.
    pub attrs: Attributes,
}

impl DatasetInfo {
    /// Create a dataset descriptor from array metadata.
    #[must_use]
    pub fn new(path: NodePath, metadata: &ArrayMetadataV2, attrs: Attributes) -> Self {
        Self {
            name: path.name().as_str().to_string(),
            path,
            shape: metadata.shape.clone(),
            dtype: metadata.dtype.clone(),
            attrs,
        }
    }

    /// Return the data type and endianness of the dataset.
    ///
    /// # Errors
    /// Returns [`DataTypeError`] if the typestring is not supported.
    pub fn data_type(&self) -> Result<(DataType, Endianness), DataTypeError> {
        DataType::from_typestring(&self.dtype)
    }
}

/// Dataset data retrieval options.
#[derive(Clone, Default, Debug)]
pub struct DatasetDataOptions {
    /// The range of each leading dimension to read. Trailing dimensions without a range are read whole.
    pub slice: Option<Vec<Range<u64>>>,
    /// Return 64-bit integer data as is, rather than converting it to `float64`.
    pub allow_big_int: bool,
}

impl DatasetDataOptions {
    /// Options to read the `slice` of a dataset.
    #[must_use]
    pub fn with_slice(slice: Vec<Range<u64>>) -> Self {
        Self {
            slice: Some(slice),
            allow_big_int: false,
        }
    }
}

/// A hierarchy error.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// The store has no consolidated metadata.
    #[error("the store has no consolidated metadata")]
    MissingConsolidatedMetadata,
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// Invalid metadata.
    #[error("invalid metadata {0}: {1}")]
    InvalidMetadata(String, String),
    /// An unsupported data type.
    #[error(transparent)]
    DataTypeError(#[from] DataTypeError),
    /// An incompatible fill value.
    #[error(transparent)]
    IncompatibleFillValueError(#[from] IncompatibleFillValueError),
    /// An invalid slice.
    #[error("invalid slice {0:?} of dataset with shape {1:?}")]
    InvalidSlice(Vec<Range<u64>>, Vec<u64>),
    /// A decoded chunk has an unexpected size.
    #[error("chunk {key} has {actual} bytes, expected {expected}")]
    InvalidChunkSize {
        /// The chunk key.
        key: String,
        /// The expected size in bytes.
        expected: usize,
        /// The actual size in bytes.
        actual: usize,
    },
    /// A decoded chunk or region does not match its shape.
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
    /// A chunk could not be decompressed.
    #[error("failed to decompress chunk: {0}")]
    DecompressionError(#[from] std::io::Error),
    /// An unsupported feature of a dataset.
    #[error("unsupported: {0}")]
    Unsupported(String),
}
