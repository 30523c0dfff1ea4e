//! Zarr storage.
//!
//! A Zarr store is a system that can be used to store and retrieve data from a Zarr hierarchy.
//! For example: a filesystem, HTTP server, Amazon S3 bucket, etc.
//!
//! The remote store behind an overlay is only ever read through [`ReadableStorageTraits`].
//! An upload transport is anything implementing [`WritableStorageTraits`] (or [`AsyncWritableStorageTraits`] with the `async` feature).
//! [`MemoryStore`](store::MemoryStore) implements the synchronous traits.

pub mod storage_adapter;
mod storage_sync;
pub mod store;
mod store_key;

#[cfg(feature = "async")]
mod storage_async;

use std::sync::Arc;

use thiserror::Error;

use crate::{byte_range::InvalidByteRangeError, metadata::ConsolidatedMetadata, node::NodePath};

pub use store_key::{StoreKey, StoreKeyError};

pub use self::storage_sync::{ReadableStorageTraits, WritableStorageTraits};

#[cfg(feature = "async")]
pub use self::storage_async::{AsyncReadableStorageTraits, AsyncWritableStorageTraits};

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

/// The type for bytes used in store set and get methods.
///
/// An alias for [`bytes::Bytes`].
pub type Bytes = bytes::Bytes;

/// An alias for bytes which may or may not be available.
///
/// When a value is read from a store, it returns `MaybeBytes` which is [`None`] if the key is not available.
pub type MaybeBytes = Option<Bytes>;

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An error parsing the metadata for a key.
    #[error("error parsing metadata for {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store key.
    #[error(transparent)]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An invalid byte range.
    #[error(transparent)]
    InvalidByteRangeError(#[from] InvalidByteRangeError),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// The key of the consolidated metadata document at the root of a store.
pub const CONSOLIDATED_METADATA_KEY: &str = ".zmetadata";

/// Return the metadata key given a node path for a specified metadata file name (e.g. .zarray, .zgroup, .zattrs).
#[must_use]
fn meta_key_any(path: &NodePath, metadata_file_name: &str) -> StoreKey {
    data_key(path, metadata_file_name)
}

/// Return the Zarr V2 array metadata key (.zarray) given a node path.
#[must_use]
pub fn meta_key_v2_array(path: &NodePath) -> StoreKey {
    meta_key_any(path, ".zarray")
}

/// Return the Zarr V2 group metadata key (.zgroup) given a node path.
#[must_use]
pub fn meta_key_v2_group(path: &NodePath) -> StoreKey {
    meta_key_any(path, ".zgroup")
}

/// Return the Zarr V2 user-defined attributes key (.zattrs) given a node path.
#[must_use]
pub fn meta_key_v2_attributes(path: &NodePath) -> StoreKey {
    meta_key_any(path, ".zattrs")
}

/// Return the data key of the chunk with encoded key `chunk_key` of the array at `path`.
#[must_use]
pub fn data_key(path: &NodePath, chunk_key: &str) -> StoreKey {
    let path = path.as_str();
    if path.eq("/") {
        unsafe { StoreKey::new_unchecked(chunk_key.to_string()) }
    } else {
        let path = path.strip_prefix('/').unwrap_or(path);
        unsafe { StoreKey::new_unchecked(format!("{path}/{chunk_key}")) }
    }
}

/// Return the consolidated metadata key (.zmetadata).
#[must_use]
pub fn consolidated_metadata_key() -> StoreKey {
    unsafe { StoreKey::new_unchecked(CONSOLIDATED_METADATA_KEY) }
}

/// Retrieve and parse the consolidated metadata document (`.zmetadata`) at the root of `storage`.
///
/// Returns [`None`] if the store has no consolidated metadata.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying storage error or the document is invalid.
pub fn get_consolidated_metadata(
    storage: &dyn ReadableStorageTraits,
) -> Result<Option<ConsolidatedMetadata>, StorageError> {
    let key = consolidated_metadata_key();
    storage
        .get(&key)?
        .map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))
        })
        .transpose()
}
