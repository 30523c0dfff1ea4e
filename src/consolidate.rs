//! Consolidation of edits into an upload payload.
//!
//! [`consolidate_edits`] reduces an [`EditSet`] to the objects that must be written to the base store:
//!  - every edited metadata object (`.zgroup`, `.zattrs`, `.zarray`) is spliced into the consolidated metadata document,
//!    which is uploaded once as `.zmetadata`, and
//!  - every other edited object (a chunk) is uploaded as is.
//!
//! Tombstones are not uploaded, so removed nodes remain in the base store.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use zarrs_overlay::{
//! #     consolidate::{consolidate_edits, fetch_consolidated_metadata},
//! #     hierarchy::StoreGroup,
//! #     overlay::EditSession,
//! #     storage::store::MemoryStore,
//! # };
//! # let store = Arc::new(MemoryStore::new());
//! # zarrs_overlay::storage::WritableStorageTraits::set(
//! #     &*store,
//! #     &".zmetadata".try_into()?,
//! #     r#"{"zarr_consolidated_format":1,"metadata":{".zgroup":{"zarr_format":2}}}"#.into(),
//! # )?;
//! let session = EditSession::new(Arc::new(StoreGroup::open(store.clone())?));
//! session.root().create_group("g", serde_json::Map::new())?;
//!
//! let payload = consolidate_edits(&session.edits(), fetch_consolidated_metadata(&*store)?)?;
//! payload.store(&*store)?;
//! session.clear_edits();
//!
//! let session = EditSession::new(Arc::new(StoreGroup::open(store)?));
//! assert!(session.root().get_group("g")?.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    config::metadata_to_string,
    edits::{EditSet, EditValue},
    metadata::{is_metadata_file_name, ConsolidatedMetadata},
    storage::{
        consolidated_metadata_key, get_consolidated_metadata, Bytes, ReadableStorageTraits,
        StorageError, StoreKey, StoreKeyError, WritableStorageTraits,
    },
};

#[cfg(feature = "async")]
use crate::storage::{AsyncReadableStorageTraits, AsyncWritableStorageTraits};

/// A consolidation error.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// The store has no consolidated metadata.
    #[error("the store has no consolidated metadata")]
    MissingConsolidatedMetadata,
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An edited object path is not a valid store key.
    #[error(transparent)]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An edited metadata object is invalid.
    #[error("invalid edited metadata {0}: {1}")]
    InvalidMetadata(String, String),
    /// The consolidated metadata could not be serialised.
    #[error(transparent)]
    SerializationError(#[from] serde_json::Error),
}

/// The value of an object to upload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum UploadValue {
    /// Metadata text.
    Text(String),
    /// Binary data.
    Binary(Bytes),
}

impl UploadValue {
    /// The bytes to store.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Text(text) => Bytes::from(text.clone()),
            Self::Binary(bytes) => bytes.clone(),
        }
    }
}

/// The objects to write to a store, keyed relative to the store root.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct UploadPayload {
    objects: BTreeMap<StoreKey, UploadValue>,
}

impl UploadPayload {
    /// Return the object at `key`, if any.
    #[must_use]
    pub fn get(&self, key: &StoreKey) -> Option<&UploadValue> {
        self.objects.get(key)
    }

    /// The rewritten consolidated metadata document, if any metadata was edited.
    #[must_use]
    pub fn consolidated_metadata(&self) -> Option<&str> {
        match self.get(&consolidated_metadata_key()) {
            Some(UploadValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns true if there is nothing to upload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The number of objects to upload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Iterate over the objects to upload in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StoreKey, &UploadValue)> {
        self.objects.iter()
    }

    /// Write every object to `storage`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a write fails. Objects written before the failure are not rolled back.
    pub fn store<TStorage: ?Sized + WritableStorageTraits>(
        &self,
        storage: &TStorage,
    ) -> Result<(), StorageError> {
        for (key, value) in &self.objects {
            storage.set(key, value.to_bytes())?;
        }
        tracing::debug!("stored {} objects", self.objects.len());
        Ok(())
    }

    #[cfg(feature = "async")]
    /// Asynchronously write every object to `storage`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if a write fails. Objects written before the failure are not rolled back.
    pub async fn async_store<TStorage: ?Sized + AsyncWritableStorageTraits>(
        &self,
        storage: &TStorage,
    ) -> Result<(), StorageError> {
        let futures = self
            .objects
            .iter()
            .map(|(key, value)| storage.set(key, value.to_bytes()));
        futures::future::try_join_all(futures).await?;
        tracing::debug!("stored {} objects", self.objects.len());
        Ok(())
    }
}

impl<'a> IntoIterator for &'a UploadPayload {
    type Item = (&'a StoreKey, &'a UploadValue);
    type IntoIter = std::collections::btree_map::Iter<'a, StoreKey, UploadValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Reduce `edits` to the objects to upload to a store with consolidated `metadata`.
///
/// Edited metadata objects are spliced into `metadata`, and edited chunks drop their `refs` entries.
/// `metadata` is included in the payload as `.zmetadata` if and only if either changed it.
/// Other edited objects are included as is. Tombstones are skipped.
///
/// # Errors
/// Returns a [`ConsolidateError`] if an edited metadata object is not valid JSON or an edited object path is not a valid store key.
pub fn consolidate_edits(
    edits: &EditSet,
    mut metadata: ConsolidatedMetadata,
) -> Result<UploadPayload, ConsolidateError> {
    let mut objects = BTreeMap::new();
    let mut metadata_changed = false;
    for (object_path, value) in edits.iter() {
        let key = StoreKey::from_object_path(object_path)?;
        let file_name = object_path.rsplit('/').next().unwrap_or(object_path);
        match value {
            EditValue::Tombstone => {}
            EditValue::Text(text) if is_metadata_file_name(file_name) => {
                let document = serde_json::from_str(text).map_err(|err| {
                    ConsolidateError::InvalidMetadata(object_path.to_string(), err.to_string())
                })?;
                metadata.metadata.insert(key.as_str().to_string(), document);
                metadata_changed = true;
            }
            EditValue::Binary(_) if is_metadata_file_name(file_name) => {
                return Err(ConsolidateError::InvalidMetadata(
                    object_path.to_string(),
                    "expected text".to_string(),
                ));
            }
            EditValue::Text(text) => {
                objects.insert(key, UploadValue::Text(text.clone()));
            }
            EditValue::Binary(bytes) => {
                // the uploaded object replaces any packed copy of the chunk
                if let Some(refs) = metadata.refs.as_mut() {
                    metadata_changed |= refs.remove(key.as_str()).is_some();
                }
                objects.insert(key, UploadValue::Binary(bytes.clone()));
            }
        }
    }
    if metadata_changed {
        objects.insert(
            consolidated_metadata_key(),
            UploadValue::Text(metadata_to_string(&metadata)?),
        );
    }
    tracing::debug!(
        "consolidated {} edits into {} objects",
        edits.len(),
        objects.len()
    );
    Ok(UploadPayload { objects })
}

/// Retrieve the consolidated metadata document of `storage`.
///
/// # Errors
/// Returns [`ConsolidateError::MissingConsolidatedMetadata`] if the store has no `.zmetadata`,
/// or [`ConsolidateError::StorageError`] if it cannot be read or parsed.
pub fn fetch_consolidated_metadata(
    storage: &dyn ReadableStorageTraits,
) -> Result<ConsolidatedMetadata, ConsolidateError> {
    get_consolidated_metadata(storage)?.ok_or(ConsolidateError::MissingConsolidatedMetadata)
}

#[cfg(feature = "async")]
/// Asynchronously retrieve the consolidated metadata document of `storage`.
///
/// # Errors
/// Returns [`ConsolidateError::MissingConsolidatedMetadata`] if the store has no `.zmetadata`,
/// or [`ConsolidateError::StorageError`] if it cannot be read or parsed.
pub async fn async_fetch_consolidated_metadata(
    storage: &dyn AsyncReadableStorageTraits,
) -> Result<ConsolidatedMetadata, ConsolidateError> {
    let key = consolidated_metadata_key();
    let bytes = storage
        .get(&key)
        .await?
        .ok_or(ConsolidateError::MissingConsolidatedMetadata)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| StorageError::InvalidMetadata(key, err.to_string()).into())
}
