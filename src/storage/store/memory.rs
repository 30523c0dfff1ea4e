//! An in-memory store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::{
    byte_range::{extract_byte_ranges, ByteRange},
    storage::{Bytes, ReadableStorageTraits, StorageError, StoreKey, WritableStorageTraits},
};

/// An in-memory store.
///
/// Useful as a stand-in for a remote store, or as an upload target.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data_map: RwLock<BTreeMap<StoreKey, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadableStorageTraits for MemoryStore {
    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        let data_map = self.data_map.read();
        match data_map.get(key) {
            Some(data) => Ok(Some(extract_byte_ranges(data, byte_ranges)?)),
            None => Ok(None),
        }
    }
}

impl WritableStorageTraits for MemoryStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.data_map.write().insert(key.clone(), value);
        Ok(())
    }
}
