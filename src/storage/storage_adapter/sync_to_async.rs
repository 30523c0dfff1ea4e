//! A sync to async storage adapter.

use std::sync::Arc;

use crate::storage::{
    AsyncReadableStorageTraits, AsyncWritableStorageTraits, Bytes, MaybeBytes,
    ReadableStorageTraits, StorageError, StoreKey, WritableStorageTraits,
};

/// A sync to async storage adapter.
///
/// Exposes a synchronous store through the asynchronous storage API.
/// Every call completes immediately, so this adapter does not require an asynchronous runtime.
pub struct SyncToAsyncStorageAdapter<TStorage: ?Sized> {
    storage: Arc<TStorage>,
}

impl<TStorage: ?Sized> core::fmt::Debug for SyncToAsyncStorageAdapter<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "sync to async")
    }
}

impl<TStorage: ?Sized> SyncToAsyncStorageAdapter<TStorage> {
    /// Create a new sync to async storage adapter.
    #[must_use]
    pub fn new(storage: Arc<TStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait::async_trait]
impl<TStorage: ?Sized + ReadableStorageTraits> AsyncReadableStorageTraits
    for SyncToAsyncStorageAdapter<TStorage>
{
    async fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        self.storage.get(key)
    }
}

#[async_trait::async_trait]
impl<TStorage: ?Sized + WritableStorageTraits> AsyncWritableStorageTraits
    for SyncToAsyncStorageAdapter<TStorage>
{
    async fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.storage.set(key, value)
    }
}
