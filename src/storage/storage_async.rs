use super::{Bytes, MaybeBytes, StorageError, StoreKey};

/// Async readable storage traits.
///
/// This is the seam for a remote store which must be awaited, e.g. fetching the consolidated metadata document over HTTP.
#[async_trait::async_trait]
pub trait AsyncReadableStorageTraits: Send + Sync {
    /// Retrieve the value (bytes) associated with a given [`StoreKey`].
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if there is an error with the underlying store.
    async fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError>;
}

/// Async writable storage traits.
///
/// This is the seam for an upload transport.
#[async_trait::async_trait]
pub trait AsyncWritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`].
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on failure to store.
    async fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;
}
