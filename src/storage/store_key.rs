use derive_more::{Display, From};
use thiserror::Error;

/// A Zarr abstract store key.
///
/// Keys are relative to the root of a store, e.g. `.zmetadata`, `a/.zattrs`, or `a/b/0.0`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct StoreKey(String);

/// An invalid store key.
#[derive(Debug, From, Error)]
#[error("invalid store key {0}")]
pub struct StoreKeyError(String);

impl StoreKey {
    /// Create a new Zarr abstract store key from `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreKeyError`] if `key` is not valid according to [`StoreKey::validate()`].
    pub fn new(key: impl Into<String>) -> Result<Self, StoreKeyError> {
        let key = key.into();
        if Self::validate(&key) {
            Ok(Self(key))
        } else {
            Err(StoreKeyError(key))
        }
    }

    /// Create a new Zarr abstract store key from `key` without validation.
    ///
    /// # Safety
    ///
    /// `key` is not validated, so this can result in an invalid store key.
    #[must_use]
    pub unsafe fn new_unchecked(key: impl Into<String>) -> Self {
        let key = key.into();
        debug_assert!(Self::validate(&key));
        Self(key)
    }

    /// Create a store key from an absolute object path, such as an edit log key (e.g. `/a/.zattrs` becomes `a/.zattrs`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreKeyError`] if the path with its leading `/` removed is not a valid key.
    pub fn from_object_path(object_path: &str) -> Result<Self, StoreKeyError> {
        Self::new(object_path.strip_prefix('/').unwrap_or(object_path))
    }

    /// Extracts a string slice of the underlying Key [String].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a key:
    /// - a key is a Unicode string, where the final character is not a `/` character,
    /// - a key cannot start with a `/`, and
    /// - a key cannot be an empty string.
    #[must_use]
    pub fn validate(key: &str) -> bool {
        !key.starts_with('/') && !key.ends_with('/') && !key.eq("")
    }
}

impl TryFrom<&str> for StoreKey {
    type Error = StoreKeyError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}
