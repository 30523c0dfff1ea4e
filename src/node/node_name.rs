use derive_more::Display;
use thiserror::Error;

/// A Zarr hierarchy node name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display)]
pub struct NodeName(String);

/// An invalid node name.
#[derive(Debug, Error)]
#[error("invalid node name {0}")]
pub struct NodeNameError(String);

impl NodeName {
    /// Create a new Zarr node name from `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeNameError`] if `name` is empty (the root name) or not valid according to [`NodeName::validate`()].
    pub fn new(name: &str) -> Result<Self, NodeNameError> {
        if Self::validate(name) && !name.is_empty() {
            Ok(Self(name.to_string()))
        } else {
            Err(NodeNameError(name.to_string()))
        }
    }

    /// Create a new Zarr node name from `name`.
    ///
    /// # Safety
    ///
    /// `name` is not validated, so this can result in an invalid node name.
    #[must_use]
    pub unsafe fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Extracts a string slice containing the node name `String`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a node name according to the following rules:
    /// - The root node does not have a name and is the empty string "". Otherwise,
    /// - must not include the character "/", and
    /// - must not be a string composed only of period characters, e.g. "." or "..".
    ///
    /// Names starting with a period are otherwise allowed, but they collide with Zarr V2 metadata keys
    /// (`.zgroup`, `.zattrs`, `.zarray`) and are rejected.
    #[must_use]
    pub fn validate(node_name: &str) -> bool {
        node_name.is_empty()
            || (!node_name.contains('/')
                && !node_name.replace('.', "").is_empty()
                && !matches!(node_name, ".zgroup" | ".zattrs" | ".zarray" | ".zmetadata"))
    }

    /// Indicates if a node has the root node name ("").
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<&str> for NodeName {
    type Error = NodeNameError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}
