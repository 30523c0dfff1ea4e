use derive_more::Display;
use thiserror::Error;

use super::NodeName;

/// A Zarr hierarchy node path.
///
/// A path always starts with `/`, the root path is `/`, and a non-root path has no empty components and no trailing `/`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{_0}")]
pub struct NodePath(String);

/// An invalid node path.
#[derive(Debug, Error)]
#[error("invalid node path {0}")]
pub struct NodePathError(String);

impl NodePath {
    /// Create a new Zarr node path from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`NodePathError`] if `path` is not valid according to [`NodePath::validate`()].
    pub fn new(path: &str) -> Result<Self, NodePathError> {
        if Self::validate(path) {
            Ok(Self(path.to_string()))
        } else {
            Err(NodePathError(path.to_string()))
        }
    }

    /// The root node.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Extracts a string slice containing the node path `String`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Indicates if this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Validates a path according to the following rules:
    /// - A path always starts with `/`, and
    /// - a non-root path cannot end with `/`, because node names must be non-empty and cannot contain `/`.
    ///
    /// Additionally, it checks that there are no empty nodes (i.e. a `//` substring).
    #[must_use]
    pub fn validate(path: &str) -> bool {
        path.eq("/") || (path.starts_with('/') && !path.ends_with('/') && !path.contains("//"))
    }

    /// Return the path of the child `name` of this node.
    #[must_use]
    pub fn join(&self, name: &NodeName) -> Self {
        Self(super::join_path(self.as_str(), name.as_str()))
    }

    /// Return the parent path, or [`None`] for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(index) => Some(Self(self.0[..index].to_string())),
        }
    }

    /// Return the name of the node, the last component of the path.
    ///
    /// The root node has the empty name.
    #[must_use]
    pub fn name(&self) -> NodeName {
        let name = self.0.rsplit('/').next().unwrap_or_default();
        unsafe { NodeName::new_unchecked(name) }
    }

    /// Returns true if `child` is a direct child of this node.
    #[must_use]
    pub fn is_parent_of(&self, child: &NodePath) -> bool {
        super::is_direct_child(self.as_str(), child.as_str())
    }

    /// Return the path of the metadata object `file_name` (e.g. `.zattrs`) of this node.
    ///
    /// This is the key used by the edit log, e.g. `/a/b/.zattrs` or `/.zgroup` for the root.
    #[must_use]
    pub fn metadata_path(&self, file_name: &str) -> String {
        super::join_path(self.as_str(), file_name)
    }
}

impl TryFrom<&str> for NodePath {
    type Error = NodePathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}
