//! Zarr node paths and names.
//!
//! A node in a Zarr hierarchy is either a group or a dataset (array).
//! Nodes are addressed by a [`NodePath`], and the objects that describe a node are addressed by appending a
//! metadata file name (`.zgroup`, `.zattrs`, `.zarray`) or a chunk key to its path.
//!
//! The free functions in this module operate on raw `/`-delimited path strings and are shared by the edit log,
//! which keys its entries by full object path, and the overlay, which tests those keys against node paths.

mod node_name;
mod node_path;

pub use node_name::{NodeName, NodeNameError};
pub use node_path::{NodePath, NodePathError};

/// Join `name` onto the path `parent`.
///
/// ```
/// # use zarrs_overlay::node::join_path;
/// assert_eq!(join_path("/", "a"), "/a");
/// assert_eq!(join_path("/a", "b"), "/a/b");
/// ```
#[must_use]
pub fn join_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Returns true if `child` is a direct child of `parent`.
///
/// `child` must start with `parent` followed by `/` (or just `/` for the root), and the remainder must be non-empty and must not contain `/`.
#[must_use]
pub fn is_direct_child(parent: &str, child: &str) -> bool {
    child_name(parent, child).is_some()
}

/// Return the name of `child` relative to `parent` if `child` is a direct child of `parent`.
#[must_use]
pub fn child_name<'a>(parent: &str, child: &'a str) -> Option<&'a str> {
    let remainder = if parent == "/" {
        child.strip_prefix('/')?
    } else {
        child.strip_prefix(parent)?.strip_prefix('/')?
    };
    if remainder.is_empty() || remainder.contains('/') {
        None
    } else {
        Some(remainder)
    }
}

/// Split an object path (e.g. `/a/b/.zattrs`) into its node path (`/a/b`) and file name (`.zattrs`).
///
/// Returns [`None`] if `object_path` is not absolute or has no file name.
#[must_use]
pub fn split_object_path(object_path: &str) -> Option<(&str, &str)> {
    let index = object_path.rfind('/')?;
    let file_name = &object_path[index + 1..];
    if file_name.is_empty() || !object_path.starts_with('/') {
        return None;
    }
    let node = if index == 0 { "/" } else { &object_path[..index] };
    Some((node, file_name))
}
