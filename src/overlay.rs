//! The overlay view of a base hierarchy with edits.
//!
//! An [`OverlayGroup`] reads through to a base group, merging in an [`EditSet`](crate::edits::EditSet) snapshot:
//!  - removed nodes are hidden,
//!  - edited attributes override the base attributes, and
//!  - created groups and datasets appear alongside (or in place of) base nodes with the same name.
//!
//! Mutators on an [`OverlayGroup`] dispatch an [`EditAction`](crate::edits::EditAction) and do not change the group itself.
//! An [`EditSession`] owns the current edit set, and [`EditSession::root`] derives a fresh overlay that reflects every dispatched edit.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use zarrs_overlay::{hierarchy::StoreGroup, overlay::EditSession, storage::store::MemoryStore};
//! # let store = Arc::new(MemoryStore::new());
//! # zarrs_overlay::storage::WritableStorageTraits::set(
//! #     &*store,
//! #     &".zmetadata".try_into()?,
//! #     r#"{"zarr_consolidated_format":1,"metadata":{".zgroup":{"zarr_format":2}}}"#.into(),
//! # )?;
//! let session = EditSession::new(Arc::new(StoreGroup::open(store)?));
//! session.root().create_group("g", serde_json::Map::new())?;
//! assert!(session.root().get_group("g")?.is_some());
//! session.root().remove_group("g")?;
//! assert!(session.root().get_group("g")?.is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod edit_session;
mod overlay_group;

use std::sync::Arc;

use thiserror::Error;

pub use edit_session::EditSession;
pub use overlay_group::{OverlayGroup, OverlayNode};

use crate::{
    edits::{EditAction, EditError},
    hierarchy::HierarchyError,
    node::{NodeNameError, NodePath},
};

/// A function that applies an [`EditAction`] to the edit set of a session.
pub type EditDispatch = Arc<dyn Fn(EditAction) -> Result<(), EditError> + Send + Sync>;

/// An overlay error.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// An error reading the base hierarchy.
    #[error(transparent)]
    HierarchyError(#[from] HierarchyError),
    /// An edit was rejected.
    #[error(transparent)]
    EditError(#[from] EditError),
    /// An invalid child name.
    #[error(transparent)]
    InvalidNodeName(#[from] NodeNameError),
    /// Invalid edited metadata.
    #[error("invalid edited metadata {0}: {1}")]
    InvalidMetadata(String, String),
    /// Slices of created datasets are not supported.
    #[error("slicing created dataset {0} is not supported")]
    UnsupportedSlice(NodePath),
}
