use crate::{hierarchy::DatasetData, metadata::Attributes, node::NodePath};

/// An edit to a hierarchy.
///
/// Actions are applied to an [`EditSet`](super::EditSet) with [`EditSet::apply`](super::EditSet::apply).
#[derive(Clone, PartialEq, Debug)]
pub enum EditAction {
    /// Replace the attributes of the node at `path`.
    ///
    /// The node does not need to exist.
    SetAttrs {
        /// The node path.
        path: NodePath,
        /// The new attributes.
        attrs: Attributes,
    },
    /// Create a group at `path` with `attrs`.
    CreateGroup {
        /// The group path.
        path: NodePath,
        /// The group attributes.
        attrs: Attributes,
    },
    /// Remove the group at `path`. Descendants are not removed.
    RemoveGroup {
        /// The group path.
        path: NodePath,
    },
    /// Create a dataset at `path` holding `data` as a single uncompressed chunk.
    CreateDataset {
        /// The dataset path.
        path: NodePath,
        /// The dataset elements in C order.
        data: DatasetData,
        /// The dataset shape.
        shape: Vec<u64>,
        /// The data type name, e.g. `float32`.
        dtype: String,
        /// The dataset attributes.
        attrs: Attributes,
    },
    /// Remove the dataset at `path`.
    RemoveDataset {
        /// The dataset path.
        path: NodePath,
    },
    /// Discard all edits.
    ClearEdits,
}

impl EditAction {
    /// The path of the node that the action applies to, or [`None`] for [`EditAction::ClearEdits`].
    #[must_use]
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            Self::SetAttrs { path, .. }
            | Self::CreateGroup { path, .. }
            | Self::RemoveGroup { path }
            | Self::CreateDataset { path, .. }
            | Self::RemoveDataset { path } => Some(path),
            Self::ClearEdits => None,
        }
    }

    /// A short name of the action, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetAttrs { .. } => "set_attrs",
            Self::CreateGroup { .. } => "create_group",
            Self::RemoveGroup { .. } => "remove_group",
            Self::CreateDataset { .. } => "create_dataset",
            Self::RemoveDataset { .. } => "remove_dataset",
            Self::ClearEdits => "clear_edits",
        }
    }
}
