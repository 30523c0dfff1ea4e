use std::sync::Arc;

use crate::{
    edits::{decode_created_dataset, parse_attrs, EditAction, EditSet, EditValue},
    hierarchy::{BaseGroup, DatasetData, DatasetDataOptions, DatasetInfo, SubgroupInfo},
    metadata::{ArrayMetadataV2, Attributes, ZARRAY, ZATTRS, ZGROUP},
    node::{child_name, join_path, split_object_path, NodeName, NodePath},
};

use super::{EditDispatch, OverlayError};

/// The node wrapped by an [`OverlayGroup`].
#[derive(Clone)]
pub enum OverlayNode {
    /// A group of the base hierarchy.
    Materialized(BaseGroup),
    /// A group that only exists in the edit set.
    Virtual(NodePath),
}

impl OverlayNode {
    /// The path of the node.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        match self {
            Self::Materialized(base) => base.path(),
            Self::Virtual(path) => path,
        }
    }
}

/// A group of a base hierarchy as seen through an edit set.
///
/// Every read is computed from the wrapped node and the edit set snapshot, nothing is cached.
/// Nodes that do not exist are [`None`].
#[derive(Clone)]
pub struct OverlayGroup {
    node: OverlayNode,
    edits: Arc<EditSet>,
    dispatch: EditDispatch,
}

impl core::fmt::Debug for OverlayGroup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayGroup")
            .field("path", self.path())
            .field("virtual", &self.is_virtual())
            .field("edits", &self.edits.len())
            .finish_non_exhaustive()
    }
}

impl OverlayGroup {
    /// Create an overlay of `node` with the `edits` snapshot, dispatching mutations through `dispatch`.
    #[must_use]
    pub fn new(node: OverlayNode, edits: Arc<EditSet>, dispatch: EditDispatch) -> Self {
        Self {
            node,
            edits,
            dispatch,
        }
    }

    /// The path of the group.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        self.node.path()
    }

    /// Returns true if the group only exists in the edit set.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        matches!(self.node, OverlayNode::Virtual(_))
    }

    /// Returns true if the edit set is not empty.
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// The edit set snapshot of the overlay.
    #[must_use]
    pub fn file_edits(&self) -> &Arc<EditSet> {
        &self.edits
    }

    /// The attributes of the group.
    ///
    /// # Errors
    /// Returns [`OverlayError::InvalidMetadata`] if the edited attributes are invalid.
    pub fn attrs(&self) -> Result<Attributes, OverlayError> {
        self.resolve_attrs(self.path(), || match &self.node {
            OverlayNode::Materialized(base) => base.attrs(),
            OverlayNode::Virtual(_) => Attributes::new(),
        })
    }

    /// The direct child groups.
    ///
    /// Removed groups are excluded, and a created group replaces a base group with the same name.
    ///
    /// # Errors
    /// Returns [`OverlayError::InvalidMetadata`] if edited attributes are invalid.
    pub fn subgroups(&self) -> Result<Vec<SubgroupInfo>, OverlayError> {
        let mut created = Vec::new();
        for (name, path, _) in self.created_children(ZGROUP) {
            let attrs = self.resolve_attrs(&path, Attributes::new)?;
            created.push(SubgroupInfo { name, path, attrs });
        }

        let mut subgroups = Vec::new();
        for mut subgroup in self.base_subgroups() {
            if self.edits.is_tombstoned(&subgroup.path.metadata_path(ZGROUP)) {
                continue;
            }
            if let Some(index) = created.iter().position(|c| c.name == subgroup.name) {
                subgroups.push(created.remove(index));
            } else {
                let base_attrs = std::mem::take(&mut subgroup.attrs);
                subgroup.attrs = self.resolve_attrs(&subgroup.path, || base_attrs)?;
                subgroups.push(subgroup);
            }
        }
        subgroups.extend(created);
        Ok(subgroups)
    }

    /// The direct child datasets.
    ///
    /// Removed datasets are excluded, and a created dataset replaces a base dataset with the same name.
    ///
    /// # Errors
    /// Returns [`OverlayError::InvalidMetadata`] if edited metadata is invalid.
    pub fn datasets(&self) -> Result<Vec<DatasetInfo>, OverlayError> {
        let mut created = Vec::new();
        for (_, path, text) in self.created_children(ZARRAY) {
            created.push(self.created_dataset_info(path, text)?);
        }

        let mut datasets = Vec::new();
        for mut dataset in self.base_datasets() {
            if self.edits.is_tombstoned(&dataset.path.metadata_path(ZARRAY)) {
                continue;
            }
            if let Some(index) = created.iter().position(|c| c.name == dataset.name) {
                datasets.push(created.remove(index));
            } else {
                let base_attrs = std::mem::take(&mut dataset.attrs);
                dataset.attrs = self.resolve_attrs(&dataset.path, || base_attrs)?;
                datasets.push(dataset);
            }
        }
        datasets.extend(created);
        Ok(datasets)
    }

    /// Get the child group `name`.
    ///
    /// A base group is returned if it exists, otherwise a virtual group if it was created.
    ///
    /// # Errors
    /// Returns [`OverlayError::HierarchyError`] if the base hierarchy cannot be read.
    pub fn get_group(&self, name: &str) -> Result<Option<Self>, OverlayError> {
        let Some(path) = self.child_path(name) else {
            return Ok(None);
        };
        let zgroup = path.metadata_path(ZGROUP);
        if self.edits.is_tombstoned(&zgroup) {
            return Ok(None);
        }
        if let OverlayNode::Materialized(base) = &self.node {
            if let Some(group) = base.get_group(name)? {
                return Ok(Some(self.with_node(OverlayNode::Materialized(group))));
            }
        }
        if let Some(EditValue::Text(_)) = self.edits.get(&zgroup) {
            return Ok(Some(self.with_node(OverlayNode::Virtual(path))));
        }
        Ok(None)
    }

    /// Get the descriptor of the child dataset `name`.
    ///
    /// # Errors
    /// Returns an [`OverlayError`] if the base hierarchy cannot be read or edited metadata is invalid.
    pub fn get_dataset(&self, name: &str) -> Result<Option<DatasetInfo>, OverlayError> {
        let Some(path) = self.child_path(name) else {
            return Ok(None);
        };
        match self.edits.get(&path.metadata_path(ZARRAY)) {
            Some(EditValue::Tombstone) => Ok(None),
            Some(EditValue::Text(text)) => Ok(Some(self.created_dataset_info(path, text)?)),
            Some(EditValue::Binary(_)) => Err(invalid_metadata(
                &path.metadata_path(ZARRAY),
                "expected text",
            )),
            None => {
                let OverlayNode::Materialized(base) = &self.node else {
                    return Ok(None);
                };
                let Some(mut dataset) = base.get_dataset(name)? else {
                    return Ok(None);
                };
                let base_attrs = std::mem::take(&mut dataset.attrs);
                dataset.attrs = self.resolve_attrs(&path, || base_attrs)?;
                Ok(Some(dataset))
            }
        }
    }

    /// Read the elements of the child dataset `name`.
    ///
    /// The data of a created dataset is returned as it was created, and `options` are ignored, except that a slice is not supported.
    ///
    /// # Errors
    /// Returns [`OverlayError::UnsupportedSlice`] if a slice of a created dataset is requested,
    /// or another [`OverlayError`] if the data cannot be read.
    pub fn get_dataset_data(
        &self,
        name: &str,
        options: &DatasetDataOptions,
    ) -> Result<Option<DatasetData>, OverlayError> {
        let Some(path) = self.child_path(name) else {
            return Ok(None);
        };
        let zarray = path.metadata_path(ZARRAY);
        match self.edits.get(&zarray) {
            Some(EditValue::Tombstone) => Ok(None),
            Some(EditValue::Text(text)) => {
                if options.slice.is_some() {
                    return Err(OverlayError::UnsupportedSlice(path));
                }
                let metadata = parse_array_metadata(&zarray, text)?;
                let chunk_key = metadata.chunk_key(&vec![0; metadata.shape.len()]);
                let Some(chunk) = self
                    .edits
                    .get(&path.metadata_path(&chunk_key))
                    .and_then(EditValue::as_binary)
                else {
                    return Ok(None);
                };
                let data = decode_created_dataset(&metadata, chunk)
                    .map_err(|err| invalid_metadata(&zarray, err))?;
                Ok(Some(data))
            }
            Some(EditValue::Binary(_)) => Err(invalid_metadata(&zarray, "expected text")),
            None => match &self.node {
                OverlayNode::Materialized(base) => Ok(base.get_dataset_data(name, options)?),
                OverlayNode::Virtual(_) => Ok(None),
            },
        }
    }

    /// Replace the attributes of the group.
    ///
    /// # Errors
    /// Returns [`OverlayError::EditError`] if the edit is rejected.
    pub fn set_attrs(&self, attrs: Attributes) -> Result<(), OverlayError> {
        self.dispatch(EditAction::SetAttrs {
            path: self.path().clone(),
            attrs,
        })
    }

    /// Replace the attributes of the child dataset `name`.
    ///
    /// # Errors
    /// Returns an [`OverlayError`] if `name` is invalid or the edit is rejected.
    pub fn set_dataset_attrs(&self, name: &str, attrs: Attributes) -> Result<(), OverlayError> {
        let path = self.path().join(&NodeName::new(name)?);
        self.dispatch(EditAction::SetAttrs { path, attrs })
    }

    /// Create the child group `name` with `attrs`.
    ///
    /// # Errors
    /// Returns an [`OverlayError`] if `name` is invalid or the edit is rejected.
    pub fn create_group(&self, name: &str, attrs: Attributes) -> Result<(), OverlayError> {
        let path = self.path().join(&NodeName::new(name)?);
        self.dispatch(EditAction::CreateGroup { path, attrs })
    }

    /// Remove the child group `name`.
    ///
    /// # Errors
    /// Returns an [`OverlayError`] if `name` is invalid or the edit is rejected.
    pub fn remove_group(&self, name: &str) -> Result<(), OverlayError> {
        let path = self.path().join(&NodeName::new(name)?);
        self.dispatch(EditAction::RemoveGroup { path })
    }

    /// Create the child dataset `name` holding `data` with `shape`, data type `dtype` (e.g. `float32`), and `attrs`.
    ///
    /// # Errors
    /// Returns an [`OverlayError`] if `name` is invalid, `dtype` is unsupported, or `data` does not match `dtype` or `shape`.
    pub fn create_dataset(
        &self,
        name: &str,
        data: DatasetData,
        shape: Vec<u64>,
        dtype: &str,
        attrs: Attributes,
    ) -> Result<(), OverlayError> {
        let path = self.path().join(&NodeName::new(name)?);
        self.dispatch(EditAction::CreateDataset {
            path,
            data,
            shape,
            dtype: dtype.to_string(),
            attrs,
        })
    }

    /// Remove the child dataset `name`.
    ///
    /// # Errors
    /// Returns an [`OverlayError`] if `name` is invalid or the edit is rejected.
    pub fn remove_dataset(&self, name: &str) -> Result<(), OverlayError> {
        let path = self.path().join(&NodeName::new(name)?);
        self.dispatch(EditAction::RemoveDataset { path })
    }

    fn dispatch(&self, action: EditAction) -> Result<(), OverlayError> {
        Ok((self.dispatch)(action)?)
    }

    fn with_node(&self, node: OverlayNode) -> Self {
        Self::new(node, self.edits.clone(), self.dispatch.clone())
    }

    fn child_path(&self, name: &str) -> Option<NodePath> {
        NodePath::new(&join_path(self.path().as_str(), name)).ok()
    }

    fn base_subgroups(&self) -> Vec<SubgroupInfo> {
        match &self.node {
            OverlayNode::Materialized(base) => base.subgroups(),
            OverlayNode::Virtual(_) => Vec::new(),
        }
    }

    fn base_datasets(&self) -> Vec<DatasetInfo> {
        match &self.node {
            OverlayNode::Materialized(base) => base.datasets(),
            OverlayNode::Virtual(_) => Vec::new(),
        }
    }

    /// Direct children with a created `file_name` marker, as `(name, path, marker text)`.
    fn created_children<'a>(
        &'a self,
        file_name: &'a str,
    ) -> impl Iterator<Item = (String, NodePath, &'a str)> + 'a {
        let parent = self.path().as_str();
        self.edits.iter().filter_map(move |(object_path, value)| {
            let (node, marker) = split_object_path(object_path)?;
            let text = value.as_text()?;
            if marker != file_name {
                return None;
            }
            let name = child_name(parent, node)?;
            let path = NodePath::new(node).ok()?;
            Some((name.to_string(), path, text))
        })
    }

    fn created_dataset_info(&self, path: NodePath, text: &str) -> Result<DatasetInfo, OverlayError> {
        let metadata = parse_array_metadata(&path.metadata_path(ZARRAY), text)?;
        let attrs = self.resolve_attrs(&path, Attributes::new)?;
        Ok(DatasetInfo::new(path, &metadata, attrs))
    }

    /// The edited attributes of the node at `path`, or `base` if they are not edited.
    fn resolve_attrs(
        &self,
        path: &NodePath,
        base: impl FnOnce() -> Attributes,
    ) -> Result<Attributes, OverlayError> {
        let zattrs = path.metadata_path(ZATTRS);
        match self.edits.get(&zattrs) {
            Some(EditValue::Text(text)) => {
                parse_attrs(text).map_err(|err| invalid_metadata(&zattrs, err))
            }
            Some(EditValue::Tombstone) => Ok(Attributes::new()),
            Some(EditValue::Binary(_)) => Err(invalid_metadata(&zattrs, "expected text")),
            None => Ok(base()),
        }
    }
}

fn invalid_metadata(object_path: &str, err: impl ToString) -> OverlayError {
    OverlayError::InvalidMetadata(object_path.to_string(), err.to_string())
}

fn parse_array_metadata(object_path: &str, text: &str) -> Result<ArrayMetadataV2, OverlayError> {
    serde_json::from_str(text).map_err(|err| invalid_metadata(object_path, err))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        edits::EditError,
        hierarchy::{BaseGroupTraits, StoreGroup},
        metadata::ConsolidatedMetadata,
        overlay::EditSession,
        storage::{store::MemoryStore, StoreKey, WritableStorageTraits},
    };

    fn attrs(value: serde_json::Value) -> Attributes {
        value.as_object().unwrap().clone()
    }

    fn empty_session() -> EditSession {
        let base = StoreGroup::new_with_metadata(
            Arc::new(MemoryStore::new()),
            ConsolidatedMetadata::default(),
        );
        EditSession::new(Arc::new(base))
    }

    /// A base hierarchy with dataset `/a` (`{x: 1}`), group `/b` (`{y: 1}`) and dataset `/b/c`.
    fn base_group() -> Result<Arc<StoreGroup>, Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let metadata: ConsolidatedMetadata = serde_json::from_value(json!({
            "zarr_consolidated_format": 1,
            "metadata": {
                ".zgroup": {"zarr_format": 2},
                ".zattrs": {"title": "base"},
                "a/.zarray": {
                    "zarr_format": 2, "shape": [3], "chunks": [3], "dtype": "<i4",
                    "compressor": null, "fill_value": 0, "order": "C", "filters": null
                },
                "a/.zattrs": {"x": 1},
                "b/.zgroup": {"zarr_format": 2},
                "b/.zattrs": {"y": 1},
                "b/c/.zarray": {
                    "zarr_format": 2, "shape": [2], "chunks": [2], "dtype": "|u1",
                    "compressor": null, "fill_value": 0, "order": "C", "filters": null
                },
            }
        }))?;
        store.set(
            &StoreKey::new("a/0")?,
            DatasetData::Int32(vec![1, 2, 3]).to_le_bytes().into(),
        )?;
        store.set(&StoreKey::new("b/c/0")?, vec![4u8, 5].into())?;
        Ok(Arc::new(StoreGroup::new_with_metadata(store, metadata)))
    }

    #[test]
    fn overlay_create_group() -> Result<(), Box<dyn std::error::Error>> {
        let session = empty_session();
        session.root().create_group("g", attrs(json!({"k": 1})))?;

        let subgroups = session.root().subgroups()?;
        assert_eq!(subgroups.len(), 1);
        assert_eq!(subgroups[0].name, "g");
        assert_eq!(subgroups[0].path.as_str(), "/g");
        assert_eq!(subgroups[0].attrs, attrs(json!({"k": 1})));

        let g = session.root().get_group("g")?.unwrap();
        assert!(g.is_virtual());
        assert_eq!(g.attrs()?, attrs(json!({"k": 1})));
        assert!(g.subgroups()?.is_empty());
        assert!(g.get_group("missing")?.is_none());
        assert!(g
            .get_dataset_data("missing", &DatasetDataOptions::default())?
            .is_none());
        Ok(())
    }

    #[test]
    fn overlay_create_dataset_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let session = empty_session();
        session.root().create_group("g", attrs(json!({"k": 1})))?;
        let g = session.root().get_group("g")?.unwrap();
        g.create_dataset(
            "d",
            DatasetData::Float32(vec![1.0, 2.0, 3.0, 4.0]),
            vec![4],
            "float32",
            Attributes::new(),
        )?;
        // the existing overlay holds the old snapshot
        assert!(g.get_dataset("d")?.is_none());

        let g = session.root().get_group("g")?.unwrap();
        assert_eq!(
            g.get_dataset_data("d", &DatasetDataOptions::default())?,
            Some(DatasetData::Float32(vec![1.0, 2.0, 3.0, 4.0]))
        );
        assert!(matches!(
            g.get_dataset_data("d", &DatasetDataOptions::with_slice(vec![0..2])),
            Err(OverlayError::UnsupportedSlice(_))
        ));

        let dataset = g.get_dataset("d")?.unwrap();
        assert_eq!(dataset.path.as_str(), "/g/d");
        assert_eq!(dataset.shape, vec![4]);
        assert_eq!(dataset.dtype, "<f4");
        assert_eq!(g.datasets()?, vec![dataset]);

        // 64-bit integers of created datasets are returned as created
        g.create_dataset(
            "i",
            DatasetData::Int64(vec![i64::MAX]),
            vec![1],
            "int64",
            Attributes::new(),
        )?;
        let g = session.root().get_group("g")?.unwrap();
        assert_eq!(
            g.get_dataset_data("i", &DatasetDataOptions::default())?,
            Some(DatasetData::Int64(vec![i64::MAX]))
        );
        Ok(())
    }

    #[test]
    fn overlay_create_dataset_errors() -> Result<(), Box<dyn std::error::Error>> {
        let session = empty_session();
        let root = session.root();
        assert!(matches!(
            root.create_dataset(
                "d",
                DatasetData::Float32(vec![1.0]),
                vec![1],
                "float16",
                Attributes::new()
            ),
            Err(OverlayError::EditError(_))
        ));
        assert!(matches!(
            root.create_group("a/b", Attributes::new()),
            Err(OverlayError::InvalidNodeName(_))
        ));
        assert!(matches!(
            root.create_group(".zgroup", Attributes::new()),
            Err(OverlayError::InvalidNodeName(_))
        ));
        assert!(!session.has_edits());
        Ok(())
    }

    #[test]
    fn overlay_remove_group_is_shallow() -> Result<(), Box<dyn std::error::Error>> {
        let session = empty_session();
        session.root().create_group("g", Attributes::new())?;
        session.root().get_group("g")?.unwrap().create_dataset(
            "d",
            DatasetData::UInt8(vec![1]),
            vec![1],
            "uint8",
            Attributes::new(),
        )?;
        session.root().remove_group("g")?;

        let root = session.root();
        assert!(root.subgroups()?.is_empty());
        assert!(root.get_group("g")?.is_none());
        assert!(root.file_edits().get("/g/d/.zarray").is_some());

        // a group created and removed in the session can be created again
        root.create_group("g", attrs(json!({"k": 2})))?;
        let g = session.root().get_group("g")?.unwrap();
        assert_eq!(g.attrs()?, attrs(json!({"k": 2})));
        assert!(g.get_dataset("d")?.is_some());
        Ok(())
    }

    #[test]
    fn overlay_recreate_removed_base_group() -> Result<(), Box<dyn std::error::Error>> {
        let session = EditSession::new(base_group()?);
        session.root().remove_group("b")?;
        assert!(matches!(
            session.root().create_group("b", Attributes::new()),
            Err(OverlayError::EditError(EditError::RecreateRemovedGroup(_)))
        ));
        assert!(session.root().get_group("b")?.is_none());
        Ok(())
    }

    #[test]
    fn overlay_set_dataset_attrs() -> Result<(), Box<dyn std::error::Error>> {
        let base = base_group()?;
        let session = EditSession::new(base.clone());
        session.dispatch(EditAction::SetAttrs {
            path: NodePath::new("/a")?,
            attrs: attrs(json!({"x": 2})),
        })?;

        let root = session.root();
        assert_eq!(root.get_dataset("a")?.unwrap().attrs, attrs(json!({"x": 2})));
        assert_eq!(root.datasets()?[0].attrs, attrs(json!({"x": 2})));
        assert_eq!(base.get_dataset("a")?.unwrap().attrs, attrs(json!({"x": 1})));

        root.set_dataset_attrs("a", attrs(json!({"x": 3})))?;
        assert_eq!(
            session.root().get_dataset("a")?.unwrap().attrs,
            attrs(json!({"x": 3}))
        );
        Ok(())
    }

    #[test]
    fn overlay_precedence() -> Result<(), Box<dyn std::error::Error>> {
        let session = EditSession::new(base_group()?);
        let root = session.root();
        root.create_dataset(
            "a",
            DatasetData::Float64(vec![0.5, 1.5]),
            vec![2],
            "float64",
            attrs(json!({"created": true})),
        )?;
        root.create_group("b", attrs(json!({"y": 2})))?;

        let root = session.root();
        let datasets = root.datasets()?;
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].shape, vec![2]);
        assert_eq!(datasets[0].dtype, "<f8");
        assert_eq!(datasets[0].attrs, attrs(json!({"created": true})));
        assert_eq!(
            root.get_dataset_data("a", &DatasetDataOptions::default())?,
            Some(DatasetData::Float64(vec![0.5, 1.5]))
        );

        let subgroups = root.subgroups()?;
        assert_eq!(subgroups.len(), 1);
        assert_eq!(subgroups[0].attrs, attrs(json!({"y": 2})));

        // a created group over a base group keeps the base children
        let b = root.get_group("b")?.unwrap();
        assert!(!b.is_virtual());
        assert_eq!(b.attrs()?, attrs(json!({"y": 2})));
        assert_eq!(b.datasets()?.len(), 1);
        Ok(())
    }

    #[test]
    fn overlay_tombstone_hiding() -> Result<(), Box<dyn std::error::Error>> {
        let base = base_group()?;
        let session = EditSession::new(base.clone());
        session.root().remove_dataset("a")?;
        session.root().get_group("b")?.unwrap().remove_dataset("c")?;

        let root = session.root();
        assert!(root.get_dataset("a")?.is_none());
        assert!(root
            .get_dataset_data("a", &DatasetDataOptions::default())?
            .is_none());
        assert!(root.datasets()?.is_empty());
        assert!(root.get_group("b")?.unwrap().datasets()?.is_empty());
        assert_eq!(base.datasets().len(), 1);

        root.remove_group("b")?;
        let root = session.root();
        assert!(root.get_group("b")?.is_none());
        assert!(root.subgroups()?.is_empty());

        // a removed dataset can be created again
        root.create_dataset("a", DatasetData::Int32(vec![9]), vec![1], "int32", Attributes::new())?;
        assert_eq!(
            session
                .root()
                .get_dataset_data("a", &DatasetDataOptions::default())?,
            Some(DatasetData::Int32(vec![9]))
        );
        Ok(())
    }

    #[test]
    fn overlay_reads_through_to_base() -> Result<(), Box<dyn std::error::Error>> {
        let session = EditSession::new(base_group()?);
        let root = session.root();
        assert!(!root.has_edits());
        assert_eq!(root.attrs()?, attrs(json!({"title": "base"})));
        assert_eq!(
            root.get_dataset_data("a", &DatasetDataOptions::with_slice(vec![1..3]))?,
            Some(DatasetData::Int32(vec![2, 3]))
        );
        let b = root.get_group("b")?.unwrap();
        assert_eq!(
            b.get_dataset_data("c", &DatasetDataOptions::default())?,
            Some(DatasetData::UInt8(vec![4, 5]))
        );
        assert!(root.get_group("missing")?.is_none());
        assert!(root.get_dataset("missing")?.is_none());

        root.set_attrs(attrs(json!({"title": "edited"})))?;
        assert_eq!(session.root().attrs()?, attrs(json!({"title": "edited"})));

        session.root().remove_group("b")?;
        session.dispatch(EditAction::SetAttrs {
            path: NodePath::new("/b")?,
            attrs: attrs(json!({"y": 3})),
        })?;
        assert!(session.root().get_group("b")?.is_none());
        Ok(())
    }

    #[test]
    fn overlay_idempotent_recomputation() -> Result<(), Box<dyn std::error::Error>> {
        let session = EditSession::new(base_group()?);
        session.root().create_group("g", attrs(json!({"k": 1})))?;
        session.root().remove_dataset("a")?;

        let first = session.root();
        let second = session.root();
        assert_eq!(first.subgroups()?, second.subgroups()?);
        assert_eq!(first.datasets()?, second.datasets()?);
        assert_eq!(first.attrs()?, second.attrs()?);
        assert_eq!(
            first.get_group("g")?.unwrap().attrs()?,
            second.get_group("g")?.unwrap().attrs()?
        );
        assert_eq!(first.subgroups()?, first.subgroups()?);
        Ok(())
    }
}
