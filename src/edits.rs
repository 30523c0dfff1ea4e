//! The edit log.
//!
//! An [`EditSet`] maps the path of every edited object of a hierarchy (e.g. `/a/.zattrs`, `/a/b/.zarray`, `/a/b/0.0`)
//! to its new content or a tombstone.
//! It is never modified in place: [`EditSet::apply`] returns a new edit set and leaves the original untouched.
//!
//! A tombstone on a `.zgroup` or `.zarray` object removes the node. Removal is shallow: edits below a removed node
//! are kept, but are unreachable through an overlay.
//! Removing a group created in the same edit set drops its created objects instead, so it can be created again.

mod edit_action;

use std::collections::BTreeMap;

use thiserror::Error;

pub use edit_action::EditAction;

use crate::{
    config::metadata_to_string,
    hierarchy::DatasetData,
    metadata::{
        num_elements, ArrayMetadataV2, Attributes, DataType, DataTypeError, GroupMetadataV2,
        ZARRAY, ZATTRS, ZGROUP,
    },
    node::NodePath,
    storage::Bytes,
};

/// The value of an edited object.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EditValue {
    /// Serialised metadata (`.zgroup`, `.zattrs`, `.zarray`).
    Text(String),
    /// A binary chunk.
    Binary(Bytes),
    /// The object is deleted.
    Tombstone,
}

impl EditValue {
    /// Returns true if the value is a tombstone.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone)
    }

    /// Return the text of a [`EditValue::Text`] value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Return the bytes of a [`EditValue::Binary`] value.
    #[must_use]
    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// An edit error.
///
/// An edit that fails leaves the edit set unchanged.
#[derive(Debug, Error)]
pub enum EditError {
    /// An unsupported data type.
    #[error(transparent)]
    DataTypeError(#[from] DataTypeError),
    /// The data does not have the requested data type.
    #[error("data of type {actual} does not match data type {expected}")]
    DataTypeMismatch {
        /// The requested data type.
        expected: DataType,
        /// The data type of the data.
        actual: DataType,
    },
    /// The number of elements does not match the shape.
    #[error("{elements} elements do not match shape {shape:?}")]
    ShapeMismatch {
        /// The requested shape.
        shape: Vec<u64>,
        /// The number of elements.
        elements: usize,
    },
    /// A group cannot be created where a base group was removed.
    #[error("cannot create group {0}, a group at this path was removed")]
    RecreateRemovedGroup(NodePath),
    /// Metadata could not be serialised.
    #[error(transparent)]
    SerializationError(#[from] serde_json::Error),
    /// Any other error, e.g. from a dispatcher.
    #[error("{0}")]
    Other(String),
}

/// The edit log of a hierarchy: a map from object path to [`EditValue`], ordered by path.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct EditSet {
    edits: BTreeMap<String, EditValue>,
}

impl EditSet {
    /// Create an empty edit set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the edit set resulting from applying `action` to this edit set.
    ///
    /// # Errors
    /// Returns an [`EditError`] if `action` is invalid, e.g. a dataset with an unsupported data type.
    pub fn apply(&self, action: &EditAction) -> Result<Self, EditError> {
        let mut edits = self.edits.clone();
        match action {
            EditAction::SetAttrs { path, attrs } => {
                edits.insert(path.metadata_path(ZATTRS), attrs_value(attrs)?);
            }
            EditAction::CreateGroup { path, attrs } => {
                let zgroup = path.metadata_path(ZGROUP);
                if self.is_tombstoned(&zgroup) {
                    return Err(EditError::RecreateRemovedGroup(path.clone()));
                }
                let metadata = metadata_to_string(&GroupMetadataV2::default())?;
                edits.insert(zgroup, EditValue::Text(metadata));
                edits.insert(path.metadata_path(ZATTRS), attrs_value(attrs)?);
            }
            EditAction::RemoveGroup { path } => {
                let zgroup = path.metadata_path(ZGROUP);
                let zattrs = path.metadata_path(ZATTRS);
                if matches!(self.get(&zgroup), Some(EditValue::Text(_))) {
                    edits.remove(&zgroup);
                    edits.remove(&zattrs);
                } else {
                    edits.insert(zgroup, EditValue::Tombstone);
                    edits.insert(zattrs, EditValue::Tombstone);
                }
            }
            EditAction::CreateDataset {
                path,
                data,
                shape,
                dtype,
                attrs,
            } => {
                let data_type = DataType::from_name(dtype)?;
                if data.data_type() != data_type {
                    return Err(EditError::DataTypeMismatch {
                        expected: data_type,
                        actual: data.data_type(),
                    });
                }
                if num_elements(shape) != Some(data.len() as u64) {
                    return Err(EditError::ShapeMismatch {
                        shape: shape.clone(),
                        elements: data.len(),
                    });
                }
                let metadata = ArrayMetadataV2::new_single_chunk(shape.clone(), data_type);
                let chunk_key = metadata.chunk_key(&vec![0; shape.len()]);
                edits.insert(
                    path.metadata_path(ZARRAY),
                    EditValue::Text(metadata_to_string(&metadata)?),
                );
                edits.insert(path.metadata_path(ZATTRS), attrs_value(attrs)?);
                edits.insert(
                    path.metadata_path(&chunk_key),
                    EditValue::Binary(data.to_le_bytes().into()),
                );
            }
            EditAction::RemoveDataset { path } => {
                edits.insert(path.metadata_path(ZARRAY), EditValue::Tombstone);
                edits.insert(path.metadata_path(ZATTRS), EditValue::Tombstone);
            }
            EditAction::ClearEdits => edits.clear(),
        }
        Ok(Self { edits })
    }

    /// Return the edit of the object at `object_path` (e.g. `/a/.zattrs`), if any.
    #[must_use]
    pub fn get(&self, object_path: &str) -> Option<&EditValue> {
        self.edits.get(object_path)
    }

    /// Returns true if the object at `object_path` is tombstoned.
    #[must_use]
    pub fn is_tombstoned(&self, object_path: &str) -> bool {
        self.get(object_path).is_some_and(EditValue::is_tombstone)
    }

    /// Returns true if there are no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// The number of edited objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Iterate over the edited objects in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EditValue)> {
        self.edits.iter().map(|(path, value)| (path.as_str(), value))
    }
}

impl<'a> IntoIterator for &'a EditSet {
    type Item = (&'a String, &'a EditValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, EditValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

fn attrs_value(attrs: &Attributes) -> Result<EditValue, EditError> {
    Ok(EditValue::Text(metadata_to_string(attrs)?))
}

/// Parse the text of an edited `.zattrs` object.
///
/// # Errors
/// Returns a [`serde_json::Error`] if `text` is not a JSON object.
pub fn parse_attrs(text: &str) -> Result<Attributes, serde_json::Error> {
    serde_json::from_str(text)
}

/// Decode the data of a created dataset from its `.zarray` and its chunk.
///
/// # Errors
/// Returns a [`DataTypeError`] if the data type of the dataset is not supported.
pub fn decode_created_dataset(
    metadata: &ArrayMetadataV2,
    chunk: &[u8],
) -> Result<DatasetData, DataTypeError> {
    let (data_type, endianness) = metadata.data_type()?;
    Ok(DatasetData::from_bytes(data_type, endianness, chunk))
}
