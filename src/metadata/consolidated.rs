use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::AdditionalFields;

/// Consolidated metadata of a Zarr V2 hierarchy, stored at `.zmetadata` in the root of a store.
///
/// `metadata` maps each metadata key relative to the store root (e.g. `a/.zarray`) to its JSON document.
/// If present, `refs` maps chunk keys to a byte range of a packed data file.
///
/// ```json
/// {
///     "zarr_consolidated_format": 1,
///     "metadata": {
///         ".zgroup": {"zarr_format": 2},
///         "a/.zattrs": {"units": "ms"}
///     },
///     "refs": {
///         "a/0": ["_consolidated_0.dat", 0, 400]
///     }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ConsolidatedMetadata {
    /// The consolidated metadata format version. Must be `1`.
    pub zarr_consolidated_format: monostate::MustBe!(1u64),
    /// Metadata documents keyed by store key.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Chunk references into packed data files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<BTreeMap<String, ChunkRef>>,
    /// Additional fields.
    #[serde(flatten)]
    pub additional_fields: AdditionalFields,
}

/// The location of a chunk inside a packed data file: `[file, offset, length]`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ChunkRef(pub String, pub u64, pub u64);

impl ChunkRef {
    /// The key of the packed data file, relative to the store root.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.0
    }

    /// The byte offset of the chunk within the file.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.1
    }

    /// The length of the chunk in bytes.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.2
    }
}

impl Default for ConsolidatedMetadata {
    fn default() -> Self {
        Self {
            zarr_consolidated_format: monostate::MustBe!(1u64),
            metadata: serde_json::Map::new(),
            refs: None,
            additional_fields: AdditionalFields::default(),
        }
    }
}

impl ConsolidatedMetadata {
    /// Return the metadata document at `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Return the packed location of the chunk at `key`, if it is referenced.
    #[must_use]
    pub fn chunk_ref(&self, key: &str) -> Option<&ChunkRef> {
        self.refs.as_ref().and_then(|refs| refs.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consolidated_metadata() {
        let json = r#"{
            "zarr_consolidated_format": 1,
            "metadata": {
                ".zgroup": {"zarr_format": 2},
                "a/.zattrs": {"units": "ms"}
            },
            "refs": {
                "a/0": ["_consolidated_0.dat", 16, 400]
            }
        }"#;
        let metadata: ConsolidatedMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(
            metadata.get("a/.zattrs"),
            Some(&serde_json::json!({"units": "ms"}))
        );
        let chunk_ref = metadata.chunk_ref("a/0").unwrap();
        assert_eq!(chunk_ref.file(), "_consolidated_0.dat");
        assert_eq!(chunk_ref.offset(), 16);
        assert_eq!(chunk_ref.length(), 400);
        assert!(metadata.chunk_ref("a/1").is_none());

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["refs"]["a/0"], serde_json::json!(["_consolidated_0.dat", 16, 400]));
    }

    #[test]
    fn consolidated_metadata_without_refs() {
        let metadata: ConsolidatedMetadata =
            serde_json::from_str(r#"{"zarr_consolidated_format": 1, "metadata": {}}"#).unwrap();
        assert!(metadata.refs.is_none());
        assert!(serde_json::from_str::<ConsolidatedMetadata>(
            r#"{"zarr_consolidated_format": 2, "metadata": {}}"#
        )
        .is_err());
        assert_eq!(
            serde_json::to_value(ConsolidatedMetadata::default()).unwrap(),
            serde_json::json!({"zarr_consolidated_format": 1, "metadata": {}})
        );
    }
}
