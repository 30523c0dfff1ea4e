use serde::{Deserialize, Serialize};

/// Codec metadata with an id and optional configuration.
///
/// For example:
/// ```json
/// {
///     "id": "zstd",
///     "level": 3
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct MetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: serde_json::Map<String, serde_json::Value>,
}

impl MetadataV2 {
    /// Return the "id" key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration, which includes all fields excluding the "id".
    #[must_use]
    pub fn configuration(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.configuration
    }
}
