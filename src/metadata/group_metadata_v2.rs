use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::AdditionalFields;

/// Zarr V2 group metadata.
///
/// ```json
/// {
///     "zarr_format": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct GroupMetadataV2 {
    /// An integer defining the version of the storage specification to which the group adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// Additional fields.
    ///
    /// These are not part of Zarr V2, but are retained for compatibility/flexibility.
    #[serde(default, flatten)]
    pub additional_fields: AdditionalFields,
}

impl Default for GroupMetadataV2 {
    fn default() -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
            additional_fields: AdditionalFields::default(),
        }
    }
}
