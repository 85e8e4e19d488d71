// src/entity/settings.rs
use serde::{Deserialize, Serialize};

/// Contents of config.json in the per-user application directory. Absent by
/// default; written only when the data directory is migrated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "dataPath", skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    #[serde(rename = "lastModified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}
