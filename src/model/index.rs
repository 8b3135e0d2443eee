use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One element of `index/modules.json`: a module and the vulnerabilities
/// recorded against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMeta {
    pub path: String,
    #[serde(default)]
    pub vulns: Vec<ModuleVuln>,
}

/// A vulnerability as summarised in the module index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleVuln {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Highest fixed version of the module, empty if some range is unfixed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fixed: String,
}

/// One element of `index/vulns.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}
