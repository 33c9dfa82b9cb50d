use serde::{Deserialize, Serialize};

/// Body of `GET /__version__`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub source: String,
    pub version: String,
    pub commit: String,
    pub build: String,
}
