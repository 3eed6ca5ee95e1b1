//! The remote release manifest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UpdateError};

/// `latest.json`: the newest release version and its per-platform
/// artifacts. Fetched fresh on every check, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateManifest {
    /// Latest release version, with or without a leading `v`.
    pub version: String,

    /// Platform key to artifact path, relative to the release base URL.
    pub files: HashMap<String, String>,
}

impl UpdateManifest {
    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| UpdateError::ManifestParse(e.to_string()))
    }
}

/// Fetches `<base>/latest.json`.
pub async fn fetch_manifest(http: &reqwest::Client, base_url: &str) -> Result<UpdateManifest> {
    let url = format!("{}/latest.json", base_url.trim_end_matches('/'));
    debug!("Checking {}", url);

    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| UpdateError::ManifestFetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(UpdateError::ManifestFetch(format!(
            "HTTP {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| UpdateError::ManifestFetch(e.to_string()))?;

    UpdateManifest::from_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "version": "v1.0.8",
            "files": {
                "win64": "Shine.Unicorn.Installer.Setup.1.0.8.exe",
                "linux": "Shine.Unicorn.Installer.Setup.1.0.8.AppImage"
            }
        }"#;

        let manifest = UpdateManifest::from_json(json).unwrap();
        assert_eq!(manifest.version, "v1.0.8");
        assert_eq!(manifest.files.len(), 2);
        assert!(manifest.files.contains_key("linux"));
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(matches!(
            UpdateManifest::from_json("{ nope"),
            Err(UpdateError::ManifestParse(_))
        ));
        assert!(matches!(
            UpdateManifest::from_json(r#"{"version": 7}"#),
            Err(UpdateError::ManifestParse(_))
        ));
    }
}
