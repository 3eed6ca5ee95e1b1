//! Platform families: artifact key preference, naming, and apply hints.

use std::collections::HashMap;
use std::path::Path;

/// Leading filename piece shared by every installer artifact.
pub const INSTALLER_PREFIX: &str = "Shine.Unicorn.Installer.Setup.";

/// A platform family for artifact resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// The family this build runs on.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        }
    }

    /// Manifest keys accepted for this family, most preferred first.
    pub fn manifest_keys(self) -> &'static [&'static str] {
        match self {
            Platform::Windows => &["win64", "win32", "windows", "win"],
            Platform::MacOs => &["mac", "darwin", "osx"],
            Platform::Linux => &["linux", "appimage"],
        }
    }

    /// Installer file extension for this family.
    pub fn artifact_ext(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::MacOs => ".dmg",
            Platform::Linux => ".AppImage",
        }
    }

    /// `Shine.Unicorn.Installer.Setup.<version>.<ext>`
    pub fn artifact_name(self, version: &str) -> String {
        format!("{}{}{}", INSTALLER_PREFIX, version, self.artifact_ext())
    }

    /// The exact command the user runs to apply a downloaded installer.
    pub fn apply_hint(self, artifact: &Path) -> String {
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| artifact.display().to_string());
        match self {
            Platform::Windows => format!(".\\{}", name),
            Platform::MacOs => format!("open {}", name),
            Platform::Linux => format!("chmod +x {0} && ./{0}", name),
        }
    }
}

/// Picks the first manifest entry matching the family's preference order.
pub fn resolve_artifact(
    platform: Platform,
    files: &HashMap<String, String>,
) -> Option<&str> {
    platform
        .manifest_keys()
        .iter()
        .find_map(|key| files.get(*key).map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(keys: &[&str]) -> HashMap<String, String> {
        keys.iter()
            .map(|k| (k.to_string(), format!("artifacts/{}", k)))
            .collect()
    }

    #[test]
    fn test_preference_order() {
        let all = files(&["win32", "win64", "linux", "mac"]);
        assert_eq!(
            resolve_artifact(Platform::Windows, &all),
            Some("artifacts/win64")
        );
        assert_eq!(
            resolve_artifact(Platform::Linux, &all),
            Some("artifacts/linux")
        );
        assert_eq!(
            resolve_artifact(Platform::MacOs, &all),
            Some("artifacts/mac")
        );
    }

    #[test]
    fn test_fallback_keys() {
        let only_win32 = files(&["win32"]);
        assert_eq!(
            resolve_artifact(Platform::Windows, &only_win32),
            Some("artifacts/win32")
        );
    }

    #[test]
    fn test_missing_platform() {
        let only_win = files(&["win64"]);
        assert_eq!(resolve_artifact(Platform::Linux, &only_win), None);
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(
            Platform::Windows.artifact_name("1.0.8"),
            "Shine.Unicorn.Installer.Setup.1.0.8.exe"
        );
        assert_eq!(
            Platform::Linux.artifact_name("1.0.8"),
            "Shine.Unicorn.Installer.Setup.1.0.8.AppImage"
        );
    }

    #[test]
    fn test_apply_hint() {
        let artifact = Path::new("Shine.Unicorn.Installer.Setup.1.0.8.AppImage");
        assert_eq!(
            Platform::Linux.apply_hint(artifact),
            "chmod +x Shine.Unicorn.Installer.Setup.1.0.8.AppImage && ./Shine.Unicorn.Installer.Setup.1.0.8.AppImage"
        );
        assert!(Platform::Windows.apply_hint(artifact).starts_with(".\\"));
    }
}
