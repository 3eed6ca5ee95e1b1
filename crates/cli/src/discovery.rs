//! Plugins directory discovery.

use std::path::{Path, PathBuf};

/// Finds the plugins directory: `plugins/` next to the executable wins,
/// then the per-user data directory.
pub fn find_plugins_dir() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(found) = plugins_dir_near(&exe) {
            return Some(found);
        }
    }

    let data = dirs::data_dir()?.join("shine").join("plugins");
    if data.is_dir() { Some(data) } else { None }
}

/// Returns the `plugins/` sibling of the given executable, if it exists.
fn plugins_dir_near(exe: &Path) -> Option<PathBuf> {
    let sibling = exe.parent()?.join("plugins");
    if sibling.is_dir() { Some(sibling) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sibling_plugins_dir_found() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("shine");
        std::fs::write(&exe, "").unwrap();
        std::fs::create_dir(dir.path().join("plugins")).unwrap();

        assert_eq!(plugins_dir_near(&exe), Some(dir.path().join("plugins")));
    }

    #[test]
    fn test_missing_sibling_plugins_dir() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("shine");
        std::fs::write(&exe, "").unwrap();

        assert_eq!(plugins_dir_near(&exe), None);
    }
}
