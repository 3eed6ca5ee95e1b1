//! Script source buffer.

use std::path::{Path, PathBuf};

use crate::error::{Result, ShineError};

/// An immutable script read from disk, owned by a single run.
#[derive(Debug, Clone)]
pub struct ScriptSource {
    /// Path the script was read from.
    pub path: PathBuf,

    /// Full source text.
    pub text: String,
}

impl ScriptSource {
    /// Reads a script from the given path.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ShineError::FileNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|e| ShineError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// The file extension, lowercased and dot-prefixed (e.g. `.unicorn`).
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let err = ScriptSource::read(Path::new("/definitely/not/here.unicorn")).unwrap_err();
        assert!(matches!(err, ShineError::FileNotFound(_)));
    }

    #[test]
    fn test_extension_is_lowercased() {
        let src = ScriptSource {
            path: PathBuf::from("spell.UNICORN"),
            text: String::new(),
        };
        assert_eq!(src.extension().as_deref(), Some(".unicorn"));
    }

    #[test]
    fn test_extension_missing() {
        let src = ScriptSource {
            path: PathBuf::from("Spellbook"),
            text: String::new(),
        };
        assert_eq!(src.extension(), None);
    }
}
