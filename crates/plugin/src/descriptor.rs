//! Plugin descriptors: JSON metadata files in the plugins directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, Result};

/// A plugin descriptor: metadata plus the strategy used to execute files
/// with a claimed extension. Loaded once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin name.
    pub name: String,

    /// Plugin version.
    pub version: String,

    /// Extensions this plugin claims (case-insensitive, dot-prefixed).
    pub extensions: Vec<String>,

    /// Optional command executed exactly once when the plugin is registered.
    #[serde(default)]
    pub init: Option<String>,

    /// How claimed files are executed.
    pub runner: RunnerSpec,
}

/// Execution strategy for a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunnerSpec {
    /// Run an interpreter directly on the file.
    Command {
        /// Candidate programs, probed in order.
        programs: Vec<String>,

        /// Arguments; `{file}` expands to the script path.
        #[serde(default = "default_command_args")]
        args: Vec<String>,
    },

    /// Compile the file to a temporary binary, run it, then remove it.
    Compile {
        /// Candidate compilers, probed in order.
        compilers: Vec<String>,

        /// Compile arguments; `{file}` and `{output}` expand.
        compile_args: Vec<String>,
    },
}

fn default_command_args() -> Vec<String> {
    vec!["{file}".to_string()]
}

impl PluginDescriptor {
    /// Loads a descriptor from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a descriptor from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PluginError::InvalidDescriptor(e.to_string()))
    }

    /// Checks the descriptor invariants.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(PluginError::InvalidDescriptor(
                "plugin name must not be empty".to_string(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(PluginError::InvalidDescriptor(format!(
                "plugin '{}' claims no extensions",
                self.name
            )));
        }
        for ext in &self.extensions {
            if !ext.starts_with('.') {
                return Err(PluginError::InvalidDescriptor(format!(
                    "extension '{}' must start with '.'",
                    ext
                )));
            }
        }
        Ok(())
    }

    /// Case-insensitive extension membership.
    pub fn supports(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|e| e.to_lowercase() == ext)
    }
}
