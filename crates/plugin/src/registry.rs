//! Extension-keyed plugin registry.
//!
//! Descriptors are loaded once from the plugins directory and held,
//! read-only, for the process lifetime. Dispatch walks the handlers in
//! load order; the first extension match wins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::descriptor::{PluginDescriptor, RunnerSpec};
use crate::error::{PluginError, Result};
use crate::toolchain;

/// Capability interface for anything that can execute files by extension.
#[async_trait]
pub trait ExtensionHandler: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn extensions(&self) -> &[String];

    /// Case-insensitive extension match.
    fn supports(&self, ext: &str) -> bool;

    /// Executes the file. Failures are fatal to the current run.
    async fn execute(&self, path: &Path, source: &str) -> Result<()>;
}

/// Outcome of a dispatch attempt. `Unhandled` is distinct from failure so
/// the caller can fall back to the script engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A plugin claimed the extension and completed successfully.
    Handled,

    /// No loaded plugin claims the extension.
    Unhandled,
}

/// Information about a loaded plugin, for the `plugins` listing.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub extensions: Vec<String>,
}

/// A plugin backed by a JSON descriptor and an external toolchain.
struct DescriptorPlugin {
    descriptor: PluginDescriptor,
}

#[async_trait]
impl ExtensionHandler for DescriptorPlugin {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn version(&self) -> &str {
        &self.descriptor.version
    }

    fn extensions(&self) -> &[String] {
        &self.descriptor.extensions
    }

    fn supports(&self, ext: &str) -> bool {
        self.descriptor.supports(ext)
    }

    async fn execute(&self, path: &Path, _source: &str) -> Result<()> {
        match &self.descriptor.runner {
            RunnerSpec::Command { programs, args } => {
                let program = toolchain::probe(programs)?;
                let args = toolchain::expand_args(args, path, None);
                toolchain::run_command(&program, &args).await
            }
            RunnerSpec::Compile {
                compilers,
                compile_args,
            } => {
                let compiler = toolchain::probe(compilers)?;
                let output = toolchain::temp_output(path);
                let args = toolchain::expand_args(compile_args, path, Some(&output));
                toolchain::compile_and_run(&compiler, &args, &output).await
            }
        }
    }
}

/// Registry of loaded plugins, keyed by file extension at dispatch time.
pub struct PluginRegistry {
    handlers: Vec<Box<dyn ExtensionHandler>>,
}

impl PluginRegistry {
    /// Creates a registry with no plugins.
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Loads every `*.json` descriptor from `dir`, in sorted name order so
    /// dispatch priority is stable across runs. Load failures are logged
    /// and skipped; they never abort the whole load.
    pub async fn load(dir: &Path) -> Self {
        let mut registry = Self::empty();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No plugins directory at {}: {}", dir.display(), e);
                return registry;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            match Self::load_descriptor(&path).await {
                Ok(handler) => {
                    info!(
                        "Registered plugin: {} v{} ({})",
                        handler.name(),
                        handler.version(),
                        handler.extensions().join(", ")
                    );
                    registry.handlers.push(handler);
                }
                Err(e) => warn!("Failed to load plugin {}: {}", path.display(), e),
            }
        }

        registry
    }

    async fn load_descriptor(path: &Path) -> Result<Box<dyn ExtensionHandler>> {
        let descriptor = PluginDescriptor::from_file(path).map_err(|e| match e {
            PluginError::Io(io) => PluginError::LoadError {
                path: path.to_path_buf(),
                reason: io.to_string(),
            },
            other => other,
        })?;
        descriptor.validate()?;

        // The init hook runs exactly once per process, at registration.
        if let Some(init) = &descriptor.init {
            run_init(init).await?;
        }

        Ok(Box::new(DescriptorPlugin { descriptor }))
    }

    /// Registers an already-built handler at the end of the dispatch order.
    pub fn register(&mut self, handler: Box<dyn ExtensionHandler>) {
        self.handlers.push(handler);
    }

    /// Dispatches a file to the first plugin claiming its extension.
    /// A plugin failure propagates; no match returns `Unhandled`.
    pub async fn dispatch(&self, path: &Path, source: &str) -> Result<Dispatch> {
        let Some(ext) = file_extension(path) else {
            return Ok(Dispatch::Unhandled);
        };

        for handler in &self.handlers {
            if handler.supports(&ext) {
                debug!("Plugin '{}' claims {}", handler.name(), path.display());
                handler.execute(path, source).await?;
                return Ok(Dispatch::Handled);
            }
        }

        Ok(Dispatch::Unhandled)
    }

    /// Lists the loaded plugins in dispatch order.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.handlers
            .iter()
            .map(|h| PluginInfo {
                name: h.name().to_string(),
                version: h.version().to_string(),
                extensions: h.extensions().to_vec(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// The file's extension, lowercased and dot-prefixed.
fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

async fn run_init(command: &str) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PluginError::InitError("empty init command".to_string()))?;

    let output = Command::new(program)
        .args(parts)
        .output()
        .await
        .map_err(|e| PluginError::InitError(format!("{}: {}", program, e)))?;

    if !output.status.success() {
        return Err(PluginError::InitError(format!(
            "'{}' exited with {}",
            command, output.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Test handler that records which plugin handled the dispatch.
    struct Probe {
        name: String,
        extensions: Vec<String>,
        hits: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Probe {
        fn boxed(name: &str, ext: &str, hits: &Arc<Mutex<Vec<String>>>) -> Box<Self> {
            Box::new(Self {
                name: name.to_string(),
                extensions: vec![ext.to_string()],
                hits: Arc::clone(hits),
                fail: false,
            })
        }
    }

    #[async_trait]
    impl ExtensionHandler for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn version(&self) -> &str {
            "0.0.0"
        }

        fn extensions(&self) -> &[String] {
            &self.extensions
        }

        fn supports(&self, ext: &str) -> bool {
            self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        }

        async fn execute(&self, _path: &Path, _source: &str) -> Result<()> {
            self.hits.lock().unwrap().push(self.name.clone());
            if self.fail {
                return Err(PluginError::ExecutionError("boom".to_string()));
            }
            Ok(())
        }
    }

    fn write_descriptor(dir: &Path, file: &str, name: &str, ext: &str) {
        let json = format!(
            r#"{{
                "name": "{name}",
                "version": "1.0.0",
                "extensions": ["{ext}"],
                "runner": {{ "kind": "command", "programs": ["true"] }}
            }}"#
        );
        std::fs::write(dir.join(file), json).unwrap();
    }

    #[tokio::test]
    async fn test_first_loaded_plugin_wins() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::empty();
        registry.register(Probe::boxed("first", ".foo", &hits));
        registry.register(Probe::boxed("second", ".foo", &hits));

        for _ in 0..3 {
            let outcome = registry
                .dispatch(Path::new("magic.foo"), "")
                .await
                .unwrap();
            assert_eq!(outcome, Dispatch::Handled);
        }

        assert_eq!(*hits.lock().unwrap(), vec!["first", "first", "first"]);
    }

    #[tokio::test]
    async fn test_unhandled_extension() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::empty();
        registry.register(Probe::boxed("only-foo", ".foo", &hits));

        let outcome = registry
            .dispatch(Path::new("script.unicorn"), "")
            .await
            .unwrap();
        assert_eq!(outcome, Dispatch::Unhandled);
        assert!(hits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_extension_is_unhandled() {
        let registry = PluginRegistry::empty();
        let outcome = registry.dispatch(Path::new("Spellbook"), "").await.unwrap();
        assert_eq!(outcome, Dispatch::Unhandled);
    }

    #[tokio::test]
    async fn test_dispatch_is_case_insensitive() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::empty();
        registry.register(Probe::boxed("foo", ".foo", &hits));

        let outcome = registry.dispatch(Path::new("LOUD.FOO"), "").await.unwrap();
        assert_eq!(outcome, Dispatch::Handled);
    }

    #[tokio::test]
    async fn test_execute_failure_propagates() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::empty();
        registry.register(Box::new(Probe {
            name: "broken".to_string(),
            extensions: vec![".foo".to_string()],
            hits: Arc::clone(&hits),
            fail: true,
        }));

        let result = registry.dispatch(Path::new("x.foo"), "").await;
        assert!(matches!(result, Err(PluginError::ExecutionError(_))));
    }

    #[tokio::test]
    async fn test_load_skips_bad_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        write_descriptor(dir.path(), "a-good.json", "good", ".foo");
        std::fs::write(dir.path().join("b-broken.json"), "{ not json").unwrap();

        let registry = PluginRegistry::load(dir.path()).await;
        let plugins = registry.plugins();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].name, "good");
    }

    #[tokio::test]
    async fn test_load_order_is_sorted_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write_descriptor(dir.path(), "z-last.json", "last", ".foo");
        write_descriptor(dir.path(), "a-first.json", "first", ".foo");

        let registry = PluginRegistry::load(dir.path()).await;
        let names: Vec<String> = registry.plugins().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["first", "last"]);
    }

    #[tokio::test]
    async fn test_failing_init_skips_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
            "name": "needy",
            "version": "1.0.0",
            "extensions": [".foo"],
            "init": "no-such-program-shine-init-test",
            "runner": { "kind": "command", "programs": ["true"] }
        }"#;
        std::fs::write(dir.path().join("needy.json"), json).unwrap();

        let registry = PluginRegistry::load(dir.path()).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_loads_empty() {
        let registry = PluginRegistry::load(Path::new("/no/plugins/here")).await;
        assert!(registry.is_empty());
    }
}
