//! Run command implementation.

use std::path::Path;

use miette::{Result, miette};
use shine_core::{ScriptSource, ShineError};
use shine_engine::Interpreter;
use shine_plugin::{Dispatch, PluginRegistry};

use crate::output;

/// Executes a script file. Plugins get first claim on the extension; any
/// file no plugin claims runs through the Unicorn engine.
pub async fn execute(path: &Path, registry: &PluginRegistry) -> Result<()> {
    let source = ScriptSource::read(path).map_err(|e| match e {
        ShineError::FileNotFound(p) => miette!("Script not found: {}", p.display()),
        other => miette!("{}", other),
    })?;

    match registry.dispatch(path, &source.text).await {
        Ok(Dispatch::Handled) => return Ok(()),
        Ok(Dispatch::Unhandled) => {}
        Err(e) => return Err(miette!("Plugin failed: {}", e)),
    }

    let program = shine_parser::parse_program(&source.text).map_err(miette::Report::new)?;

    let mut interpreter = Interpreter::new();
    if let Err(fault) = interpreter.run(&program) {
        output::error(&format!("UnicornLang Error: {}", fault.message));
        for frame in &fault.trace {
            output::trace(frame);
        }
        return Err(miette!("script failed"));
    }

    Ok(())
}
