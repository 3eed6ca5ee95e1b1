//! External toolchain execution for descriptor plugins.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{PluginError, Result};

/// Finds the first runnable candidate: absolute paths are checked on disk,
/// bare names are resolved through PATH.
pub fn probe(candidates: &[String]) -> Result<PathBuf> {
    for candidate in candidates {
        let path = Path::new(candidate);
        if path.is_absolute() {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
        } else if let Ok(found) = which::which(candidate) {
            return Ok(found);
        }
    }
    Err(PluginError::ToolchainNotFound(candidates.join(", ")))
}

/// Expands `{file}` and `{output}` placeholders in an argument template.
pub fn expand_args(template: &[String], file: &Path, output: Option<&Path>) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            let arg = arg.replace("{file}", &file.to_string_lossy());
            match output {
                Some(out) => arg.replace("{output}", &out.to_string_lossy()),
                None => arg,
            }
        })
        .collect()
}

/// Scratch path for a compiled binary.
pub fn temp_output(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "plugin".to_string());
    std::env::temp_dir().join(format!("shine-{}-{}", stem, std::process::id()))
}

/// Runs a program with inherited standard streams and waits for it.
pub async fn run_command(program: &Path, args: &[String]) -> Result<()> {
    debug!("Running {} {:?}", program.display(), args);
    let status = Command::new(program).args(args).status().await?;
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(PluginError::RunFailed(code)),
        None => Err(PluginError::ExecutionError(
            "process terminated by signal".to_string(),
        )),
    }
}

/// COMPILE → RUN: a non-zero compile exit aborts before RUN; the temp
/// binary is removed afterwards, best-effort.
pub async fn compile_and_run(compiler: &Path, compile_args: &[String], output: &Path) -> Result<()> {
    debug!("Compiling with {} {:?}", compiler.display(), compile_args);
    let compile = Command::new(compiler)
        .args(compile_args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !compile.status.success() {
        return Err(PluginError::CompileFailed {
            code: compile.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&compile.stderr).trim().to_string(),
        });
    }

    let result = run_command(output, &[]).await;

    if let Err(e) = std::fs::remove_file(output) {
        warn!("Failed to remove temp binary {}: {}", output.display(), e);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_args() {
        let template = vec![
            "-o".to_string(),
            "{output}".to_string(),
            "{file}".to_string(),
        ];
        let expanded = expand_args(
            &template,
            Path::new("/tmp/hello.c"),
            Some(Path::new("/tmp/hello")),
        );
        assert_eq!(expanded, vec!["-o", "/tmp/hello", "/tmp/hello.c"]);
    }

    #[test]
    fn test_expand_args_without_output() {
        let template = vec!["{file}".to_string()];
        let expanded = expand_args(&template, Path::new("script.py"), None);
        assert_eq!(expanded, vec!["script.py"]);
    }

    #[test]
    fn test_probe_missing_everything() {
        let candidates = vec![
            "/definitely/not/a/compiler".to_string(),
            "no-such-program-shine-test".to_string(),
        ];
        assert!(matches!(
            probe(&candidates),
            Err(PluginError::ToolchainNotFound(_))
        ));
    }

    #[test]
    fn test_temp_output_uses_stem() {
        let out = temp_output(Path::new("/src/hello.c"));
        let name = out.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("shine-hello-"));
    }
}
