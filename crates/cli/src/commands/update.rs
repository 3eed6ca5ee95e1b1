//! Update command implementation.

use miette::{Result, miette};
use shine_update::{UpdateClient, UpdateOutcome};

use crate::output;

/// Runs one check-and-download cycle against the release server.
pub async fn execute(current_version: &str) -> Result<()> {
    let working_dir = std::env::current_dir()
        .map_err(|e| miette!("Cannot get current directory: {}", e))?;

    let client =
        UpdateClient::new(current_version, working_dir).map_err(|e| miette!("{}", e))?;

    output::info(&format!("Current version: {}", current_version));

    match client.check_and_download().await {
        Ok(UpdateOutcome::AlreadyLatest { version }) => {
            output::success(&format!("Already at the latest version ({})", version));
            Ok(())
        }
        Ok(UpdateOutcome::Downloaded {
            version,
            artifact,
            apply_hint,
        }) => {
            output::success(&format!(
                "Downloaded version {} to {}",
                version,
                artifact.display()
            ));
            output::info(&format!("To apply it, run: {}", apply_hint));
            Ok(())
        }
        Err(e) => Err(miette!("Update failed: {}", e)),
    }
}
