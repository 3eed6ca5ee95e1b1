//! The update client: one CHECK → RESOLVE → CLEAN_OLD → DOWNLOAD → VERIFY
//! cycle. No step is retried; at most one request is in flight at a time.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::redirect::Policy;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{Result, UpdateError};
use crate::manifest::fetch_manifest;
use crate::platform::{INSTALLER_PREFIX, Platform, resolve_artifact};
use crate::version;

/// Release server queried for `latest.json`.
pub const DEFAULT_BASE_URL: &str = "https://repfal.betaflare.workers.dev";

/// Redirect depth cap for artifact downloads.
pub const DEFAULT_REDIRECT_CAP: u32 = 5;

/// Inactivity bound on the artifact stream.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one check-and-download cycle.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Current and manifest versions match; nothing was downloaded.
    AlreadyLatest { version: String },

    /// A new installer is on disk, along with the command to apply it.
    Downloaded {
        version: String,
        artifact: PathBuf,
        apply_hint: String,
    },
}

/// One download in flight, including its remaining redirect budget.
#[derive(Debug)]
struct DownloadTask {
    url: String,
    dest: PathBuf,
    redirects_remaining: u32,
}

/// The update client. The client never installs anything itself.
pub struct UpdateClient {
    base_url: String,
    current_version: String,
    platform: Platform,
    working_dir: PathBuf,
    redirect_cap: u32,
    idle_timeout: Duration,
    show_progress: bool,
    http: reqwest::Client,
}

impl UpdateClient {
    /// Creates a client checking against the default release server.
    ///
    /// Redirects are followed manually in [`UpdateClient::check_and_download`]
    /// so the depth cap stays an explicit, testable parameter.
    pub fn new(current_version: impl Into<String>, working_dir: impl Into<PathBuf>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| UpdateError::Client(e.to_string()))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            current_version: current_version.into(),
            platform: Platform::current(),
            working_dir: working_dir.into(),
            redirect_cap: DEFAULT_REDIRECT_CAP,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            show_progress: true,
            http,
        })
    }

    /// Overrides the release server URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the platform family.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Overrides the redirect depth cap.
    pub fn with_redirect_cap(mut self, cap: u32) -> Self {
        self.redirect_cap = cap;
        self
    }

    /// Overrides the inactivity timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Enables or disables the terminal progress bar.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Runs the full cycle.
    pub async fn check_and_download(&self) -> Result<UpdateOutcome> {
        // CHECK
        let manifest = fetch_manifest(&self.http, &self.base_url).await?;
        info!("Latest release: {}", manifest.version);

        // RESOLVE
        let latest = version::normalize(&manifest.version).to_string();
        if version::same_version(&self.current_version, &manifest.version) {
            return Ok(UpdateOutcome::AlreadyLatest { version: latest });
        }

        let rel_path = resolve_artifact(self.platform, &manifest.files)
            .ok_or_else(|| UpdateError::NoArtifactForPlatform(self.platform.name().to_string()))?;

        let artifact_name = self.platform.artifact_name(&latest);
        let dest = self.working_dir.join(&artifact_name);
        let url = join_url(&self.base_url, rel_path);

        // CLEAN_OLD
        self.clean_old_installers(&artifact_name);

        // DOWNLOAD
        self.download(DownloadTask {
            url,
            dest: dest.clone(),
            redirects_remaining: self.redirect_cap,
        })
        .await?;

        // VERIFY
        let metadata = std::fs::metadata(&dest)?;
        if metadata.len() == 0 {
            let _ = std::fs::remove_file(&dest);
            return Err(UpdateError::EmptyArtifact);
        }

        Ok(UpdateOutcome::Downloaded {
            version: latest,
            apply_hint: self.platform.apply_hint(&dest),
            artifact: dest,
        })
    }

    /// Removes stale installers from the working directory. The file may be
    /// held open by a running installer, so failures are logged and
    /// swallowed, never fatal.
    fn clean_old_installers(&self, keep: &str) {
        let entries = match std::fs::read_dir(&self.working_dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(INSTALLER_PREFIX) && name != keep {
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => info!("Removed old installer {}", name),
                    Err(e) => warn!("Could not remove old installer {}: {}", name, e),
                }
            }
        }
    }

    /// Streams the artifact to disk. Any failure deletes the partial file.
    async fn download(&self, mut task: DownloadTask) -> Result<()> {
        let result = self.download_inner(&mut task).await;
        if result.is_err() {
            let _ = std::fs::remove_file(&task.dest);
        }
        result
    }

    async fn download_inner(&self, task: &mut DownloadTask) -> Result<()> {
        let response = loop {
            debug!(
                "GET {} ({} redirects left)",
                task.url, task.redirects_remaining
            );
            let response = self
                .http
                .get(&task.url)
                .send()
                .await
                .map_err(|e| UpdateError::Request(e.to_string()))?;

            let status = response.status();
            if matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308) {
                if task.redirects_remaining == 0 {
                    return Err(UpdateError::TooManyRedirects(self.redirect_cap));
                }
                task.redirects_remaining -= 1;

                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(UpdateError::BadRedirect)?;
                task.url = resolve_location(&task.url, location)?;
                continue;
            }

            if status != reqwest::StatusCode::OK {
                return Err(UpdateError::Http(status.as_u16()));
            }
            break response;
        };

        let total = response.content_length();
        let progress = match (self.show_progress, total) {
            // The indicator is derived from bytes/content-length, so it is
            // suppressed when the server sends no length.
            (true, Some(len)) => Some(progress_bar(len)),
            _ => None,
        };

        let mut file = File::create(&task.dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let chunk = match tokio::time::timeout(self.idle_timeout, stream.next()).await {
                Ok(Some(chunk)) => chunk.map_err(|e| UpdateError::Transfer(e.to_string()))?,
                Ok(None) => break,
                Err(_) => return Err(UpdateError::Timeout(self.idle_timeout.as_secs())),
            };

            downloaded += chunk.len() as u64;
            file.write_all(&chunk).await?;

            if let Some(pb) = &progress {
                pb.set_position(downloaded);
            }
        }

        file.flush().await?;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        debug!("Downloaded {} bytes to {}", downloaded, task.dest.display());
        Ok(())
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓░"),
    );
    pb
}

/// Joins a manifest-relative artifact path onto the base URL.
fn join_url(base: &str, rel: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        rel.trim_start_matches('/')
    )
}

/// Resolves a redirect Location (absolute or relative) against the
/// current URL.
fn resolve_location(current: &str, location: &str) -> Result<String> {
    let base =
        reqwest::Url::parse(current).map_err(|e| UpdateError::InvalidUrl(e.to_string()))?;
    let url = base
        .join(location)
        .map_err(|e| UpdateError::InvalidUrl(e.to_string()))?;
    Ok(url.to_string())
}
