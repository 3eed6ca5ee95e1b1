//! Shine Update - self-update client for the Shine runner.
//!
//! Fetches the release manifest, resolves the platform artifact, and
//! streams it to disk with an explicit redirect budget and an inactivity
//! timeout. The client never installs anything itself.

mod client;
mod error;
mod manifest;
mod platform;
mod version;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_IDLE_TIMEOUT, DEFAULT_REDIRECT_CAP, UpdateClient, UpdateOutcome,
};
pub use error::{Result, UpdateError};
pub use manifest::UpdateManifest;
pub use platform::{INSTALLER_PREFIX, Platform};
pub use version::{normalize, same_version};
