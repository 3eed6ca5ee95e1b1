//! Version string normalization and comparison.

/// Strips an optional leading `v` (and surrounding whitespace).
pub fn normalize(version: &str) -> &str {
    let version = version.trim();
    version.strip_prefix('v').unwrap_or(version)
}

/// True when both strings name the same release. Proper semver strings
/// compare structurally; anything else falls back to string equality.
pub fn same_version(current: &str, latest: &str) -> bool {
    let current = normalize(current);
    let latest = normalize(latest);

    match (
        semver::Version::parse(current),
        semver::Version::parse(latest),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => current == latest,
    }
}
