//! Version parsing for the two version schemes found in the database.
//!
//! Ordinary modules are versioned with semver, written with or without the
//! `v` prefix and possibly abbreviated (`v1.2`). The standard library and the
//! toolchain are versioned by Go release tags (`go1.19.3`, `go1.21rc2`); a
//! candidate version for those modules that is not a release tag never
//! compares, so it can neither match a range nor be "past the fix".

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version};

use crate::model::{GO_STD_MODULE_PATH, STDLIB_MODULE_PATH, TOOLCHAIN_MODULE_PATH};

/// How versions of a module are written and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionScheme {
    /// Semantic versions, `v1.2.3` or `1.2.3`.
    Semver,
    /// Go release tags, `go1.N[.M]` with optional `betaN`/`rcN` suffix.
    GoToolchain,
}

impl VersionScheme {
    /// Returns the scheme used by the module with the given path.
    pub fn for_module(path: &str) -> Self {
        match path {
            STDLIB_MODULE_PATH | GO_STD_MODULE_PATH | TOOLCHAIN_MODULE_PATH => {
                VersionScheme::GoToolchain
            }
            _ => VersionScheme::Semver,
        }
    }

    /// Parses a version supplied by a caller.
    pub fn parse_candidate(&self, version: &str) -> Option<Version> {
        match self {
            VersionScheme::Semver => parse_semver(version),
            VersionScheme::GoToolchain => parse_go_version(version),
        }
    }

    /// Compares a caller's version against a range bound recorded in the
    /// database. Returns `None` when either side does not parse.
    pub fn compare(&self, version: &str, bound: &str) -> Option<Ordering> {
        let version = self.parse_candidate(version)?;
        let bound = parse_bound(bound)?;
        Some(version.cmp(&bound))
    }
}

/// Parses a range bound. The database records bounds as semver without a
/// prefix (`1.19.4`), but prefixed forms are accepted too.
pub(crate) fn parse_bound(bound: &str) -> Option<Version> {
    let bound = bound.strip_prefix("go").unwrap_or(bound);
    parse_semver(bound)
}

/// Parses a possibly abbreviated semantic version, ignoring build metadata.
pub fn parse_semver(version: &str) -> Option<Version> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let split = version.find(['-', '+']).unwrap_or(version.len());
    let (core, rest) = version.split_at(split);

    let [major, minor, patch] = parse_core(core)?;
    let mut parsed = Version::parse(&format!("{major}.{minor}.{patch}{rest}")).ok()?;
    parsed.build = BuildMetadata::EMPTY;
    Some(parsed)
}

/// Parses a Go release tag such as `go1.20`, `go1.19.3` or `go1.21rc1`.
pub fn parse_go_version(version: &str) -> Option<Version> {
    let version = version.strip_prefix("go")?;
    let split = version
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(version.len());
    let (core, suffix) = version.split_at(split);

    let [major, minor, patch] = parse_core(core)?;
    let mut parsed = Version::new(major, minor, patch);
    if !suffix.is_empty() {
        parsed.pre = go_prerelease(suffix)?;
    }
    Some(parsed)
}

/// Converts `rc1` / `beta2` into the semver prerelease `rc.1` / `beta.2`.
fn go_prerelease(suffix: &str) -> Option<Prerelease> {
    let (label, number) = ["beta", "rc"]
        .iter()
        .find_map(|label| suffix.strip_prefix(label).map(|n| (*label, n)))?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Prerelease::new(&format!("{label}.{number}")).ok()
}

/// Parses one to three dot-separated numbers, padding the missing ones.
fn parse_core(core: &str) -> Option<[u64; 3]> {
    let mut parts = [0u64; 3];
    let mut count = 0;
    for part in core.split('.') {
        if count == 3 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        parts[count] = part.parse().ok()?;
        count += 1;
    }
    Some(parts)
}
