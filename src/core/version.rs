//! Version ordering for upgrade listeners
//!
//! Versions are compared as semver. Releases tagged `1.0.0-beta.1` sort
//! before `1.0.0-rc.1`; an empty or unparseable version sorts below every
//! real one, and two empty versions are equal.

use semver::Version;
use std::cmp::Ordering;

/// Parse leniently: `v2.1`, `2.1` and `2.1.0` are the same version
pub fn parse(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches(['v', 'V']);
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    // Pad missing minor / patch components before the pre-release part
    let (core, rest) = match trimmed.find(['-', '+']) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    let parts = core.split('.').count();
    if parts >= 3 {
        return None;
    }
    let padded = format!("{}{}{}", core, ".0".repeat(3 - parts), rest);
    Version::parse(&padded).ok()
}

/// Compare two version strings, empty / invalid lowest
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// True when a listener pinned at `version` already ran for an install at `old`
pub fn is_listener_fired(version: &str, old: &str) -> bool {
    compare(version, old) != Ordering::Greater
}
