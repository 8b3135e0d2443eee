//! Version-range matching.
//!
//! OSV ranges are sequences of events: an `introduced` event opens an
//! interval of affected versions and a `fixed` event closes it. This module
//! turns those events into intervals and decides whether a version falls
//! inside one of them.
//!
//! # Example
//!
//! ```
//! use govulndb::model::{Range, RangeEvent};
//! use govulndb::range::{affects, VersionScheme};
//!
//! let ranges = vec![Range::semver(vec![
//!     RangeEvent::introduced("0"),
//!     RangeEvent::fixed("1.2.3"),
//! ])];
//!
//! assert!(affects(&ranges, "v1.2.2", VersionScheme::Semver));
//! assert!(!affects(&ranges, "v1.2.3", VersionScheme::Semver));
//! ```

mod version;

pub use version::{parse_go_version, parse_semver, VersionScheme};

use std::cmp::Ordering;

use semver::Version;

use crate::model::{Affected, Range, RangeType};
use version::parse_bound;

/// A closed-open interval `[introduced, fixed)` of affected versions.
///
/// An empty `introduced` means the interval has no lower bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangePair {
    pub introduced: String,
    pub fixed: String,
}

impl RangePair {
    pub fn new(introduced: impl Into<String>, fixed: impl Into<String>) -> Self {
        Self {
            introduced: introduced.into(),
            fixed: fixed.into(),
        }
    }
}

/// Collects the closed intervals of every range of `affected`, in
/// declaration order.
///
/// Semver bounds are given a `v` prefix; bounds of other range types are
/// returned verbatim. An `introduced` with no later `fixed` does not produce
/// a pair.
pub fn collect_range_pairs(affected: &Affected) -> Vec<RangePair> {
    affected
        .ranges
        .iter()
        .flat_map(|range| range_intervals(range).0)
        .collect()
}

/// Walks the events of one range, returning its closed intervals and, if the
/// last `introduced` was never fixed, the lower bound of the open interval.
fn range_intervals(range: &Range) -> (Vec<RangePair>, Option<String>) {
    let mut pairs = Vec::new();
    let mut lower = String::new();
    let mut open = false;

    for event in &range.events {
        if !event.introduced.is_empty() {
            lower = normalize_lower(range.range_type, &event.introduced);
            open = true;
        }
        if !event.fixed.is_empty() {
            let fixed = normalize(range.range_type, &event.fixed);
            pairs.push(RangePair::new(std::mem::take(&mut lower), fixed));
            open = false;
        }
    }

    (pairs, open.then_some(lower))
}

fn normalize(range_type: RangeType, version: &str) -> String {
    if range_type == RangeType::Semver && !version.is_empty() && !version.starts_with('v') {
        format!("v{version}")
    } else {
        version.to_string()
    }
}

/// "0" is the OSV spelling of "the beginning of time", whatever the range type.
fn normalize_lower(range_type: RangeType, version: &str) -> String {
    if version == "0" {
        String::new()
    } else {
        normalize(range_type, version)
    }
}

/// Reports whether `version` is inside the affected ranges.
///
/// An empty `version` matches everything. Without any semver range there is
/// nothing to narrow the match, so every version is affected. A version the
/// scheme cannot parse never matches.
pub fn affects(ranges: &[Range], version: &str, scheme: VersionScheme) -> bool {
    if version.is_empty() {
        return true;
    }
    let Some(candidate) = scheme.parse_candidate(version) else {
        return false;
    };

    let mut semver_present = false;
    for range in ranges.iter().filter(|r| r.range_type == RangeType::Semver) {
        semver_present = true;
        if contains(range, &candidate) {
            return true;
        }
    }
    !semver_present
}

fn contains(range: &Range, candidate: &Version) -> bool {
    if range.events.is_empty() {
        return true;
    }
    let (pairs, open) = range_intervals(range);
    pairs
        .iter()
        .any(|pair| in_interval(candidate, &pair.introduced, &pair.fixed))
        || open.is_some_and(|lower| in_interval(candidate, &lower, ""))
}

/// Empty bounds are unbounded; bounds that do not parse exclude everything.
fn in_interval(candidate: &Version, lower: &str, upper: &str) -> bool {
    let above_lower = lower.is_empty() || parse_bound(lower).is_some_and(|l| *candidate >= l);
    let below_upper = upper.is_empty() || parse_bound(upper).is_some_and(|u| *candidate < u);
    above_lower && below_upper
}

/// Reports whether `version` is strictly before `fixed`.
///
/// Used to decide which records are worth fetching, so when the answer is
/// unknown (empty or unparseable versions) it errs towards `true`.
pub fn is_before_fix(version: &str, fixed: &str, scheme: VersionScheme) -> bool {
    if version.is_empty() || fixed.is_empty() {
        return true;
    }
    !matches!(
        scheme.compare(version, fixed),
        Some(Ordering::Equal | Ordering::Greater)
    )
}
