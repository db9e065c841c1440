//! Semantic version values used as migration identifiers
//!
//! A migration is identified by a four-part version: `major.minor.patch`
//! plus an optional prerelease tag that encodes the migration step
//! (e.g. `"1.0.0-2"` is step 2 of version 1.0.0). Ordering follows the
//! numeric fields first and then the prerelease rule described on
//! [`SemanticVersion::compare_prerelease`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, MigrateResult};

/// Immutable four-part version value with strict parsing and total ordering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticVersion {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Option<String>,
}

impl SemanticVersion {
    /// Create a release version with no prerelease tag
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Return a copy of this version with the given prerelease tag
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        let tag = prerelease.into();
        self.prerelease = if tag.is_empty() { None } else { Some(tag) };
        self
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Prerelease tag, with the empty tag normalized to `None`
    pub fn prerelease(&self) -> Option<&str> {
        match self.prerelease.as_deref() {
            Some("") | None => None,
            Some(tag) => Some(tag),
        }
    }

    /// Parse a version string, failing with [`MigrateError::Format`] on
    /// malformed input.
    ///
    /// Everything after the first `-` is taken verbatim as the prerelease
    /// tag. The remainder is split on `.` into at most three numeric
    /// segments; missing trailing segments default to 0.
    pub fn parse(text: &str) -> MigrateResult<Self> {
        if text.is_empty() {
            return Err(MigrateError::Format(
                "version string must not be empty".to_string(),
            ));
        }

        let (numeric, prerelease) = match text.split_once('-') {
            Some((numeric, tag)) => (numeric, Some(tag)),
            None => (text, None),
        };

        if numeric.is_empty() {
            return Err(MigrateError::Format(format!(
                "'{}' is missing its numeric part",
                text
            )));
        }

        let segments: Vec<&str> = numeric.split('.').collect();
        if segments.len() > 3 {
            return Err(MigrateError::Format(format!(
                "'{}' has more than 3 numeric segments",
                text
            )));
        }

        let mut parts = [0u64; 3];
        for (i, segment) in segments.iter().enumerate() {
            parts[i] = parse_numeric_segment(segment)
                .ok_or_else(|| MigrateError::Format(format!(
                    "'{}' is not a valid numeric segment in '{}'",
                    segment, text
                )))?;
        }

        let prerelease = match prerelease {
            Some("") | None => None,
            Some(tag) => Some(tag.to_string()),
        };

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            prerelease,
        })
    }

    /// Non-throwing variant of [`SemanticVersion::parse`]
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Compare two prerelease tags.
    ///
    /// A missing tag sorts *higher* than any present tag (so `1.0.0` is a
    /// later version than `1.0.0-alpha`). Present tags are split on `.` and
    /// compared component-wise: numeric components compare numerically, a
    /// numeric component sorts below a non-numeric one, and non-numeric
    /// components compare ordinally. When all shared components are equal,
    /// the tag with more components sorts higher.
    pub fn compare_prerelease(a: Option<&str>, b: Option<&str>) -> Ordering {
        let a = a.filter(|tag| !tag.is_empty());
        let b = b.filter(|tag| !tag.is_empty());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let left: Vec<&str> = a.split('.').collect();
                let right: Vec<&str> = b.split('.').collect();
                for (l, r) in left.iter().zip(right.iter()) {
                    let ordering = compare_prerelease_component(l, r);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                left.len().cmp(&right.len())
            }
        }
    }
}

/// Parse a version segment, accepting ASCII digits only (no sign, no
/// whitespace, which the stdlib integer parser would let through).
fn parse_numeric_segment(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn is_numeric_component(component: &str) -> bool {
    !component.is_empty() && component.bytes().all(|b| b.is_ascii_digit())
}

fn compare_prerelease_component(l: &str, r: &str) -> Ordering {
    match (is_numeric_component(l), is_numeric_component(r)) {
        // Digit-string compare avoids any overflow: strip leading zeros,
        // then longer means larger, then ordinal settles equal lengths.
        (true, true) => {
            let l = l.trim_start_matches('0');
            let r = r.trim_start_matches('0');
            l.len().cmp(&r.len()).then_with(|| l.cmp(r))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => l.cmp(r),
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prerelease() {
            Some(tag) => write!(f, "{}.{}.{}-{}", self.major, self.minor, self.patch, tag),
            None => write!(f, "{}.{}.{}", self.major, self.minor, self.patch),
        }
    }
}

impl FromStr for SemanticVersion {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| Self::compare_prerelease(self.prerelease(), other.prerelease()))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> SemanticVersion {
        SemanticVersion::parse(text).unwrap()
    }

    #[test]
    fn test_parse_canonical_round_trip() {
        assert_eq!(v("10.4.382-alpha.34").to_string(), "10.4.382-alpha.34");
        assert_eq!(v("1.0.0").to_string(), "1.0.0");
    }

    #[test]
    fn test_parse_defaults_missing_segments() {
        assert_eq!(v("10").to_string(), "10.0.0");
        assert_eq!(v("10.4").to_string(), "10.4.0");
        assert_eq!(v("10.4").patch(), 0);
    }

    #[test]
    fn test_parse_rejections() {
        assert!(SemanticVersion::parse("23.4.82.0").is_err());
        assert!(SemanticVersion::parse("23k.0.0").is_err());
        assert!(SemanticVersion::parse("").is_err());
        assert!(SemanticVersion::parse("-").is_err());
        assert!(SemanticVersion::parse("-alpha").is_err());
        assert!(SemanticVersion::parse("+3.0.0").is_err());
        assert!(SemanticVersion::parse("1. 2.3").is_err());
    }

    #[test]
    fn test_try_parse() {
        assert!(SemanticVersion::try_parse("1.2.3-rc.1").is_some());
        assert!(SemanticVersion::try_parse("not a version").is_none());
    }

    #[test]
    fn test_release_sorts_above_prerelease() {
        assert!(v("1.0.0") > v("1.0.0-alpha"));
        assert!(v("1.0.0-alpha") < v("1.0.0"));
    }

    #[test]
    fn test_prerelease_component_rules() {
        use std::cmp::Ordering;
        assert_eq!(
            SemanticVersion::compare_prerelease(Some("alpha.4"), Some("alpha.4.2")),
            Ordering::Less
        );
        assert_eq!(
            SemanticVersion::compare_prerelease(Some("23"), Some("alpha23")),
            Ordering::Less
        );
        assert_eq!(
            SemanticVersion::compare_prerelease(None, None),
            Ordering::Equal
        );
        assert_eq!(
            SemanticVersion::compare_prerelease(Some(""), None),
            Ordering::Equal
        );
    }

    #[test]
    fn test_numeric_fields_dominate() {
        assert!(v("2.0.0-1") < v("10.0.0-1"));
        assert!(v("1.2.0") < v("1.10.0"));
        assert!(v("1.0.1") > v("1.0.0-99"));
    }

    #[test]
    fn test_total_order_is_exclusive_and_transitive() {
        let versions = ["1.0.0-2", "1.0.0-alpha", "1.0.0-alpha.1", "1.0.0", "1.0.1"];
        for a in &versions {
            for b in &versions {
                let (a, b) = (v(a), v(b));
                let flags = [a < b, a == b, a > b];
                assert_eq!(flags.iter().filter(|f| **f).count(), 1);
            }
        }
        // sorted input stays sorted
        let mut parsed: Vec<_> = versions.iter().map(|t| v(t)).collect();
        let expected = parsed.clone();
        parsed.sort();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_empty_prerelease_equals_none() {
        let with_empty = SemanticVersion::new(1, 0, 0).with_prerelease("");
        assert_eq!(with_empty, SemanticVersion::new(1, 0, 0));
        assert_eq!(with_empty.to_string(), "1.0.0");
    }

    #[test]
    fn test_numeric_before_non_numeric_in_prerelease() {
        assert!(v("1.0.0-11") < v("1.0.0-alpha"));
        assert!(v("1.0.0-alpha.2") < v("1.0.0-alpha.10"));
        assert!(v("1.0.0-alpha.beta") > v("1.0.0-alpha.10"));
    }
}
