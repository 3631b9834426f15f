//! Impact (severity) vocabulary for accessibility issues
//!
//! Ordered `critical > serious > moderate > minor`. Tags outside the known
//! vocabulary are kept verbatim as [`Impact::Other`] and rank below `minor`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Severity of a single accessibility violation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
    /// Unrecognized tag reported by the audit tool
    Other(String),
}

impl Impact {
    /// Severity used when the audit tool omits an impact tag
    pub const FALLBACK: Impact = Impact::Moderate;

    /// Parse an impact tag (case-insensitive for the known vocabulary)
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "critical" => Impact::Critical,
            "serious" => Impact::Serious,
            "moderate" => Impact::Moderate,
            "minor" => Impact::Minor,
            _ => Impact::Other(tag.to_string()),
        }
    }

    /// Canonical tag as persisted in `accessibility_issues.impact`
    pub fn as_str(&self) -> &str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
            Impact::Other(tag) => tag,
        }
    }

    /// Numeric severity, higher is more severe
    pub fn rank(&self) -> u8 {
        match self {
            Impact::Critical => 4,
            Impact::Serious => 3,
            Impact::Moderate => 2,
            Impact::Minor => 1,
            Impact::Other(_) => 0,
        }
    }

    /// Display label with the first letter capitalized ("Critical", "Serious", ...)
    pub fn label(&self) -> String {
        let tag = self.as_str();
        let mut chars = tag.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Default for Impact {
    fn default() -> Self {
        Impact::FALLBACK
    }
}

impl From<String> for Impact {
    fn from(tag: String) -> Self {
        Impact::from_tag(&tag)
    }
}

impl From<Impact> for String {
    fn from(impact: Impact) -> Self {
        impact.as_str().to_string()
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for Impact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by severity; unknown tags compare by their text among themselves
impl Ord for Impact {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.as_str().cmp(other.as_str()))
    }
}

/// SQL expression ranking the `impact` column the same way as [`Impact::rank`]
pub const IMPACT_RANK_SQL: &str = "CASE lower(impact) \
     WHEN 'critical' THEN 4 \
     WHEN 'serious' THEN 3 \
     WHEN 'moderate' THEN 2 \
     WHEN 'minor' THEN 1 \
     ELSE 0 END";
