//! Publish state of a record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Publish state of a record.
///
/// State transitions:
/// - Pending -> Published (generation and file write both succeeded)
///
/// There is no way back: a published record is never regenerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishStatus {
    /// Waiting for an article. Also the reading of an absent or empty status.
    #[default]
    Pending,

    /// Article written.
    Published,
}

impl PublishStatus {
    /// Interpret a raw status cell from the store.
    ///
    /// Only `Published` (case-insensitive, surrounding whitespace ignored) counts
    /// as published; anything else leaves the record eligible.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("published") => PublishStatus::Published,
            _ => PublishStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PublishStatus::Pending => "Pending",
            PublishStatus::Published => "Published",
        }
    }

    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, PublishStatus::Published)
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How untouched records write their status cell back to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFill {
    /// Write back exactly what was read (an absent status stays empty).
    #[default]
    Preserve,

    /// Always write `Pending` or `Published`.
    Explicit,
}
