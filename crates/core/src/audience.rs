//! Audience segmentation rules for campaign sends.
//!
//! An [`Audience`] names a slice of the active subscriber base. The SQL
//! translation lives in `palco-db`; this module owns the vocabulary and
//! the time windows.

use serde::{Deserialize, Serialize};

/// Days an open counts towards the "engaged" segment (and its absence
/// towards "inactive").
pub const ENGAGED_WINDOW_DAYS: i64 = 30;

/// Days since signup for the "new" segment.
pub const NEW_WINDOW_DAYS: i64 = 7;

/// A named slice of the active subscriber base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Active subscribers with at least one open in the last 30 days.
    Engaged,
    /// Active subscribers with no open in the last 30 days.
    Inactive,
    /// Active subscribers created within the last 7 days.
    New,
    /// All active subscribers.
    #[default]
    All,
}

impl Audience {
    /// Parse an audience name from a request payload.
    ///
    /// Unrecognised values fall back to [`Audience::All`]; the dashboard
    /// has always treated a missing or unknown audience as "everyone"
    /// rather than rejecting the send.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "engaged" => Self::Engaged,
            "inactive" => Self::Inactive,
            "new" => Self::New,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engaged => "engaged",
            Self::Inactive => "inactive",
            Self::New => "new",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_audiences() {
        assert_eq!(Audience::parse("engaged"), Audience::Engaged);
        assert_eq!(Audience::parse("inactive"), Audience::Inactive);
        assert_eq!(Audience::parse("new"), Audience::New);
        assert_eq!(Audience::parse("all"), Audience::All);
    }

    #[test]
    fn parse_is_case_and_whitespace_insensitive() {
        assert_eq!(Audience::parse("  Engaged "), Audience::Engaged);
        assert_eq!(Audience::parse("NEW"), Audience::New);
    }

    #[test]
    fn unknown_values_fall_back_to_all() {
        assert_eq!(Audience::parse("vip"), Audience::All);
        assert_eq!(Audience::parse(""), Audience::All);
    }

    #[test]
    fn round_trips_through_as_str() {
        for audience in [
            Audience::Engaged,
            Audience::Inactive,
            Audience::New,
            Audience::All,
        ] {
            assert_eq!(Audience::parse(audience.as_str()), audience);
        }
    }
}
