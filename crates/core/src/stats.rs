//! Campaign statistics computation.
//!
//! Aggregates per-recipient rows into the numbers the dashboard shows.
//! Rates are formatted server-side as two-decimal strings; the dashboard
//! renders them verbatim and the contract predates this backend.

use chrono::Duration;
use serde::Serialize;

use crate::types::Timestamp;

/// Reporting window, lower-bounded by `sent_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl Timeframe {
    /// Parse a timeframe keyword; unknown values mean all-time.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    /// The lower bound for `sent_at`, or `None` for all-time.
    pub fn cutoff(&self, now: Timestamp) -> Option<Timestamp> {
        match self {
            Self::Day => Some(now - Duration::days(1)),
            Self::Week => Some(now - Duration::weeks(1)),
            Self::Month => Some(now - Duration::days(30)),
            Self::Year => Some(now - Duration::days(365)),
            Self::All => None,
        }
    }
}

/// The send/open/click state of one recipient row.
#[derive(Debug, Clone)]
pub struct RecipientActivity {
    pub sent_at: Timestamp,
    pub opened_at: Option<Timestamp>,
    pub clicked_at: Option<Timestamp>,
}

/// Aggregate statistics for one campaign over a timeframe.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignStats {
    pub total_sent: i64,
    pub total_opened: i64,
    pub total_clicked: i64,
    /// Opens as a percentage of sends, two decimals.
    pub open_rate: String,
    /// Clicks as a percentage of opens, two decimals.
    pub click_rate: String,
    /// Mean hours between send and first open, one decimal.
    pub avg_time_to_open_hours: String,
}

impl CampaignStats {
    /// Compute stats over the given recipient rows.
    ///
    /// Empty and all-unopened sets produce `"0.00"` / `"0.0"` rather
    /// than NaN or an error.
    pub fn compute(rows: &[RecipientActivity]) -> Self {
        let total_sent = rows.len() as i64;
        let total_opened = rows.iter().filter(|r| r.opened_at.is_some()).count() as i64;
        let total_clicked = rows.iter().filter(|r| r.clicked_at.is_some()).count() as i64;

        let open_rate = percentage(total_opened, total_sent);
        let click_rate = percentage(total_clicked, total_opened);

        let open_delays: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.opened_at.map(|opened| (opened - r.sent_at).num_seconds()))
            .map(|secs| secs as f64 / 3600.0)
            .collect();

        let avg_time_to_open_hours = if open_delays.is_empty() {
            "0.0".to_string()
        } else {
            let mean = open_delays.iter().sum::<f64>() / open_delays.len() as f64;
            format!("{mean:.1}")
        };

        Self {
            total_sent,
            total_opened,
            total_clicked,
            open_rate,
            click_rate,
            avg_time_to_open_hours,
        }
    }
}

/// `part / whole * 100` as a two-decimal string, `"0.00"` when the
/// denominator is zero.
pub fn percentage(part: i64, whole: i64) -> String {
    if whole == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", part as f64 / whole as f64 * 100.0)
}
