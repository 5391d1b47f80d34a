use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::parse_date_prefix;

/// The subset of an event the vetting screens need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub vetting_start_date: Option<String>,
    #[serde(default)]
    pub vetting_end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Event {
    pub fn start(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(parse_date_prefix)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end_date.as_deref().and_then(parse_date_prefix)
    }

    /// An event has ended once `today` is past its end date. Without a usable
    /// end date the event is treated as still running.
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end().is_some_and(|end| today > end)
    }

    /// Whether `today` lies inside the vetting window, when one is set.
    pub fn in_vetting_window(&self, today: NaiveDate) -> bool {
        let start = self.vetting_start_date.as_deref().and_then(parse_date_prefix);
        let end = self.vetting_end_date.as_deref().and_then(parse_date_prefix);
        match (start, end) {
            (Some(start), Some(end)) => start <= today && today <= end,
            _ => false,
        }
    }

    /// Human date range used for `{{EVENT_DATE_RANGE}}`, e.g. `10 Mar 2025 - 14 Mar 2025`.
    pub fn date_range(&self) -> String {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) if start == end => start.format("%-d %b %Y").to_string(),
            (Some(start), Some(end)) => format!(
                "{} - {}",
                start.format("%-d %b %Y"),
                end.format("%-d %b %Y")
            ),
            (Some(start), None) => start.format("%-d %b %Y").to_string(),
            _ => String::new(),
        }
    }
}
