pub mod committee;
pub mod email_template;
pub mod event;
pub mod participant;
pub mod user;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub use committee::{ApprovalReceipt, ApprovalRequest, Committee, SubmissionRequest};
pub use email_template::{EmailTemplate, PlaceholderValues};
pub use event::Event;
pub use participant::{Participant, ParticipantRole, ParticipantStatus, RoleUpdate, StatusUpdate};
pub use user::CurrentUser;

/// Parse the leading `YYYY-MM-DD` of a date or datetime string.
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Accept RFC 3339 timestamps as well as the naive ISO timestamps the backend
/// emits for some columns (read as UTC). Anything unparseable becomes `None`.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}
