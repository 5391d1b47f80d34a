use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vetting committee record, one per event, owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Committee {
    pub id: i64,
    pub event_id: i64,
    /// Raw status string; see `vetting::status::normalize`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::lenient_timestamp")]
    pub approved_at: Option<DateTime<Utc>>,
}

/// Body of `POST /events/{id}/vetting/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRequest {
    pub event_id: i64,
    pub submitted_by: &'static str,
}

impl SubmissionRequest {
    pub fn from_committee(event_id: i64) -> Self {
        Self { event_id, submitted_by: "vetting_committee" }
    }
}

/// Body of `POST /events/{id}/vetting/approve`. Both fields are omitted when
/// the approver did not customise the notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApprovalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_body: Option<String>,
}

impl ApprovalRequest {
    pub fn with_template(subject: &str, body: &str) -> Self {
        let keep = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
        Self { email_subject: keep(subject), email_body: keep(body) }
    }

    pub fn is_empty(&self) -> bool {
        self.email_subject.is_none() && self.email_body.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApprovalReceipt {
    #[serde(default)]
    pub participants_notified: u32,
}
