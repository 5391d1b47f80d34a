use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a feedback message stays on screen.
pub const AUTO_DISMISS_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Success,
    Warning,
    Error,
}

impl FeedbackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackKind::Success => "success",
            FeedbackKind::Warning => "warning",
            FeedbackKind::Error => "error",
        }
    }
}

/// A transient, dismissible message produced by every workflow action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), raised_at: Utc::now() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Error, message)
    }

    pub fn is_success(&self) -> bool {
        self.kind == FeedbackKind::Success
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.raised_at + Duration::seconds(AUTO_DISMISS_SECS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Remaining display time in milliseconds, for the page's dismiss timer.
    pub fn dismiss_after_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at() - now).num_milliseconds().max(0)
    }
}
