use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role assumed when the backend sends neither `participant_role` nor `role`.
pub const DEFAULT_ROLE: &str = "visitor";

/// A registration row as returned by the backend.
///
/// `status` stays a plain string: the backend owns the vocabulary and may send
/// values this client does not know. Fields not modelled here are kept in
/// `extra` so nothing is lost when a row is re-serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vetting_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Participant {
    /// `participant_role` wins over the legacy `role` field.
    pub fn effective_role(&self) -> &str {
        self.participant_role
            .as_deref()
            .filter(|r| !r.is_empty())
            .or(self.role.as_deref().filter(|r| !r.is_empty()))
            .unwrap_or(DEFAULT_ROLE)
    }

    pub fn is_facilitator(&self) -> bool {
        self.effective_role().eq_ignore_ascii_case(ParticipantRole::Facilitator.as_str())
    }

    pub fn has_status(&self, status: ParticipantStatus) -> bool {
        self.status == status.as_str()
    }

    /// Stored comment, `None` when absent or blank.
    pub fn comment(&self) -> Option<&str> {
        self.vetting_comments.as_deref().filter(|c| !c.trim().is_empty())
    }

    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Participant statuses a vetting actor may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Registered,
    Selected,
    NotSelected,
    Waiting,
    Canceled,
    Declined,
    Attended,
    Confirmed,
}

impl ParticipantStatus {
    pub const ALL: [ParticipantStatus; 8] = [
        ParticipantStatus::Registered,
        ParticipantStatus::Selected,
        ParticipantStatus::NotSelected,
        ParticipantStatus::Waiting,
        ParticipantStatus::Canceled,
        ParticipantStatus::Declined,
        ParticipantStatus::Attended,
        ParticipantStatus::Confirmed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantStatus::Registered => "registered",
            ParticipantStatus::Selected => "selected",
            ParticipantStatus::NotSelected => "not_selected",
            ParticipantStatus::Waiting => "waiting",
            ParticipantStatus::Canceled => "canceled",
            ParticipantStatus::Declined => "declined",
            ParticipantStatus::Attended => "attended",
            ParticipantStatus::Confirmed => "confirmed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParticipantStatus::Registered => "Registered",
            ParticipantStatus::Selected => "Selected",
            ParticipantStatus::NotSelected => "Not Selected",
            ParticipantStatus::Waiting => "Waiting",
            ParticipantStatus::Canceled => "Canceled",
            ParticipantStatus::Declined => "Declined",
            ParticipantStatus::Attended => "Attended",
            ParticipantStatus::Confirmed => "Confirmed",
        }
    }

    /// Fixed reason strings a comment must be chosen from, for the statuses
    /// that require a reason code.
    pub fn reason_options(self) -> Option<&'static [&'static str]> {
        match self {
            ParticipantStatus::Declined => Some(&DECLINED_REASONS),
            ParticipantStatus::Canceled => Some(&CANCELED_REASONS),
            _ => None,
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParticipantStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown participant status '{s}'"))
    }
}

pub const DECLINED_REASONS: [&str; 2] = [
    "Declined - Operational / Work Reasons",
    "Declined - Personal Reasons",
];

pub const CANCELED_REASONS: [&str; 7] = [
    "Cancelled - Operational Reasons",
    "Cancelled - Personal Reasons",
    "Cancelled - Prioritising Other Training",
    "Cancelled - Visa Rejected",
    "Cancelled - Visa Appointment Not Available",
    "Cancelled - Visa Issuing Took Too Long",
    "Cancelled - Visa Process Unfeasible",
];

/// Reason list for a raw status string; `None` means free text is allowed.
pub fn reason_options_for(status: &str) -> Option<&'static [&'static str]> {
    status.parse::<ParticipantStatus>().ok().and_then(ParticipantStatus::reason_options)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Visitor,
    Facilitator,
    Organizer,
}

impl ParticipantRole {
    pub const ALL: [ParticipantRole; 3] = [
        ParticipantRole::Visitor,
        ParticipantRole::Facilitator,
        ParticipantRole::Organizer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantRole::Visitor => "visitor",
            ParticipantRole::Facilitator => "facilitator",
            ParticipantRole::Organizer => "organizer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParticipantRole::Visitor => "Visitor",
            ParticipantRole::Facilitator => "Facilitator",
            ParticipantRole::Organizer => "Organizer",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParticipantRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown participant role '{s}'"))
    }
}

/// Body of `PUT /event-registration/participant/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_email: Option<bool>,
}

impl StatusUpdate {
    pub fn new(status: impl Into<String>) -> Self {
        Self { status: status.into(), comments: None, suppress_email: None }
    }

    /// Attach a comment; blank comments are dropped, others trimmed.
    pub fn with_comments(mut self, comments: Option<&str>) -> Self {
        self.comments = comments
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        self
    }

    pub fn suppressing_email(mut self, suppress: Option<bool>) -> Self {
        self.suppress_email = suppress;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleUpdate {
    pub role: String,
}
