use std::fmt;

use serde::{Deserialize, Serialize};

/// The committee workflow states. Forward order is
/// `Open -> PendingApproval -> Approved`; the only backward moves are the two
/// cancellations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Open,
    PendingApproval,
    Approved,
}

impl WorkflowState {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Open => "open",
            WorkflowState::PendingApproval => "pending_approval",
            WorkflowState::Approved => "approved",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkflowState::Open => "Open",
            WorkflowState::PendingApproval => "Pending Approval",
            WorkflowState::Approved => "Approved",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized committee status: one of the workflow states, or any other
/// string passed through untouched. Unrecognized values never grant editing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommitteeStatus {
    Known(WorkflowState),
    Other(String),
}

impl CommitteeStatus {
    pub fn state(&self) -> Option<WorkflowState> {
        match self {
            CommitteeStatus::Known(state) => Some(*state),
            CommitteeStatus::Other(_) => None,
        }
    }

    pub fn is(&self, state: WorkflowState) -> bool {
        self.state() == Some(state)
    }

    pub fn as_str(&self) -> &str {
        match self {
            CommitteeStatus::Known(state) => state.as_str(),
            CommitteeStatus::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CommitteeStatus::Known(state) => state.label(),
            CommitteeStatus::Other(raw) if raw.is_empty() => "Unknown",
            CommitteeStatus::Other(raw) => raw,
        }
    }
}

impl Default for CommitteeStatus {
    fn default() -> Self {
        CommitteeStatus::Other(String::new())
    }
}

impl From<WorkflowState> for CommitteeStatus {
    fn from(state: WorkflowState) -> Self {
        CommitteeStatus::Known(state)
    }
}

impl fmt::Display for CommitteeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw server status onto a workflow token. `pending` is an older
/// spelling of `pending_approval`; a missing status becomes the empty token.
pub fn normalize(raw: Option<&str>) -> CommitteeStatus {
    match raw.unwrap_or("") {
        "open" => WorkflowState::Open.into(),
        "pending_approval" | "pending" => WorkflowState::PendingApproval.into(),
        "approved" => WorkflowState::Approved.into(),
        other => CommitteeStatus::Other(other.to_string()),
    }
}
