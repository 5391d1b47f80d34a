//! Who may edit participant rows, derived from the caller's roles and the
//! committee status. The gate is advisory: the backend remains the authority.

use serde::{Deserialize, Serialize};

use super::status::{CommitteeStatus, WorkflowState};

pub const COMMITTEE_ROLE: &str = "vetting_committee";
pub const APPROVER_ROLE: &str = "vetting_approver";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlags {
    pub committee: bool,
    pub approver: bool,
}

impl RoleFlags {
    pub fn new(committee: bool, approver: bool) -> Self {
        Self { committee, approver }
    }

    /// Role names are matched case-insensitively (`VETTING_APPROVER` and
    /// `vetting_approver` are the same role).
    pub fn from_role_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().fold(Self::default(), |flags, name| {
            let name = name.as_ref().trim();
            Self {
                committee: flags.committee || name.eq_ignore_ascii_case(COMMITTEE_ROLE),
                approver: flags.approver || name.eq_ignore_ascii_case(APPROVER_ROLE),
            }
        })
    }

    /// Committee membership takes precedence when both flags are set.
    pub fn actor(self) -> Actor {
        if self.committee {
            Actor::Committee
        } else if self.approver {
            Actor::Approver
        } else {
            Actor::Neither
        }
    }

    pub fn is_vetting_actor(self) -> bool {
        self.committee || self.approver
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Committee,
    Approver,
    Neither,
}

/// Edit permission for the vetting actors. `None` means the caller holds
/// neither vetting role and the decision belongs to someone else.
pub fn resolve(flags: RoleFlags, status: &CommitteeStatus) -> Option<bool> {
    match flags.actor() {
        Actor::Committee => Some(status.is(WorkflowState::Open)),
        Actor::Approver => Some(status.is(WorkflowState::PendingApproval)),
        Actor::Neither => None,
    }
}

/// The caller's view of the workflow. `can_edit` is always computed from the
/// current flags and status, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VettingMode {
    flags: RoleFlags,
    submission_status: CommitteeStatus,
    fallback_can_edit: bool,
}

impl VettingMode {
    /// `fallback_can_edit` applies only to callers holding neither vetting role.
    pub fn new(flags: RoleFlags, submission_status: CommitteeStatus, fallback_can_edit: bool) -> Self {
        Self { flags, submission_status, fallback_can_edit }
    }

    pub fn flags(&self) -> RoleFlags {
        self.flags
    }

    pub fn is_committee(&self) -> bool {
        self.flags.committee
    }

    pub fn is_approver(&self) -> bool {
        self.flags.approver
    }

    pub fn submission_status(&self) -> &CommitteeStatus {
        &self.submission_status
    }

    pub fn set_submission_status(&mut self, status: CommitteeStatus) {
        self.submission_status = status;
    }

    pub fn can_edit(&self) -> bool {
        resolve(self.flags, &self.submission_status).unwrap_or(self.fallback_can_edit)
    }

    /// Editing as a committee member or approver, as opposed to the plain
    /// admin fallback. Comment controls are only interactive in this mode.
    pub fn can_edit_as_vetter(&self) -> bool {
        self.flags.is_vetting_actor() && self.can_edit()
    }

    /// Participant emails are held back until the vetting is approved.
    pub fn suppress_emails(&self) -> bool {
        self.flags.is_vetting_actor() && !self.submission_status.is(WorkflowState::Approved)
    }

    /// Value for the `suppress_email` field of a status update: only vetting
    /// actors send it; everyone else leaves the backend default.
    pub fn suppress_email_flag(&self) -> Option<bool> {
        self.flags.is_vetting_actor().then(|| self.suppress_emails())
    }
}
