//! The committee workflow state machine.
//!
//! ```text
//! open --submit--> pending_approval --approve--> approved
//!  ^                 |        ^                     |
//!  +--cancel submit--+        +---cancel approval---+
//! ```
//!
//! Each transition is one backend call. Guards are checked before any call is
//! made, and the local status only moves after the backend confirms.

use chrono::NaiveDate;

use crate::api::{ApiError, VettingApi};
use crate::models::ApprovalRequest;

use super::feedback::Feedback;
use super::permission::{Actor, RoleFlags, VettingMode};
use super::status::{normalize, CommitteeStatus, WorkflowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Submit,
    CancelSubmission,
    Approve,
    CancelApproval,
}

impl Transition {
    pub const ALL: [Transition; 4] = [
        Transition::Submit,
        Transition::CancelSubmission,
        Transition::Approve,
        Transition::CancelApproval,
    ];

    pub fn from_state(self) -> WorkflowState {
        match self {
            Transition::Submit => WorkflowState::Open,
            Transition::CancelSubmission | Transition::Approve => WorkflowState::PendingApproval,
            Transition::CancelApproval => WorkflowState::Approved,
        }
    }

    pub fn to_state(self) -> WorkflowState {
        match self {
            Transition::Submit | Transition::CancelApproval => WorkflowState::PendingApproval,
            Transition::CancelSubmission => WorkflowState::Open,
            Transition::Approve => WorkflowState::Approved,
        }
    }

    fn actor(self) -> Actor {
        match self {
            Transition::Submit | Transition::CancelSubmission => Actor::Committee,
            Transition::Approve | Transition::CancelApproval => Actor::Approver,
        }
    }

    /// Whether `mode` may fire this transition right now.
    pub fn permitted(self, mode: &VettingMode, event_ended: bool) -> bool {
        let actor_ok = match self.actor() {
            Actor::Committee => mode.is_committee(),
            Actor::Approver => mode.is_approver(),
            Actor::Neither => false,
        };
        actor_ok
            && mode.submission_status().is(self.from_state())
            && !(self == Transition::CancelApproval && event_ended)
    }

    pub fn label(self) -> &'static str {
        match self {
            Transition::Submit => "Submit for Approval",
            Transition::CancelSubmission => "Cancel Submission",
            Transition::Approve => "Approve Vetting",
            Transition::CancelApproval => "Cancel Approval",
        }
    }

    /// URL path segment of the form action driving this transition.
    pub fn action(self) -> &'static str {
        match self {
            Transition::Submit => "submit",
            Transition::CancelSubmission => "cancel-submission",
            Transition::Approve => "approve",
            Transition::CancelApproval => "cancel-approval",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Transition::Submit => "Failed to submit vetting. Please try again.",
            Transition::CancelSubmission => "Failed to cancel submission.",
            Transition::Approve => "Failed to approve vetting. Please try again.",
            Transition::CancelApproval => "Failed to cancel approval.",
        }
    }
}

pub struct VettingController<'a, A> {
    api: &'a A,
    event_id: i64,
    mode: VettingMode,
    committee_id: Option<i64>,
    event_ended: bool,
}

impl<'a, A: VettingApi> VettingController<'a, A> {
    pub fn new(api: &'a A, event_id: i64, mode: VettingMode) -> Self {
        Self { api, event_id, mode, committee_id: None, event_ended: false }
    }

    /// Read the committee and event from the backend. A missing committee
    /// leaves the empty status, which grants nothing.
    pub async fn load(
        api: &'a A,
        event_id: i64,
        flags: RoleFlags,
        fallback_can_edit: bool,
        today: NaiveDate,
    ) -> Result<Self, ApiError> {
        let mut controller = Self::new(
            api,
            event_id,
            VettingMode::new(flags, CommitteeStatus::default(), fallback_can_edit),
        );
        controller.refresh_status().await?;
        let event = api.fetch_event(event_id).await?;
        controller.event_ended = event.has_ended(today);
        Ok(controller)
    }

    pub fn with_committee_id(mut self, committee_id: i64) -> Self {
        self.committee_id = Some(committee_id);
        self
    }

    pub fn with_event_ended(mut self, ended: bool) -> Self {
        self.event_ended = ended;
        self
    }

    /// Adopt the backend's current committee status.
    pub async fn refresh_status(&mut self) -> Result<(), ApiError> {
        match self.api.fetch_committee(self.event_id).await {
            Ok(committee) => {
                self.committee_id = Some(committee.id);
                self.mode.set_submission_status(normalize(committee.status.as_deref()));
                Ok(())
            }
            Err(ApiError::Status { status: 404, .. }) => {
                log::debug!("No vetting committee for event {}", self.event_id);
                self.mode.set_submission_status(CommitteeStatus::default());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn mode(&self) -> &VettingMode {
        &self.mode
    }

    pub fn into_mode(self) -> VettingMode {
        self.mode
    }

    pub fn status(&self) -> &CommitteeStatus {
        self.mode.submission_status()
    }

    pub fn committee_id(&self) -> Option<i64> {
        self.committee_id
    }

    pub fn event_ended(&self) -> bool {
        self.event_ended
    }

    pub fn available_transitions(&self) -> Vec<Transition> {
        Transition::ALL
            .into_iter()
            .filter(|t| t.permitted(&self.mode, self.event_ended))
            .collect()
    }

    /// Fire a transition by value; approval carries no custom email.
    pub async fn run(&mut self, transition: Transition) -> Feedback {
        match transition {
            Transition::Submit => self.submit_for_approval().await,
            Transition::CancelSubmission => self.cancel_submission().await,
            Transition::Approve => self.approve(&ApprovalRequest::default()).await,
            Transition::CancelApproval => self.cancel_approval().await,
        }
    }

    fn guard(&self, transition: Transition) -> Option<Feedback> {
        if transition.permitted(&self.mode, self.event_ended) {
            return None;
        }
        log::debug!(
            "{transition:?} refused for event {} in status '{}'",
            self.event_id,
            self.status()
        );
        Some(Feedback::error(format!(
            "{} is not available while vetting is {}.",
            transition.label(),
            self.status().label()
        )))
    }

    fn confirm(&mut self, transition: Transition) {
        log::info!("Vetting for event {} moved to {}", self.event_id, transition.to_state());
        self.mode.set_submission_status(transition.to_state().into());
    }

    fn fail(&self, transition: Transition, err: &ApiError) -> Feedback {
        log::warn!("{transition:?} failed for event {}: {err}", self.event_id);
        Feedback::error(err.user_message(transition.failure_message()))
    }

    pub async fn submit_for_approval(&mut self) -> Feedback {
        let t = Transition::Submit;
        if let Some(refused) = self.guard(t) {
            return refused;
        }
        match self.api.submit_vetting(self.event_id).await {
            Ok(()) => {
                self.confirm(t);
                Feedback::success("Vetting submitted for approval! Approver has been notified.")
            }
            Err(e) => self.fail(t, &e),
        }
    }

    /// Needs the committee id; it is looked up first when not yet known.
    pub async fn cancel_submission(&mut self) -> Feedback {
        let t = Transition::CancelSubmission;
        if let Some(refused) = self.guard(t) {
            return refused;
        }
        let committee_id = match self.committee_id {
            Some(id) => id,
            None => match self.api.fetch_committee(self.event_id).await {
                Ok(committee) => {
                    self.committee_id = Some(committee.id);
                    committee.id
                }
                Err(e) => return self.fail(t, &e),
            },
        };
        match self.api.cancel_submission(committee_id).await {
            Ok(()) => {
                self.confirm(t);
                Feedback::success("Submission cancelled. You can now edit participants again.")
            }
            Err(e) => self.fail(t, &e),
        }
    }

    pub async fn approve(&mut self, request: &ApprovalRequest) -> Feedback {
        let t = Transition::Approve;
        if let Some(refused) = self.guard(t) {
            return refused;
        }
        match self.api.approve_vetting(self.event_id, request).await {
            Ok(receipt) => {
                self.confirm(t);
                Feedback::success(format!(
                    "Vetting approved! Notification emails sent to {} participants.",
                    receipt.participants_notified
                ))
            }
            Err(e) => self.fail(t, &e),
        }
    }

    pub async fn cancel_approval(&mut self) -> Feedback {
        let t = Transition::CancelApproval;
        if let Some(refused) = self.guard(t) {
            return refused;
        }
        match self.api.cancel_approval(self.event_id).await {
            Ok(()) => {
                self.confirm(t);
                Feedback::success("Vetting approval cancelled. You can now approve again.")
            }
            Err(e) => self.fail(t, &e),
        }
    }
}
