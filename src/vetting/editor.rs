//! Per-row status, role and comment editing.
//!
//! Nothing is patched locally before the backend confirms a change. After a
//! confirmed change the row is patched and the whole list is re-read; a failed
//! re-read keeps the confirmed patch.

use crate::api::{ApiError, VettingApi};
use crate::models::participant::{reason_options_for, DEFAULT_ROLE};
use crate::models::{Participant, ParticipantRole, ParticipantStatus, StatusUpdate};

use super::feedback::Feedback;
use super::permission::VettingMode;

pub const LOCKED_MESSAGE: &str = "Cannot edit participants during this vetting phase";
pub const MAX_COMMENT_LEN: usize = 500;

/// Cached participant rows for one event, as last read from the backend.
#[derive(Debug, Clone, Default)]
pub struct ParticipantList {
    event_id: i64,
    status_filter: Option<String>,
    include_facilitators: bool,
    rows: Vec<Participant>,
}

impl ParticipantList {
    /// Facilitators are managed elsewhere and left out unless asked for.
    pub fn new(event_id: i64, status_filter: Option<String>) -> Self {
        Self {
            event_id,
            status_filter: status_filter.filter(|f| !f.is_empty() && f != "all"),
            include_facilitators: false,
            rows: Vec::new(),
        }
    }

    pub fn including_facilitators(mut self) -> Self {
        self.include_facilitators = true;
        self
    }

    pub async fn load<A: VettingApi>(
        api: &A,
        event_id: i64,
        status_filter: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut list = Self::new(event_id, status_filter);
        list.refetch(api).await?;
        Ok(list)
    }

    /// Replace the cache with the backend's current rows.
    pub async fn refetch<A: VettingApi>(&mut self, api: &A) -> Result<(), ApiError> {
        let rows = api
            .fetch_participants(self.event_id, self.status_filter.as_deref())
            .await?;
        self.rows = if self.include_facilitators {
            rows
        } else {
            rows.into_iter().filter(|p| !p.is_facilitator()).collect()
        };
        Ok(())
    }

    /// Refetch after a confirmed mutation; failures are logged, not surfaced.
    pub(crate) async fn refresh_after_mutation<A: VettingApi>(&mut self, api: &A) {
        if let Err(e) = self.refetch(api).await {
            log::warn!("Participant list refetch failed for event {}: {e}", self.event_id);
        }
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn status_filter(&self) -> Option<&str> {
        self.status_filter.as_deref()
    }

    pub fn rows(&self) -> &[Participant] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, participant_id: i64) -> Option<&Participant> {
        self.rows.iter().find(|p| p.id == participant_id)
    }

    /// Rows still waiting for a vetting decision.
    pub fn registered_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|p| p.has_status(ParticipantStatus::Registered))
            .count()
    }

    fn patch(&mut self, participant_id: i64, apply: impl FnOnce(&mut Participant)) {
        if let Some(row) = self.rows.iter_mut().find(|p| p.id == participant_id) {
            apply(row);
        }
    }
}

/// How the status cell of a row is shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusControl {
    Select { current: String },
    Badge { current: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleControl {
    Select { current: String, disabled: bool },
    Badge { current: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentControl {
    /// Declined/canceled rows: the comment is a reason code from a fixed list.
    ReasonSelect { options: &'static [&'static str], selected: Option<String> },
    FreeText { value: String },
    ReadOnly { value: Option<String> },
}

pub fn status_control(mode: &VettingMode, participant: &Participant) -> StatusControl {
    let current = participant.status.clone();
    if mode.can_edit() {
        StatusControl::Select { current }
    } else {
        StatusControl::Badge { current }
    }
}

/// Role changes stay possible for editors until the event is over.
pub fn role_control(mode: &VettingMode, participant: &Participant, event_ended: bool) -> RoleControl {
    let current = participant.effective_role().to_string();
    if mode.can_edit() {
        RoleControl::Select { current, disabled: event_ended }
    } else {
        RoleControl::Badge { current }
    }
}

pub fn comment_control(mode: &VettingMode, participant: &Participant) -> CommentControl {
    let stored = participant.comment().map(String::from);
    if !mode.can_edit_as_vetter() {
        return CommentControl::ReadOnly { value: stored };
    }
    match reason_options_for(&participant.status) {
        Some(options) => CommentControl::ReasonSelect { options, selected: stored },
        None => CommentControl::FreeText { value: stored.unwrap_or_default() },
    }
}

/// Issues single-row mutations on behalf of the caller described by `mode`.
pub struct ParticipantEditor<'a, A> {
    api: &'a A,
    event_id: i64,
    mode: &'a VettingMode,
}

impl<'a, A: VettingApi> ParticipantEditor<'a, A> {
    pub fn new(api: &'a A, event_id: i64, mode: &'a VettingMode) -> Self {
        Self { api, event_id, mode }
    }

    /// Build the request body for a status change by this caller.
    pub(crate) fn status_update(&self, status: ParticipantStatus, comments: Option<&str>) -> StatusUpdate {
        StatusUpdate::new(status.as_str())
            .with_comments(comments)
            .suppressing_email(self.mode.suppress_email_flag())
    }

    pub async fn change_status(
        &self,
        list: &mut ParticipantList,
        participant_id: i64,
        status: ParticipantStatus,
        comments: Option<&str>,
    ) -> Feedback {
        if !self.mode.can_edit() {
            log::debug!("Status change for participant {participant_id} blocked by vetting phase");
            return Feedback::error(LOCKED_MESSAGE);
        }

        let update = self.status_update(status, comments);
        match self.api.update_participant_status(participant_id, &update).await {
            Ok(()) => {
                log::info!(
                    "Participant {participant_id} of event {} set to {status}",
                    self.event_id
                );
                let sent_comment = update.comments.clone();
                list.patch(participant_id, |row| {
                    row.status = status.as_str().to_string();
                    if sent_comment.is_some() {
                        row.vetting_comments = sent_comment;
                    }
                });
                list.refresh_after_mutation(self.api).await;
                Feedback::success(format!(
                    "Participant status updated to {status}.{}",
                    self.email_note(status)
                ))
            }
            Err(e) => {
                log::warn!("Status update for participant {participant_id} failed: {e}");
                Feedback::error(format!(
                    "Failed to update participant status: {}",
                    e.user_message("Failed to update status")
                ))
            }
        }
    }

    fn email_note(&self, status: ParticipantStatus) -> &'static str {
        if self.mode.suppress_emails() {
            " (No email sent - awaiting vetting approval)"
        } else if status == ParticipantStatus::Selected {
            " Invitation email sent."
        } else {
            ""
        }
    }

    pub async fn change_role(
        &self,
        list: &mut ParticipantList,
        participant_id: i64,
        role: ParticipantRole,
    ) -> Feedback {
        if !self.mode.can_edit() {
            log::debug!("Role change for participant {participant_id} blocked by vetting phase");
            return Feedback::error(LOCKED_MESSAGE);
        }

        match self
            .api
            .update_participant_role(self.event_id, participant_id, role.as_str())
            .await
        {
            Ok(()) => {
                log::info!("Participant {participant_id} of event {} now {role}", self.event_id);
                list.patch(participant_id, |row| {
                    row.participant_role = Some(role.as_str().to_string());
                });
                list.refresh_after_mutation(self.api).await;
                Feedback::success(format!(
                    "Participant role updated to {role}. Accommodation will be reallocated automatically."
                ))
            }
            Err(e) => {
                log::warn!("Role update for participant {participant_id} failed: {e}");
                Feedback::error("Failed to update participant role.")
            }
        }
    }

    /// Persist a vetting comment through the status endpoint, keeping the
    /// participant's current status. Returns `None` when there is nothing to
    /// save (blank, or unchanged from the stored comment).
    pub async fn save_comment(
        &self,
        list: &mut ParticipantList,
        participant_id: i64,
        comment: &str,
    ) -> Option<Feedback> {
        let comment = comment.trim();
        if comment.is_empty() {
            return None;
        }
        if !self.mode.can_edit_as_vetter() {
            return Some(Feedback::error(LOCKED_MESSAGE));
        }
        let Some(participant) = list.get(participant_id) else {
            return Some(Feedback::error("Participant not found."));
        };
        if participant.comment() == Some(comment) {
            return None;
        }
        if let Some(options) = reason_options_for(&participant.status) {
            if !options.contains(&comment) {
                return Some(Feedback::error("Please select one of the listed reasons."));
            }
        } else if comment.chars().count() > MAX_COMMENT_LEN {
            return Some(Feedback::error(format!(
                "Comments are limited to {MAX_COMMENT_LEN} characters."
            )));
        }

        let update = StatusUpdate::new(participant.status.clone())
            .with_comments(Some(comment))
            .suppressing_email(Some(true));
        match self.api.update_participant_status(participant_id, &update).await {
            Ok(()) => {
                log::info!("Vetting comment saved for participant {participant_id}");
                let saved = comment.to_string();
                list.patch(participant_id, |row| row.vetting_comments = Some(saved));
                list.refresh_after_mutation(self.api).await;
                Some(Feedback::success("Comment saved successfully."))
            }
            Err(e) => {
                log::warn!("Saving comment for participant {participant_id} failed: {e}");
                Some(Feedback::error("Failed to save comment."))
            }
        }
    }
}

/// Role shown for a row whose backend role is not one of the editable ones.
pub fn display_role(participant: &Participant) -> String {
    let role = participant.effective_role();
    role.parse::<ParticipantRole>()
        .map(|r| r.label().to_string())
        .unwrap_or_else(|_| if role.is_empty() { DEFAULT_ROLE.to_string() } else { role.to_uppercase() })
}
