use std::collections::BTreeSet;

use futures::future::join_all;

use crate::api::VettingApi;
use crate::models::{ParticipantRole, ParticipantStatus};

use super::editor::{ParticipantEditor, ParticipantList, LOCKED_MESSAGE};
use super::feedback::Feedback;
use super::permission::VettingMode;

/// Statuses offered in the bulk action bar.
pub const BULK_STATUSES: [ParticipantStatus; 6] = [
    ParticipantStatus::Selected,
    ParticipantStatus::NotSelected,
    ParticipantStatus::Waiting,
    ParticipantStatus::Canceled,
    ParticipantStatus::Declined,
    ParticipantStatus::Attended,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Status(ParticipantStatus),
    Role(ParticipantRole),
}

impl BulkAction {
    fn success_message(self, count: usize) -> String {
        match self {
            BulkAction::Status(status) => {
                format!("{count} participant(s) status updated to {status}.")
            }
            BulkAction::Role(role) => format!("{count} participant(s) role updated to {role}."),
        }
    }
}

/// Outcome of one bulk run. Which rows failed is not reported.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkReport {
    pub selected: usize,
    pub succeeded: usize,
    pub refetched: bool,
    pub feedback: Feedback,
}

pub struct BulkApplier<'a, A> {
    api: &'a A,
    event_id: i64,
    mode: &'a VettingMode,
}

impl<'a, A: VettingApi> BulkApplier<'a, A> {
    pub fn new(api: &'a A, event_id: i64, mode: &'a VettingMode) -> Self {
        Self { api, event_id, mode }
    }

    /// Fire one request per selected id concurrently, then re-read the list
    /// exactly once whatever the outcome. An empty selection does nothing.
    pub async fn apply(
        &self,
        list: &mut ParticipantList,
        participant_ids: &[i64],
        action: BulkAction,
    ) -> Option<BulkReport> {
        let ids: BTreeSet<i64> = participant_ids.iter().copied().collect();
        if ids.is_empty() {
            return None;
        }
        let selected = ids.len();
        if !self.mode.can_edit() {
            log::debug!("Bulk update on event {} blocked by vetting phase", self.event_id);
            return Some(BulkReport {
                selected,
                succeeded: 0,
                refetched: false,
                feedback: Feedback::error(LOCKED_MESSAGE),
            });
        }

        let results = match action {
            BulkAction::Status(status) => {
                let update = ParticipantEditor::new(self.api, self.event_id, self.mode)
                    .status_update(status, None);
                join_all(ids.iter().map(|&id| self.api.update_participant_status(id, &update))).await
            }
            BulkAction::Role(role) => {
                join_all(
                    ids.iter()
                        .map(|&id| self.api.update_participant_role(self.event_id, id, role.as_str())),
                )
                .await
            }
        };

        let mut succeeded = 0;
        for (id, result) in ids.iter().zip(&results) {
            match result {
                Ok(()) => succeeded += 1,
                Err(e) => log::warn!("Bulk update of participant {id} failed: {e}"),
            }
        }

        let refetched = match list.refetch(self.api).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Participant list refetch failed for event {}: {e}", self.event_id);
                false
            }
        };

        let feedback = if succeeded == selected {
            log::info!("Bulk update applied to {selected} participants of event {}", self.event_id);
            Feedback::success(action.success_message(selected))
        } else {
            Feedback::warning(format!(
                "{succeeded} of {selected} participants updated. Some updates failed."
            ))
        };

        Some(BulkReport { selected, succeeded, refetched, feedback })
    }
}
