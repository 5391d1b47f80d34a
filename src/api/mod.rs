//! Seam between the vetting workflow and the REST backend.
//!
//! Every workflow component takes a `VettingApi` at construction instead of
//! reaching for a global client. `ApiClient` is the HTTP implementation; tests
//! plug in an in-memory recorder.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

use crate::models::{
    ApprovalReceipt, ApprovalRequest, Committee, EmailTemplate, Event, Participant, StatusUpdate,
};

/// Backend operations used by the vetting workflow. All authority lives behind
/// this trait; callers only request changes and re-read state.
#[allow(async_fn_in_trait)]
pub trait VettingApi {
    async fn fetch_event(&self, event_id: i64) -> Result<Event, ApiError>;

    async fn fetch_participants(
        &self,
        event_id: i64,
        status_filter: Option<&str>,
    ) -> Result<Vec<Participant>, ApiError>;

    async fn update_participant_status(
        &self,
        participant_id: i64,
        update: &StatusUpdate,
    ) -> Result<(), ApiError>;

    async fn update_participant_role(
        &self,
        event_id: i64,
        participant_id: i64,
        role: &str,
    ) -> Result<(), ApiError>;

    async fn fetch_committee(&self, event_id: i64) -> Result<Committee, ApiError>;

    async fn submit_vetting(&self, event_id: i64) -> Result<(), ApiError>;

    async fn cancel_submission(&self, committee_id: i64) -> Result<(), ApiError>;

    async fn approve_vetting(
        &self,
        event_id: i64,
        request: &ApprovalRequest,
    ) -> Result<ApprovalReceipt, ApiError>;

    async fn cancel_approval(&self, event_id: i64) -> Result<(), ApiError>;

    /// Tenant-scoped vetting notification template.
    async fn fetch_email_template(&self) -> Result<EmailTemplate, ApiError>;

    async fn save_email_template(&self, template: &EmailTemplate) -> Result<(), ApiError>;
}
