use crate::api::VettingApi;
use crate::models::{ApprovalRequest, EmailTemplate};

use super::feedback::Feedback;
use super::permission::VettingMode;

/// The approver's notification template editor.
///
/// `revision` is bumped whenever the body is replaced from outside (a fetch),
/// and the page keys the editor widget on it so it re-initializes with the new
/// content. Local typing does not bump it. Placeholders are saved as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateEditor {
    template: EmailTemplate,
    visible: bool,
    revision: u32,
}

impl TemplateEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the tenant's template. Only approvers load it; a missing or empty
    /// stored template falls back to the built-in one unless the editor
    /// already holds content.
    pub async fn load<A: VettingApi>(&mut self, api: &A, mode: &VettingMode) {
        if !mode.is_approver() {
            return;
        }
        match api.fetch_email_template().await {
            Ok(stored) if !stored.is_empty() => self.replace(stored),
            Ok(_) => {
                if self.template.is_empty() {
                    self.replace(EmailTemplate::fallback());
                }
            }
            Err(e) => {
                log::warn!("Could not load vetting email template: {e}");
                if self.template.is_empty() {
                    self.replace(EmailTemplate::fallback());
                }
            }
        }
    }

    pub fn replace(&mut self, template: EmailTemplate) {
        self.template = template;
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn edit_subject(&mut self, subject: impl Into<String>) {
        self.template.subject = subject.into();
    }

    pub fn edit_body(&mut self, body: impl Into<String>) {
        self.template.body = body.into();
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn template(&self) -> &EmailTemplate {
        &self.template
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn editor_key(&self) -> String {
        format!("email-body-{}", self.revision)
    }

    pub async fn save<A: VettingApi>(&self, api: &A, mode: &VettingMode) -> Feedback {
        if !mode.is_approver() {
            log::debug!("Template save refused for non-approver");
            return Feedback::error("Only vetting approvers can edit the email template.");
        }
        match api.save_email_template(&self.template).await {
            Ok(()) => {
                log::info!("Vetting email template saved");
                Feedback::success("Email template saved successfully!")
            }
            Err(e) => {
                log::warn!("Saving vetting email template failed: {e}");
                Feedback::error("Failed to save email template.")
            }
        }
    }

    /// Custom subject/body sent along with an approval.
    pub fn approval_request(&self) -> ApprovalRequest {
        ApprovalRequest::with_template(&self.template.subject, &self.template.body)
    }
}
