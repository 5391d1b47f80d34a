use askama::Template;

use super::PageContext;
use crate::models::email_template::PLACEHOLDERS;
use crate::models::{Event, Participant, ParticipantRole, ParticipantStatus, PlaceholderValues};
use crate::vetting::bulk::BULK_STATUSES;
use crate::vetting::editor::{
    comment_control, display_role, role_control, status_control, CommentControl, RoleControl,
    StatusControl, MAX_COMMENT_LEN,
};
use crate::vetting::{ParticipantList, TemplateEditor, Transition, VettingMode};

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str, label: &str, current: &str) -> Self {
        Self { value: value.to_string(), label: label.to_string(), selected: value == current }
    }
}

pub struct TransitionButton {
    pub action: &'static str,
    pub label: &'static str,
    /// Approval forms carry the notification subject and body.
    pub carries_template: bool,
}

impl From<Transition> for TransitionButton {
    fn from(t: Transition) -> Self {
        Self { action: t.action(), label: t.label(), carries_template: t == Transition::Approve }
    }
}

/// One participant row, with every control already decided.
pub struct ParticipantRowView {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub initials: String,
    pub status: String,
    pub status_label: String,
    pub status_editable: bool,
    pub status_options: Vec<SelectOption>,
    pub role_label: String,
    pub role_editable: bool,
    pub role_disabled: bool,
    pub role_options: Vec<SelectOption>,
    /// `reasons`, `text` or `readonly`.
    pub comment_mode: &'static str,
    pub comment_value: String,
    pub comment_options: Vec<SelectOption>,
}

fn status_label(raw: &str) -> String {
    raw.parse::<ParticipantStatus>()
        .map(|s| s.label().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

impl ParticipantRowView {
    pub fn build(p: &Participant, mode: &VettingMode, event_ended: bool) -> Self {
        let (status, status_editable) = match status_control(mode, p) {
            StatusControl::Select { current } => (current, true),
            StatusControl::Badge { current } => (current, false),
        };
        let status_options = ParticipantStatus::ALL
            .iter()
            .map(|s| SelectOption::new(s.as_str(), s.label(), &status))
            .collect();

        let (role, role_editable, role_disabled) = match role_control(mode, p, event_ended) {
            RoleControl::Select { current, disabled } => (current, true, disabled),
            RoleControl::Badge { current } => (current, false, false),
        };
        let role_options = ParticipantRole::ALL
            .iter()
            .map(|r| SelectOption::new(r.as_str(), r.label(), &role.to_lowercase()))
            .collect();

        let (comment_mode, comment_value, comment_options) = match comment_control(mode, p) {
            CommentControl::ReasonSelect { options, selected } => {
                let current = selected.unwrap_or_default();
                let opts = options.iter().map(|o| SelectOption::new(o, o, &current)).collect();
                ("reasons", current, opts)
            }
            CommentControl::FreeText { value } => ("text", value, Vec::new()),
            CommentControl::ReadOnly { value } => ("readonly", value.unwrap_or_default(), Vec::new()),
        };

        Self {
            id: p.id,
            full_name: p.full_name.clone(),
            email: p.email.clone(),
            initials: p.initials(),
            status_label: status_label(&status),
            status,
            status_editable,
            status_options,
            role_label: display_role(p),
            role_editable,
            role_disabled,
            role_options,
            comment_mode,
            comment_value,
            comment_options,
        }
    }
}

#[derive(Template)]
#[template(path = "vetting/page.html")]
pub struct VettingPageTemplate {
    pub ctx: PageContext,
    pub event_id: i64,
    pub event_title: String,
    pub event_location: String,
    pub event_dates: String,
    pub event_ended: bool,
    pub status_token: String,
    pub status_label: String,
    pub is_committee: bool,
    pub is_approver: bool,
    pub can_edit: bool,
    pub emails_suppressed: bool,
    pub transitions: Vec<TransitionButton>,
    pub rows: Vec<ParticipantRowView>,
    pub registered_count: usize,
    pub status_filter: String,
    pub filter_options: Vec<SelectOption>,
    pub bulk_statuses: Vec<SelectOption>,
    pub bulk_roles: Vec<SelectOption>,
    pub comment_max_len: usize,
    pub show_template: bool,
    pub template_subject: String,
    pub template_body: String,
    pub editor_key: String,
    pub placeholders: Vec<&'static str>,
    pub preview_subject: String,
    pub preview_body: String,
}

pub struct VettingPageParts<'a> {
    pub event: &'a Event,
    pub mode: &'a VettingMode,
    pub event_ended: bool,
    pub transitions: Vec<Transition>,
    pub list: &'a ParticipantList,
    pub editor: &'a TemplateEditor,
}

impl VettingPageTemplate {
    pub fn build(ctx: PageContext, parts: VettingPageParts<'_>) -> Self {
        let VettingPageParts { event, mode, event_ended, transitions, list, editor } = parts;
        let filter = list.status_filter().unwrap_or("all").to_string();

        let mut filter_options = vec![SelectOption::new("all", "All statuses", &filter)];
        filter_options.extend(
            ParticipantStatus::ALL
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.label(), &filter)),
        );

        let template = editor.template();
        let sample = list.rows().first();
        let values = PlaceholderValues {
            participant_name: sample.map_or("Participant Name", |p| p.full_name.as_str()).to_string(),
            participant_email: sample.map_or("participant@example.org", |p| p.email.as_str()).to_string(),
            event_title: event.title.clone(),
            event_location: event.location.clone().unwrap_or_default(),
            event_date_range: event.date_range(),
            registration_link: "[registration link]".to_string(),
        };
        let preview = template.render(&values, true);

        Self {
            event_id: event.id,
            event_title: event.title.clone(),
            event_location: event.location.clone().unwrap_or_default(),
            event_dates: event.date_range(),
            event_ended,
            status_token: mode.submission_status().as_str().to_string(),
            status_label: mode.submission_status().label().to_string(),
            is_committee: mode.is_committee(),
            is_approver: mode.is_approver(),
            can_edit: mode.can_edit(),
            emails_suppressed: mode.suppress_emails(),
            transitions: transitions.into_iter().map(TransitionButton::from).collect(),
            rows: list.rows().iter().map(|p| ParticipantRowView::build(p, mode, event_ended)).collect(),
            registered_count: list.registered_count(),
            status_filter: filter,
            filter_options,
            bulk_statuses: BULK_STATUSES
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.label(), ""))
                .collect(),
            bulk_roles: ParticipantRole::ALL
                .iter()
                .map(|r| SelectOption::new(r.as_str(), r.label(), ""))
                .collect(),
            comment_max_len: MAX_COMMENT_LEN,
            show_template: mode.is_approver() && editor.is_visible(),
            template_subject: template.subject.clone(),
            template_body: template.body.clone(),
            editor_key: editor.editor_key(),
            placeholders: PLACEHOLDERS.to_vec(),
            preview_subject: preview.subject,
            preview_body: preview.body,
            ctx,
        }
    }
}
