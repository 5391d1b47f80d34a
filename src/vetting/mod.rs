//! Vetting workflow core. Every component here talks to the backend only
//! through `VettingApi` and reports outcomes as `Feedback`.

pub mod bulk;
pub mod controller;
pub mod editor;
pub mod feedback;
pub mod permission;
pub mod status;
pub mod template_editor;

pub use bulk::{BulkAction, BulkApplier, BulkReport};
pub use controller::{Transition, VettingController};
pub use editor::{ParticipantEditor, ParticipantList};
pub use feedback::{Feedback, FeedbackKind};
pub use permission::{resolve, RoleFlags, VettingMode};
pub use status::{normalize, CommitteeStatus, WorkflowState};
pub use template_editor::TemplateEditor;
