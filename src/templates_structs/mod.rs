// Template context structures for Askama templates, organized by page.

use actix_session::Session;
use chrono::Utc;

use crate::auth::csrf;
use crate::auth::session::{take_flash, SessionUser};
use crate::config::AppConfig;
use crate::vetting::Feedback;

pub mod common;
pub mod vetting;

pub use common::{HomeTemplate, LoginTemplate};
pub use vetting::{ParticipantRowView, SelectOption, TransitionButton, VettingPageTemplate};

/// A flash message ready for display, with its remaining dismiss time.
pub struct FlashView {
    pub kind: &'static str,
    pub message: String,
    pub dismiss_ms: i64,
}

impl FlashView {
    /// `None` once the message has outlived its display time.
    pub fn from_feedback(feedback: &Feedback) -> Option<Self> {
        let now = Utc::now();
        if feedback.is_expired(now) {
            return None;
        }
        Some(Self {
            kind: feedback.kind.as_str(),
            message: feedback.message.clone(),
            dismiss_ms: feedback.dismiss_after_ms(now),
        })
    }
}

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.flash`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub tenant_slug: String,
    pub flash: Option<FlashView>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session, config: &AppConfig, user: &SessionUser) -> Self {
        let flash = take_flash(session).as_ref().and_then(FlashView::from_feedback);
        Self {
            username: user.name.clone(),
            avatar_initial: user.initial(),
            tenant_slug: user.tenant_slug.clone(),
            flash,
            app_name: config.app_name.clone(),
            csrf_token: csrf::get_or_create_token(session),
        }
    }
}
