use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::api::{ApiClient, ApiError, VettingApi};
use crate::auth::csrf;
use crate::auth::session::{require_user, set_flash, SessionUser};
use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::{ApprovalRequest, ParticipantRole, ParticipantStatus};
use crate::templates_structs::vetting::VettingPageParts;
use crate::templates_structs::{HomeTemplate, PageContext, VettingPageTemplate};
use crate::vetting::{
    BulkAction, BulkApplier, Feedback, ParticipantEditor, ParticipantList, TemplateEditor,
    Transition, VettingController, VettingMode,
};

const TEMPLATE_VISIBLE_KEY: &str = "template_editor_visible";

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct JumpQuery {
    pub event_id: i64,
}

#[derive(Deserialize)]
pub struct StatusForm {
    pub csrf_token: String,
    pub status: String,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub status_filter: Option<String>,
}

#[derive(Deserialize)]
pub struct RoleForm {
    pub csrf_token: String,
    pub role: String,
    #[serde(default)]
    pub status_filter: Option<String>,
}

#[derive(Deserialize)]
pub struct CommentForm {
    pub csrf_token: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub status_filter: Option<String>,
}

#[derive(Deserialize)]
pub struct TransitionForm {
    pub csrf_token: String,
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub email_body: Option<String>,
}

/// The editor form; its fields share names with `TransitionForm` so the
/// Approve button can submit the unsaved text.
#[derive(Deserialize)]
pub struct TemplateForm {
    pub csrf_token: String,
    #[serde(default)]
    pub email_subject: String,
    #[serde(default)]
    pub email_body: String,
}

fn client_for(config: &AppConfig, http: &reqwest::Client, user: &SessionUser) -> ApiClient {
    ApiClient::from_config(config, &user.tenant_slug)
        .with_http(http.clone())
        .with_token(user.token.clone())
}

/// An expired backend session sends the user back to the tenant login.
fn backend_error(slug: &str) -> impl Fn(ApiError) -> AppError + '_ {
    move |e| match e {
        ApiError::Unauthorized => AppError::LoginRequired(slug.to_string()),
        other => AppError::Api(other),
    }
}

fn page_path(slug: &str, event_id: i64, status_filter: Option<&str>) -> String {
    match status_filter.filter(|f| !f.is_empty() && *f != "all") {
        Some(filter) => format!("/tenant/{slug}/events/{event_id}/vetting?status={filter}"),
        None => format!("/tenant/{slug}/events/{event_id}/vetting"),
    }
}

fn back_to_page(slug: &str, event_id: i64, status_filter: Option<&str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", page_path(slug, event_id, status_filter)))
        .finish()
}

fn flash_and_return(
    session: &Session,
    feedback: &Feedback,
    slug: &str,
    event_id: i64,
    status_filter: Option<&str>,
) -> HttpResponse {
    set_flash(session, feedback);
    back_to_page(slug, event_id, status_filter)
}

/// Committee status, event-ended flag and caller roles for one event.
async fn load_controller<'a, A: VettingApi>(
    api: &'a A,
    user: &SessionUser,
    event_id: i64,
) -> Result<VettingController<'a, A>, AppError> {
    VettingController::load(
        api,
        event_id,
        user.role_flags(),
        user.is_admin(),
        Utc::now().date_naive(),
    )
    .await
    .map_err(backend_error(&user.tenant_slug))
}

async fn load_mode<A: VettingApi>(
    api: &A,
    user: &SessionUser,
    event_id: i64,
) -> Result<(VettingMode, bool), AppError> {
    let controller = load_controller(api, user, event_id).await?;
    let ended = controller.event_ended();
    Ok((controller.into_mode(), ended))
}

/// Tenant landing page: jump to an event's vetting screen.
pub async fn home(
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let user = require_user(&session, &slug)?;
    let ctx = PageContext::build(&session, &config, &user);
    render(HomeTemplate { ctx })
}

pub async fn jump(path: web::Path<String>, query: web::Query<JumpQuery>) -> HttpResponse {
    back_to_page(&path.into_inner(), query.event_id, None)
}

pub async fn page(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<(String, i64)>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id) = path.into_inner();
    let user = require_user(&session, &slug)?;
    let api = client_for(&config, &http, &user);

    let event = api.fetch_event(event_id).await.map_err(backend_error(&slug))?;
    let mut controller = VettingController::new(
        &api,
        event_id,
        VettingMode::new(user.role_flags(), Default::default(), user.is_admin()),
    )
    .with_event_ended(event.has_ended(Utc::now().date_naive()));
    controller.refresh_status().await.map_err(backend_error(&slug))?;

    let list = ParticipantList::load(&api, event_id, query.status.clone())
        .await
        .map_err(backend_error(&slug))?;

    let mut editor = TemplateEditor::new();
    editor.set_visible(session.get::<bool>(TEMPLATE_VISIBLE_KEY).unwrap_or(None).unwrap_or(false));
    editor.load(&api, controller.mode()).await;

    let ctx = PageContext::build(&session, &config, &user);
    let tmpl = VettingPageTemplate::build(
        ctx,
        VettingPageParts {
            event: &event,
            mode: controller.mode(),
            event_ended: controller.event_ended(),
            transitions: controller.available_transitions(),
            list: &list,
            editor: &editor,
        },
    );
    render(tmpl)
}

pub async fn participant_status(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<(String, i64, i64)>,
    form: web::Form<StatusForm>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id, participant_id) = path.into_inner();
    let user = require_user(&session, &slug)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let filter = form.status_filter.as_deref();

    let status = match form.status.parse::<ParticipantStatus>() {
        Ok(status) => status,
        Err(msg) => {
            return Ok(flash_and_return(&session, &Feedback::error(msg), &slug, event_id, filter));
        }
    };

    let api = client_for(&config, &http, &user);
    let (mode, _) = load_mode(&api, &user, event_id).await?;
    let mut list = ParticipantList::new(event_id, form.status_filter.clone());
    let feedback = ParticipantEditor::new(&api, event_id, &mode)
        .change_status(&mut list, participant_id, status, form.comments.as_deref())
        .await;
    Ok(flash_and_return(&session, &feedback, &slug, event_id, filter))
}

pub async fn participant_role(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<(String, i64, i64)>,
    form: web::Form<RoleForm>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id, participant_id) = path.into_inner();
    let user = require_user(&session, &slug)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let filter = form.status_filter.as_deref();

    let role = match form.role.parse::<ParticipantRole>() {
        Ok(role) => role,
        Err(msg) => {
            return Ok(flash_and_return(&session, &Feedback::error(msg), &slug, event_id, filter));
        }
    };

    let api = client_for(&config, &http, &user);
    let (mode, ended) = load_mode(&api, &user, event_id).await?;
    if ended {
        let feedback = Feedback::error("Roles cannot be changed after the event has ended.");
        return Ok(flash_and_return(&session, &feedback, &slug, event_id, filter));
    }
    let mut list = ParticipantList::new(event_id, form.status_filter.clone());
    let feedback = ParticipantEditor::new(&api, event_id, &mode)
        .change_role(&mut list, participant_id, role)
        .await;
    Ok(flash_and_return(&session, &feedback, &slug, event_id, filter))
}

pub async fn participant_comment(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<(String, i64, i64)>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id, participant_id) = path.into_inner();
    let user = require_user(&session, &slug)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let filter = form.status_filter.as_deref();

    let api = client_for(&config, &http, &user);
    let (mode, _) = load_mode(&api, &user, event_id).await?;
    let mut list = ParticipantList::load(&api, event_id, form.status_filter.clone())
        .await
        .map_err(backend_error(&slug))?;
    let outcome = ParticipantEditor::new(&api, event_id, &mode)
        .save_comment(&mut list, participant_id, &form.comment)
        .await;
    match outcome {
        Some(feedback) => Ok(flash_and_return(&session, &feedback, &slug, event_id, filter)),
        None => Ok(back_to_page(&slug, event_id, filter)),
    }
}

/// Bulk form fields arrive as repeated pairs: `participant_ids` once per
/// ticked row, plus `target` naming which of `bulk_status` / `bulk_role` applies.
pub struct BulkForm {
    pub csrf_token: String,
    pub participant_ids: Vec<i64>,
    pub target: String,
    pub bulk_status: String,
    pub bulk_role: String,
    pub status_filter: Option<String>,
}

impl BulkForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = BulkForm {
            csrf_token: String::new(),
            participant_ids: Vec::new(),
            target: String::new(),
            bulk_status: String::new(),
            bulk_role: String::new(),
            status_filter: None,
        };
        for (key, value) in pairs {
            match key.as_str() {
                "csrf_token" => form.csrf_token = value,
                "participant_ids" => {
                    if let Ok(id) = value.trim().parse() {
                        form.participant_ids.push(id);
                    }
                }
                "target" => form.target = value,
                "bulk_status" => form.bulk_status = value,
                "bulk_role" => form.bulk_role = value,
                "status_filter" => form.status_filter = Some(value),
                _ => {}
            }
        }
        form
    }

    pub fn action(&self) -> Result<BulkAction, String> {
        match self.target.as_str() {
            "role" => self.bulk_role.parse().map(BulkAction::Role),
            _ => self.bulk_status.parse().map(BulkAction::Status),
        }
    }
}

pub async fn bulk(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<(String, i64)>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id) = path.into_inner();
    let user = require_user(&session, &slug)?;
    let form = BulkForm::from_pairs(form.into_inner());
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let filter = form.status_filter.as_deref();

    let action = match form.action() {
        Ok(action) => action,
        Err(_) => {
            let feedback = Feedback::error("Choose a status or role to apply.");
            return Ok(flash_and_return(&session, &feedback, &slug, event_id, filter));
        }
    };

    let api = client_for(&config, &http, &user);
    let (mode, _) = load_mode(&api, &user, event_id).await?;
    let mut list = ParticipantList::new(event_id, form.status_filter.clone());
    let report = BulkApplier::new(&api, event_id, &mode)
        .apply(&mut list, &form.participant_ids, action)
        .await;
    match report {
        Some(report) => Ok(flash_and_return(&session, &report.feedback, &slug, event_id, filter)),
        None => Ok(back_to_page(&slug, event_id, filter)),
    }
}

pub async fn transition(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<(String, i64, String)>,
    form: web::Form<TransitionForm>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id, action) = path.into_inner();
    let user = require_user(&session, &slug)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let Some(transition) = Transition::ALL.into_iter().find(|t| t.action() == action) else {
        return Err(AppError::NotFound);
    };

    let api = client_for(&config, &http, &user);
    let mut controller = load_controller(&api, &user, event_id).await?;
    let feedback = match transition {
        Transition::Approve => {
            let request = ApprovalRequest::with_template(
                form.email_subject.as_deref().unwrap_or_default(),
                form.email_body.as_deref().unwrap_or_default(),
            );
            controller.approve(&request).await
        }
        other => controller.run(other).await,
    };
    Ok(flash_and_return(&session, &feedback, &slug, event_id, None))
}

pub async fn template_toggle(
    session: Session,
    path: web::Path<(String, i64)>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id) = path.into_inner();
    require_user(&session, &slug)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let visible = session.get::<bool>(TEMPLATE_VISIBLE_KEY).unwrap_or(None).unwrap_or(false);
    session
        .insert(TEMPLATE_VISIBLE_KEY, !visible)
        .map_err(|e| AppError::Session(format!("Failed to store editor state: {e}")))?;
    Ok(back_to_page(&slug, event_id, None))
}

pub async fn template_save(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<(String, i64)>,
    form: web::Form<TemplateForm>,
) -> Result<HttpResponse, AppError> {
    let (slug, event_id) = path.into_inner();
    let user = require_user(&session, &slug)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let api = client_for(&config, &http, &user);
    let mode = VettingMode::new(user.role_flags(), Default::default(), false);
    let mut editor = TemplateEditor::new();
    editor.edit_subject(form.email_subject.clone());
    editor.edit_body(form.email_body.clone());
    let feedback = editor.save(&api, &mode).await;
    Ok(flash_and_return(&session, &feedback, &slug, event_id, None))
}
