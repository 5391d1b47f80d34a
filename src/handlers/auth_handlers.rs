use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::api::{ApiClient, ApiError};
use crate::auth::session::{get_user, sign_in, SessionUser};
use crate::auth::{csrf, rate_limit::LoginThrottle};
use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::models::user::collect_role_names;
use crate::templates_structs::LoginTemplate;

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn home_path(slug: &str) -> String {
    format!("/tenant/{slug}")
}

/// Only same-tenant paths are honoured as post-login targets.
fn landing_path(slug: &str, next: Option<&str>) -> String {
    let prefix = format!("/tenant/{slug}/");
    match next {
        Some(next) if next.starts_with(&prefix) && !next.contains("//") => next.to_string(),
        _ => home_path(slug),
    }
}

fn login_form(
    config: &AppConfig,
    session: &Session,
    slug: &str,
    email: &str,
    next: Option<&str>,
    error: Option<String>,
) -> Result<HttpResponse, AppError> {
    render(LoginTemplate {
        error,
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
        tenant_slug: slug.to_string(),
        email: email.to_string(),
        next: next.unwrap_or_default().to_string(),
    })
}

pub async fn login_page(
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<String>,
    query: web::Query<NextQuery>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    // Already logged in to this tenant
    if get_user(&session).is_some_and(|u| u.tenant_slug == slug) {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", landing_path(&slug, query.next.as_deref())))
            .finish());
    }
    login_form(&config, &session, &slug, "", query.next.as_deref(), None)
}

pub async fn login_submit(
    config: web::Data<AppConfig>,
    http: web::Data<reqwest::Client>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<LoginForm>,
    throttle: web::Data<LoginThrottle>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let slug = path.into_inner();
    let email = form.email.trim();
    let next = form.next.as_deref();

    // Throttle check BEFORE contacting the backend
    if throttle.is_blocked(&slug, email) {
        log::warn!("Login for {email} on tenant {slug} throttled");
        return login_form(
            &config,
            &session,
            &slug,
            email,
            next,
            Some("Too many failed login attempts. Please try again later.".to_string()),
        );
    }

    let client = ApiClient::from_config(&config, &slug).with_http(http.get_ref().clone());
    let token = match client.login(email, &form.password).await {
        Ok(response) => response.access_token,
        Err(ApiError::Status { status: 400..=403, detail }) => {
            throttle.record_failure(&slug, email);
            log::info!("Failed login for {email} on tenant {slug}");
            let message = detail.unwrap_or_else(|| "Invalid email or password".to_string());
            return login_form(&config, &session, &slug, email, next, Some(message));
        }
        Err(e) => {
            log::warn!("Login request for tenant {slug} failed: {e}");
            let message = e.user_message("Login failed. Please try again.");
            return login_form(&config, &session, &slug, email, next, Some(message));
        }
    };
    throttle.clear(&slug, email);

    let client = client.with_token(token.clone());
    let me = match client.current_user().await {
        Ok(me) => me,
        Err(e) => {
            log::warn!("Could not read current user after login: {e}");
            let message = e.user_message("Login failed. Please try again.");
            return login_form(&config, &session, &slug, email, next, Some(message));
        }
    };
    let extra_roles = client.user_roles(me.id).await.unwrap_or_else(|e| {
        log::warn!("Could not read extra roles for user {}: {e}", me.id);
        Vec::new()
    });

    let user = SessionUser {
        user_id: me.id,
        name: me.display_name().to_string(),
        email: me.email.clone(),
        token,
        tenant_slug: slug.clone(),
        roles: collect_role_names(&me, &extra_roles),
    };
    sign_in(&session, &user)?;
    log::info!("User {} logged in to tenant {slug} with roles {:?}", user.user_id, user.roles);

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", landing_path(&slug, next)))
        .finish())
}

pub async fn logout(
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/tenant/{}/login", path.into_inner())))
        .finish())
}
