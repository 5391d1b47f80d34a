use actix_session::Session;

use crate::errors::AppError;
use crate::vetting::{Feedback, RoleFlags};

/// Everything the portal keeps about a logged-in user. The bearer token is the
/// only credential; roles are cached for the permission gate, which is
/// advisory anyway.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub token: String,
    pub tenant_slug: String,
    pub roles: Vec<String>,
}

impl SessionUser {
    pub fn role_flags(&self) -> RoleFlags {
        RoleFlags::from_role_names(&self.roles)
    }

    /// Plain admins fall back to this when they hold neither vetting role.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| {
            ["super_admin", "mt_admin", "hr_admin", "event_admin"]
                .iter()
                .any(|admin| r.eq_ignore_ascii_case(admin))
        })
    }

    pub fn initial(&self) -> String {
        self.name.chars().next().unwrap_or('?').to_uppercase().to_string()
    }
}

pub fn sign_in(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session.renew();
    let insert = |key: &str, result: Result<(), actix_session::SessionInsertError>| {
        result.map_err(|e| AppError::Session(format!("Failed to store {key}: {e}")))
    };
    insert("user_id", session.insert("user_id", user.user_id))?;
    insert("user_name", session.insert("user_name", &user.name))?;
    insert("user_email", session.insert("user_email", &user.email))?;
    insert("access_token", session.insert("access_token", &user.token))?;
    insert("tenant_slug", session.insert("tenant_slug", &user.tenant_slug))?;
    insert("roles", session.insert("roles", &user.roles))?;
    Ok(())
}

pub fn get_tenant_slug(session: &Session) -> Option<String> {
    session.get::<String>("tenant_slug").unwrap_or(None)
}

pub fn get_user(session: &Session) -> Option<SessionUser> {
    let token = session.get::<String>("access_token").unwrap_or(None)?;
    Some(SessionUser {
        user_id: session.get::<i64>("user_id").unwrap_or(None).unwrap_or(0),
        name: session.get::<String>("user_name").unwrap_or(None).unwrap_or_default(),
        email: session.get::<String>("user_email").unwrap_or(None).unwrap_or_default(),
        token,
        tenant_slug: get_tenant_slug(session)?,
        roles: session.get::<Vec<String>>("roles").unwrap_or(None).unwrap_or_default(),
    })
}

/// The logged-in user for `slug`, or a redirect to that tenant's login page.
pub fn require_user(session: &Session, slug: &str) -> Result<SessionUser, AppError> {
    match get_user(session) {
        Some(user) if user.tenant_slug == slug => Ok(user),
        _ => Err(AppError::LoginRequired(slug.to_string())),
    }
}

pub fn set_flash(session: &Session, feedback: &Feedback) {
    if let Err(e) = session.insert("flash", feedback) {
        log::warn!("Could not store flash message: {e}");
    }
}

pub fn take_flash(session: &Session) -> Option<Feedback> {
    let flash = session.get::<Feedback>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}
