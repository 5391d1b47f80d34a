use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

/// Tenant slug of a `/tenant/{slug}/...` path.
pub fn tenant_from_path(path: &str) -> Option<&str> {
    path.strip_prefix("/tenant/")
        .and_then(|rest| rest.split('/').next())
        .filter(|slug| !slug.is_empty())
}

/// Middleware function that checks for a session bound to the tenant in the
/// path. Anything else is redirected to that tenant's login page.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let slug = tenant_from_path(req.path()).unwrap_or_default().to_string();
    let session = req.get_session();
    let has_token = session.get::<String>("access_token").unwrap_or(None).is_some();
    let bound = session.get::<String>("tenant_slug").unwrap_or(None);

    if !has_token || bound.as_deref() != Some(slug.as_str()) {
        log::debug!("Unauthenticated request for tenant '{slug}' redirected to login");
        let response = HttpResponse::SeeOther()
            .insert_header(("Location", format!("/tenant/{slug}/login?next={}", req.path())))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
