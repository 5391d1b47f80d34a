use actix_web::{middleware, web};

pub mod auth_handlers;
pub mod vetting_handlers;

/// Route table, shared by `main` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes, registered before the tenant scope
        .route("/tenant/{slug}/login", web::get().to(auth_handlers::login_page))
        .route("/tenant/{slug}/login", web::post().to(auth_handlers::login_submit))
        // Protected routes
        .service(
            web::scope("/tenant/{slug}")
                .wrap(middleware::from_fn(crate::auth::middleware::require_auth))
                .route("", web::get().to(vetting_handlers::home))
                .route("/logout", web::post().to(auth_handlers::logout))
                .route("/vetting", web::get().to(vetting_handlers::jump))
                .route("/events/{event_id}/vetting", web::get().to(vetting_handlers::page))
                .route("/events/{event_id}/vetting/bulk", web::post().to(vetting_handlers::bulk))
                .route(
                    "/events/{event_id}/vetting/template/toggle",
                    web::post().to(vetting_handlers::template_toggle),
                )
                .route(
                    "/events/{event_id}/vetting/template",
                    web::post().to(vetting_handlers::template_save),
                )
                .route(
                    "/events/{event_id}/vetting/participants/{participant_id}/status",
                    web::post().to(vetting_handlers::participant_status),
                )
                .route(
                    "/events/{event_id}/vetting/participants/{participant_id}/role",
                    web::post().to(vetting_handlers::participant_role),
                )
                .route(
                    "/events/{event_id}/vetting/participants/{participant_id}/comment",
                    web::post().to(vetting_handlers::participant_comment),
                )
                // submit, cancel-submission, approve, cancel-approval
                .route(
                    "/events/{event_id}/vetting/{action}",
                    web::post().to(vetting_handlers::transition),
                ),
        );
}
