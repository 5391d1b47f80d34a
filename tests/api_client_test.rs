//! `ApiClient` against a fake REST backend over real HTTP.

mod common;

use common::*;
use vetdesk::api::{ApiClient, ApiError, VettingApi};
use vetdesk::models::{ApprovalRequest, EmailTemplate, StatusUpdate};
use vetdesk::vetting::{RoleFlags, TemplateEditor, VettingController, WorkflowState};

fn client(backend: &FakeBackend) -> ApiClient {
    ApiClient::new(backend.api_base(), TENANT).with_token(BACKEND_TOKEN)
}

// ============================================================================
// AUTH
// ============================================================================

#[actix_web::test]
async fn test_login_returns_token() {
    let backend = FakeBackend::start("open").await;
    let api = ApiClient::new(backend.api_base(), TENANT);

    let login = api.login("vetter@example.org", BACKEND_PASSWORD).await.unwrap();
    assert_eq!(login.access_token, BACKEND_TOKEN);

    let sent = backend.requests_to("POST", "/auth/login/tenant");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json()["tenant_slug"], TENANT);
    assert!(sent[0].authorization.is_none());
}

#[actix_web::test]
async fn test_login_failure_keeps_detail() {
    let backend = FakeBackend::start("open").await;
    let api = ApiClient::new(backend.api_base(), TENANT);

    match api.login("vetter@example.org", "wrong").await {
        Err(ApiError::Status { status: 401, detail }) => {
            assert_eq!(detail.as_deref(), Some("Incorrect email or password"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[actix_web::test]
async fn test_missing_token_maps_to_unauthorized() {
    let backend = FakeBackend::start("open").await;
    let api = ApiClient::new(backend.api_base(), TENANT);

    let err = api.fetch_event(EVENT_ID).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[actix_web::test]
async fn test_current_user_and_roles() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    let user = api.current_user().await.unwrap();
    assert_eq!(user.id, 11);
    assert_eq!(user.display_name(), "Vera Vetter");

    let roles = api.user_roles(user.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(backend.requests_to("GET", "/user-roles/user/11").len(), 1);
}

// ============================================================================
// PARTICIPANTS
// ============================================================================

#[actix_web::test]
async fn test_fetch_participants_sends_bearer_and_filter() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    let rows = api.fetch_participants(EVENT_ID, Some("registered")).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].extra.get("oc").and_then(|v| v.as_str()), Some("OCA"));
    assert_eq!(rows[2].effective_role(), "organizer");

    api.fetch_participants(EVENT_ID, Some("all")).await.unwrap();

    let sent = backend.requests_to("GET", "/event-registration/event/42/registrations");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].query, "status_filter=registered");
    assert_eq!(sent[1].query, "");
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer tok-123"));
}

#[actix_web::test]
async fn test_status_update_body() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    let update = StatusUpdate::new("declined")
        .with_comments(Some("Declined - Personal Reasons"))
        .suppressing_email(Some(true));
    api.update_participant_status(2, &update).await.unwrap();

    let sent = backend.requests_to("PUT", "/event-registration/participant/2/status");
    assert_eq!(
        sent[0].json(),
        serde_json::json!({
            "status": "declined",
            "comments": "Declined - Personal Reasons",
            "suppress_email": true
        })
    );
}

#[actix_web::test]
async fn test_status_update_error_detail() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    let err = api
        .update_participant_status(99, &StatusUpdate::new("selected"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message("Failed"), "Participant is locked");
}

#[actix_web::test]
async fn test_role_update_body() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    api.update_participant_role(EVENT_ID, 1, "organizer").await.unwrap();

    let sent = backend.requests_to("PUT", "/events/42/participants/1/role");
    assert_eq!(sent[0].json(), serde_json::json!({"role": "organizer"}));
}

// ============================================================================
// COMMITTEE WORKFLOW
// ============================================================================

#[actix_web::test]
async fn test_committee_with_naive_timestamp() {
    let backend = FakeBackend::start("pending").await;
    let api = client(&backend);

    let committee = api.fetch_committee(EVENT_ID).await.unwrap();
    assert_eq!(committee.id, COMMITTEE_ID);
    assert_eq!(committee.status.as_deref(), Some("pending"));
    assert!(committee.submitted_at.is_some());
}

#[actix_web::test]
async fn test_submit_body_names_committee() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    api.submit_vetting(EVENT_ID).await.unwrap();

    let sent = backend.requests_to("POST", "/events/42/vetting/submit");
    assert_eq!(
        sent[0].json(),
        serde_json::json!({"event_id": 42, "submitted_by": "vetting_committee"})
    );
    assert_eq!(backend.committee_status(), "pending_approval");
}

#[actix_web::test]
async fn test_approve_without_template_sends_no_body() {
    let backend = FakeBackend::start("pending_approval").await;
    let api = client(&backend);

    let receipt = api.approve_vetting(EVENT_ID, &ApprovalRequest::default()).await.unwrap();
    assert_eq!(receipt.participants_notified, 3);

    let sent = backend.requests_to("POST", "/events/42/vetting/approve");
    assert!(sent[0].body.is_empty());
}

#[actix_web::test]
async fn test_controller_over_http() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    let mut controller = VettingController::load(
        &api,
        EVENT_ID,
        RoleFlags::new(true, false),
        false,
        chrono::Utc::now().date_naive(),
    )
    .await
    .unwrap();
    controller.submit_for_approval().await;
    assert!(controller.status().is(WorkflowState::PendingApproval));

    let fb = controller.cancel_submission().await;
    assert!(fb.is_success());
    assert_eq!(backend.requests_to("POST", "/vetting-committee/7/cancel-submission").len(), 1);
    assert_eq!(backend.committee_status(), "open");
}

#[actix_web::test]
async fn test_cancel_approval_rejection_surfaces_detail() {
    let backend = FakeBackend::start("approved").await;
    let api = client(&backend);
    let mut controller = VettingController::new(&api, EVENT_ID, approver_mode("approved"));

    let fb = controller.cancel_approval().await;

    assert_eq!(fb.message, "Cannot cancel approval after the event has ended");
    assert!(controller.status().is(WorkflowState::Approved));
}

// ============================================================================
// EMAIL TEMPLATE
// ============================================================================

#[actix_web::test]
async fn test_template_round_trip_keeps_placeholders() {
    let backend = FakeBackend::start("pending_approval").await;
    let api = client(&backend);
    let mode = approver_mode("pending_approval");

    let mut editor = TemplateEditor::new();
    editor.load(&api, &mode).await;
    // Nothing stored yet: the built-in template is offered
    assert_eq!(editor.template(), &EmailTemplate::fallback());

    editor.edit_subject("Your place on {{EVENT_TITLE}}");
    editor.edit_body("Dear {{PARTICIPANT_NAME}},\n{{#if_selected}}Welcome!{{/if_selected}}");
    assert!(editor.save(&api, &mode).await.is_success());

    let mut reloaded = TemplateEditor::new();
    reloaded.load(&api, &mode).await;
    assert_eq!(reloaded.template(), editor.template());
    assert!(reloaded.template().body.contains("{{PARTICIPANT_NAME}}"));

    let sent = backend.requests_to("PUT", "/email-templates/tenant/msf-oca/vetting-notification");
    assert_eq!(sent.len(), 1);
}

#[actix_web::test]
async fn test_template_not_loaded_for_committee() {
    let backend = FakeBackend::start("open").await;
    let api = client(&backend);

    let mut editor = TemplateEditor::new();
    editor.load(&api, &committee_mode("open")).await;

    assert!(editor.template().is_empty());
    assert!(backend.requests().is_empty());
}
