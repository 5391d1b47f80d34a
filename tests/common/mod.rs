//! Shared test infrastructure.
//!
//! - `FakeApi`: in-memory `VettingApi` that records every call, applies
//!   successful mutations to its own state, and fails on demand.
//! - `FakeBackend`: an actix-web server on an ephemeral port that speaks the
//!   REST contract, so the real `ApiClient` can be exercised over HTTP.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};

use vetdesk::api::{ApiError, VettingApi};
use vetdesk::models::{
    ApprovalReceipt, ApprovalRequest, Committee, EmailTemplate, Event, Participant, StatusUpdate,
};
use vetdesk::vetting::{normalize, RoleFlags, VettingMode};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const EVENT_ID: i64 = 42;
pub const COMMITTEE_ID: i64 = 7;
pub const TENANT: &str = "msf-oca";

// ============================================================================
// FIXTURES
// ============================================================================

pub fn participant(id: i64, name: &str, status: &str) -> Participant {
    serde_json::from_value(json!({
        "id": id,
        "full_name": name,
        "email": format!("{}@example.org", name.split_whitespace().next().unwrap_or("p").to_lowercase()),
        "status": status,
        "participant_role": "visitor"
    }))
    .expect("valid participant fixture")
}

pub fn facilitator(id: i64, name: &str) -> Participant {
    let mut p = participant(id, name, "selected");
    p.participant_role = Some("facilitator".into());
    p
}

pub fn event(end_date: &str) -> Event {
    serde_json::from_value(json!({
        "id": EVENT_ID,
        "title": "Field Leadership Course",
        "location": "Nairobi",
        "start_date": "2030-03-10",
        "end_date": end_date
    }))
    .expect("valid event fixture")
}

pub fn committee(status: &str) -> Committee {
    Committee {
        id: COMMITTEE_ID,
        event_id: EVENT_ID,
        status: Some(status.to_string()),
        submitted_at: None,
        approved_at: None,
    }
}

pub fn committee_mode(status: &str) -> VettingMode {
    VettingMode::new(RoleFlags::new(true, false), normalize(Some(status)), false)
}

pub fn approver_mode(status: &str) -> VettingMode {
    VettingMode::new(RoleFlags::new(false, true), normalize(Some(status)), false)
}

// ============================================================================
// FAKE API
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchEvent(i64),
    FetchParticipants(i64, Option<String>),
    UpdateStatus(i64, StatusUpdate),
    UpdateRole(i64, i64, String),
    FetchCommittee(i64),
    Submit(i64),
    CancelSubmission(i64),
    Approve(i64, ApprovalRequest),
    CancelApproval(i64),
    FetchTemplate,
    SaveTemplate(EmailTemplate),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::FetchEvent(_) | Call::FetchParticipants(..) | Call::FetchCommittee(_) | Call::FetchTemplate
        )
    }
}

pub struct FakeState {
    pub event: Event,
    pub participants: Vec<Participant>,
    pub committee: Option<Committee>,
    pub template: Option<EmailTemplate>,
    pub participants_notified: u32,
    /// Participant ids whose mutations fail with a 400.
    pub failing_participants: HashSet<i64>,
    /// When set, every mutation fails with this status and detail.
    pub fail_mutations: Option<(u16, Option<String>)>,
    pub fail_participant_fetch: bool,
    pub fail_template_fetch: bool,
    pub calls: Vec<Call>,
}

pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new(participants: Vec<Participant>, committee_status: &str) -> Self {
        Self {
            state: Mutex::new(FakeState {
                event: event("2099-12-31"),
                participants,
                committee: Some(committee(committee_status)),
                template: None,
                participants_notified: 0,
                failing_participants: HashSet::new(),
                fail_mutations: None,
                fail_participant_fetch: false,
                fail_template_fetch: false,
                calls: Vec::new(),
            }),
        }
    }

    pub fn with<F: FnOnce(&mut FakeState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn set<F: FnOnce(&mut FakeState)>(&self, f: F) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn refetches(&self) -> usize {
        self.count(|c| matches!(c, Call::FetchParticipants(..)))
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn participant_status(&self, id: i64) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.participants.iter().find(|p| p.id == id).map(|p| p.status.clone())
    }

    pub fn stored_template(&self) -> Option<EmailTemplate> {
        self.state.lock().unwrap().template.clone()
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }

    fn mutation_result(state: &FakeState, participant_id: Option<i64>) -> Result<(), ApiError> {
        if let Some((status, detail)) = &state.fail_mutations {
            return Err(ApiError::Status { status: *status, detail: detail.clone() });
        }
        if participant_id.is_some_and(|id| state.failing_participants.contains(&id)) {
            return Err(ApiError::Status { status: 400, detail: Some("Update rejected".into()) });
        }
        Ok(())
    }

    fn set_committee_status(state: &mut FakeState, status: &str) {
        if let Some(c) = state.committee.as_mut() {
            c.status = Some(status.to_string());
        }
    }
}

impl VettingApi for FakeApi {
    async fn fetch_event(&self, event_id: i64) -> Result<Event, ApiError> {
        let state = self.record(Call::FetchEvent(event_id));
        Ok(state.event.clone())
    }

    async fn fetch_participants(
        &self,
        event_id: i64,
        status_filter: Option<&str>,
    ) -> Result<Vec<Participant>, ApiError> {
        let state = self.record(Call::FetchParticipants(event_id, status_filter.map(String::from)));
        if state.fail_participant_fetch {
            return Err(ApiError::Status { status: 503, detail: None });
        }
        Ok(state
            .participants
            .iter()
            .filter(|p| status_filter.is_none_or(|f| p.status == f))
            .cloned()
            .collect())
    }

    async fn update_participant_status(
        &self,
        participant_id: i64,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        let mut state = self.record(Call::UpdateStatus(participant_id, update.clone()));
        Self::mutation_result(&state, Some(participant_id))?;
        if let Some(p) = state.participants.iter_mut().find(|p| p.id == participant_id) {
            p.status = update.status.clone();
            if update.comments.is_some() {
                p.vetting_comments = update.comments.clone();
            }
        }
        Ok(())
    }

    async fn update_participant_role(
        &self,
        event_id: i64,
        participant_id: i64,
        role: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.record(Call::UpdateRole(event_id, participant_id, role.to_string()));
        Self::mutation_result(&state, Some(participant_id))?;
        if let Some(p) = state.participants.iter_mut().find(|p| p.id == participant_id) {
            p.participant_role = Some(role.to_string());
        }
        Ok(())
    }

    async fn fetch_committee(&self, event_id: i64) -> Result<Committee, ApiError> {
        let state = self.record(Call::FetchCommittee(event_id));
        state
            .committee
            .clone()
            .ok_or(ApiError::Status { status: 404, detail: Some("Vetting committee not found".into()) })
    }

    async fn submit_vetting(&self, event_id: i64) -> Result<(), ApiError> {
        let mut state = self.record(Call::Submit(event_id));
        Self::mutation_result(&state, None)?;
        Self::set_committee_status(&mut state, "pending_approval");
        Ok(())
    }

    async fn cancel_submission(&self, committee_id: i64) -> Result<(), ApiError> {
        let mut state = self.record(Call::CancelSubmission(committee_id));
        Self::mutation_result(&state, None)?;
        Self::set_committee_status(&mut state, "open");
        Ok(())
    }

    async fn approve_vetting(
        &self,
        event_id: i64,
        request: &ApprovalRequest,
    ) -> Result<ApprovalReceipt, ApiError> {
        let mut state = self.record(Call::Approve(event_id, request.clone()));
        Self::mutation_result(&state, None)?;
        Self::set_committee_status(&mut state, "approved");
        Ok(ApprovalReceipt { participants_notified: state.participants_notified })
    }

    async fn cancel_approval(&self, event_id: i64) -> Result<(), ApiError> {
        let mut state = self.record(Call::CancelApproval(event_id));
        Self::mutation_result(&state, None)?;
        Self::set_committee_status(&mut state, "pending_approval");
        Ok(())
    }

    async fn fetch_email_template(&self) -> Result<EmailTemplate, ApiError> {
        let state = self.record(Call::FetchTemplate);
        if state.fail_template_fetch {
            return Err(ApiError::Status { status: 500, detail: None });
        }
        Ok(state.template.clone().unwrap_or_default())
    }

    async fn save_email_template(&self, template: &EmailTemplate) -> Result<(), ApiError> {
        let mut state = self.record(Call::SaveTemplate(template.clone()));
        Self::mutation_result(&state, None)?;
        state.template = Some(template.clone());
        Ok(())
    }
}

// ============================================================================
// FAKE HTTP BACKEND
// ============================================================================

pub const BACKEND_PASSWORD: &str = "correct-horse";
pub const BACKEND_TOKEN: &str = "tok-123";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
pub struct BackendState {
    pub requests: Vec<Recorded>,
    pub committee_status: String,
    pub template: Option<Value>,
    pub participants: Vec<Value>,
    /// Role name returned for the logged-in user.
    pub user_role: String,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub origin: String,
    pub state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    /// Start the server on an ephemeral port inside the current actix runtime.
    pub async fn start(committee_status: &str) -> Self {
        let state = Arc::new(Mutex::new(BackendState {
            committee_status: committee_status.to_string(),
            participants: vec![
                json!({"id": 1, "full_name": "Ama Mensah", "email": "ama@example.org", "status": "registered", "participant_role": "visitor", "oc": "OCA"}),
                json!({"id": 2, "full_name": "Jean Okafor", "email": "jean@example.org", "status": "registered", "participant_role": "visitor"}),
                json!({"id": 3, "full_name": "Lina Haddad", "email": "lina@example.org", "status": "selected", "role": "organizer"}),
                json!({"id": 4, "full_name": "Tom Facil", "email": "tom@example.org", "status": "selected", "participant_role": "facilitator"}),
            ],
            user_role: "VETTING_COMMITTEE".into(),
            ..BackendState::default()
        }));
        let data = web::Data::new(state.clone());
        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).default_service(web::to(handle))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake backend");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        Self { origin: format!("http://{addr}"), state }
    }

    /// Answer the user-roles lookup with `role` instead of the committee role.
    pub fn with_user_role(self, role: &str) -> Self {
        self.state.lock().unwrap().user_role = role.to_string();
        self
    }

    pub fn stored_template(&self) -> Option<Value> {
        self.state.lock().unwrap().template.clone()
    }

    pub fn api_base(&self) -> String {
        format!("{}/api/v1", self.origin)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path_suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.ends_with(path_suffix))
            .collect()
    }

    pub fn committee_status(&self) -> String {
        self.state.lock().unwrap().committee_status.clone()
    }
}

fn detail(status: actix_web::http::StatusCode, msg: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "detail": msg }))
}

async fn handle(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<Arc<Mutex<BackendState>>>,
) -> HttpResponse {
    use actix_web::http::StatusCode;

    let method = req.method().as_str().to_string();
    let path = req.path().to_string();
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body_text = String::from_utf8_lossy(&body).to_string();

    let mut st = state.lock().unwrap();
    st.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: req.query_string().to_string(),
        authorization: authorization.clone(),
        body: body_text.clone(),
    });

    let Some(rest) = path.strip_prefix("/api/v1") else {
        return HttpResponse::NotFound().finish();
    };
    let segments: Vec<&str> = rest.trim_matches('/').split('/').collect();

    if segments.as_slice() == ["auth", "login", "tenant"] {
        let body: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);
        return if body["password"] == BACKEND_PASSWORD {
            HttpResponse::Ok().json(json!({"access_token": BACKEND_TOKEN, "token_type": "bearer"}))
        } else {
            detail(StatusCode::UNAUTHORIZED, "Incorrect email or password")
        };
    }

    let expected = format!("Bearer {BACKEND_TOKEN}");
    if authorization.as_deref() != Some(expected.as_str()) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["auth", "test-token"]) => HttpResponse::Ok().json(json!({
            "id": 11, "email": "vetter@example.org", "full_name": "Vera Vetter", "role": "event_admin"
        })),
        ("GET", ["user-roles", "user", _]) => {
            HttpResponse::Ok().json(json!([{"role": st.user_role}]))
        }
        ("GET", ["events", id]) => HttpResponse::Ok().json(json!({
            "id": id.parse::<i64>().unwrap_or(0),
            "title": "Field Leadership Course",
            "location": "Nairobi",
            "start_date": "2099-03-10",
            "end_date": "2099-03-14T17:00:00"
        })),
        ("GET", ["event-registration", "event", _, "registrations"]) => {
            HttpResponse::Ok().json(st.participants.clone())
        }
        ("PUT", ["event-registration", "participant", "99", "status"]) => {
            detail(StatusCode::BAD_REQUEST, "Participant is locked")
        }
        ("PUT", ["event-registration", "participant", id, "status"]) => {
            let body: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);
            let id: i64 = id.parse().unwrap_or(0);
            if let Some(p) = st.participants.iter_mut().find(|p| p["id"] == id) {
                p["status"] = body["status"].clone();
                if let Some(c) = body.get("comments") {
                    p["vetting_comments"] = c.clone();
                }
            }
            HttpResponse::Ok().json(json!({"message": "updated"}))
        }
        ("PUT", ["events", _, "participants", id, "role"]) => {
            let body: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);
            let id: i64 = id.parse().unwrap_or(0);
            if let Some(p) = st.participants.iter_mut().find(|p| p["id"] == id) {
                p["participant_role"] = body["role"].clone();
            }
            HttpResponse::Ok().finish()
        }
        ("GET", ["vetting-committee", "event", event_id]) => HttpResponse::Ok().json(json!({
            "id": COMMITTEE_ID,
            "event_id": event_id.parse::<i64>().unwrap_or(0),
            "status": st.committee_status,
            "submitted_at": "2099-01-02T10:00:00.000000"
        })),
        ("POST", ["events", _, "vetting", "submit"]) => {
            st.committee_status = "pending_approval".into();
            HttpResponse::Ok().json(json!({"id": COMMITTEE_ID, "status": "pending_approval"}))
        }
        ("POST", ["vetting-committee", _, "cancel-submission"]) => {
            st.committee_status = "open".into();
            HttpResponse::Ok().finish()
        }
        ("POST", ["events", _, "vetting", "approve"]) => {
            st.committee_status = "approved".into();
            HttpResponse::Ok().json(json!({"participants_notified": 3}))
        }
        ("POST", ["events", _, "vetting", "cancel-approval"]) => {
            detail(StatusCode::BAD_REQUEST, "Cannot cancel approval after the event has ended")
        }
        ("GET", ["email-templates", "tenant", _, "vetting-notification"]) => match &st.template {
            Some(t) => HttpResponse::Ok().json(t),
            None => HttpResponse::Ok().content_type("application/json").body("null"),
        },
        ("PUT", ["email-templates", "tenant", _, "vetting-notification"]) => {
            st.template = serde_json::from_str(&body_text).ok();
            HttpResponse::Ok().json(json!({"message": "saved"}))
        }
        _ => detail(StatusCode::NOT_FOUND, "Not Found"),
    }
}
