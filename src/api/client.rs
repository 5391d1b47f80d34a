use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{extract_detail, ApiError};
use super::VettingApi;
use crate::config::AppConfig;
use crate::models::user::{LoginRequest, LoginResponse, UserRole};
use crate::models::{
    ApprovalReceipt, ApprovalRequest, Committee, CurrentUser, EmailTemplate, Event, Participant,
    RoleUpdate, StatusUpdate, SubmissionRequest,
};

/// HTTP client for the REST backend, bound to one tenant and one bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tenant_slug: String,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the API root including any prefix, e.g. `http://host/api/v1`.
    pub fn new(base_url: impl Into<String>, tenant_slug: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tenant_slug: tenant_slug.into(),
            token: None,
        }
    }

    pub fn from_config(config: &AppConfig, tenant_slug: impl Into<String>) -> Self {
        Self::new(config.api_base(), tenant_slug)
    }

    /// Reuse an existing connection pool (one per worker, shared via app data).
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn tenant_slug(&self) -> &str {
        &self.tenant_slug
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and map non-2xx responses onto `ApiError`.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status: status.as_u16(), detail: extract_detail(&body) })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.send(self.request(method, path).json(body)).await
    }

    /// `POST /auth/login/tenant`. 401 here means bad credentials, not an
    /// expired session, so the server's detail is surfaced as a status error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email, password, tenant_slug: &self.tenant_slug };
        let response = self
            .http
            .post(self.url("/auth/login/tenant"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), detail: extract_detail(&text) });
        }
        decode(response).await
    }

    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.get_json("/auth/test-token").await
    }

    pub async fn user_roles(&self, user_id: i64) -> Result<Vec<UserRole>, ApiError> {
        self.get_json(&format!("/user-roles/user/{user_id}")).await
    }
}

/// Read the body as JSON. An empty body is decoded as JSON `null` so unit-like
/// targets still succeed.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_str("null")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

impl VettingApi for ApiClient {
    async fn fetch_event(&self, event_id: i64) -> Result<Event, ApiError> {
        self.get_json(&format!("/events/{event_id}")).await
    }

    async fn fetch_participants(
        &self,
        event_id: i64,
        status_filter: Option<&str>,
    ) -> Result<Vec<Participant>, ApiError> {
        let path = format!("/event-registration/event/{event_id}/registrations");
        let mut builder = self.request(Method::GET, &path);
        if let Some(filter) = status_filter.filter(|f| !f.is_empty() && *f != "all") {
            builder = builder.query(&[("status_filter", filter)]);
        }
        let response = self.send(builder).await?;
        decode(response).await
    }

    async fn update_participant_status(
        &self,
        participant_id: i64,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        let path = format!("/event-registration/participant/{participant_id}/status");
        self.send_json(Method::PUT, &path, update).await?;
        Ok(())
    }

    async fn update_participant_role(
        &self,
        event_id: i64,
        participant_id: i64,
        role: &str,
    ) -> Result<(), ApiError> {
        let path = format!("/events/{event_id}/participants/{participant_id}/role");
        let body = RoleUpdate { role: role.to_string() };
        self.send_json(Method::PUT, &path, &body).await?;
        Ok(())
    }

    async fn fetch_committee(&self, event_id: i64) -> Result<Committee, ApiError> {
        self.get_json(&format!("/vetting-committee/event/{event_id}")).await
    }

    async fn submit_vetting(&self, event_id: i64) -> Result<(), ApiError> {
        let path = format!("/events/{event_id}/vetting/submit");
        let body = SubmissionRequest::from_committee(event_id);
        self.send_json(Method::POST, &path, &body).await?;
        Ok(())
    }

    async fn cancel_submission(&self, committee_id: i64) -> Result<(), ApiError> {
        let path = format!("/vetting-committee/{committee_id}/cancel-submission");
        self.send(self.request(Method::POST, &path)).await?;
        Ok(())
    }

    async fn approve_vetting(
        &self,
        event_id: i64,
        request: &ApprovalRequest,
    ) -> Result<ApprovalReceipt, ApiError> {
        let path = format!("/events/{event_id}/vetting/approve");
        let builder = if request.is_empty() {
            self.request(Method::POST, &path)
        } else {
            self.request(Method::POST, &path).json(request)
        };
        let response = self.send(builder).await?;
        let receipt: Option<ApprovalReceipt> = decode(response).await?;
        Ok(receipt.unwrap_or_default())
    }

    async fn cancel_approval(&self, event_id: i64) -> Result<(), ApiError> {
        let path = format!("/events/{event_id}/vetting/cancel-approval");
        self.send(self.request(Method::POST, &path)).await?;
        Ok(())
    }

    async fn fetch_email_template(&self) -> Result<EmailTemplate, ApiError> {
        let path = format!("/email-templates/tenant/{}/vetting-notification", self.tenant_slug);
        let template: Option<EmailTemplate> = self.get_json(&path).await?;
        Ok(template.unwrap_or_default())
    }

    async fn save_email_template(&self, template: &EmailTemplate) -> Result<(), ApiError> {
        let path = format!("/email-templates/tenant/{}/vetting-notification", self.tenant_slug);
        self.send_json(Method::PUT, &path, template).await?;
        Ok(())
    }
}
