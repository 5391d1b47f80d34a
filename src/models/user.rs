use serde::{Deserialize, Serialize};

/// The authenticated account as reported by `GET /auth/test-token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    /// Primary role; additional roles come from `/user-roles/user/{id}`.
    #[serde(default)]
    pub role: Option<String>,
}

impl CurrentUser {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// One row of `GET /user-roles/user/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRole {
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub tenant_slug: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Merge the primary role with the extra role rows, dropping duplicates
/// while keeping first-seen order.
pub fn collect_role_names(user: &CurrentUser, extra: &[UserRole]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let candidates = extra
        .iter()
        .map(|r| r.role.as_str())
        .chain(user.role.as_deref());
    for name in candidates {
        let name = name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
