use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} - {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    #[error("Session expired - please log in again")]
    Unauthorized,

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Collapse any failure kind into the single message shown to the user.
    /// The server's `detail` wins; transport failures get the network message;
    /// everything else falls back to the caller's wording.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { detail: Some(detail), .. } if !detail.trim().is_empty() => {
                detail.clone()
            }
            ApiError::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Unauthorized => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

/// Pull a human-readable error out of a backend error body. FastAPI-style
/// `{"detail": "..."}` first, then `{"message": "..."}`, then the raw text.
pub fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["detail", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(String::from),
        Err(_) => Some(trimmed.to_string()),
    }
}
