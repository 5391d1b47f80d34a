use actix_web::cookie::Key;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_APP_NAME: &str = "Vetting Desk";

/// Minimum length accepted for `SESSION_KEY` (actix cookie keys need 64 bytes).
const MIN_SESSION_KEY_LEN: usize = 64;

/// Runtime configuration, built once in `main` and handed to handlers as app data.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend origin without trailing slash, e.g. `http://localhost:8000`.
    pub api_url: String,
    /// Path prefix for every backend endpoint, e.g. `/api/v1`.
    pub api_prefix: String,
    pub bind_addr: String,
    pub app_name: String,
    pub session_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            session_key: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment. Call `dotenvy::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_url = get("API_URL")
            .or_else(|| get("NEXT_PUBLIC_API_URL"))
            .unwrap_or(defaults.api_url);
        let api_prefix = get("API_PREFIX").unwrap_or(defaults.api_prefix);

        Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            api_prefix: normalize_prefix(&api_prefix),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            session_key: get("SESSION_KEY"),
        }
    }

    /// Full URL of the backend API root (origin + prefix).
    pub fn api_base(&self) -> String {
        format!("{}{}", self.api_url, self.api_prefix)
    }

    /// Cookie-session signing key. Falls back to a random key, which means
    /// sessions do not survive a restart.
    pub fn cookie_key(&self) -> Key {
        match &self.session_key {
            Some(val) if val.len() >= MIN_SESSION_KEY_LEN => {
                log::info!("Using SESSION_KEY from environment");
                Key::from(val.as_bytes())
            }
            Some(val) => {
                log::warn!(
                    "SESSION_KEY too short ({} bytes, need {}+), generating random key",
                    val.len(),
                    MIN_SESSION_KEY_LEN
                );
                Key::generate()
            }
            None => {
                log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
                Key::generate()
            }
        }
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
