use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_ATTEMPTS: usize = 5;
const WINDOW_SECS: u64 = 900; // 15 minutes

/// Failed-login throttle keyed by (tenant slug, lowercased email).
#[derive(Clone, Default)]
pub struct LoginThrottle {
    attempts: Arc<Mutex<HashMap<(String, String), Vec<Instant>>>>,
}

fn key(tenant: &str, email: &str) -> (String, String) {
    (tenant.to_string(), email.trim().to_lowercase())
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `MAX_ATTEMPTS` failures fall inside the window. Stale
    /// entries for the checked key are dropped.
    pub fn is_blocked(&self, tenant: &str, email: &str) -> bool {
        self.is_blocked_at(tenant, email, Instant::now())
    }

    fn is_blocked_at(&self, tenant: &str, email: &str, now: Instant) -> bool {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let window = Duration::from_secs(WINDOW_SECS);
        match map.get_mut(&key(tenant, email)) {
            Some(timestamps) => {
                timestamps.retain(|t| now.saturating_duration_since(*t) < window);
                timestamps.len() >= MAX_ATTEMPTS
            }
            None => false,
        }
    }

    pub fn record_failure(&self, tenant: &str, email: &str) {
        self.record_failure_at(tenant, email, Instant::now());
    }

    /// Record a failure and drop every key whose failures have all expired.
    fn record_failure_at(&self, tenant: &str, email: &str, at: Instant) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let window = Duration::from_secs(WINDOW_SECS);
        map.retain(|_, timestamps| {
            timestamps.retain(|t| at.saturating_duration_since(*t) < window);
            !timestamps.is_empty()
        });
        map.entry(key(tenant, email)).or_default().push(at);
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Forget failures after a successful login.
    pub fn clear(&self, tenant: &str, email: &str) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&key(tenant, email));
    }
}
