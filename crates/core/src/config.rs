//! Client configuration
//!
//! Values come from the environment with sensible local defaults.

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_AUTH_PREFIX: &str = "/api/auth";

/// Configuration for the gateway and the stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote service, without a trailing slash
    pub base_url: String,
    /// Path prefix of the auth endpoints (`/api/auth` or `/auth`)
    pub auth_prefix: String,
    /// Reject a task write while another write to the same task is outstanding
    pub serialize_task_writes: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            serialize_task_writes: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `TASKIE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self::new(
            env_string("TASKIE_API_BASE_URL").unwrap_or(defaults.base_url),
            env_string("TASKIE_AUTH_PREFIX").unwrap_or(defaults.auth_prefix),
        )
        .with_serialized_task_writes(env_flag(
            "TASKIE_SERIALIZE_TASK_WRITES",
            defaults.serialize_task_writes,
        ))
    }

    pub fn new(base_url: impl Into<String>, auth_prefix: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_prefix: normalize_prefix(&auth_prefix.into()),
            serialize_task_writes: false,
        }
    }

    pub fn with_serialized_task_writes(mut self, enabled: bool) -> Self {
        self.serialize_task_writes = enabled;
        self
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL of an auth endpoint, e.g. `auth_url("signin")`
    pub fn auth_url(&self, endpoint: &str) -> String {
        format!("{}{}/{}", self.base_url, self.auth_prefix, endpoint)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => parse_flag(&raw).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
