//! Response body reading and error normalization

use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AuthError, GENERIC_ERROR_MESSAGE};
use crate::Result;

/// A response body read according to its declared content kind
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Read the body as JSON when the response declares it, else as text.
    ///
    /// A body that claims to be JSON but does not parse is kept as text.
    pub async fn read(response: Response) -> Result<Self> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        let bytes = response.bytes().await?;
        if is_json {
            if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
                return Ok(Self::Json(value));
            }
        }
        Ok(Self::Text(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Decode a success body into the caller's result type
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        };
        serde_json::from_value(value)
            .map_err(|e| AuthError::invalid_response(format!("Unexpected response body: {}", e)))
    }

    /// Error carried by the body, if any.
    ///
    /// Accepts `{ error: { code, message } }`, `{ error: "text" }` and
    /// `{ detail: ... }`. `fallback_code` is used when the body has no code.
    pub fn embedded_error(&self, fallback_code: &str) -> Option<AuthError> {
        let Self::Json(Value::Object(map)) = self else {
            return None;
        };

        match map.get("error") {
            Some(Value::Object(error)) => {
                let code = error
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or(fallback_code);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(GENERIC_ERROR_MESSAGE);
                return Some(AuthError::new(code, message));
            }
            Some(Value::String(message)) => return Some(AuthError::new(fallback_code, message.as_str())),
            _ => {}
        }

        match map.get("detail") {
            Some(Value::String(detail)) => Some(AuthError::new(fallback_code, detail.as_str())),
            Some(Value::Null) | None => None,
            Some(other) => Some(AuthError::new(fallback_code, other.to_string())),
        }
    }
}

/// Error for a non-success, non-401 response
pub fn normalize_error(status: u16, body: &ResponseBody) -> AuthError {
    let fallback_code = format!("HTTP_{}", status);
    if let Some(error) = body.embedded_error(&fallback_code) {
        return error;
    }

    match body {
        ResponseBody::Text(text) if !text.trim().is_empty() => AuthError::http(status, text.trim()),
        _ => AuthError::http(status, GENERIC_ERROR_MESSAGE),
    }
}
