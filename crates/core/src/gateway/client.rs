//! HTTP gateway for the remote resource API
//!
//! Every authenticated call goes through [`HttpGateway`]. It attaches the
//! ambient session cookie, normalizes bodies and errors, and applies the
//! global 401 policy: the session is invalidated and the user is sent to the
//! sign-in page before the error reaches the caller.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::response::{normalize_error, ResponseBody};
use crate::auth::SessionInvalidator;
use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::navigation::{Navigator, SIGN_IN_ROUTE};
use crate::Result;

/// Builder for a client that keeps and replays cookies set by the service.
///
/// The session cookie lives only in this jar; nothing reads its value.
pub fn client_builder() -> ClientBuilder {
    Client::builder().cookie_store(true)
}

/// Single choke point for calls to the remote resource API
pub struct HttpGateway {
    client: Client,
    config: ClientConfig,
    navigator: Arc<dyn Navigator>,
    session: Arc<dyn SessionInvalidator>,
}

impl HttpGateway {
    pub fn new(
        client: Client,
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
        session: Arc<dyn SessionInvalidator>,
    ) -> Self {
        Self {
            client,
            config,
            navigator,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = self.config.url(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            AuthError::network(format!("Failed to reach {}: {}", url, e))
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("{} {} returned 401, ending session", method, url);
            self.session.invalidate();
            self.navigator.navigate(SIGN_IN_ROUTE);
            return Err(AuthError::unauthorized());
        }

        let body = ResponseBody::read(response).await?;
        if !status.is_success() {
            let error = normalize_error(status.as_u16(), &body);
            warn!("{} {} returned {}: {}", method, url, status, error);
            return Err(error);
        }

        body.decode()
    }
}
