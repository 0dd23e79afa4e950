//! Application wiring
//!
//! Builds the session store, gateway and task store around one shared HTTP
//! client so the session cookie set at sign-in rides along on every
//! resource call.

use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use crate::auth::{SessionInvalidator, SessionStore};
use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::gateway::{client_builder, HttpGateway};
use crate::navigation::Navigator;
use crate::task::TaskStore;
use crate::Result;

/// The stores a front end needs, wired together
pub struct TaskieApp {
    pub config: ClientConfig,
    pub navigator: Arc<dyn Navigator>,
    pub session: Arc<SessionStore>,
    pub gateway: Arc<HttpGateway>,
    pub tasks: Arc<TaskStore>,
}

impl TaskieApp {
    /// Build everything with a fresh cookie-keeping client
    pub fn init(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let client = client_builder()
            .build()
            .map_err(|e| AuthError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config, navigator, client))
    }

    /// Build everything around `client`, which should keep cookies
    pub fn with_client(config: ClientConfig, navigator: Arc<dyn Navigator>, client: Client) -> Self {
        let session = Arc::new(SessionStore::new(
            client.clone(),
            config.clone(),
            Arc::clone(&navigator),
        ));
        let invalidator: Arc<dyn SessionInvalidator> = session.clone();
        let gateway = Arc::new(HttpGateway::new(
            client,
            config.clone(),
            Arc::clone(&navigator),
            invalidator,
        ));
        let tasks = Arc::new(TaskStore::new(Arc::clone(&gateway)));

        info!("Client ready for {}", config.base_url);

        Self {
            config,
            navigator,
            session,
            gateway,
            tasks,
        }
    }
}
