//! Authenticated-user state machine
//!
//! Sign-up, sign-in and sign-out talk to the auth endpoints directly rather
//! than through the gateway, since a session has to exist before gateway
//! calls make sense. A 401 from the sign-in endpoint is therefore an ordinary
//! failure here, not a forced redirect.

use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use super::model::{AuthResponse, SignInRequest, SignUpRequest, User};
use crate::config::ClientConfig;
use crate::error::{codes, AuthError};
use crate::gateway::ResponseBody;
use crate::navigation::{Navigator, SIGN_IN_ROUTE, TASKS_ROUTE};
use crate::Result;

/// The client's belief about who, if anyone, is signed in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<AuthError>,
    pub(crate) signing_out: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.is_loading, self.signing_out, self.user.is_some()) {
            (true, true, _) => SessionPhase::SigningOut,
            (true, false, _) => SessionPhase::Authenticating,
            (false, _, true) => SessionPhase::Authenticated,
            (false, _, false) => SessionPhase::Unauthenticated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
    SigningOut,
}

/// Receives the gateway's "the session is gone" signal
pub trait SessionInvalidator: Send + Sync {
    fn invalidate(&self);
}

/// Owns the session record for the lifetime of the application
pub struct SessionStore {
    client: Client,
    config: ClientConfig,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// `client` must share its cookie jar with the gateway's client
    pub fn new(client: Client, config: ClientConfig, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            client,
            config,
            navigator,
            state,
        }
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    /// Observe every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: Option<&str>) -> Result<User> {
        let request = SignUpRequest {
            email,
            password,
            name,
        };
        self.authenticate("signup", &request, codes::SIGNUP_FAILED, "Sign-up failed")
            .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let request = SignInRequest { email, password };
        self.authenticate("signin", &request, codes::SIGNIN_FAILED, "Sign-in failed")
            .await
    }

    /// End the session on the service; the user is kept if that fails
    pub async fn sign_out(&self) -> Result<()> {
        self.begin(true);

        let result = self
            .post::<serde::de::IgnoredAny, _>(
                "signout",
                None::<&()>,
                codes::SIGNOUT_FAILED,
                "Sign-out failed",
            )
            .await;

        match result {
            Ok(_) => {
                info!("Signed out");
                self.state.send_modify(|session| {
                    session.user = None;
                    session.is_loading = false;
                    session.signing_out = false;
                });
                self.navigator.navigate(SIGN_IN_ROUTE);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|session| session.error.take().is_some());
    }

    async fn authenticate<B: Serialize>(
        &self,
        endpoint: &str,
        request: &B,
        fallback_code: &str,
        fallback_message: &str,
    ) -> Result<User> {
        self.begin(false);

        let result = self
            .post::<AuthResponse, _>(endpoint, Some(request), fallback_code, fallback_message)
            .await;

        match result {
            Ok(response) => {
                let user = response.user;
                info!("Authenticated as {} ({})", user.email, user.id);
                self.state.send_modify(|session| {
                    session.user = Some(user.clone());
                    session.is_loading = false;
                });
                self.navigator.navigate(TASKS_ROUTE);
                Ok(user)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn post<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        fallback_code: &str,
        fallback_message: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.config.auth_url(endpoint);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::network(format!("Failed to reach {}: {}", url, e)))?;

        let status = response.status();
        let body = ResponseBody::read(response).await?;
        if !status.is_success() {
            return Err(body
                .embedded_error(fallback_code)
                .unwrap_or_else(|| AuthError::new(fallback_code, fallback_message)));
        }

        body.decode()
    }

    fn begin(&self, signing_out: bool) {
        self.state.send_modify(|session| {
            session.is_loading = true;
            session.signing_out = signing_out;
            session.error = None;
        });
    }

    fn fail(&self, err: AuthError) -> AuthError {
        warn!("Auth request failed: {}", err);
        self.state.send_modify(|session| {
            session.is_loading = false;
            session.signing_out = false;
            session.error = Some(err.clone());
        });
        err
    }
}

impl SessionInvalidator for SessionStore {
    fn invalidate(&self) {
        let had_user = self.state.send_if_modified(|session| session.user.take().is_some());
        if had_user {
            info!("Session invalidated");
        }
    }
}
