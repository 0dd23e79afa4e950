//! Navigation side effects and route gating
//!
//! The gateway and the session store redirect the user as part of their
//! contract. `Navigator` is the seam where that happens; the route guard is
//! the collaborator that consults session state before a page is shown.

use std::sync::Mutex;

use tracing::debug;

use crate::auth::Session;

pub const HOME_ROUTE: &str = "/";
pub const SIGN_IN_ROUTE: &str = "/auth/signin";
pub const SIGN_UP_ROUTE: &str = "/auth/signup";
pub const TASKS_ROUTE: &str = "/tasks";
pub const PROFILE_ROUTE: &str = "/profile";

const PROTECTED_ROUTES: &[&str] = &[TASKS_ROUTE, PROFILE_ROUTE];
const AUTH_ROUTES: &[&str] = &[SIGN_IN_ROUTE, SIGN_UP_ROUTE];

/// Performs a full client-side redirect
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// In-memory location with history, starting at `/`
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::starting_at(HOME_ROUTE)
    }

    pub fn starting_at(path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![path.into()]),
        }
    }

    /// Current location
    pub fn current(&self) -> String {
        self.lock().last().cloned().unwrap_or_else(|| HOME_ROUTE.to_string())
    }

    /// Every location visited, oldest first
    pub fn history(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // A poisoned history is still a valid list of strings
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, path: &str) {
        debug!("Navigating to {}", path);
        self.lock().push(path.to_string());
    }
}

/// How a route relates to authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Requires a signed-in user
    Protected,
    /// Sign-in and sign-up pages
    AuthOnly,
    Public,
}

impl RouteAccess {
    pub fn for_path(path: &str) -> Self {
        if PROTECTED_ROUTES.iter().any(|route| matches_route(path, route)) {
            Self::Protected
        } else if AUTH_ROUTES.iter().any(|route| matches_route(path, route)) {
            Self::AuthOnly
        } else {
            Self::Public
        }
    }
}

fn matches_route(path: &str, route: &str) -> bool {
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
}

/// Where to redirect before showing `path`, if anywhere
pub fn guard(path: &str, session: &Session) -> Option<&'static str> {
    match (RouteAccess::for_path(path), session.is_authenticated()) {
        (RouteAccess::Protected, false) => Some(SIGN_IN_ROUTE),
        (RouteAccess::AuthOnly, true) => Some(TASKS_ROUTE),
        _ => None,
    }
}
