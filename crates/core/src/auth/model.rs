use serde::{Deserialize, Serialize};

/// Snapshot of the signed-in user as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Success body of the sign-up and sign-in endpoints.
///
/// The service may also return a bearer `token`; it is ignored because the
/// session travels in the cookie jar.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
