//! Auth module
//!
//! Session state and the sign-up / sign-in / sign-out flows.

mod model;
mod session;

pub use model::User;
pub use session::{Session, SessionInvalidator, SessionPhase, SessionStore};
