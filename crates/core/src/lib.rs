//! Core library for the Taskie client
//!
//! This crate contains the client-side session and synchronization layer:
//! - HTTP gateway with credential and error handling
//! - Session state (sign up, sign in, sign out)
//! - In-memory task list synchronized with the service

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod task;
pub mod validation;

pub use app::TaskieApp;
pub use config::ClientConfig;
pub use error::AuthError;
pub type Result<T> = std::result::Result<T, AuthError>;
