//! Gateway module
//!
//! HTTP access to the remote service with uniform credential and error
//! handling.

mod client;
mod response;

pub use client::{client_builder, HttpGateway};
pub use response::{normalize_error, ResponseBody};
