//! Task module
//!
//! This module contains the task model and the in-memory task store.

mod in_flight;
mod model;
mod store;

pub use model::*;
pub use store::{TaskListState, TaskStore};
