//! Per-task write guard
//!
//! Tracks which task ids have a write outstanding. A claim is released when
//! its guard is dropped, whether the write succeeded, failed or was cancelled.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default, Clone)]
pub(crate) struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Claim `task_id`, or `None` if a write to it is already outstanding
    pub fn claim(&self, task_id: &str) -> Option<InFlightGuard> {
        if !self.lock().insert(task_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            ids: Arc::clone(&self.ids),
            task_id: task_id.to_string(),
        })
    }

    pub fn is_busy(&self, task_id: &str) -> bool {
        self.lock().contains(task_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub(crate) struct InFlightGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    task_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.task_id);
    }
}
