//! In-memory task list kept in step with the remote service
//!
//! Every mutation goes through the gateway scoped by user id, and the local
//! list is only changed once the service has confirmed the write. A failed
//! call therefore never needs a rollback: the list is simply left alone.

use std::sync::Arc;

use serde::de::IgnoredAny;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::in_flight::{InFlight, InFlightGuard};
use super::model::{CreateTaskRequest, Task, TaskListResponse, UpdateTaskRequest};
use crate::error::{codes, AuthError};
use crate::gateway::HttpGateway;
use crate::Result;

/// Observable state of the task list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListState {
    /// Tasks in insertion order; ids are unique
    pub tasks: Vec<Task>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl TaskListState {
    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == task_id)
    }

    /// Replace the whole list, keeping the first occurrence of each id
    fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks.clear();
        for task in tasks {
            if self.position(&task.id).is_some() {
                warn!("Dropping duplicate task {} from listing", task.id);
                continue;
            }
            self.tasks.push(task);
        }
    }

    /// Append a new task; an id already present is replaced where it stands
    fn append(&mut self, task: Task) {
        match self.position(&task.id) {
            Some(index) => {
                warn!("Service returned existing id {} for a new task", task.id);
                self.tasks[index] = task;
            }
            None => self.tasks.push(task),
        }
    }

    /// Swap in the confirmed version of `task_id` at its current position
    fn replace(&mut self, task_id: &str, task: Task) {
        match self.position(task_id) {
            Some(index) => self.tasks[index] = task,
            None => debug!("Task {} is not in the local list, nothing to replace", task_id),
        }
    }

    fn remove(&mut self, task_id: &str) -> bool {
        match self.position(task_id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }
}

const FETCH_FAILED: &str = "Failed to fetch tasks";
const CREATE_FAILED: &str = "Failed to create task";
const UPDATE_FAILED: &str = "Failed to update task";
const COMPLETE_FAILED: &str = "Failed to complete task";
const DELETE_FAILED: &str = "Failed to delete task";

/// CRUD over the active user's tasks
pub struct TaskStore {
    gateway: Arc<HttpGateway>,
    state: watch::Sender<TaskListState>,
    in_flight: Option<InFlight>,
}

impl TaskStore {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        let serialize_writes = gateway.config().serialize_task_writes;
        let (state, _) = watch::channel(TaskListState::default());
        Self {
            gateway,
            state,
            in_flight: serialize_writes.then(InFlight::default),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> TaskListState {
        self.state.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    pub fn get(&self, task_id: &str) -> Option<Task> {
        self.state.borrow().get(task_id).cloned()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Whether a write to `task_id` is outstanding (only tracked when task
    /// writes are serialized)
    pub fn is_busy(&self, task_id: &str) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.is_busy(task_id))
    }

    /// Observe every state change
    pub fn subscribe(&self) -> watch::Receiver<TaskListState> {
        self.state.subscribe()
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Load the user's full list, replacing local state
    pub async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.begin();

        match self.gateway.get::<TaskListResponse>(&tasks_path(user_id)).await {
            Ok(response) => {
                self.state.send_modify(|state| {
                    state.replace_all(response.tasks);
                    state.is_loading = false;
                });
                let tasks = self.tasks();
                debug!("Fetched {} tasks for user {}", tasks.len(), user_id);
                Ok(tasks)
            }
            Err(err) => Err(self.fail(err, FETCH_FAILED)),
        }
    }

    pub async fn create_task(&self, user_id: &str, request: &CreateTaskRequest) -> Result<Task> {
        self.begin();

        match self
            .gateway
            .post::<Task, _>(&tasks_path(user_id), request)
            .await
        {
            Ok(task) => {
                info!("Created task {}", task.id);
                self.state.send_modify(|state| {
                    state.append(task.clone());
                    state.is_loading = false;
                });
                Ok(task)
            }
            Err(err) => Err(self.fail(err, CREATE_FAILED)),
        }
    }

    pub async fn update_task(
        &self,
        user_id: &str,
        task_id: &str,
        request: &UpdateTaskRequest,
    ) -> Result<Task> {
        let _claim = self.claim(task_id, UPDATE_FAILED)?;
        self.begin();

        match self
            .gateway
            .put::<Task, _>(&task_path(user_id, task_id), request)
            .await
        {
            Ok(task) => {
                info!("Updated task {}", task_id);
                self.confirm_replace(task_id, task.clone());
                Ok(task)
            }
            Err(err) => Err(self.fail(err, UPDATE_FAILED)),
        }
    }

    pub async fn complete_task(&self, user_id: &str, task_id: &str) -> Result<Task> {
        let _claim = self.claim(task_id, COMPLETE_FAILED)?;
        self.begin();

        let path = format!("{}/complete", task_path(user_id, task_id));
        match self
            .gateway
            .patch::<Task, _>(&path, &serde_json::json!({}))
            .await
        {
            Ok(task) => {
                info!("Completed task {}", task_id);
                self.confirm_replace(task_id, task.clone());
                Ok(task)
            }
            Err(err) => Err(self.fail(err, COMPLETE_FAILED)),
        }
    }

    pub async fn delete_task(&self, user_id: &str, task_id: &str) -> Result<()> {
        let _claim = self.claim(task_id, DELETE_FAILED)?;
        self.begin();

        match self
            .gateway
            .delete::<IgnoredAny>(&task_path(user_id, task_id))
            .await
        {
            Ok(_) => {
                info!("Deleted task {}", task_id);
                self.state.send_modify(|state| {
                    if !state.remove(task_id) {
                        debug!("Task {} was not in the local list", task_id);
                    }
                    state.is_loading = false;
                });
                Ok(())
            }
            Err(err) => Err(self.fail(err, DELETE_FAILED)),
        }
    }

    fn claim(&self, task_id: &str, fallback: &str) -> Result<Option<InFlightGuard>> {
        let Some(in_flight) = &self.in_flight else {
            return Ok(None);
        };

        match in_flight.claim(task_id) {
            Some(guard) => Ok(Some(guard)),
            None => {
                let err = AuthError::new(
                    codes::TASK_BUSY,
                    format!("Task {} already has a change in progress", task_id),
                );
                warn!("{}", err);
                // Leave is_loading to the write that holds the claim
                self.state
                    .send_modify(|state| state.error = Some(error_message(&err, fallback)));
                Err(err)
            }
        }
    }

    fn confirm_replace(&self, task_id: &str, task: Task) {
        self.state.send_modify(|state| {
            state.replace(task_id, task);
            state.is_loading = false;
        });
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    fn fail(&self, err: AuthError, fallback: &str) -> AuthError {
        warn!("{}: {}", fallback, err);
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(error_message(&err, fallback));
        });
        err
    }
}

fn error_message(err: &AuthError, fallback: &str) -> String {
    if err.message.trim().is_empty() {
        fallback.to_string()
    } else {
        err.message.clone()
    }
}

fn tasks_path(user_id: &str) -> String {
    format!("/api/{}/tasks", urlencoding::encode(user_id))
}

fn task_path(user_id: &str, task_id: &str) -> String {
    format!("{}/{}", tasks_path(user_id), urlencoding::encode(task_id))
}
