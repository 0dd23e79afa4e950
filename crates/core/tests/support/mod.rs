//! In-process fake of the remote task service.
//!
//! Speaks the service's wire format (integer ids, snake_case fields,
//! `status` strings) and keeps sessions in an HttpOnly cookie. Tests can
//! inject a one-shot response or delay for the next request.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use taskie_core::gateway::client_builder;
use taskie_core::navigation::MemoryNavigator;
use taskie_core::{ClientConfig, TaskieApp};

const SESSION_COOKIE: &str = "session";
const TIMESTAMP: &str = "2024-05-01T10:00:00";

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "secret123";

#[derive(Debug, Clone)]
pub enum Injected {
    Json(StatusCode, Value),
    Text(StatusCode, String),
}

#[derive(Debug, Clone)]
struct FakeUser {
    id: String,
    email: String,
    password: String,
    name: Option<String>,
}

impl FakeUser {
    fn to_json(&self) -> Value {
        json!({ "id": self.id, "email": self.email, "name": self.name })
    }
}

#[derive(Debug, Clone)]
struct FakeTask {
    id: i64,
    user_id: String,
    title: String,
    description: Option<String>,
    complete: bool,
    priority: String,
}

impl FakeTask {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.user_id,
            "title": self.title,
            "description": self.description,
            "status": if self.complete { "complete" } else { "incomplete" },
            "priority": self.priority,
            "created_at": TIMESTAMP,
            "updated_at": TIMESTAMP,
        })
    }
}

#[derive(Debug, Default)]
struct FakeState {
    users: Vec<FakeUser>,
    sessions: HashMap<String, String>,
    tasks: Vec<FakeTask>,
    next_task_id: i64,
    injected: Option<Injected>,
    delay: Option<Duration>,
    requests: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeService {
    /// Start the service on an ephemeral port; returns its base URL
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/api/auth/signup", post(sign_up))
            .route("/api/auth/signin", post(sign_in))
            .route("/api/auth/signout", post(sign_out))
            .route("/api/{user_id}/tasks", get(list_tasks).post(create_task))
            .route(
                "/api/{user_id}/tasks/{task_id}",
                put(update_task).delete(delete_task),
            )
            .route("/api/{user_id}/tasks/{task_id}/complete", patch(complete_task))
            .layer(middleware::from_fn_with_state(self.clone(), intercept))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Register a user directly; returns the user id
    pub fn add_user(&self, email: &str, password: &str, name: Option<&str>) -> String {
        let id = format!("user-{}", Uuid::new_v4());
        self.lock().users.push(FakeUser {
            id: id.clone(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        });
        id
    }

    /// Seed a task owned by `user_id`; returns its id as the client sees it
    pub fn add_task(&self, user_id: &str, title: &str) -> String {
        let mut state = self.lock();
        state.next_task_id += 1;
        let id = state.next_task_id;
        state.tasks.push(FakeTask {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            complete: false,
            priority: "medium".to_string(),
        });
        id.to_string()
    }

    pub fn task_count(&self, user_id: &str) -> usize {
        self.lock().tasks.iter().filter(|t| t.user_id == user_id).count()
    }

    /// Answer the next request with `response` instead of routing it
    pub fn inject(&self, response: Injected) {
        self.lock().injected = Some(response);
    }

    /// Hold the next request for `delay` before handling it
    pub fn delay_next(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// `"METHOD /path"` for every request received
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn active_sessions(&self) -> usize {
        self.lock().sessions.len()
    }

    fn session_user(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token.to_string())?;
        self.lock().sessions.get(&token).cloned()
    }

    fn start_session(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.lock().sessions.insert(token.clone(), user_id.to_string());
        token
    }

    fn authorize(&self, headers: &HeaderMap, path_user: &str) -> Result<(), Response> {
        match self.session_user(headers) {
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Not authenticated" })),
            )
                .into_response()),
            Some(user_id) if user_id != path_user => Err((
                StatusCode::FORBIDDEN,
                Json(json!({ "error": { "code": "FORBIDDEN", "message": "Not your tasks" } })),
            )
                .into_response()),
            Some(_) => Ok(()),
        }
    }
}

async fn intercept(State(service): State<FakeService>, request: Request, next: Next) -> Response {
    let (injected, delay) = {
        let mut state = service.lock();
        state
            .requests
            .push(format!("{} {}", request.method(), request.uri().path()));
        (state.injected.take(), state.delay.take())
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    match injected {
        Some(Injected::Json(status, body)) => (status, Json(body)).into_response(),
        Some(Injected::Text(status, body)) => (status, body).into_response(),
        None => next.run(request).await,
    }
}

fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, token)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Task not found" }))).into_response()
}

#[derive(Deserialize)]
struct SignUpBody {
    email: String,
    password: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

async fn sign_up(State(service): State<FakeService>, Json(body): Json<SignUpBody>) -> Response {
    if service.lock().users.iter().any(|u| u.email == body.email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": { "code": "EMAIL_TAKEN", "message": "Email already registered" } })),
        )
            .into_response();
    }

    let id = service.add_user(&body.email, &body.password, body.name.as_deref());
    let token = service.start_session(&id);
    let user = service
        .lock()
        .users
        .iter()
        .find(|u| u.id == id)
        .map(FakeUser::to_json)
        .unwrap();

    (
        StatusCode::CREATED,
        [(SET_COOKIE, session_cookie(&token))],
        Json(json!({ "user": user, "token": token })),
    )
        .into_response()
}

async fn sign_in(State(service): State<FakeService>, Json(body): Json<SignInBody>) -> Response {
    let user = service
        .lock()
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .cloned();

    match user {
        Some(user) => {
            let token = service.start_session(&user.id);
            (
                [(SET_COOKIE, session_cookie(&token))],
                Json(json!({ "user": user.to_json(), "token": token, "token_type": "Bearer" })),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid email or password" })),
        )
            .into_response(),
    }
}

async fn sign_out(State(service): State<FakeService>, headers: HeaderMap) -> Response {
    if let Some(user_id) = service.session_user(&headers) {
        service.lock().sessions.retain(|_, owner| *owner != user_id);
    }
    (
        [(SET_COOKIE, format!("{}=; Path=/; Max-Age=0", SESSION_COOKIE))],
        Json(json!({})),
    )
        .into_response()
}

async fn list_tasks(
    State(service): State<FakeService>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = service.authorize(&headers, &user_id) {
        return response;
    }
    let tasks: Vec<Value> = service
        .lock()
        .tasks
        .iter()
        .filter(|t| t.user_id == user_id)
        .map(FakeTask::to_json)
        .collect();
    Json(json!({ "tasks": tasks })).into_response()
}

#[derive(Deserialize)]
struct CreateBody {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

async fn create_task(
    State(service): State<FakeService>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> Response {
    if let Err(response) = service.authorize(&headers, &user_id) {
        return response;
    }
    let mut state = service.lock();
    state.next_task_id += 1;
    let task = FakeTask {
        id: state.next_task_id,
        user_id,
        title: body.title,
        description: body.description,
        complete: false,
        priority: body.priority.unwrap_or_else(|| "medium".to_string()),
    };
    state.tasks.push(task.clone());
    (StatusCode::CREATED, Json(task.to_json())).into_response()
}

#[derive(Deserialize)]
struct UpdateBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}

fn find_task<'a>(state: &'a mut FakeState, user_id: &str, task_id: &str) -> Option<&'a mut FakeTask> {
    let id: i64 = task_id.parse().ok()?;
    state
        .tasks
        .iter_mut()
        .find(|t| t.id == id && t.user_id == user_id)
}

async fn update_task(
    State(service): State<FakeService>,
    Path((user_id, task_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    if let Err(response) = service.authorize(&headers, &user_id) {
        return response;
    }
    let mut state = service.lock();
    let Some(task) = find_task(&mut state, &user_id, &task_id) else {
        return not_found();
    };
    if let Some(title) = body.title {
        task.title = title;
    }
    if let Some(description) = body.description {
        task.description = Some(description);
    }
    if let Some(priority) = body.priority {
        task.priority = priority;
    }
    if let Some(completed) = body.completed {
        task.complete = completed;
    }
    Json(task.to_json()).into_response()
}

async fn complete_task(
    State(service): State<FakeService>,
    Path((user_id, task_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = service.authorize(&headers, &user_id) {
        return response;
    }
    let mut state = service.lock();
    let Some(task) = find_task(&mut state, &user_id, &task_id) else {
        return not_found();
    };
    task.complete = true;
    Json(task.to_json()).into_response()
}

async fn delete_task(
    State(service): State<FakeService>,
    Path((user_id, task_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = service.authorize(&headers, &user_id) {
        return response;
    }
    let mut state = service.lock();
    let before = state.tasks.len();
    let id: Option<i64> = task_id.parse().ok();
    state
        .tasks
        .retain(|t| !(Some(t.id) == id && t.user_id == user_id));
    if state.tasks.len() == before {
        return not_found();
    }
    Json(json!({})).into_response()
}

/// A fake service plus a fully wired client pointed at it
pub struct Harness {
    pub service: FakeService,
    pub navigator: Arc<MemoryNavigator>,
    pub app: TaskieApp,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(|config| config).await
    }

    pub async fn start_with(configure: impl FnOnce(ClientConfig) -> ClientConfig) -> Self {
        let service = FakeService::default();
        let base_url = service.spawn().await;
        let config = configure(ClientConfig::new(base_url, "/api/auth"));
        let navigator = Arc::new(MemoryNavigator::new());
        let client = client_builder().no_proxy().build().unwrap();
        let app = TaskieApp::with_client(config, navigator.clone(), client);
        Self {
            service,
            navigator,
            app,
        }
    }

    /// Register the default user and sign in; returns the user id
    pub async fn signed_in(&self) -> String {
        let user_id = self.service.add_user(EMAIL, PASSWORD, Some("Ada"));
        self.app.session.sign_in(EMAIL, PASSWORD).await.unwrap();
        user_id
    }
}

/// A base URL where nothing is listening
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
