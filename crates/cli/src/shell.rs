//! Interactive shell over the session and task stores

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use taskie_core::navigation::{guard, MemoryNavigator, Navigator, TASKS_ROUTE};
use taskie_core::task::{CreateTaskRequest, Task, UpdateTaskRequest};
use taskie_core::{validation, AuthError, TaskieApp};

use crate::command::{Command, HELP};

pub struct Shell {
    app: TaskieApp,
    navigator: Arc<MemoryNavigator>,
}

impl Shell {
    pub fn new(app: TaskieApp, navigator: Arc<MemoryNavigator>) -> Self {
        Self { app, navigator }
    }

    /// Read commands from stdin until `quit` or end of input
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        println!("Taskie shell. Type 'help' for commands.");
        loop {
            stdout
                .write_all(format!("{}> ", self.navigator.current()).as_bytes())
                .await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }
            if let Err(err) = self.execute(command).await {
                println!("Error: {}", err.message);
            }
        }

        Ok(())
    }

    async fn execute(&self, command: Command) -> std::result::Result<(), AuthError> {
        debug!("Executing {:?}", command);
        let session = &self.app.session;
        let tasks = &self.app.tasks;

        match command {
            Command::SignUp {
                email,
                password,
                name,
            } => {
                validation::validate_sign_up(&email, &password, name.as_deref())?;
                let user = session.sign_up(&email, &password, name.as_deref()).await?;
                println!("Welcome, {}!", display_name(&user.email, user.name.as_deref()));
                self.show_tasks(&user.id).await?;
            }
            Command::SignIn { email, password } => {
                validation::validate_email(&email)?;
                let user = session.sign_in(&email, &password).await?;
                println!("Signed in as {}", display_name(&user.email, user.name.as_deref()));
                self.show_tasks(&user.id).await?;
            }
            Command::SignOut => {
                session.sign_out().await?;
                println!("Signed out");
            }
            Command::WhoAmI => match session.user() {
                Some(user) => println!("{} ({})", display_name(&user.email, user.name.as_deref()), user.id),
                None => println!("Not signed in"),
            },
            Command::List => {
                let user_id = self.require_user()?;
                self.show_tasks(&user_id).await?;
            }
            Command::Add { title, description } => {
                let user_id = self.require_user()?;
                let mut request = CreateTaskRequest::new(title);
                request.description = description;
                validation::validate_create_task(&request)?;
                let task = tasks.create_task(&user_id, &request).await?;
                println!("Added {}", format_task(&task));
            }
            Command::Edit { id, title } => {
                let user_id = self.require_user()?;
                let request = UpdateTaskRequest {
                    title: Some(title),
                    ..UpdateTaskRequest::default()
                };
                validation::validate_update_task(&request)?;
                let task = tasks.update_task(&user_id, &id, &request).await?;
                println!("Updated {}", format_task(&task));
            }
            Command::Done { id } => {
                let user_id = self.require_user()?;
                let task = tasks.complete_task(&user_id, &id).await?;
                println!("Completed {}", format_task(&task));
            }
            Command::Remove { id } => {
                let user_id = self.require_user()?;
                tasks.delete_task(&user_id, &id).await?;
                println!("Deleted {}", id);
            }
            Command::Clear => {
                session.clear_error();
                tasks.clear_error();
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }

        Ok(())
    }

    /// Gate task commands behind a session, as the tasks page is
    fn require_user(&self) -> std::result::Result<String, AuthError> {
        let session = self.app.session.session();
        if let Some(redirect) = guard(TASKS_ROUTE, &session) {
            self.navigator.navigate(redirect);
        }
        session
            .user
            .map(|user| user.id)
            .ok_or_else(|| AuthError::new("NOT_SIGNED_IN", "Please sign in first"))
    }

    async fn show_tasks(&self, user_id: &str) -> std::result::Result<(), AuthError> {
        let tasks = self.app.tasks.fetch_tasks(user_id).await?;
        match tasks.len() {
            0 => println!("No tasks yet. Try 'add <title>'."),
            1 => println!("1 task"),
            n => println!("{} tasks", n),
        }
        for task in &tasks {
            println!("  {}", format_task(task));
        }
        Ok(())
    }
}

fn display_name<'a>(email: &'a str, name: Option<&'a str>) -> &'a str {
    name.filter(|name| !name.is_empty()).unwrap_or(email)
}

fn format_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{}] {}  {}", mark, task.id, task.title);
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!(" - {}", description));
    }
    line
}
