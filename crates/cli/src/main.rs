//! Taskie command-line client
//!
//! Wires the core stores together and drives them from a line-oriented
//! shell. The session lives only for the life of the process.

mod command;
mod shell;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskie_core::navigation::MemoryNavigator;
use taskie_core::{ClientConfig, TaskieApp};

use crate::shell::Shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout belongs to the shell
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskie_cli=info,taskie_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();
    tracing::info!("Using API at {}", config.base_url);

    let navigator = Arc::new(MemoryNavigator::new());
    let app = TaskieApp::init(config, navigator.clone())?;

    Shell::new(app, navigator).run().await
}
