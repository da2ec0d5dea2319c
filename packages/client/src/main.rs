mod cli;
mod commands;
mod navigator;
mod state;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vrms_core::config::ClientConfig;

use crate::cli::Cli;
use crate::navigator::Navigator;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }
    info!(
        "Using session file {} (gateway: {})",
        config.session_file.display(),
        config.use_gateway
    );

    let state = AppState::from_config(&config);
    let mut navigator = Navigator::subscribe(&state.events, state.store.clone());

    let outcome = commands::run(&state, cli.command).await;

    if let Some(route) = navigator.drain() {
        println!("Redirecting to {}", route);
    }

    outcome
}
