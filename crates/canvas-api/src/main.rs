//! TheCanvas CLI and REST API entry point.
//!
//! Binary name: `canvas`
//!
//! Parses CLI arguments, initializes the database and services, then
//! dispatches to the appropriate command handler or starts the REST API
//! server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{BlockCommand, Cli, Commands, ProjectCommand, WebhookCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,canvas=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "canvas", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Project { action } => match action {
            ProjectCommand::List { owner } => {
                cli::project::list_projects(&state, owner, cli.json).await?;
            }
            ProjectCommand::Create {
                name,
                goal,
                instructions,
                folder,
                webhook_url,
            } => {
                cli::project::create_project(
                    &state,
                    name,
                    goal,
                    instructions,
                    folder,
                    webhook_url,
                    cli.json,
                )
                .await?;
            }
            ProjectCommand::Show { id } => {
                cli::project::show_project(&state, id, cli.json).await?;
            }
            ProjectCommand::Delete { id } => {
                cli::project::delete_project(&state, id, cli.json).await?;
            }
            ProjectCommand::Select { id } => {
                cli::project::select_project(&state, id, cli.json).await?;
            }
            ProjectCommand::Generate { id } => {
                cli::project::generate_attributes(&state, id, cli.json).await?;
            }
        },

        Commands::Block { action } => match action {
            BlockCommand::List { categorized } => {
                cli::block::list_blocks(&state, categorized, cli.json).await?;
            }
        },

        Commands::Webhook { action } => match action {
            WebhookCommand::Test { url } => {
                cli::webhook::test_webhook(&state, &url, cli.json).await?;
            }
            WebhookCommand::Pending => {
                cli::webhook::pending_webhooks(&state, cli.json).await?;
            }
        },

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} TheCanvas API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {}",
                console::style(format!("Data directory: {}", state.data_dir.display())).dim()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
