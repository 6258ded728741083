//! CLI command definitions and dispatch for the `canvas` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a noun-verb
//! pattern (e.g., `canvas project list`, `canvas webhook test`).

pub mod block;
pub mod project;
pub mod webhook;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

/// Manage TheCanvas projects, blocks, and webhook sessions.
#[derive(Parser)]
#[command(name = "canvas", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },

    /// Manage building blocks.
    Block {
        #[command(subcommand)]
        action: BlockCommand,
    },

    /// Dispatch and inspect webhook sessions.
    Webhook {
        #[command(subcommand)]
        action: WebhookCommand,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to the configured port).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to the configured host).
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// List projects.
    #[command(alias = "ls")]
    List {
        /// Only show projects owned by this user.
        #[arg(long)]
        owner: Option<String>,
    },

    /// Create a project (and make it the current selection).
    Create {
        /// Project name.
        name: String,

        /// What the project should accomplish.
        #[arg(long, default_value = "")]
        goal: String,

        /// System prompt used by AI/agent functions.
        #[arg(long, default_value = "")]
        instructions: String,

        /// Local folder reference.
        #[arg(long, default_value = "")]
        folder: String,

        /// n8n webhook URL for AI/agent functions.
        #[arg(long)]
        webhook_url: Option<String>,
    },

    /// Show full details of a project.
    Show {
        /// Project ID.
        id: Uuid,
    },

    /// Delete a project.
    #[command(alias = "rm")]
    Delete {
        /// Project ID.
        id: Uuid,
    },

    /// Make a project the current selection.
    Select {
        /// Project ID.
        id: Uuid,
    },

    /// Ask the project's agent flow to generate attributes and wait for
    /// the session to resolve.
    Generate {
        /// Project ID.
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum BlockCommand {
    /// List blocks.
    #[command(alias = "ls")]
    List {
        /// Group blocks by kind, sidebar-style.
        #[arg(long)]
        categorized: bool,
    },
}

#[derive(Subcommand)]
pub enum WebhookCommand {
    /// Check whether a webhook destination is reachable.
    Test {
        /// Destination URL.
        url: String,
    },

    /// Show the number of sessions awaiting resolution.
    Pending,
}
