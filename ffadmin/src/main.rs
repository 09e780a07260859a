//! # ffadmin
//!
//! Command line administration for the Firefly media server's
//! configuration.
//!
//! ```bash
//! ffadmin --server http://nas:3689 show
//! ffadmin --server http://nas:3689 set servername="Living Room" mp3_dir=/music,/podcasts
//! ffadmin --server http://nas:3689 edit
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

use crate::{
    commands::{CommandHandler, parse_assignment},
    ctx::AdminContext,
};

#[macro_use]
extern crate log;

/// Command handlers.
mod commands;

/// Shared options and service selection.
mod ctx;

#[derive(Parser, Debug)]
#[command(version, about = "Edit Firefly media server configuration")]
struct Cli {
    /// Base URL of the media server.
    #[arg(long, short, default_value = "http://localhost:3689", env = "FFADMIN_SERVER")]
    server: String,

    /// Admin password.
    #[arg(long, short, env = "FFADMIN_PASSWORD")]
    password: Option<String>,

    /// Preferences file.
    #[arg(long, default_value = ".ffconfig.toml")]
    prefs: PathBuf,

    /// Request timeout in seconds. Requests never time out by default.
    #[arg(long)]
    timeout: Option<u64>,

    /// Read config.xml, stats.xml and values.xml from this directory instead
    /// of a server.
    #[arg(long)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive editor.
    Edit,
    /// Print the current configuration form.
    Show {
        /// Print the form model as JSON.
        #[arg(long)]
        json: bool,
        /// Include advanced settings.
        #[arg(long, short)]
        advanced: bool,
    },
    /// Set values and save them in one update.
    Set {
        /// `KEY=VALUE` pairs; multi-valued settings take comma-separated values.
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The editor owns the terminal: keep stderr quiet, or with `ui-log` let
    // its debug console collect the logs instead.
    let editing = matches!(cli.command, Command::Edit);
    if !(cfg!(feature = "ui-log") && editing) {
        let filter = if editing { "error" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    }

    let ctx = AdminContext {
        server: cli.server,
        password: cli.password,
        prefs: cli.prefs,
        timeout: cli.timeout.map(Duration::from_secs),
        fixtures: cli.fixtures,
    };

    match cli.command {
        Command::Edit => CommandHandler::handle_edit(&ctx).await,
        Command::Show { json, advanced } => CommandHandler::handle_show(&ctx, json, advanced).await,
        Command::Set { assignments } => CommandHandler::handle_set(&ctx, &assignments).await,
    }
}
