// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Medrent command-line client.

mod account;
mod app;
mod notifications;
mod output;
mod prompt;
mod resources;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use medrent_api::{RedactingWriter, SecretRegistry};
use medrent_config::MedrentConfig;
use medrent_core::MedrentError;

use crate::account::{ProfileArgs, RegisterArgs};
use crate::app::App;
use crate::notifications::NotificationCommand;
use crate::output::Output;
use crate::resources::{ClientCommand, InstrumentCommand, OrderCommand, ReportCommand, StaffCommand};

/// Medrent - hospital instrument rental and sales client.
#[derive(Parser, Debug)]
#[command(name = "medrent", version, about)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and keep the session for later commands.
    Login {
        email: String,
    },
    /// End the session here and on the backend.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Create an account.
    Register(RegisterArgs),
    /// Change the logged-in user's password.
    Passwd,
    /// Show or update the logged-in user's profile.
    Profile(ProfileArgs),
    /// Print the effective configuration.
    Config,
    /// Notifications of the logged-in user.
    Notifications {
        #[command(subcommand)]
        command: NotificationCommand,
    },
    /// Instruments, categories and maintenance records.
    Instruments {
        #[command(subcommand)]
        command: InstrumentCommand,
    },
    /// Clients, contacts and addresses.
    Clients {
        #[command(subcommand)]
        command: ClientCommand,
    },
    /// Staff members, departments, attendance and leaves.
    Staff {
        #[command(subcommand)]
        command: StaffCommand,
    },
    /// Orders, items, payments and invoices.
    Orders {
        #[command(subcommand)]
        command: OrderCommand,
    },
    /// Reports, dashboards and widgets.
    Reports {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

impl Commands {
    /// Whether the persisted session must be restored before running.
    fn uses_session(&self) -> bool {
        !matches!(
            self,
            Commands::Login { .. }
                | Commands::Config
                | Commands::Register(RegisterArgs {
                    provision: false,
                    ..
                })
        )
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => medrent_config::load_and_validate_path(path),
        None => medrent_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            medrent_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let secrets = SecretRegistry::new();
    init_tracing(&config.log.level, secrets.clone());

    let out = Output::new(cli.json, cli.plain);
    if let Err(e) = run(cli.command, config, secrets, &out).await {
        out.error(&e);
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: MedrentConfig,
    secrets: SecretRegistry,
    out: &Output,
) -> Result<(), MedrentError> {
    if let Commands::Config = command {
        println!(
            "{}",
            serde_json::to_string_pretty(&config)
                .map_err(|e| MedrentError::Internal(format!("failed to render config: {e}")))?
        );
        return Ok(());
    }

    let app = App::new(config, secrets)?;
    if command.uses_session() {
        app.restore().await;
    }

    match command {
        Commands::Login { email } => account::login(&app, &email, out).await,
        Commands::Logout => account::logout(&app, out).await,
        Commands::Whoami => account::whoami(&app, out),
        Commands::Register(args) => account::register(&app, &args, out).await,
        Commands::Passwd => account::passwd(&app, out).await,
        Commands::Profile(args) => account::profile(&app, &args, out).await,
        Commands::Config => Ok(()),
        Commands::Notifications { command } => notifications::run(&app, command, out).await,
        Commands::Instruments { command } => resources::instruments(&app, command, out).await,
        Commands::Clients { command } => resources::clients(&app, command, out).await,
        Commands::Staff { command } => resources::staff(&app, command, out).await,
        Commands::Orders { command } => resources::orders(&app, command, out).await,
        Commands::Reports { command } => resources::reports(&app, command, out).await,
    }
}

/// Logs go to stderr through a writer that masks every token the client
/// has sent.
fn init_tracing(log_level: &str, secrets: SecretRegistry) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("medrent={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(move || RedactingWriter::new(std::io::stderr(), secrets.clone()))
        .init();
}
