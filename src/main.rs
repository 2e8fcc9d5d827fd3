// ABOUTME: Main entry point for the ws tmux session navigator

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tmux_ws::config::AppConfig;
use tmux_ws::dispatch::{Command, Dispatcher, KillTarget, Outcome};
use tmux_ws::models::SessionId;
use tracing::error;

#[derive(Parser)]
#[command(name = "ws", version, about = "Jump between tmux sessions")]
struct Cli {
    /// Config file (defaults to $WS_CONFIG or ~/.config/ws/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a session to switch to
    Pick,
    /// Kill a session, switching away first if it is the current one
    Kill {
        /// Session to kill; prompts when omitted
        session: Option<String>,
        /// Kill the session this client is attached to
        #[arg(long, conflicts_with = "session")]
        current: bool,
    },
    /// Jump back to the previous session
    Back,
    /// Show the navigation history, most recent first
    History,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Pick => Self::Pick,
            Commands::Kill {
                session: Some(name),
                ..
            } => Self::Kill(KillTarget::Named(SessionId::from(name))),
            Commands::Kill { current: true, .. } => Self::Kill(KillTarget::Current),
            Commands::Kill { .. } => Self::Kill(KillTarget::Choose),
            Commands::Back => Self::Back,
            Commands::History => Self::History,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    setup_logging(&config);

    let dispatcher = Dispatcher::from_config(&config);
    let outcome = dispatcher.run(cli.command.into())?;
    report(&outcome);
    Ok(())
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::NoSessionsRemain { target } => {
            eprintln!("Killed {}; no sessions remain", target);
        }
        Outcome::NothingToKill => eprintln!("No sessions to kill"),
        Outcome::History(entries) => {
            for entry in entries {
                println!("{}", entry);
            }
        }
        Outcome::NoOp | Outcome::Switched(_) | Outcome::Killed { .. } => {}
    }
}

fn setup_logging(config: &AppConfig) {
    use std::fs::OpenOptions;
    use tracing_subscriber::prelude::*;

    let log_file = config.log.path();
    if let Some(dir) = log_file.parent() {
        let _ = std::fs::create_dir_all(dir);
    }

    // Every hotkey press is a new process, so append to one file
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_file) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| "tmux_ws=info".into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(file)
                .with_ansi(false), // No ANSI colors in log file
        )
        .with(filter)
        .init();
}
