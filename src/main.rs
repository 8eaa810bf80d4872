mod cli;
mod commands;
mod config;
mod progress;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, UserCommand};
use config::{Config, Settings};
use state::StateStore;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub settings: Settings,
    pub store: StateStore,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "converge", &mut io::stdout());
        return Ok(());
    }

    let settings = Config::load()?.resolve(cli.api_url, cli.state_dir)?;
    log::debug!("State directory: {}", settings.state_dir.display());

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        store: StateStore::new(&settings.state_dir),
        settings,
    };

    match cli.command {
        Command::User(cmd) => match cmd {
            UserCommand::Apply(args) => commands::user::apply(&ctx, args),
            UserCommand::Get(args) => commands::user::get(&ctx, args),
        },
        Command::Delete(args) => commands::scope::delete(&ctx, args),
        Command::Destroy(args) => commands::scope::destroy(&ctx, args),
        Command::Scopes(args) => commands::scope::list(&ctx, args),
        Command::Status(args) => commands::scope::status(&ctx, args),
        Command::Completions { .. } => Ok(()),
    }
}
