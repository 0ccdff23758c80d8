//! Mediate CLI - Dispute intake, panel assignment and resolution

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use mediate::cli::commands::{self, CommandContext};
use mediate::cli::{Cli, Commands};
use mediate::errors::to_exit_code;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            std::process::exit(to_exit_code(&e));
        }
    }
}

fn run(cli: Cli) -> mediate::Result<()> {
    let Some(command) = cli.command.as_ref() else {
        // Default to showing help - clap handles this
        println!("Use --help for usage information");
        return Ok(());
    };
    if let Commands::Init { force } = command {
        return commands::init::run(cli.cwd.as_deref(), *force, cli.json);
    }

    let ctx = CommandContext::locate(cli.cwd.as_deref(), cli.actor()?, cli.json)?;
    match cli.command {
        Some(Commands::Session(cmd)) => commands::session::run(&ctx, cmd),
        Some(Commands::Case(cmd)) => commands::case::run(&ctx, cmd),
        Some(Commands::Panel(cmd)) => commands::panel::run(&ctx, cmd),
        Some(Commands::Panelist(cmd)) => commands::panel::run_registry(&ctx, cmd),
        Some(Commands::Resolution(cmd)) => commands::resolution::run(&ctx, cmd),
        Some(Commands::Init { .. }) | None => Ok(()),
    }
}
