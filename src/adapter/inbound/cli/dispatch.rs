//! Command dispatch.

use super::command::{CheckCommand, Cli, Commands};
use super::{catalog, check, install, list, output, run};
use crate::infrastructure::config::LoggingConfig;

/// Log level for one-shot commands, raised by `-v`.
fn command_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Dispatch a parsed command line.
///
/// `run` initializes logging from its configuration file; every other
/// command logs at a level chosen by `-v`.
pub async fn execute(cli: Cli) -> miette::Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if !matches!(cli.command, Commands::Run(_)) {
        LoggingConfig {
            level: command_log_level(cli.verbose).to_string(),
            ..LoggingConfig::default()
        }
        .init();
    }

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Catalog(args) => catalog::execute(&args).await,
        Commands::Install(args) => install::install(&args).await,
        Commands::Uninstall(args) => install::uninstall(&args).await,
        Commands::Retry(args) => install::retry(&args).await,
        Commands::List(args) => list::execute(&args),
        Commands::Check(CheckCommand::Config(args)) => check::config::execute_config(&args.config),
        Commands::Check(CheckCommand::Orchestrator(args)) => {
            check::orchestrator::execute_orchestrator(&args.config).await
        }
    }
}
