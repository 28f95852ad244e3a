//! Command-line interface definitions.
//!
//! Defines the CLI structure for the berth application using `clap`.
//! The CLI runs the engine in the foreground, drives single install
//! operations against the persisted registry, and performs diagnostic checks.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Install self-hosted applications onto a remote orchestrator
#[derive(Parser, Debug)]
#[command(name = "berth")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the berth CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the engine in the foreground until Ctrl-C
    Run(ConfigPathArg),

    /// Fetch the catalog once and print it
    Catalog(ConfigPathArg),

    /// Install a package under a new instance name
    Install(InstallArgs),

    /// Remove an instance and its deployment
    Uninstall(TargetArgs),

    /// Retry a stuck or failed instance
    Retry(TargetArgs),

    /// List a user's instances
    List(ListArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `berth check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file and run static health checks.
    Config(ConfigPathArg),
    /// Probe the configured orchestrator for liveness.
    Orchestrator(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `install` subcommand.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Instance name.
    pub name: String,

    /// Catalog package to install.
    #[arg(short, long)]
    pub package: String,

    /// Owner of the instance.
    #[arg(short, long)]
    pub user: String,

    /// Wait until provisioning settles instead of returning after dispatch.
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds.
    #[arg(long, default_value = "60", requires = "wait")]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Arguments for commands addressing one instance.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Instance name.
    pub name: String,

    /// Owner of the instance.
    #[arg(short, long)]
    pub user: String,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Arguments for the `list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Owner of the instances.
    #[arg(short, long)]
    pub user: String,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_install_with_flags() {
        let cli = Cli::try_parse_from([
            "berth", "--json", "install", "myapp", "-p", "wordpress", "-u", "1", "--wait", "-c",
            "berth.toml",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Install(args) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(args.name, "myapp");
        assert_eq!(args.package, "wordpress");
        assert_eq!(args.user, "1");
        assert!(args.wait);
        assert_eq!(args.timeout_secs, 60);
        assert_eq!(args.config.config, PathBuf::from("berth.toml"));
    }

    #[test]
    fn install_requires_package_and_user() {
        assert!(Cli::try_parse_from(["berth", "install", "myapp", "-u", "1"]).is_err());
        assert!(Cli::try_parse_from(["berth", "install", "myapp", "-p", "ghost"]).is_err());
    }

    #[test]
    fn timeout_needs_wait() {
        let parsed = Cli::try_parse_from([
            "berth", "install", "myapp", "-p", "ghost", "-u", "1", "--timeout-secs", "5",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn check_subcommands_parse() {
        let cli = Cli::try_parse_from(["berth", "check", "orchestrator", "-c", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Check(CheckCommand::Orchestrator(_))
        ));
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["berth", "-vv", "list", "-u", "1"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
