//! Command-line interface for CR-Unblocker
//!
//! # Usage
//!
//! ```bash
//! cr-unblock localize --host www.crunchyroll.com
//! cr-unblock localize --subdomain www. --extension .com
//! echo "$PASSWORD" | cr-unblock remember --username me@example.com
//! cr-unblock status
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use cr_unblocker::cli::{
    GlobalArgs,
    account::{run_logout, run_remember, run_reset, run_settings, run_status},
    localize::{LocalizeArgs, run_localize},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "cr-unblock")]
struct Cli {
    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding stored records and cookies
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Full host name of the page, e.g. www.crunchyroll.com
    #[arg(long)]
    host: Option<String>,

    /// Domain extension, e.g. .com
    #[arg(long, allow_hyphen_values = true)]
    extension: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a US session and write it into the site's cookies
    Localize {
        #[command(flatten)]
        target: TargetArgs,

        /// Subdomain including its trailing dot, e.g. www.
        #[arg(long, requires = "extension")]
        subdomain: Option<String>,
    },
    /// Allow the next localize to run immediately
    Reset,
    /// Forget the stored login, user and credentials
    Logout,
    /// Store credentials for automatic login; the password is read from stdin
    Remember {
        #[arg(short, long)]
        username: String,
    },
    /// Print the save-login and region-switch flags
    Settings,
    /// Print the cooldown and stored account state as JSON
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let global = GlobalArgs {
        config: cli.config,
        state_dir: cli.state_dir,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Localize { target, subdomain } => {
            let args = LocalizeArgs {
                host: target.host,
                subdomain,
                extension: target.extension,
            };
            run_localize(global, args).await
        }
        Commands::Reset => run_reset(global).await,
        Commands::Logout => run_logout(global).await,
        Commands::Remember { username } => run_remember(global, username).await,
        Commands::Settings => run_settings(global).await,
        Commands::Status => run_status(global).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_localize_with_host() {
        let cli = Cli::parse_from(["cr-unblock", "localize", "--host", "www.crunchyroll.com"]);

        match cli.command {
            Commands::Localize { target, subdomain } => {
                assert_eq!(target.host, Some("www.crunchyroll.com".to_string()));
                assert!(target.extension.is_none());
                assert!(subdomain.is_none());
            }
            _ => panic!("Expected localize subcommand"),
        }
    }

    #[test]
    fn test_localize_with_parts() {
        let cli = Cli::parse_from([
            "cr-unblock",
            "localize",
            "--subdomain",
            "www.",
            "--extension",
            ".com",
        ]);

        match cli.command {
            Commands::Localize { target, subdomain } => {
                assert_eq!(target.extension, Some(".com".to_string()));
                assert_eq!(subdomain, Some("www.".to_string()));
            }
            _ => panic!("Expected localize subcommand"),
        }
    }

    #[test]
    fn test_localize_target_conflicts() {
        assert!(Cli::try_parse_from(["cr-unblock", "localize"]).is_err());
        assert!(
            Cli::try_parse_from([
                "cr-unblock",
                "localize",
                "--host",
                "www.crunchyroll.com",
                "--extension",
                ".com"
            ])
            .is_err()
        );
        assert!(Cli::try_parse_from(["cr-unblock", "localize", "--subdomain", "www."]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cr-unblock", "status", "--state-dir", "/tmp/x", "-v"]);
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/x")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_remember_requires_username() {
        assert!(Cli::try_parse_from(["cr-unblock", "remember"]).is_err());
    }
}
