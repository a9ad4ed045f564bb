//! gitlab-admin: reconcile GitLab protected-branch rules with a desired
//! configuration.
//!
//! The binary wires the pieces together: it parses arguments (with
//! `GITLAB_*` environment fallbacks), loads the TOML configuration, builds
//! the API client and hands control to `gitlab_admin_core::run`. Change
//! reports go to stdout; diagnostics go to tracing on stderr so the report
//! stream stays machine-friendly.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use config_manager::{Config, ConnectionOverrides, DEFAULT_CONFIG_FILENAME};
use gitlab_admin_core::RunSummary;
use gitlab_client::GitLabClient;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod errors;
use errors::Error;

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Environment variable consulted for a tracing filter before the `-v`
/// flags are considered.
const LOG_ENV_VAR: &str = "GITLAB_ADMIN_LOG";

/// Reconcile GitLab protected-branch rules with a desired configuration
#[derive(Debug, Parser)]
#[command(name = "gitlab-admin")]
#[command(about = "Reconcile GitLab protected-branch rules with a desired configuration", long_about = None)]
struct Cli {
    /// Do not change anything on the server, only report the deltas
    #[arg(long)]
    dry_run: bool,

    /// GitLab server entry from the configuration file to use
    #[arg(short, long, env = "GITLAB_SERVER")]
    server: Option<String>,

    /// GitLab private token
    #[arg(short, long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab group to reconcile
    #[arg(short, long, env = "GITLAB_GROUP")]
    group: Option<String>,

    /// GitLab host, e.g. https://gitlab.example.com
    #[arg(long, env = "GITLAB_HOST")]
    host: Option<String>,

    /// Configuration file
    #[arg(short, long, env = "GITLAB_CONFIG", default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Request timeout for remote calls, in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Disable TLS certificate verification
    #[arg(long)]
    insecure_skip_tls_verify: bool,

    /// Enable debug messages, may be passed multiple times
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Maps the `-v` count onto a default tracing filter.
fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbose)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn execute(cli: Cli) -> Result<RunSummary, Error> {
    let config = Config::load(&cli.config)?;
    let overrides = ConnectionOverrides {
        server: cli.server,
        host: cli.host,
        token: cli.token,
        group: cli.group,
    };
    let connection = config.resolve_connection(&overrides)?;

    let mut builder = GitLabClient::builder(&connection.host, &connection.token);
    if let Some(seconds) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    if cli.insecure_skip_tls_verify {
        builder = builder.accept_invalid_certs(true);
    }
    let client = builder.build()?;

    info!(
        host = %connection.host,
        group = %connection.group,
        dry_run = cli.dry_run,
        "starting gitlab-admin"
    );
    let summary = gitlab_admin_core::run(
        &client,
        &connection.group,
        &config.rules.protected_branches,
        cli.dry_run,
    )
    .await?;
    Ok(summary)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    // Initialize logging
    init_logging(cli.verbose);

    match execute(cli).await {
        Ok(summary) => {
            if dry_run && summary.changes() > 0 {
                println!(
                    "dry-run: {} change(s) pending on {} project(s)",
                    summary.changes(),
                    summary.projects_reconciled
                );
            }
            info!(
                groups = summary.groups_visited,
                projects = summary.projects_reconciled,
                changes = summary.changes(),
                "done"
            );
            std::process::exit(0);
        }
        Err(e) => {
            error!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
