//! google-cloudflare-sync: mirror Google Workspace group membership into
//! Cloudflare Zero Trust Gateway lists.
//!
//! # Usage
//!
//! ```text
//! google-cloudflare-sync --google_impersonate <admin> --google_groups a@x.com,b@x.com [--cf_list_name vpn-users]
//! google-cloudflare-sync --google_impersonate <admin> --google_groups_regex 'name:vpn*'
//! google-cloudflare-sync --google_impersonate <admin> --google_groups a@x.com --delete_stale
//! ```
//!
//! Every mode accepts `--dry_run` and `--debug`.

mod logging;
mod report;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::Colorize;

use gcfsync_cloudflare::GatewayClient;
use gcfsync_core::{DirectoryConfig, GatewayConfig, GroupSelector, SyncError};
use gcfsync_google::DirectoryClient;
use gcfsync_sync::{Reconciler, RunMode, DEFAULT_LIST_NAME};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "google-cloudflare-sync",
    version,
    disable_version_flag = true,
    about = "Sync Google Workspace groups into Cloudflare Zero Trust Gateway lists",
    long_about = None,
)]
struct Cli {
    /// Print the version and exit.
    #[arg(short = 'V', long)]
    version: bool,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,

    /// Revoke gateway seats of users no longer in --google_groups.
    #[arg(long = "delete_stale")]
    delete_stale: bool,

    /// Comma-separated list of group emails.
    #[arg(long = "google_groups", default_value = "")]
    google_groups: String,

    /// Directory search query; each matching group syncs into a list of the same name.
    #[arg(long = "google_groups_regex", default_value = "")]
    google_groups_regex: String,

    /// Admin user the service account acts on behalf of.
    #[arg(long = "google_impersonate", default_value = "")]
    google_impersonate: String,

    /// Gateway list to sync --google_groups into.
    #[arg(long = "cf_list_name", default_value = DEFAULT_LIST_NAME)]
    cf_list_name: String,

    /// Log the changes without applying them.
    #[arg(long = "dry_run")]
    dry_run: bool,
}

impl Cli {
    /// Checks clap cannot express on its own. Runs before any backend call.
    fn validate(&self) -> Result<RunMode, SyncError> {
        let selector = GroupSelector::from_flags(&self.google_groups, &self.google_groups_regex)?;
        if self.google_impersonate.trim().is_empty() {
            return Err(SyncError::Config(
                "google_impersonate is required".to_string(),
            ));
        }
        RunMode::select(selector, self.delete_stale, &self.cf_list_name)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let mode = match cli.validate() {
        Ok(mode) => mode,
        Err(err) => usage_error(&err),
    };

    // A missing .env is fine; the variables may come from the environment.
    let _ = dotenvy::dotenv();
    logging::init(cli.debug);

    let result = run(&cli, &mode);
    if let Err(err) = &result {
        let class = err.downcast_ref::<SyncError>().map(SyncError::class);
        tracing::error!(error = %format!("{err:#}"), class = ?class, "sync failed");
    }
    result
}

fn usage_error(err: &SyncError) -> ! {
    let reason = match err {
        SyncError::Config(reason) => reason.clone(),
        other => other.to_string(),
    };
    eprintln!("{} {reason}\n", "ERROR:".red().bold());
    eprintln!("{}", Cli::command().render_help());
    std::process::exit(1);
}

fn run(cli: &Cli, mode: &RunMode) -> Result<()> {
    let span = tracing::info_span!("run", mode = mode.label(), dry_run = cli.dry_run);

    let gateway_config = GatewayConfig::from_env().context("loading Cloudflare configuration")?;
    let directory_config = DirectoryConfig::from_env().context("loading Google configuration")?;

    let directory =
        DirectoryClient::connect(&directory_config, cli.google_impersonate.trim(), span.clone())
            .context("authenticating against the Google directory")?;
    let gateway = GatewayClient::new(&gateway_config, span.clone());

    let report = Reconciler::new(&directory, &gateway, span)
        .dry_run(cli.dry_run)
        .run(mode)
        .with_context(|| format!("{} run failed", mode.label()))?;

    report::print(&report);
    Ok(())
}
