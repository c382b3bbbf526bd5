//! Human-readable run summary.

use colored::Colorize;

use gcfsync_sync::{ListOutcome, PurgeOutcome, RunReport};

pub fn print(report: &RunReport) {
    match serde_json::to_string(report) {
        Ok(json) => tracing::debug!(report = %json, "run report"),
        Err(err) => tracing::warn!(error = %err, "could not serialise run report"),
    }

    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    for list in &report.lists {
        print_list(prefix, list);
    }
    if let Some(purge) = &report.purge {
        print_purge(prefix, purge);
    }
    for group in &report.missing_groups {
        println!("{prefix}{} group '{group}' not found", "!".yellow().bold());
    }
}

fn print_list(prefix: &str, list: &ListOutcome) {
    if list.added.is_empty() && list.removed.is_empty() {
        println!("{prefix}{} '{}' up to date", "✓".green().bold(), list.list_name);
        return;
    }

    println!(
        "{prefix}{} '{}' synced ({} added, {} removed)",
        "✓".green().bold(),
        list.list_name,
        list.added.len(),
        list.removed.len()
    );
    for identity in &list.added {
        println!("  +  {identity}");
    }
    for identity in &list.removed {
        println!("  -  {identity}");
    }
}

fn print_purge(prefix: &str, purge: &PurgeOutcome) {
    println!(
        "{prefix}{} {} stale, {} revoked, {} already gone",
        "✓".green().bold(),
        purge.stale.len(),
        purge.revoked.len(),
        purge.not_found.len()
    );
    for identity in &purge.stale {
        let marker = if purge.revoked.contains(identity) {
            "x"
        } else {
            "·"
        };
        println!("  {marker}  {identity}");
    }
}
