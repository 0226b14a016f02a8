//! Terminal output for build records

use anyhow::Result;
use colored::*;
use imprint_core::domain::build::BuildRecord;

/// Print build records as a summary or as JSON
pub fn print_builds(builds: &[BuildRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(builds)?);
        return Ok(());
    }

    if builds.is_empty() {
        println!("{}", "No builds registered.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} build(s):", builds.len()).bold());
    println!();
    for build in builds {
        print_build_summary(build);
    }

    Ok(())
}

/// Print a build summary
fn print_build_summary(build: &BuildRecord) {
    println!("  {} {}", "▸".cyan(), build.component_type.bold());
    println!("    Status:       {}", colorize_status(build));
    println!(
        "    Remote ID:    {}",
        build.remote_id.as_deref().unwrap_or("-").dimmed()
    );
    if let Some(completed_at) = build.completed_at {
        println!(
            "    Completed:    {}",
            completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    if build.labels.is_empty() {
        println!("    Labels:       {}", "none".dimmed());
    } else {
        println!("    Labels:");
        let mut labels: Vec<_> = build.labels.iter().collect();
        labels.sort();
        for (key, value) in labels {
            println!("      {} = {}", key.cyan(), value);
        }
    }
    println!();
}

/// Colorize build status for display
fn colorize_status(build: &BuildRecord) -> ColoredString {
    if build.done {
        "done".green()
    } else if build.is_registered_remotely() {
        "pending".yellow()
    } else {
        "unregistered".red()
    }
}
