//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use emmc_boot_update::{Severity, UpdateError, UpdatePlan, UpdateReport};
use serde::Serialize;
use serde_json::json;

use crate::error::{CliError, error_type_name};

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let update = error.downcast_ref::<UpdateError>();
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error),
            "phase": update.map(|e| e.phase().to_string()),
            "severity": update.map(|e| e.severity().to_string()),
            "os_error": update.and_then(UpdateError::raw_os_error),
            "image_written": update.is_some_and(UpdateError::image_written),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
///
/// One line. The library messages already carry the system error, so the
/// source chain is not repeated.
pub fn print_error_human(error: &Error) {
    let critical = error
        .downcast_ref::<UpdateError>()
        .is_some_and(|e| e.severity() == Severity::Critical);
    let label = if critical {
        "CRITICAL:".magenta().bold()
    } else {
        "Error:".red().bold()
    };
    eprintln!("{} {}", label, error);
}

/// Announce the write before it starts
pub fn print_installing(plan: &UpdatePlan, json: bool) {
    if !json {
        println!("Installing new firmware on {}", plan.target_node.display());
    }
}

/// Print the outcome of a completed update
pub fn print_report(report: &UpdateReport, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(&json!({
            "success": true,
            "report": report,
        }));
    }

    println!(
        "{}",
        format!(
            "Selected boot partition {} for the next boot",
            report.selected.index()
        )
        .green()
    );
    Ok(())
}

/// Print the plan of a dry run
pub fn print_plan(plan: &UpdatePlan, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(&json!({
            "success": true,
            "dry_run": true,
            "plan": plan,
        }));
    }

    println!("{}", "Boot partition status:".bold());
    println!("  Active:           {}", plan.active);
    println!("  Target:           {}", plan.target);
    println!("  PARTITION_CONFIG: {}", plan.partition_config);
    println!(
        "{} {}",
        "Dry run:".yellow(),
        format!("would install firmware on {}", plan.target_node.display()).dimmed()
    );
    Ok(())
}
