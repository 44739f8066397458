//! Output Formatting
//!
//! Utilities for formatting CLI output in various formats.

use crate::commands::OutputFormat;
use medverify_api::{HealthResponse, LoginResponse, LogsResponse, StatsResponse, VerifyResponse};
use medverify_store::SeedReport;
use serde::Serialize;

/// Print as JSON
fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error formatting JSON: {}", e),
    }
}

/// Print health response
pub fn print_health(health: &HealthResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(health),
        OutputFormat::Plain => println!("{}", health.status),
        OutputFormat::Table => {
            println!("MedVerify Service Health");
            println!("========================");
            print_row("Status:", &health.status);
            print_row("Version:", &health.version);
            print_row("Model:", &health.model_version);
            print_row("Uptime:", &format!("{}s", health.uptime_secs));
            println!();
            println!("Components:");
            for component in &health.components {
                print!("  - {}: {}", component.name, component.status);
                if let Some(msg) = &component.message {
                    print!(" ({})", msg);
                }
                println!();
            }
        }
    }
}

/// Print verify response
pub fn print_verify_result(result: &VerifyResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Plain => println!(
            "{}\t{:.2}\t{}",
            result.status_code, result.confidence, result.reason
        ),
        OutputFormat::Table => {
            println!("Verification Result");
            println!("===================");
            print_row("Status:", &result.status);
            print_row("Reason:", &result.reason);
            print_row("Confidence:", &format!("{:.1}%", result.confidence * 100.0));
            if let Some(batch) = &result.batch_info {
                println!();
                println!("Batch:");
                print_row("  Medicine:", &batch.name);
                print_row("  Manufacturer:", &batch.manufacturer);
                print_row("  Expires:", &batch.expiry_date.to_string());
                if let Some(made) = batch.manufacturing_date {
                    print_row("  Manufactured:", &made.to_string());
                }
                print_row("  Scans:", &batch.scan_count.to_string());
            }
            println!();
            print_row("Event ID:", &result.event_id);
            print_row("Timestamp:", &result.timestamp.to_rfc3339());
        }
    }
}

/// Print login response
pub fn print_login(result: &LoginResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Plain => {
            if let Some(token) = &result.token {
                println!("{}", token);
            }
        }
        OutputFormat::Table => {
            println!("{}", result.message);
            if let Some(token) = &result.token {
                print_row("Token:", token);
            }
            if let Some(expires_at) = result.expires_at {
                print_row("Expires:", &expires_at.to_rfc3339());
            }
        }
    }
}

/// Print log listing
pub fn print_logs(logs: &LogsResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(logs),
        OutputFormat::Plain => {
            for entry in &logs.logs {
                println!(
                    "{}\t{}\t{}\t{:.2}",
                    entry.timestamp.to_rfc3339(),
                    entry.batch_code,
                    entry.status,
                    entry.confidence
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<25} {:<14} {:<10} {:>6}  {}",
                "Timestamp", "Batch", "Status", "Conf", "Reason"
            );
            print_separator();
            for entry in &logs.logs {
                println!(
                    "{:<25} {:<14} {:<10} {:>6.2}  {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                    entry.batch_code,
                    entry.status,
                    entry.confidence,
                    entry.reason
                );
            }
            println!();
            println!("{} entries", logs.count);
        }
    }
}

/// Print stats response
pub fn print_stats(stats: &StatsResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table | OutputFormat::Plain => {
            println!("Verification Statistics");
            println!("=======================");
            print_row("Verifications:", &stats.total_verifications.to_string());
            print_row("Registered batches:", &stats.total_batches.to_string());
            println!();
            println!("By status:");
            for (status, count) in &stats.status_counts {
                print_row(&format!("  {}", status.display_label()), &count.to_string());
            }
            println!();
            println!("Daily:");
            for day in &stats.daily_counts {
                print_row(&format!("  {}", day.date), &day.count.to_string());
            }
        }
    }
}

/// Print seeding outcome
pub fn print_seed_report(report: &SeedReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table | OutputFormat::Plain => {
            println!("Seeded batch registry");
            print_row("Inserted:", &report.inserted.to_string());
            print_row("Already present:", &report.skipped.to_string());
            print_row("Expired:", &report.expired.to_string());
            print_row("Near expiry:", &report.near_expiry.to_string());
            print_row("Long dated:", &report.long_dated.to_string());
        }
    }
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("Warning: {}", message);
}

/// Print a table row
pub fn print_row(key: &str, value: &str) {
    println!("{:<20} {}", key, value);
}

/// Print a separator line
pub fn print_separator() {
    println!("{}", "-".repeat(72));
}
