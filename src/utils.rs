use anyhow::Result;
use std::time::Duration;
use sysinfo::System;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};
use crate::constants::{BYTES_PER_GB, SECONDS_PER_MINUTE};

pub fn setup_logging(verbosity: &str) -> Result<()> {
    let level = match verbosity {
        "silent" => Level::ERROR,
        "normal" => Level::INFO,
        "verbose" => Level::DEBUG,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("invoice_sift={}", level).parse()?);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Returns (total, available) system memory in GB.
pub fn system_memory_gb() -> (f64, f64) {
    let mut system = System::new();
    system.refresh_memory();

    (
        system.total_memory() as f64 / BYTES_PER_GB,
        system.available_memory() as f64 / BYTES_PER_GB,
    )
}

pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs_f64();
    if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else {
        format!("{:.1}h", seconds / 3600.0)
    }
}

/// Thousands-separated count, e.g. `1,250,000`.
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(ch);
    }
    formatted
}

/// Elapsed minutes rounded to two decimals, as reported on completed tasks.
pub fn elapsed_minutes(duration: Duration) -> f64 {
    (duration.as_secs_f64() / SECONDS_PER_MINUTE * 100.0).round() / 100.0
}
