use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use invoice_sift::config::Config;
use invoice_sift::constants::DEFAULT_POLL_INTERVAL_MS;
use invoice_sift::server;
use invoice_sift::service::SiftService;
use invoice_sift::tasks::TaskState;
use invoice_sift::utils::{format_count, format_duration, setup_logging, system_memory_gb};

#[derive(Parser)]
#[command(name = "invoice-sift")]
#[command(about = "🧾 Invoice Sift: duplicate invoice detection for gzipped CSV exports")]
#[command(version)]
struct Args {
    #[arg(short, long, global = true, help = "Configuration file (defaults are used when omitted)")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one gzipped CSV file and write the flagged result
    Process {
        #[arg(short, long, help = "Input .gz file")]
        input: PathBuf,

        #[arg(short, long, help = "Output CSV file")]
        output: PathBuf,
    },
    /// Serve upload, status and download endpoints over HTTP
    Serve {
        #[arg(short, long, help = "Address to bind, overrides the configuration")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let verbosity = if args.verbose { "verbose" } else { config.logging.verbosity.as_str() };
    setup_logging(verbosity)?;

    let (total_gb, available_gb) = system_memory_gb();
    info!("Detected system memory: {:.2} GB total, {:.2} GB available", total_gb, available_gb);

    let service = Arc::new(SiftService::new(&config));

    match args.command {
        Command::Process { input, output } => process(&service, &input, &output).await,
        Command::Serve { bind } => {
            let bind_address = bind.unwrap_or_else(|| config.server.bind_address.clone());
            server::serve(service, &bind_address, config.max_upload_bytes()).await
        }
    }
}

async fn process(service: &SiftService, input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let start_time = Instant::now();
    println!("🔍 Input: {}", input.display());
    println!("📝 Output: {}", output.display());

    let task_id = service.submit_path(input).await?;
    println!("🚀 Task {} started", task_id);

    let mut last_reported = None;
    let snapshot = loop {
        let snapshot = service.poll(task_id)?;
        let current = (snapshot.progress, snapshot.message.clone());
        if last_reported.as_ref() != Some(&current) {
            println!("⏳ {} ({}%)", snapshot.message, snapshot.progress);
            last_reported = Some(current);
        }
        if snapshot.status.is_terminal() {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)).await;
    };

    if snapshot.status == TaskState::Error {
        anyhow::bail!(
            "{}",
            snapshot.error.unwrap_or_else(|| snapshot.message.clone())
        );
    }

    let summary = snapshot.summary.unwrap_or_default();
    match service.artifact_path(task_id) {
        Ok(artifact) => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(&artifact, output).await?;
        }
        Err(e) => println!("⚠️ No output written: {}", e),
    }

    println!("\n🎉 Processing completed successfully! 🎉");
    println!("=======================================");
    println!("📊 Input lines: {}", format_count(summary.total_input_lines));
    println!("✨ Lines processed: {}", format_count(summary.lines_processed));
    println!("🔁 CONCAT 1 duplicates: {}", format_count(summary.duplicates.header_po_date_amount));
    println!("🔁 CONCAT 2 duplicates: {}", format_count(summary.duplicates.vendor_year_amount));
    println!("🔁 CONCAT 3 duplicates: {}", format_count(summary.duplicates.header_po_amount));
    println!("⏱️ Processing time: {}", format_duration(start_time.elapsed()));

    Ok(())
}
