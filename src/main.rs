//! Main entry point for the snapscan CLI application.
//!
//! This binary streams a snapshot archive from the local filesystem or an
//! HTTP URL and prints a summary of the accounts it contains.

use anyhow::{Context, Result};
use clap::Parser;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use snapscan::accounts::AccountRecord;
use snapscan::cli::CompressionArg;
use snapscan::{
    ByteSource, Cli, DecodeOutcome, Decompressor, Entry, HttpSource, LocalFileSource, Passthrough,
    ScanReport, SnapshotScanner, SnapshotVisitor, Summary, ZstdDecompressor,
};

/// Application entry point.
///
/// Parses command-line arguments, opens the snapshot source and runs the scan.
/// Every stage runs on one thread; the only suspension point is the source read.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    if cli.is_http_url() {
        // Handle a remote snapshot streamed over HTTP
        let source = HttpSource::open(&cli.snapshot_file).await?;
        let source = process_snapshot(source, &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {}",
                format_size(source.transferred_bytes())
            );
        }
    } else {
        // Handle a local snapshot file
        let source = LocalFileSource::open(Path::new(&cli.snapshot_file)).await?;
        process_snapshot(source, &cli).await?;
    }

    Ok(())
}

/// Install the stderr log subscriber, honouring `RUST_LOG`.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.is_very_quiet() { "error" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Pick the decompressor requested on the command line and scan the source.
///
/// Returns the source so callers can inspect its transfer counters.
async fn process_snapshot<S: ByteSource>(source: S, cli: &Cli) -> Result<S> {
    match cli.compression {
        CompressionArg::Zstd => scan(source, ZstdDecompressor::new()?, cli).await,
        CompressionArg::None => scan(source, Passthrough::default(), cli).await,
    }
}

/// Run the scan and print the summary.
async fn scan<S: ByteSource, D: Decompressor>(source: S, decompressor: D, cli: &Cli) -> Result<S> {
    let location = source.location().to_string();
    let mut scanner = SnapshotScanner::new(source, decompressor, &cli.scan_options());
    let mut reporter = Reporter::new(cli);

    let report = match scanner.scan(&mut reporter).await {
        Ok(report) => report,
        Err(e) => {
            let kind = e.kind();
            return Err(e).with_context(|| format!("{kind} while scanning {location}"));
        }
    };

    info!(
        entries = reporter.summary.entries,
        accounts = reporter.summary.accounts,
        stopped = report.pump.stopped,
        "scan complete"
    );
    if !cli.is_very_quiet() {
        print_summary(&reporter.summary, &report);
    }

    Ok(scanner.into_source())
}

/// Visitor that prints entries and records as they are decoded and
/// accumulates the final [`Summary`].
struct Reporter<'a> {
    cli: &'a Cli,
    summary: Summary,
}

impl<'a> Reporter<'a> {
    fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            summary: Summary::new().stop_after(cli.stop_after),
        }
    }
}

impl SnapshotVisitor for Reporter<'_> {
    fn on_entry(&mut self, entry: &Entry<'_>) -> ControlFlow<()> {
        if self.cli.list || self.cli.verbose {
            println!("{}", entry.name);
        }
        self.summary.on_entry(entry)
    }

    fn on_account(&mut self, entry: &Entry<'_>, record: &AccountRecord) {
        if self.cli.verbose {
            println!(
                "  {:>8}  {}  owner={} lamports={} data_len={} executable={} rent_epoch={} write_version={} hash={}",
                record.offset,
                record.stored.pubkey,
                record.account.owner,
                record.account.lamports,
                record.stored.data_len,
                record.account.executable,
                record.account.rent_epoch,
                record.stored.write_version,
                record.hash
            );
        }
        self.summary.on_account(entry, record);
    }

    fn on_entry_end(&mut self, entry: &Entry<'_>, accounts: Option<&DecodeOutcome>) -> ControlFlow<()> {
        if let Some(outcome) = accounts
            && outcome.is_truncated()
            && !self.cli.is_quiet()
        {
            eprintln!(
                "Warning: {} ends with {} undecodable bytes after {} records",
                entry.name, outcome.trailing_bytes, outcome.records
            );
        }
        self.summary.on_entry_end(entry, accounts)
    }
}

/// Print the aggregate summary table.
fn print_summary(summary: &Summary, report: &ScanReport) {
    println!("{}", "-".repeat(60));
    println!(
        "{:<16}{} ({})",
        "Entries:",
        summary.entries,
        format_size(summary.entry_bytes)
    );
    println!(
        "{:<16}{} ({} truncated)",
        "Account files:", summary.account_entries, summary.truncated_entries
    );
    println!(
        "{:<16}{} ({} executable)",
        "Accounts:", summary.accounts, summary.executable_accounts
    );
    println!("{:<16}{}", "Lamports:", summary.lamports);
    println!("{:<16}{}", "Account data:", format_size(summary.data_bytes));
    println!(
        "{:<16}{} from {} in {} frames",
        "Decompressed:",
        format_size(report.pump.decompressed_bytes),
        format_size(report.pump.compressed_bytes),
        report.pump.frames
    );
    if report.pump.stopped {
        println!("{:<16}yes", "Stopped early:");
    }
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
