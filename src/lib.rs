//! # snapscan
//!
//! Streaming scanner for compressed ledger snapshot archives.
//!
//! A snapshot is a tar archive, usually zstd-compressed, whose `accounts/`
//! entries hold packed account records. This library decodes such an archive
//! in a single forward pass without ever holding more than one entry in
//! memory, so multi-gigabyte snapshots can be summarised from a local file or
//! straight off an HTTP download.
//!
//! ## Pipeline
//!
//! - [`io`]: byte sources (local file, HTTP, memory)
//! - [`decompress`]: sans-IO decompressors and the [`DecompressionPump`]
//! - [`tar`]: the incremental [`EntryParser`]
//! - [`accounts`]: the [`AccountDecoder`] for account files
//! - [`snapshot`]: [`SnapshotScanner`], which connects all of the above
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use snapscan::{LocalFileSource, ScanOptions, SnapshotScanner, Summary, ZstdDecompressor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = LocalFileSource::open(Path::new("snapshot.tar.zst")).await?;
//!     let mut scanner = SnapshotScanner::new(source, ZstdDecompressor::new()?, &ScanOptions::default());
//!
//!     let mut summary = Summary::new();
//!     scanner.scan(&mut summary).await?;
//!     println!("{} accounts holding {} lamports", summary.accounts, summary.lamports);
//!
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod cli;
pub mod decompress;
pub mod error;
pub mod io;
pub mod snapshot;
pub mod tar;

pub use accounts::{AccountDecoder, AccountRecord, DecodeOutcome};
pub use cli::Cli;
pub use decompress::{DecompressionPump, Decompressor, Passthrough, PumpOutcome, ZstdDecompressor};
pub use error::{Error, Result};
pub use io::{ByteSource, HttpSource, LocalFileSource, MemorySource};
pub use snapshot::{ScanOptions, ScanReport, SnapshotScanner, SnapshotVisitor, Summary};
pub use tar::{Entry, EntryParser};
