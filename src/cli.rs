use clap::{Parser, ValueEnum};

use crate::snapshot::ScanOptions;
use crate::tar::SizeRadix;

/// Compression applied to the snapshot archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    /// Zstandard frames (`.tar.zst`)
    Zstd,
    /// Plain tar
    None,
}

/// Radix of the tar header size fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RadixArg {
    Decimal,
    Octal,
}

impl From<RadixArg> for SizeRadix {
    fn from(value: RadixArg) -> Self {
        match value {
            RadixArg::Decimal => SizeRadix::Decimal,
            RadixArg::Octal => SizeRadix::Octal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "snapscan")]
#[command(version)]
#[command(about = "Stream a compressed ledger snapshot and summarise its accounts", long_about = None)]
#[command(after_help = "Examples:\n  \
  snapscan -s snapshot-100-abc.tar.zst            print an account summary\n  \
  snapscan -l -s snapshot.tar.zst --stop-after 10 list the first ten entries\n  \
  snapscan -v -s https://example.com/snapshot.tar.zst   print every account record")]
pub struct Cli {
    /// Snapshot archive path or HTTP URL
    #[arg(short = 's', long = "snapshotfile", value_name = "FILE")]
    pub snapshot_file: String,

    /// List entry names as they are read
    #[arg(short = 'l')]
    pub list: bool,

    /// Print every decoded account record
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Path prefix of entries holding account records
    #[arg(long, value_name = "PREFIX", default_value = "accounts/")]
    pub prefix: String,

    /// Radix of header size fields
    #[arg(long, value_enum, default_value_t = RadixArg::Decimal)]
    pub size_radix: RadixArg,

    /// Compression of the archive
    #[arg(long, value_enum, default_value_t = CompressionArg::Zstd)]
    pub compression: CompressionArg,

    /// Stop after this many entries
    #[arg(long, value_name = "N")]
    pub stop_after: Option<u64>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.snapshot_file.starts_with("http://") || self.snapshot_file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            account_prefix: self.prefix.clone(),
            size_radix: self.size_radix.into(),
        }
    }
}
