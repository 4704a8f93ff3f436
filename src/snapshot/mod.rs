//! End-to-end snapshot scanning.
//!
//! [`SnapshotScanner`] connects the three streaming stages:
//!
//! ```text
//! ByteSource -> DecompressionPump -> EntryParser -> AccountDecoder -> SnapshotVisitor
//! ```
//!
//! Nothing larger than one archive entry is ever held in memory. Every stage
//! runs on the caller's task; a visitor returning [`ControlFlow::Break`]
//! unwinds synchronously through the parser and the pump, and the scan ends
//! successfully.

mod summary;

pub use summary::Summary;

use std::ops::ControlFlow;

use tracing::{debug, warn};

use crate::accounts::{AccountDecoder, AccountRecord, DecodeOutcome};
use crate::decompress::{DecompressionPump, Decompressor, PumpOutcome};
use crate::error::Result;
use crate::io::ByteSource;
use crate::tar::{Entry, EntryParser, ParserStats, SizeRadix};

/// Library-level scan configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Entries whose path starts with this prefix are decoded as account files.
    pub account_prefix: String,
    /// Radix of header size fields.
    pub size_radix: SizeRadix,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            account_prefix: AccountDecoder::DEFAULT_PREFIX.to_string(),
            size_radix: SizeRadix::default(),
        }
    }
}

/// Receives entries and account records as a scan progresses.
///
/// All borrowed data is only valid for the duration of the call.
pub trait SnapshotVisitor {
    /// A complete entry is available. Breaking skips its accounts and ends the scan.
    fn on_entry(&mut self, _entry: &Entry<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// One account record decoded from `entry`, in layout order.
    fn on_account(&mut self, _entry: &Entry<'_>, _record: &AccountRecord) {}

    /// The entry has been fully processed. `accounts` is `None` for entries
    /// outside the account prefix. Breaking ends the scan.
    fn on_entry_end(&mut self, _entry: &Entry<'_>, _accounts: Option<&DecodeOutcome>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Counters reported at the end of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub pump: PumpOutcome,
    pub parser: ParserStats,
}

/// Streams one snapshot archive through the decode pipeline.
pub struct SnapshotScanner<S, D> {
    pump: DecompressionPump<S, D>,
    parser: EntryParser,
    decoder: AccountDecoder,
}

impl<S: ByteSource, D: Decompressor> SnapshotScanner<S, D> {
    pub fn new(source: S, decompressor: D, options: &ScanOptions) -> Self {
        Self {
            pump: DecompressionPump::new(source, decompressor),
            parser: EntryParser::new(options.size_radix),
            decoder: AccountDecoder::new(options.account_prefix.clone()),
        }
    }

    pub fn source(&self) -> &S {
        self.pump.source()
    }

    pub fn into_source(self) -> S {
        self.pump.into_source()
    }

    /// Scan the whole archive, reporting to `visitor`.
    ///
    /// # Errors
    ///
    /// Any fatal [`Error`](crate::Error) from the source, the decompressor or
    /// a malformed header. Truncated account files and visitor stops are not
    /// errors.
    pub async fn scan<V: SnapshotVisitor>(&mut self, visitor: &mut V) -> Result<ScanReport> {
        let Self {
            pump,
            parser,
            decoder,
        } = self;

        let outcome = pump
            .run(|chunk| {
                parser.feed(chunk, |entry| {
                    if visitor.on_entry(&entry).is_break() {
                        return ControlFlow::Break(());
                    }
                    let accounts = if decoder.matches(entry.name) {
                        Some(decoder.decode(entry.name, entry.body, |record| {
                            visitor.on_account(&entry, record)
                        }))
                    } else {
                        None
                    };
                    visitor.on_entry_end(&entry, accounts.as_ref())
                })
            })
            .await?;

        if !outcome.stopped && !parser.is_idle() {
            warn!(
                pending_entry = parser.pending_entry().unwrap_or("<header>"),
                "snapshot stream ended inside an archive entry"
            );
        }

        let report = ScanReport {
            pump: outcome,
            parser: parser.stats(),
        };
        debug!(?report, "scan finished");
        Ok(report)
    }
}
