//! Incremental tar entry parser.
//!
//! [`EntryParser`] is a push-driven state machine: decompressed bytes are
//! handed to [`EntryParser::feed`] in whatever chunk sizes the decompressor
//! produces, and every complete entry is passed to a callback as soon as its
//! last content block arrives. Chunk boundaries may fall anywhere, including
//! inside a header's size field, so both the header and the body are
//! accumulated across calls.
//!
//! ## Buffers
//!
//! The header accumulator is a fixed [`BLOCK_SIZE`] array. The body buffer is
//! a `Vec<u8>` that is resized only when an entry's rounded size exceeds its
//! current length, so a run of similarly sized entries reuses one allocation.

use std::ops::ControlFlow;

use tracing::{debug, trace};

use super::structures::{BLOCK_SIZE, EntryKind, SizeRadix, TarHeader, round_to_block};
use crate::error::{Error, Result};

/// One complete entry, borrowed from the parser for the duration of a callback.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Path stored in the header's name field.
    pub name: &'a str,
    /// Type flag of the header.
    pub kind: EntryKind,
    /// Entry content truncated to the logical size (block padding excluded).
    pub body: &'a [u8],
    /// Offset of the entry's header in the decompressed stream.
    pub offset: u64,
}

/// Counters describing what the parser has consumed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Entries handed to the callback.
    pub entries: u64,
    /// Headers declaring a zero size (directories and the like).
    pub empty_entries: u64,
    /// All-zero blocks, such as the end-of-archive marker.
    pub zero_blocks: u64,
    /// Total bytes fed to the parser.
    pub bytes_consumed: u64,
}

/// Entry whose body is being accumulated.
#[derive(Debug)]
struct Pending {
    header: TarHeader,
    rounded: usize,
    offset: u64,
}

#[derive(Debug)]
enum Phase {
    AwaitingHeader,
    AwaitingBody(Pending),
}

/// Push-driven parser that reassembles tar entries from arbitrary chunks.
#[derive(Debug)]
pub struct EntryParser {
    radix: SizeRadix,
    phase: Phase,
    /// Header accumulator, active in `AwaitingHeader`.
    header: [u8; BLOCK_SIZE],
    /// Body buffer, active in `AwaitingBody`. Its length only ever grows.
    body: Vec<u8>,
    /// Bytes filled in whichever buffer is active.
    filled: usize,
    stats: ParserStats,
}

impl Default for EntryParser {
    fn default() -> Self {
        Self::new(SizeRadix::default())
    }
}

impl EntryParser {
    pub fn new(radix: SizeRadix) -> Self {
        Self {
            radix,
            phase: Phase::AwaitingHeader,
            header: [0u8; BLOCK_SIZE],
            body: Vec::new(),
            filled: 0,
            stats: ParserStats::default(),
        }
    }

    /// Feed the next chunk of decompressed bytes.
    ///
    /// `on_entry` is invoked once per completed entry, in archive order.
    /// Returning [`ControlFlow::Break`] from it stops processing immediately
    /// (the rest of `chunk` is ignored) and is propagated to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if a header has the wrong magic or an
    /// unrepresentable size. The parser must not be fed again afterwards.
    pub fn feed<F>(&mut self, mut chunk: &[u8], mut on_entry: F) -> Result<ControlFlow<()>>
    where
        F: FnMut(Entry<'_>) -> ControlFlow<()>,
    {
        while !chunk.is_empty() {
            match std::mem::replace(&mut self.phase, Phase::AwaitingHeader) {
                Phase::AwaitingHeader => {
                    let taken = fill(&mut self.header, &mut self.filled, &mut chunk);
                    self.stats.bytes_consumed += taken as u64;
                    if self.filled < BLOCK_SIZE {
                        break;
                    }
                    self.filled = 0;
                    let offset = self.stats.bytes_consumed - BLOCK_SIZE as u64;
                    self.begin_entry(offset)?;
                }
                Phase::AwaitingBody(pending) => {
                    let taken = fill(
                        &mut self.body[..pending.rounded],
                        &mut self.filled,
                        &mut chunk,
                    );
                    self.stats.bytes_consumed += taken as u64;
                    if self.filled < pending.rounded {
                        self.phase = Phase::AwaitingBody(pending);
                        break;
                    }
                    self.filled = 0;
                    self.stats.entries += 1;

                    let entry = Entry {
                        name: &pending.header.name,
                        kind: pending.header.kind,
                        body: &self.body[..pending.header.size],
                        offset: pending.offset,
                    };
                    if on_entry(entry).is_break() {
                        debug!(name = %pending.header.name, "entry consumer requested stop");
                        return Ok(ControlFlow::Break(()));
                    }
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Interpret a freshly completed header block.
    fn begin_entry(&mut self, offset: u64) -> Result<()> {
        if TarHeader::is_zero_block(&self.header) {
            trace!(offset, "skipping zero block");
            self.stats.zero_blocks += 1;
            return Ok(());
        }

        let header = TarHeader::from_block(&self.header, self.radix).map_err(|e| Error::Format {
            offset,
            message: e.to_string(),
        })?;
        debug!(name = %header.name, size = header.size, offset, "entry header");

        if header.size == 0 {
            self.stats.empty_entries += 1;
            return Ok(());
        }

        let rounded = round_to_block(header.size).ok_or_else(|| Error::Format {
            offset,
            message: format!("entry size {} cannot be rounded to a block", header.size),
        })?;
        if self.body.len() < rounded {
            // The size field is untrusted; an impossible allocation is a header fault.
            self.body
                .try_reserve_exact(rounded - self.body.len())
                .map_err(|e| Error::Format {
                    offset,
                    message: format!("cannot buffer entry of {} bytes: {e}", header.size),
                })?;
            self.body.resize(rounded, 0);
        }
        self.phase = Phase::AwaitingBody(Pending {
            header,
            rounded,
            offset,
        });
        Ok(())
    }

    /// True when the parser sits exactly on an entry boundary.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::AwaitingHeader) && self.filled == 0
    }

    /// Name of the entry whose body is partially accumulated, if any.
    pub fn pending_entry(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingBody(pending) => Some(&pending.header.name),
            Phase::AwaitingHeader => None,
        }
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Current size of the body buffer (its high-water mark).
    pub fn body_capacity(&self) -> usize {
        self.body.len()
    }
}

/// Copy as much of `chunk` into `target[*filled..]` as fits, advancing both.
fn fill(target: &mut [u8], filled: &mut usize, chunk: &mut &[u8]) -> usize {
    let take = (target.len() - *filled).min(chunk.len());
    target[*filled..*filled + take].copy_from_slice(&chunk[..take]);
    *filled += take;
    *chunk = &chunk[take..];
    take
}
