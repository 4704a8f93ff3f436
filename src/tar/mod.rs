//! Streaming tar container parsing.
//!
//! Snapshot archives are GNU tar streams: every entry starts with one
//! 512-byte header block followed by its content padded to a whole number of
//! blocks. Unlike a seekable reader, this module never sees the archive as a
//! whole; it is fed decompressed chunks in order and reports each entry once
//! all of its blocks have arrived.
//!
//! - [`structures`]: block constants and header field decoding
//! - [`parser`]: the incremental [`EntryParser`] state machine
//!
//! ## Limitations
//!
//! - Only the GNU `"ustar "` magic is accepted
//! - GNU long-name and PAX extension entries are delivered as ordinary entries
//! - Entries with a zero size are skipped regardless of their type flag

mod parser;
mod structures;

pub use parser::{Entry, EntryParser, ParserStats};
pub use structures::*;
