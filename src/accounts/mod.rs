//! Account records nested inside snapshot account files.
//!
//! Entries under `accounts/` hold a packed sequence of fixed-layout account
//! records. This module decodes their metadata and skips the payloads; it
//! does not reconstruct account state or verify hashes.

mod decoder;
mod structures;

pub use decoder::{AccountDecoder, DecodeOutcome};
pub use structures::*;
