//! Error types shared by every stage of the scan pipeline.
//!
//! Only fatal conditions live here. A truncated account list inside an entry
//! and a cooperative stop are ordinary outcomes and are reported through
//! [`DecodeOutcome`](crate::accounts::DecodeOutcome) and
//! [`PumpOutcome`](crate::decompress::PumpOutcome) instead.

use std::io;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal errors that abort a snapshot scan.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte source could not be opened.
    #[error("unable to open snapshot source {location}: {source}")]
    Open {
        location: String,
        #[source]
        source: io::Error,
    },

    /// Reading from an already opened byte source failed.
    #[error("read failed at compressed offset {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// The decompressor context could not be created.
    #[error("unable to initialise decompressor: {0}")]
    DecompressionContext(String),

    /// The compressed stream is corrupt.
    #[error("decompression failed at compressed offset {offset}: {message}")]
    Decompress { offset: u64, message: String },

    /// Input ended while the decompressor was still inside a frame.
    #[error("EOF before end of stream: {pending} bytes still expected")]
    TruncatedStream { pending: usize },

    /// A container header failed validation.
    #[error("malformed archive header at offset {offset}: {message}")]
    Format { offset: u64, message: String },
}

impl Error {
    /// Short, stable name of the error kind used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Open { .. } | Error::Read { .. } => "IOError",
            Error::DecompressionContext(_) => "DecompressionContextError",
            Error::Decompress { .. } => "DecompressError",
            Error::TruncatedStream { .. } => "TruncatedStream",
            Error::Format { .. } => "FormatError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_error_variants() {
        let err = Error::Format {
            offset: 1024,
            message: "bad magic".into(),
        };
        assert_eq!(err.kind(), "FormatError");
        assert_eq!(
            err.to_string(),
            "malformed archive header at offset 1024: bad magic"
        );

        let err = Error::Read {
            offset: 7,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "gone"),
        };
        assert_eq!(err.kind(), "IOError");
        assert_eq!(Error::TruncatedStream { pending: 3 }.kind(), "TruncatedStream");
    }
}
