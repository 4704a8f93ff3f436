//! Zstd decompression state machine using zstd-safe.
//!
//! This is a pure buffer-to-buffer operation with no I/O traits.

use std::io::{Error as IoError, Result};

use ::zstd::zstd_safe::{DCtx, InBuffer, OutBuffer, get_error_name};

use super::{Decompressor, StreamStatus};
use crate::error::Error;

/// Convert a zstd error code to an io::Error.
fn zstd_error(code: usize) -> IoError {
    IoError::other(get_error_name(code))
}

/// Streaming zstd decompressor.
///
/// Concatenated frames are handled transparently: the context resets itself
/// after each completed frame.
pub struct ZstdDecompressor {
    ctx: DCtx<'static>,
}

impl ZstdDecompressor {
    /// Create a new decompression context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecompressionContext`] if zstd cannot allocate one.
    pub fn new() -> crate::Result<Self> {
        let ctx = DCtx::try_create()
            .ok_or_else(|| Error::DecompressionContext("ZSTD_createDCtx() failed".to_string()))?;
        Ok(Self { ctx })
    }
}

impl Decompressor for ZstdDecompressor {
    fn input_size(&self) -> usize {
        DCtx::in_size()
    }

    fn output_size(&self) -> usize {
        DCtx::out_size()
    }

    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<StreamStatus> {
        let mut in_buf = InBuffer::around(input);
        let mut out_buf = OutBuffer::around(output);

        let hint = self
            .ctx
            .decompress_stream(&mut out_buf, &mut in_buf)
            .map_err(zstd_error)?;

        // hint == 0 means the frame is complete and flushed
        if hint == 0 {
            Ok(StreamStatus::FrameEnd {
                bytes_consumed: in_buf.pos(),
                bytes_produced: out_buf.pos(),
            })
        } else {
            Ok(StreamStatus::Progress {
                bytes_consumed: in_buf.pos(),
                bytes_produced: out_buf.pos(),
                pending: hint,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(decompressor: &mut ZstdDecompressor, input: &[u8]) -> (Vec<u8>, StreamStatus) {
        let mut out = Vec::new();
        let mut buf = vec![0u8; decompressor.output_size()];
        let mut pos = 0;
        loop {
            let status = decompressor.decompress(&input[pos..], &mut buf).unwrap();
            pos += status.bytes_consumed();
            out.extend_from_slice(&buf[..status.bytes_produced()]);
            if pos == input.len() && status.bytes_produced() < buf.len() {
                return (out, status);
            }
        }
    }

    #[test]
    fn recommended_sizes_are_nonzero() {
        let d = ZstdDecompressor::new().unwrap();
        assert!(d.input_size() > 0);
        assert!(d.output_size() > 0);
    }

    #[test]
    fn single_frame_ends_on_frame_boundary() {
        let data = b"hello world hello world hello world hello world".repeat(50);
        let compressed = ::zstd::encode_all(&data[..], 3).unwrap();

        let mut d = ZstdDecompressor::new().unwrap();
        let (out, status) = drain(&mut d, &compressed);
        assert_eq!(out, data);
        assert!(status.is_frame_end());
    }

    #[test]
    fn partial_frame_reports_pending_input() {
        let data = vec![42u8; 100_000];
        let compressed = ::zstd::encode_all(&data[..], 1).unwrap();

        let mut d = ZstdDecompressor::new().unwrap();
        let (_, status) = drain(&mut d, &compressed[..compressed.len() - 4]);
        assert!(status.pending() > 0);
    }

    #[test]
    fn garbage_is_an_error() {
        let mut d = ZstdDecompressor::new().unwrap();
        let mut out = vec![0u8; 64];
        assert!(d.decompress(b"definitely not zstd", &mut out).is_err());
    }
}
