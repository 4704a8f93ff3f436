//! Streaming decompression.
//!
//! Decompressors are sans-IO state machines: they turn an input slice into
//! an output slice and report how far they got. The [`DecompressionPump`]
//! drives one of them from a [`ByteSource`](crate::io::ByteSource) and pushes
//! every decompressed span to a consumer.
//!
//! - [`ZstdDecompressor`]: zstd frames, possibly concatenated
//! - [`Passthrough`]: uncompressed input, copied through unchanged

use std::io::Result;

mod pump;
mod zstd;

pub use self::pump::{DecompressionPump, PumpOutcome};
pub use self::zstd::ZstdDecompressor;

/// Status returned by a single [`Decompressor::decompress`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Made progress; the current frame still expects `pending` more input bytes.
    Progress {
        bytes_consumed: usize,
        bytes_produced: usize,
        pending: usize,
    },
    /// The current frame was completed and fully flushed.
    FrameEnd {
        bytes_consumed: usize,
        bytes_produced: usize,
    },
}

impl StreamStatus {
    pub fn bytes_consumed(&self) -> usize {
        match *self {
            StreamStatus::Progress { bytes_consumed, .. }
            | StreamStatus::FrameEnd { bytes_consumed, .. } => bytes_consumed,
        }
    }

    pub fn bytes_produced(&self) -> usize {
        match *self {
            StreamStatus::Progress { bytes_produced, .. }
            | StreamStatus::FrameEnd { bytes_produced, .. } => bytes_produced,
        }
    }

    /// Input still expected by the current frame; zero on a frame boundary.
    pub fn pending(&self) -> usize {
        match *self {
            StreamStatus::Progress { pending, .. } => pending,
            StreamStatus::FrameEnd { .. } => 0,
        }
    }

    pub fn is_frame_end(&self) -> bool {
        matches!(self, StreamStatus::FrameEnd { .. })
    }
}

/// A streaming decompressor with fixed recommended buffer sizes.
pub trait Decompressor {
    /// Recommended size of each input read.
    fn input_size(&self) -> usize;

    /// Recommended size of the output buffer.
    fn output_size(&self) -> usize;

    /// Decompress as much of `input` into `output` as possible.
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<StreamStatus>;
}

/// Copies input to output unchanged, for archives stored without compression.
#[derive(Debug, Clone)]
pub struct Passthrough {
    buffer_size: usize,
}

impl Passthrough {
    pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }
}

impl Default for Passthrough {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_SIZE)
    }
}

impl Decompressor for Passthrough {
    fn input_size(&self) -> usize {
        self.buffer_size
    }

    fn output_size(&self) -> usize {
        self.buffer_size
    }

    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<StreamStatus> {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        Ok(StreamStatus::FrameEnd {
            bytes_consumed: n,
            bytes_produced: n,
        })
    }
}
