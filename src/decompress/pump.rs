use std::ops::ControlFlow;

use tracing::debug;

use super::Decompressor;
use crate::error::{Error, Result};
use crate::io::ByteSource;

/// How a pump run ended, with transfer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpOutcome {
    /// Compressed bytes read from the source.
    pub compressed_bytes: u64,
    /// Decompressed bytes handed to the consumer.
    pub decompressed_bytes: u64,
    /// Compression frames completed.
    pub frames: u64,
    /// True if the consumer asked to stop before the source was exhausted.
    pub stopped: bool,
}

/// Pulls raw bytes from a source, decompresses them and pushes every
/// decompressed span to a consumer.
///
/// Staging buffers are allocated once, sized from the decompressor's
/// recommended input and output sizes.
pub struct DecompressionPump<S, D> {
    source: S,
    decompressor: D,
    input: Vec<u8>,
    output: Vec<u8>,
}

impl<S: ByteSource, D: Decompressor> DecompressionPump<S, D> {
    pub fn new(source: S, decompressor: D) -> Self {
        let input = vec![0u8; decompressor.input_size().max(1)];
        let output = vec![0u8; decompressor.output_size().max(1)];
        Self {
            source,
            decompressor,
            input,
            output,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Run until the source is exhausted or the consumer breaks.
    ///
    /// `consumer` receives each nonzero span of decompressed output; the span
    /// is only valid for the duration of the call. Returning
    /// [`ControlFlow::Break`] stops reading and the run succeeds with
    /// [`PumpOutcome::stopped`] set. An error from the consumer aborts the
    /// run and is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::Read`] if the source fails
    /// - [`Error::Decompress`] if the compressed data is corrupt
    /// - [`Error::TruncatedStream`] if the source ends inside a frame
    pub async fn run<F>(&mut self, mut consumer: F) -> Result<PumpOutcome>
    where
        F: FnMut(&[u8]) -> Result<ControlFlow<()>>,
    {
        let mut outcome = PumpOutcome::default();
        let mut pending = 0usize;

        loop {
            let read = self
                .source
                .read(&mut self.input)
                .await
                .map_err(|source| Error::Read {
                    offset: outcome.compressed_bytes,
                    source,
                })?;
            if read == 0 {
                break;
            }
            let chunk_offset = outcome.compressed_bytes;
            outcome.compressed_bytes += read as u64;

            // Drain all output this input can produce before reading again.
            let mut consumed = 0;
            loop {
                let status = self
                    .decompressor
                    .decompress(&self.input[consumed..read], &mut self.output)
                    .map_err(|e| Error::Decompress {
                        offset: chunk_offset + consumed as u64,
                        message: e.to_string(),
                    })?;
                let produced = status.bytes_produced();

                if status.bytes_consumed() == 0 && produced == 0 {
                    if consumed < read {
                        return Err(Error::Decompress {
                            offset: chunk_offset + consumed as u64,
                            message: "decompressor made no progress".to_string(),
                        });
                    }
                    break;
                }

                consumed += status.bytes_consumed();
                pending = status.pending();
                if status.is_frame_end() {
                    outcome.frames += 1;
                }

                if produced > 0 {
                    outcome.decompressed_bytes += produced as u64;
                    if consumer(&self.output[..produced])?.is_break() {
                        debug!(
                            compressed = outcome.compressed_bytes,
                            decompressed = outcome.decompressed_bytes,
                            "consumer requested stop"
                        );
                        outcome.stopped = true;
                        return Ok(outcome);
                    }
                }

                // A full output buffer may leave data buffered in the decompressor.
                if consumed >= read && produced < self.output.len() {
                    break;
                }
            }
        }

        if pending != 0 {
            return Err(Error::TruncatedStream { pending });
        }
        debug!(
            compressed = outcome.compressed_bytes,
            decompressed = outcome.decompressed_bytes,
            frames = outcome.frames,
            "source exhausted"
        );
        Ok(outcome)
    }
}
