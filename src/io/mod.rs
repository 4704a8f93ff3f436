mod http;
mod local;
mod memory;

pub use http::HttpSource;
pub use local::LocalFileSource;
pub use memory::MemorySource;

use async_trait::async_trait;

/// Trait for sequential reading from a snapshot byte source
#[async_trait]
pub trait ByteSource: Send {
    /// Read up to `buf.len()` bytes. Returns 0 at end of input.
    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Human-readable location of the source, used in diagnostics
    fn location(&self) -> &str;

    /// Total size of the source in bytes, if known up front
    fn size_hint(&self) -> Option<u64> {
        None
    }
}
