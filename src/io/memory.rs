use super::ByteSource;
use async_trait::async_trait;

/// In-memory byte source, optionally capped to a maximum size per read.
///
/// Useful for embedding and for exercising arbitrary read boundaries.
pub struct MemorySource {
    data: Vec<u8>,
    pos: usize,
    read_size: usize,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            read_size: usize::MAX,
        }
    }

    /// Deliver at most `read_size` bytes per read.
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size.max(1);
        self
    }

    /// Bytes handed out so far.
    pub fn position(&self) -> usize {
        self.pos
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf
            .len()
            .min(self.read_size)
            .min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn location(&self) -> &str {
        "<memory>"
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}
