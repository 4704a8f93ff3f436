use super::ByteSource;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::error::{Error, Result};

/// Local snapshot file read front to back
pub struct LocalFileSource {
    file: tokio::fs::File,
    location: String,
    size: u64,
}

impl LocalFileSource {
    pub async fn open(path: &Path) -> Result<Self> {
        let location = path.display().to_string();
        let open_error = |source: std::io::Error| Error::Open {
            location: location.clone(),
            source,
        };
        let file = tokio::fs::File::open(path).await.map_err(open_error)?;
        let size = file.metadata().await.map_err(open_error)?.len();
        Ok(Self {
            file,
            location,
            size,
        })
    }
}

#[async_trait]
impl ByteSource for LocalFileSource {
    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf).await
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_file_to_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"snapshot bytes").unwrap();

        let mut source = LocalFileSource::open(file.path()).await.unwrap();
        assert_eq!(source.size_hint(), Some(14));

        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            let n = source.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"snapshot bytes");
    }

    #[tokio::test]
    async fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.tar.zst");
        match LocalFileSource::open(&path).await {
            Err(Error::Open { location, .. }) => assert!(location.ends_with("missing.tar.zst")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a missing file"),
        }
    }
}
