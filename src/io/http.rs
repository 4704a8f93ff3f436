use async_trait::async_trait;
use reqwest::header::RANGE;
use reqwest::{Client, Response, StatusCode};
use std::io;
use std::time::Duration;
use tracing::warn;

use super::ByteSource;
use crate::error::{Error, Result};

/// Streaming HTTP source for remote snapshot archives
///
/// The archive is fetched with a single GET and read as it arrives. If the
/// connection drops mid-body, the download resumes from the last received
/// byte with a `Range` request.
pub struct HttpSource {
    client: Client,
    url: String,
    response: Option<Response>,
    size: Option<u64>,
    /// Body bytes received from the network so far
    received: u64,
    leftover: Vec<u8>,
    leftover_pos: usize,
    max_retry: u32,
    backoff: Duration,
}

impl HttpSource {
    /// Open the URL with a GET request
    pub async fn open(url: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .read_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Open {
                location: url.to_string(),
                source: io::Error::other(e),
            })?;
        Self::open_with(client, url).await
    }

    /// Open the URL with a caller-configured client
    pub async fn open_with(client: Client, url: &str) -> Result<Self> {
        let open_error = |source: io::Error| Error::Open {
            location: url.to_string(),
            source,
        };

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| open_error(io::Error::other(e)))?;

        if !response.status().is_success() {
            return Err(open_error(io::Error::other(format!(
                "HTTP request failed with status: {}",
                response.status()
            ))));
        }

        let size = response.content_length();
        Ok(Self {
            client,
            url: url.to_string(),
            response: Some(response),
            size,
            received: 0,
            leftover: Vec::new(),
            leftover_pos: 0,
            max_retry: 10,
            backoff: Duration::from_millis(500),
        })
    }

    /// Set the retry limit and the base delay between retries
    pub fn with_retry(mut self, max_retry: u32, backoff: Duration) -> Self {
        self.max_retry = max_retry;
        self.backoff = backoff;
        self
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.received
    }

    /// Re-request the body starting at the first byte not yet received.
    ///
    /// Failed reconnects count against the same retry budget as the error
    /// that dropped the stream. Returns the updated retry count.
    async fn resume(&mut self, mut retry_count: u32, mut cause: reqwest::Error) -> io::Result<u32> {
        loop {
            retry_count += 1;
            if retry_count >= self.max_retry {
                return Err(io::Error::other(format!("max retries exceeded: {cause}")));
            }
            warn!(
                url = %self.url,
                offset = self.received,
                "connection error, retry {}/{}: {}",
                retry_count,
                self.max_retry,
                cause
            );
            tokio::time::sleep(self.backoff * retry_count).await;

            let range = format!("bytes={}-", self.received);
            match self.client.get(&self.url).header(RANGE, &range).send().await {
                Ok(response) if response.status() == StatusCode::PARTIAL_CONTENT => {
                    self.response = Some(response);
                    return Ok(retry_count);
                }
                Ok(response) => {
                    return Err(io::Error::other(format!(
                        "cannot resume download, HTTP status: {}",
                        response.status()
                    )));
                }
                Err(e) if is_retryable(&e) || e.is_request() => cause = e,
                Err(e) => return Err(io::Error::other(e)),
            }
        }
    }
}

fn is_retryable(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body()
}

#[async_trait]
impl ByteSource for HttpSource {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut retry_count = 0;
        while self.leftover_pos >= self.leftover.len() {
            let Some(response) = self.response.as_mut() else {
                return Ok(0);
            };

            match response.chunk().await {
                Ok(Some(bytes)) => {
                    self.received += bytes.len() as u64;
                    self.leftover.clear();
                    self.leftover.extend_from_slice(&bytes);
                    self.leftover_pos = 0;
                }
                Ok(None) => {
                    self.response = None;
                    return Ok(0);
                }
                Err(e) if is_retryable(&e) => {
                    self.response = None;
                    retry_count = self.resume(retry_count, e).await?;
                }
                Err(e) => return Err(io::Error::other(e)),
            }
        }

        let available = &self.leftover[self.leftover_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.leftover_pos += n;
        Ok(n)
    }

    fn location(&self) -> &str {
        &self.url
    }

    fn size_hint(&self) -> Option<u64> {
        self.size
    }
}
