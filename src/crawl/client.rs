// src/crawl/client.rs
// =============================================================================
// HTTP access with one connection at a time and a pause between requests.
//
// Both page fetches (HTML we parse) and file downloads (bytes we save) go
// through `PoliteClient`, so they share the same ConnectionTimer: wait for
// the slot, do the request, read the whole body, then re-arm the timer.
//
// No retries: a failed request is returned to the caller as is.
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Context};
use futures::StreamExt;
use reqwest::Client;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use url::Url;

use super::timer::ConnectionTimer;
use crate::error::{PageRole, ScrapeError};

pub struct PoliteClient {
    client: Client,
    timer: ConnectionTimer,
    connection_wait: Duration,
    requests: usize,
}

impl PoliteClient {
    /// Wraps a ready-to-use reqwest client. The first request goes out
    /// immediately, the following ones `connection_wait` after the previous
    /// body was fully read.
    pub fn new(client: Client, connection_wait: Duration) -> Self {
        Self {
            client,
            timer: ConnectionTimer::new(),
            connection_wait,
            requests: 0,
        }
    }

    /// How many requests went out so far
    pub fn requests_made(&self) -> usize {
        self.requests
    }

    /// Fetches an HTML page as text.
    pub async fn fetch_page(&mut self, url: &Url, role: &PageRole) -> Result<String, ScrapeError> {
        self.timer.wait().await;
        self.requests += 1;
        debug!(%url, %role, "fetching page");

        let result = self.read_page(url, role).await;
        self.timer.reset(self.connection_wait);
        result
    }

    async fn read_page(&self, url: &Url, role: &PageRole) -> Result<String, ScrapeError> {
        let fetch_error = |source| ScrapeError::Fetch {
            url: url.to_string(),
            role: role.clone(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                role: role.clone(),
                status,
            });
        }

        response.text().await.map_err(fetch_error)
    }

    /// Streams the body of `url` into `out` and returns the number of bytes
    /// written.
    pub async fn download_to<W>(&mut self, url: &Url, out: &mut W) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        self.timer.wait().await;
        self.requests += 1;
        info!(%url, "downloading");

        let result = self.stream_body(url, out).await;
        self.timer.reset(self.connection_wait);
        result
    }

    async fn stream_body<W>(&self, url: &Url, out: &mut W) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("while getting {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("while getting {}: HTTP {}", url, status));
        }

        let mut body = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.with_context(|| format!("while reading {}", url))?;
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;

        debug!(%url, bytes = written, "download finished");
        Ok(written)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why reset the timer even when the request failed?
//    - The run stops on the first error anyway
//    - Resetting in one place keeps wait/reset paired for every request
//
// 2. What is bytes_stream()?
//    - The response body as a stream of chunks
//    - We write each chunk as it arrives instead of holding the whole
//      file in memory
//
// 3. Why is download_to generic over W: AsyncWrite?
//    - Real downloads write to a tokio::fs::File
//    - Tests write to a Vec<u8>, no temp files needed
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with(path_str: &str, status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(path_str))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let server = server_with("/ebooks/a/b", 200, "<html>hi</html>").await;
        let mut client = PoliteClient::new(Client::new(), Duration::ZERO);

        let url = Url::parse(&format!("{}/ebooks/a/b", server.uri())).unwrap();
        let body = client.fetch_page(&url, &PageRole::Input).await.unwrap();

        assert_eq!(body, "<html>hi</html>");
        assert_eq!(client.requests_made(), 1);
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_is_error() {
        let server = server_with("/ebooks/a/b", 404, "").await;
        let mut client = PoliteClient::new(Client::new(), Duration::ZERO);

        let url = Url::parse(&format!("{}/ebooks/a/b", server.uri())).unwrap();
        let err = client.fetch_page(&url, &PageRole::Input).await.unwrap_err();

        match err {
            ScrapeError::HttpStatus { status, role, .. } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(role, PageRole::Input);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_requests_are_spaced() {
        let server = server_with("/page", 200, "ok").await;
        let mut client = PoliteClient::new(Client::new(), Duration::from_millis(150));
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();

        let start = std::time::Instant::now();
        for _ in 0..3 {
            client.fetch_page(&url, &PageRole::Input).await.unwrap();
        }

        // Two gaps between three requests
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_download_to_writes_body() {
        let server = server_with("/files/book.epub", 200, "EPUB BYTES").await;
        let mut client = PoliteClient::new(Client::new(), Duration::ZERO);
        let url = Url::parse(&format!("{}/files/book.epub", server.uri())).unwrap();

        let mut out = Vec::new();
        let written = client.download_to(&url, &mut out).await.unwrap();

        assert_eq!(written, 10);
        assert_eq!(out, b"EPUB BYTES");
    }

    #[tokio::test]
    async fn test_download_to_fails_on_server_error() {
        let server = server_with("/files/book.epub", 500, "").await;
        let mut client = PoliteClient::new(Client::new(), Duration::ZERO);
        let url = Url::parse(&format!("{}/files/book.epub", server.uri())).unwrap();

        let mut out = Vec::new();
        assert!(client.download_to(&url, &mut out).await.is_err());
        assert!(out.is_empty());
    }
}
