//! Static document retrieval for `--url` and `{ "url": ... }` requests.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use pinpoint_config::PinpointConfig;
use reqwest::{Client, Url};
use tracing::debug;

/// Where documents come from when a request names a URL instead of inline HTML.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET of the served markup. Scripts are not run.
pub struct HttpFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &PinpointConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(config.fetch_timeout_secs()))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            max_bytes: config.max_document_bytes(),
        })
    }
}

#[async_trait]
impl DocumentSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Unsupported URL scheme '{}'", parsed.scheme());
        }

        debug!(url = %parsed, "Fetching document");
        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("{url} returned {status}");
        }
        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                bail!("{url} is {length} bytes, over the {} byte limit", self.max_bytes);
            }
        }

        // Chunked responses carry no length up front.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.context("Failed to read response body")? {
            if body.len() + chunk.len() > self.max_bytes {
                bail!("{url} exceeds the {} byte limit", self.max_bytes);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint_config::EngineSettings;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server answering with a chunked body and no Content-Length.
    async fn serve_chunked(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ntransfer-encoding: chunked\r\n\r\n";
            let _ = socket.write_all(head.as_bytes()).await;
            for chunk in body.chunks(512) {
                let _ = socket.write_all(format!("{:x}\r\n", chunk.len()).as_bytes()).await;
                let _ = socket.write_all(chunk).await;
                let _ = socket.write_all(b"\r\n").await;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        });
        format!("http://{addr}/")
    }

    fn fetcher(max_document_bytes: usize) -> HttpFetcher {
        let mut config = PinpointConfig::default();
        config.engine = Some(EngineSettings {
            max_document_bytes: Some(max_document_bytes),
            ..Default::default()
        });
        HttpFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn chunked_bodies_are_capped() {
        let page = format!("<p>{}</p>", "x".repeat(4096)).into_bytes();

        let url = serve_chunked(page.clone()).await;
        let err = fetcher(1024).fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("byte limit"));

        let url = serve_chunked(page).await;
        let html = fetcher(8192).fetch(&url).await.unwrap();
        assert!(html.starts_with("<p>xxx"));
        assert_eq!(html.len(), 4096 + 7);
    }

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let fetcher = HttpFetcher::new(&PinpointConfig::default()).unwrap();
        let err = fetcher.fetch("file:///etc/passwd").await.unwrap_err();
        assert!(err.to_string().contains("scheme"));
        assert!(fetcher.fetch("not a url").await.is_err());
    }
}
