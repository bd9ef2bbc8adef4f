//! In-memory feed sources for tests.
use std::io;

use async_trait::async_trait;

use super::{FeedSource, FeedUrl, TransportError};

const STUB_BASE_URL: &str = "https://example.org/cdragon/tft/";

/// Stub [`FeedSource`] returning fixed bytes.
#[derive(Debug, Clone)]
pub struct StubFeedSource {
    url: FeedUrl,
    body: Vec<u8>,
}

impl StubFeedSource {
    /// Serve `body` from an `example.org` URL.
    ///
    /// # Panics
    /// Never in practice: the stub URL is a valid constant.
    #[must_use]
    pub fn new(body: Vec<u8>) -> Self {
        let url = FeedUrl::new(STUB_BASE_URL, "en_us").expect("stub url is valid");
        Self { url, body }
    }
}

#[async_trait(?Send)]
impl FeedSource for StubFeedSource {
    fn url(&self) -> &FeedUrl {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<u8>, TransportError> {
        Ok(self.body.clone())
    }
}

/// Source whose fetch always fails at the network layer.
#[derive(Debug, Clone)]
pub struct FailingFeedSource {
    url: FeedUrl,
}

impl FailingFeedSource {
    /// # Panics
    /// Never in practice: the stub URL is a valid constant.
    #[must_use]
    pub fn new() -> Self {
        let url = FeedUrl::new(STUB_BASE_URL, "en_us").expect("stub url is valid");
        Self { url }
    }
}

impl Default for FailingFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl FeedSource for FailingFeedSource {
    fn url(&self) -> &FeedUrl {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Network {
            url: self.url.to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        })
    }
}
