use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use std::io;

use super::{FeedUrl, TransportError};

pub const DEFAULT_USER_AGENT: &str = "tft-data-loader/0.1";

/// Somewhere the raw feed document can be fetched from.
#[async_trait(?Send)]
pub trait FeedSource {
    /// Location of the document, used in logs and errors.
    fn url(&self) -> &FeedUrl;
    /// Fetch the complete document body.
    async fn fetch(&self) -> Result<Vec<u8>, TransportError>;
}

/// HTTP implementation of [`FeedSource`].
#[derive(Debug)]
pub struct HttpFeedSource {
    client: Client,
    url: FeedUrl,
    user_agent: String,
}

impl HttpFeedSource {
    /// Construct an HTTP-backed feed source.
    pub fn new(url: FeedUrl) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|source| TransportError::Client { source })?;
        Ok(Self {
            client,
            url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    /// Override the default user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait(?Send)]
impl FeedSource for HttpFeedSource {
    fn url(&self) -> &FeedUrl {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<u8>, TransportError> {
        let url = self.url.as_ref();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, url))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?;
        Ok(body.to_vec())
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
