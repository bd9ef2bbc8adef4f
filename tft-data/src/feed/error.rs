//! Error types produced while fetching and decoding the feed.

use std::io;

use thiserror::Error;

/// Errors that abort a load before any stored row is touched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedError {
    /// The feed could not be downloaded.
    #[error("failed to fetch feed: {source}")]
    Fetch {
        #[source]
        source: TransportError,
    },
    /// The document was not valid JSON.
    #[error("failed to parse feed document: {source}")]
    Parse {
        #[source]
        source: simd_json::Error,
    },
    /// The document parsed but its top level was not an object.
    #[error("feed document must be a JSON object")]
    NotAnObject,
    /// The download was cancelled before it completed.
    #[error("feed download was cancelled")]
    Cancelled,
}

/// Transport-level errors encountered while issuing HTTP requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request failed before a response was received or while reading it.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}
