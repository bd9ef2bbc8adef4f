//! Fetching and decoding the Community Dragon TFT feed.
#![forbid(unsafe_code)]

mod error;
mod ops;
mod source;
mod types;

#[cfg(test)]
mod test_support;
#[cfg(test)]
pub use test_support::{FailingFeedSource, StubFeedSource};

pub use error::{FeedError, TransportError};
pub use ops::{fetch_feed, parse_feed};
pub use source::{DEFAULT_USER_AGENT, FeedSource, HttpFeedSource};
pub use types::{
    DEFAULT_BASE_URL, DEFAULT_LANGUAGE, FeedUrl, FeedUrlError, RawChampion, RawFeed, RawItem,
    RawSetRevision, RawTrait,
};
