use log::info;
use tokio_util::sync::CancellationToken;

use super::{FeedError, FeedSource, RawFeed};

/// Decode a feed document.
///
/// The buffer is modified in place by the SIMD parser.
///
/// # Examples
/// ```
/// # use tft_data::feed::parse_feed;
/// let mut bytes = br#"{"items": null, "setData": [{"mutator": "TFTSet16"}]}"#.to_vec();
/// let feed = parse_feed(&mut bytes).expect("parse feed");
/// assert!(feed.items.is_empty());
/// assert_eq!(feed.set_data[0].mutator, "TFTSet16");
/// assert!(feed.set_data[0].champions.is_empty());
/// ```
pub fn parse_feed(bytes: &mut [u8]) -> Result<RawFeed, FeedError> {
    let first = bytes.iter().copied().find(|byte| !byte.is_ascii_whitespace());
    if first.is_some_and(|byte| byte != b'{') {
        return Err(FeedError::NotAnObject);
    }
    simd_json::serde::from_slice(bytes).map_err(|source| FeedError::Parse { source })
}

/// Fetch and decode the feed, giving up if `cancel` fires first.
pub async fn fetch_feed<S: FeedSource + ?Sized>(
    source: &S,
    cancel: &CancellationToken,
) -> Result<RawFeed, FeedError> {
    info!("fetching feed from {}", source.url());
    let mut bytes = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(FeedError::Cancelled),
        fetched = source.fetch() => fetched.map_err(|source| FeedError::Fetch { source })?,
    };
    info!("fetched {} bytes", bytes.len());
    parse_feed(&mut bytes)
}
