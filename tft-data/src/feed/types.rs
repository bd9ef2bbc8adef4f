//! Intermediate records decoded from the Community Dragon feed.
//!
//! Every field tolerates absence and explicit `null`, falling back to an empty
//! value, so that feed revisions which drop or null out a field never fail to
//! decode. Unknown fields are ignored.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

/// Decoded feed document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawFeed {
    /// Items and augments, undifferentiated.
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<RawItem>,
    /// Set label to metadata; carried through but never read downstream.
    #[serde(deserialize_with = "null_as_default")]
    pub sets: BTreeMap<String, Value>,
    /// Every historical set revision.
    #[serde(rename = "setData", deserialize_with = "null_as_default")]
    pub set_data: Vec<RawSetRevision>,
}

/// Item-like record; classification into item or augment happens later.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawItem {
    #[serde(deserialize_with = "null_as_default")]
    pub api_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub desc: Option<String>,
    pub icon: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub unique: bool,
    pub composition: Option<Value>,
    pub effects: Option<Value>,
    pub associated_traits: Option<Value>,
    pub incompatible_traits: Option<Value>,
    pub tags: Option<Value>,
}

/// One historical set revision with its roster and allow-lists.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSetRevision {
    #[serde(deserialize_with = "null_as_default")]
    pub number: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mutator: String,
    #[serde(deserialize_with = "null_as_default")]
    pub champions: Vec<RawChampion>,
    #[serde(deserialize_with = "null_as_default")]
    pub traits: Vec<RawTrait>,
    /// Machine names of the items valid in this revision.
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<String>,
    /// Machine names of the augments valid in this revision.
    #[serde(deserialize_with = "null_as_default")]
    pub augments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawChampion {
    #[serde(deserialize_with = "null_as_default")]
    pub api_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub character_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cost: i64,
    pub role: Option<String>,
    pub icon: Option<String>,
    pub square_icon: Option<String>,
    pub tile_icon: Option<String>,
    /// Display names of the champion's traits.
    #[serde(deserialize_with = "null_as_default")]
    pub traits: Vec<String>,
    pub ability: Option<Value>,
    pub stats: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTrait {
    #[serde(deserialize_with = "null_as_default")]
    pub api_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub desc: Option<String>,
    pub icon: Option<String>,
    pub effects: Option<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Community Dragon directory holding the per-language TFT documents.
pub const DEFAULT_BASE_URL: &str = "https://raw.communitydragon.org/latest/cdragon/tft/";

/// Language code of the document fetched when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en_us";

/// Fully qualified URL of a language-specific feed document.
///
/// # Examples
/// ```
/// # use tft_data::feed::FeedUrl;
/// let url = FeedUrl::new("https://raw.communitydragon.org/latest/cdragon/tft", "en_us")
///     .expect("valid feed url");
/// assert_eq!(
///     url.as_ref(),
///     "https://raw.communitydragon.org/latest/cdragon/tft/en_us.json"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUrl(Url);

impl FeedUrl {
    /// Join `language` onto `base_url` as `{base_url}{language}.json`.
    ///
    /// A missing trailing slash on the base is added so the last path segment
    /// is kept.
    pub fn new(base_url: &str, language: &str) -> Result<Self, FeedUrlError> {
        let language = language.trim();
        if language.is_empty() || language.contains(['/', '?', '#']) {
            return Err(FeedUrlError::InvalidLanguage {
                language: language.to_owned(),
            });
        }

        let mut base = base_url.trim().to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        let parsed = Url::parse(&base).map_err(|source| FeedUrlError::InvalidBase {
            url: base.clone(),
            source,
        })?;
        let url = parsed
            .join(&format!("{language}.json"))
            .map_err(|source| FeedUrlError::InvalidBase { url: base, source })?;
        Ok(Self(url))
    }
}

impl AsRef<str> for FeedUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Errors raised when building a [`FeedUrl`].
#[derive(Debug, thiserror::Error)]
pub enum FeedUrlError {
    #[error("invalid feed base URL {url}: {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid feed language {language:?}")]
    InvalidLanguage { language: String },
}
