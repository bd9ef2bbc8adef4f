//! Schema-free JSON payloads stored verbatim alongside typed columns.
//!
//! The feed's ability, stat, effect and composition payloads are not
//! contractually stable, so they are kept as opaque JSON documents. The store
//! only checks that the text is valid JSON; the shape is never inspected
//! except where a query needs to scan a list of strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verbatim JSON payload carried from the feed to API responses.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use tft_core::Blob;
///
/// let blob = Blob::from_optional(Some(json!(["Yordle", "Sorcerer"]))).expect("non-null");
/// let stored = blob.to_json().expect("serialise blob");
/// assert_eq!(Blob::parse(&stored).expect("parse blob"), blob);
/// assert_eq!(blob.string_entries().collect::<Vec<_>>(), ["Yordle", "Sorcerer"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(Value);

impl Blob {
    /// Wrap a JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Wrap an optional value, treating JSON `null` as absent.
    #[must_use]
    pub fn from_optional(value: Option<Value>) -> Option<Self> {
        value.filter(|inner| !inner.is_null()).map(Self)
    }

    /// Decode a stored column value.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// Encode the payload for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Borrow the wrapped value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the wrapper.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// String elements of an array payload; empty for any other shape.
    pub fn string_entries(&self) -> impl Iterator<Item = &str> {
        self.0
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

impl From<Value> for Blob {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
