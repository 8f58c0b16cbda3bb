use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error returned when the merged items cannot be encoded.
#[derive(Debug, Error)]
#[error("Failed to encode feed items: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// One item of a fetched feed, attributed to its source channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// Item headline; may be empty.
    pub title: String,
    /// Channel title of the owning feed.
    pub source_name: String,
    /// Channel link of the owning feed.
    #[serde(rename = "sourceURL")]
    pub source_url: String,
    /// Permalink of the item itself.
    pub link: String,
    /// Normalized publish date, or [`FeedItem::undated`] when unparseable.
    #[serde(serialize_with = "serialize_rfc3339")]
    pub publish_date: DateTime<FixedOffset>,
    /// Item summary, markup kept verbatim.
    pub description: String,
}

/// Writes the offset numerically (`+00:00`, never `Z`).
fn serialize_rfc3339<S: Serializer>(
    date: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339())
}

impl FeedItem {
    /// Timestamp stored for items whose date could not be parsed: the Unix
    /// epoch at `+00:00`.
    pub fn undated() -> DateTime<FixedOffset> {
        DateTime::default()
    }

    /// Whether the item carries a real date.
    ///
    /// A feed that genuinely publishes `1970-01-01T00:00:00Z` is
    /// indistinguishable from an undated item and reports `false`.
    pub fn has_publish_date(&self) -> bool {
        self.publish_date != Self::undated()
    }
}

/// Merged result of one aggregation pass.
///
/// Items of one feed are contiguous and keep document order; feeds appear in
/// completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedCollection {
    pub items: Vec<FeedItem>,
}

impl FeedCollection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Encodes the collection as `{"items": [...]}`.
    pub fn to_json(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<Vec<FeedItem>> for FeedCollection {
    fn from(items: Vec<FeedItem>) -> Self {
        Self { items }
    }
}

impl IntoIterator for FeedCollection {
    type Item = FeedItem;
    type IntoIter = std::vec::IntoIter<FeedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
