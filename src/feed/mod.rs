//! Feed fetching, parsing, and aggregation.
//!
//! - **Documents**: Lenient RSS parsing into channel metadata plus raw items
//! - **Mapping**: Raw items to [`FeedItem`]s with normalized publish dates
//! - **Fetching**: One concurrent task per feed URL, merged by a single collector
//!
//! # Architecture
//!
//! - [`document`] - Event-based RSS parsing using `quick-xml`
//! - [`mapper`] - Source attribution and date normalization per item
//! - [`fetcher`] - HTTP retrieval and fan-out/fan-in aggregation
//! - [`item`] - Output records and JSON encoding
//!
//! # Example
//!
//! ```ignore
//! use rssfeeds::feed::aggregate;
//!
//! let client = reqwest::Client::new();
//! let urls = vec!["https://example.com/feed.xml".to_string()];
//! let collection = aggregate(&client, &urls).await;
//! println!("{}", collection.to_json()?);
//! ```

pub mod document;
pub mod fetcher;
pub mod item;
pub mod mapper;

pub use document::{parse_document, DocumentError, FeedDocument, ParseOutcome};
pub use fetcher::{aggregate, fetch_feed, Aggregator, FetchError, FetchOptions};
pub use item::{EncodeError, FeedCollection, FeedItem};
pub use mapper::map_document;
