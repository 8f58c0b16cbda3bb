//! Concurrent RSS aggregation with lenient date normalization.
//!
//! Given a list of feed URLs, [`feed::Aggregator`] fetches every feed in
//! parallel, parses each RSS document, normalizes item publish dates with
//! [`date::DateNormalizer`], and merges all items into one
//! [`feed::FeedCollection`]. Feeds that fail are logged and skipped.

pub mod config;
pub mod date;
pub mod feed;
