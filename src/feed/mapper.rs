use crate::date::{DateError, DateNormalizer};
use crate::feed::document::FeedDocument;
use crate::feed::item::FeedItem;

/// Converts a parsed document into feed items, one per source item.
///
/// Every item gets the channel title and link as its source attribution.
/// Unparseable dates do not drop the item: it is kept with
/// [`FeedItem::undated`] and the failure is logged.
pub fn map_document(document: FeedDocument, normalizer: &DateNormalizer) -> Vec<FeedItem> {
    let FeedDocument { channel, items } = document;

    items
        .into_iter()
        .map(|raw| {
            let publish_date = match normalizer.parse(&raw.pub_date) {
                Ok(date) => date,
                Err(DateError::EmptyInput) => {
                    tracing::debug!(feed = %channel.title, item = %raw.title, "Item has no publish date");
                    FeedItem::undated()
                }
                Err(e) => {
                    tracing::warn!(
                        feed = %channel.title,
                        item = %raw.title,
                        error = %e,
                        "Unrecognized publish date"
                    );
                    FeedItem::undated()
                }
            };

            FeedItem {
                title: raw.title,
                source_name: channel.title.clone(),
                source_url: channel.link.clone(),
                link: raw.link,
                publish_date,
                description: raw.description,
            }
        })
        .collect()
}
