use crate::date::DateNormalizer;
use crate::feed::document::{parse_document, ParseOutcome};
use crate::feed::item::{FeedCollection, FeedItem};
use crate::feed::mapper::map_document;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching a single feed.
///
/// Any of these makes the feed contribute zero items; the batch continues.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request and body read exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Connection broke while reading the response body
    #[error("Failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

impl FetchError {
    /// Returns true if a response arrived but its body could not be read.
    pub fn is_body_failure(&self) -> bool {
        matches!(
            self,
            FetchError::BodyRead(_)
                | FetchError::ResponseTooLarge
                | FetchError::IncompleteResponse { .. }
        )
    }
}

/// Tuning knobs for one aggregation pass.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Limit on request plus body read for each feed. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    /// Limit on the whole pass. Feeds still running when it expires contribute nothing.
    pub deadline: Option<Duration>,
    /// Maximum concurrent fetches (0 = one task per URL, all at once).
    pub max_in_flight: usize,
    /// Maximum accepted response body size in bytes.
    pub max_feed_bytes: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(REQUEST_TIMEOUT),
            deadline: None,
            max_in_flight: 0,
            max_feed_bytes: MAX_FEED_SIZE,
        }
    }
}

/// Items of one feed, sent to the collector as a single batch.
struct FetchResult {
    url: String,
    result: Result<Vec<FeedItem>, FetchError>,
}

/// Fetches many feeds concurrently and merges their items.
///
/// Cloning is cheap: the HTTP client and date normalizer are shared.
#[derive(Debug, Clone)]
pub struct Aggregator {
    client: reqwest::Client,
    normalizer: Arc<DateNormalizer>,
    options: FetchOptions,
}

impl Aggregator {
    pub fn new(client: reqwest::Client, normalizer: DateNormalizer, options: FetchOptions) -> Self {
        Self {
            client,
            normalizer: Arc::new(normalizer),
            options,
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetches every URL concurrently and returns the merged items.
    ///
    /// Each URL gets its own task. Tasks send their finished item batch over a
    /// channel to this function, the only place results are merged, so the
    /// items of one feed stay contiguous and in document order. Feeds appear
    /// in completion order.
    ///
    /// # Behavior
    ///
    /// - Failing feeds (network, status, body, timeout) are logged and skipped
    /// - Malformed documents contribute whatever items could be read
    /// - No deduplication, no retries
    /// - Never fails: zero successful feeds yields an empty collection
    pub async fn aggregate(&self, urls: &[String]) -> FeedCollection {
        if urls.is_empty() {
            return FeedCollection::default();
        }

        let total = urls.len();
        let limiter = (self.options.max_in_flight > 0)
            .then(|| Arc::new(Semaphore::new(self.options.max_in_flight)));

        // Capacity covers every feed, so senders never wait on the collector
        let (batch_tx, mut batch_rx) = mpsc::channel::<FetchResult>(total);
        let mut tasks = JoinSet::new();

        for url in urls {
            let url = url.clone();
            let client = self.client.clone();
            let normalizer = Arc::clone(&self.normalizer);
            let options = self.options.clone();
            let limiter = limiter.clone();
            let batch_tx = batch_tx.clone();

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let result = fetch_feed(&client, &url, &normalizer, &options).await;
                if batch_tx.send(FetchResult { url, result }).await.is_err() {
                    tracing::debug!("Collector gone before feed finished");
                }
            });
        }
        drop(batch_tx);

        let mut items = Vec::new();
        let mut received = 0usize;
        let mut failed = 0usize;

        let collect = async {
            while let Some(FetchResult { url, result }) = batch_rx.recv().await {
                received += 1;
                match result {
                    Ok(batch) => {
                        tracing::debug!(feed = %url, items = batch.len(), "Feed fetched");
                        items.extend(batch);
                    }
                    Err(e) => {
                        failed += 1;
                        tracing::warn!(
                            feed = %url,
                            error = %e,
                            body = e.is_body_failure(),
                            "Feed fetch failed, skipping"
                        );
                    }
                }
            }
        };

        match self.options.deadline {
            Some(deadline) => {
                let expired = tokio::time::timeout(deadline, collect).await.is_err();
                if expired {
                    tracing::warn!(
                        pending = total - received,
                        deadline_ms = deadline.as_millis() as u64,
                        "Aggregation deadline reached, abandoning unfinished feeds"
                    );
                }
            }
            None => collect.await,
        }

        tasks.abort_all();
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::warn!(error = %e, "Feed task panicked");
                }
            }
        }

        tracing::info!(
            feeds = total,
            succeeded = received - failed,
            failed = failed,
            items = items.len(),
            "Aggregation complete"
        );

        FeedCollection::from(items)
    }
}

/// Aggregates `urls` with default options and the default zone table.
pub async fn aggregate(client: &reqwest::Client, urls: &[String]) -> FeedCollection {
    Aggregator::new(client.clone(), DateNormalizer::default(), FetchOptions::default())
        .aggregate(urls)
        .await
}

/// Fetches one feed and maps its items.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::Timeout`] - Request exceeded `options.request_timeout`
/// - [`FetchError::BodyRead`], [`FetchError::ResponseTooLarge`],
///   [`FetchError::IncompleteResponse`] - Body could not be read in full
///
/// A body that is not valid RSS is not an error: the items that could be
/// read (possibly none) are returned and the parse error is logged.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    normalizer: &DateNormalizer,
    options: &FetchOptions,
) -> Result<Vec<FeedItem>, FetchError> {
    let request = download(client, url, options.max_feed_bytes);
    let bytes = match options.request_timeout {
        Some(limit) => tokio::time::timeout(limit, request)
            .await
            .map_err(|_| FetchError::Timeout)??,
        None => request.await?,
    };

    let ParseOutcome { document, error } = parse_document(&bytes);
    if let Some(e) = error {
        tracing::warn!(
            feed = %url,
            error = %e,
            items = document.items.len(),
            "Malformed feed document, keeping what was read"
        );
    }

    Ok(map_document(document, normalizer))
}

async fn download(client: &reqwest::Client, url: &str, limit: usize) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await.map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_bytes(response, limit).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Capture Content-Length for completeness check
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::BodyRead)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    // EDGE-005: Check for incomplete response (received fewer bytes than Content-Length)
    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
