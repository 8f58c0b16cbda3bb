//! Optional TOML settings read from `~/.config/rssfeeds/config.toml`.
//!
//! Every key has a default, so an absent or blank file is a valid config.
//! Keys this version does not know are reported with a warning and skipped.
use crate::date::{DateNormalizer, ZoneTable};
use crate::feed::FetchOptions;
use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on the config file size, in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Top-level keys understood by [`Config`].
const KNOWN_KEYS: &[&str] = &[
    "feeds",
    "request_timeout_secs",
    "deadline_secs",
    "max_in_flight",
    "max_feed_bytes",
    "user_agent",
    "zone_abbreviations",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("Invalid offset {value:?} for zone abbreviation {abbreviation}")]
    InvalidZoneOffset {
        abbreviation: String,
        value: String,
    },
}

/// Settings for one run of the aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed URLs fetched in addition to those given on the command line.
    pub feeds: Vec<String>,

    /// Per-feed limit on request plus body read, in seconds. 0 = transport default.
    pub request_timeout_secs: u64,

    /// Limit on a whole aggregation pass, in seconds. 0 = no deadline.
    pub deadline_secs: u64,

    /// Maximum concurrent fetches. 0 = unlimited.
    pub max_in_flight: usize,

    /// Maximum response body size in bytes.
    pub max_feed_bytes: usize,

    pub user_agent: String,

    /// Extra zone abbreviations, e.g. `IST = "+05:30"`. Overrides built-ins.
    pub zone_abbreviations: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            feeds: Vec::new(),
            request_timeout_secs: fetch.request_timeout.map_or(0, |t| t.as_secs()),
            deadline_secs: 0,
            max_in_flight: fetch.max_in_flight,
            max_feed_bytes: fetch.max_feed_bytes,
            user_agent: concat!("rssfeeds/", env!("CARGO_PKG_VERSION")).to_string(),
            zone_abbreviations: HashMap::new(),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when it is absent or blank.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TooLarge`] above 1 MiB
    /// - [`ConfigError::Parse`] for malformed TOML or mistyped values
    /// - [`ConfigError::InvalidZoneOffset`] for an unparseable zone override
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_config_text(path)? else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is blank, using defaults");
            return Ok(Self::default());
        }

        warn_unknown_keys(&content);
        let config: Config = toml::from_str(&content)?;
        config.zone_table()?;

        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            zones = config.zone_abbreviations.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Fetch settings for [`Aggregator`](crate::feed::Aggregator).
    pub fn fetch_options(&self) -> FetchOptions {
        let seconds = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));
        FetchOptions {
            request_timeout: seconds(self.request_timeout_secs),
            deadline: seconds(self.deadline_secs),
            max_in_flight: self.max_in_flight,
            max_feed_bytes: self.max_feed_bytes,
        }
    }

    /// Date normalizer using the built-in zones plus `zone_abbreviations`.
    pub fn date_normalizer(&self) -> Result<DateNormalizer, ConfigError> {
        Ok(DateNormalizer::new(self.zone_table()?))
    }

    fn zone_table(&self) -> Result<ZoneTable, ConfigError> {
        let mut zones = ZoneTable::default();
        for (abbreviation, value) in &self.zone_abbreviations {
            let offset = parse_offset(value).ok_or_else(|| ConfigError::InvalidZoneOffset {
                abbreviation: abbreviation.clone(),
                value: value.clone(),
            })?;
            zones.insert(abbreviation, offset);
        }
        Ok(zones)
    }
}

/// Returns `None` when nothing exists at `path`.
fn read_config_text(path: &Path) -> Result<Option<String>, ConfigError> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if size > MAX_CONFIG_BYTES {
        return Err(ConfigError::TooLarge {
            size,
            limit: MAX_CONFIG_BYTES,
        });
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn warn_unknown_keys(content: &str) {
    let Ok(table) = content.parse::<toml::Table>() else {
        return;
    };
    for key in table.keys().filter(|key| !KNOWN_KEYS.contains(&key.as_str())) {
        tracing::warn!(key = %key, "Ignoring unknown config key");
    }
}

/// Accepts `+05:30`, `-0600` and similar spellings.
fn parse_offset(value: &str) -> Option<FixedOffset> {
    value.trim().parse().ok()
}
