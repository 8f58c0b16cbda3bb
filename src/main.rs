use anyhow::{Context, Result};
use clap::Parser;
use reqwest::redirect::Policy;
use std::path::PathBuf;

use rssfeeds::config::Config;
use rssfeeds::feed::Aggregator;

/// Get the config file path (~/.config/rssfeeds/config.toml)
fn get_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("rssfeeds")
        .join("config.toml"))
}

/// Follow at most 5 redirects and stop on loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 5 {
            return attempt.error("Too many redirects (max 5)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "rssfeeds",
    version,
    about = "Fetch RSS feeds concurrently and print their items as JSON"
)]
struct Args {
    /// Feed URLs to fetch (merged with `feeds` from the config file)
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Config file (default: ~/.config/rssfeeds/config.toml)
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match get_config_path() {
            Ok(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            Err(e) => {
                tracing::warn!(error = %e, "No config location available, using defaults");
                Config::default()
            }
        },
    };

    let mut urls = args.urls;
    urls.extend(config.feeds.iter().cloned());

    if urls.is_empty() {
        eprintln!("Error: No feed URLs given.");
        eprintln!();
        eprintln!("Pass them as arguments:");
        eprintln!("  rssfeeds https://example.com/feed.xml");
        eprintln!();
        eprintln!("Or list them under `feeds` in the config file.");
        std::process::exit(1);
    }

    let normalizer = config
        .date_normalizer()
        .context("Invalid zone_abbreviations in config")?;

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(create_redirect_policy())
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let aggregator = Aggregator::new(client, normalizer, config.fetch_options());
    let collection = aggregator.aggregate(&urls).await;

    let json = if args.pretty {
        collection.to_json_pretty()
    } else {
        collection.to_json()
    }
    .context("Failed to encode feed items")?;

    println!("{json}");
    Ok(())
}
