use std::fmt;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::config::Config;
use crate::http_client::http_client;
use crate::state::{Feeds, MatchDictionary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Records,
    Reference,
}

impl FeedKind {
    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Records => "Records",
            FeedKind::Reference => "Reference_Key",
        }
    }
}

#[derive(Debug)]
pub enum FetchError {
    Client(anyhow::Error),
    Request {
        feed: FeedKind,
        source: anyhow::Error,
    },
    Shape {
        feed: FeedKind,
        source: serde_json::Error,
    },
    /// A fetch thread exited without reporting.
    Disconnected,
}

impl FetchError {
    pub fn feed(&self) -> Option<FeedKind> {
        match self {
            FetchError::Request { feed, .. } | FetchError::Shape { feed, .. } => Some(*feed),
            FetchError::Client(_) | FetchError::Disconnected => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Client(err) => write!(f, "http client unavailable: {err:#}"),
            FetchError::Request { feed, source } => {
                write!(f, "{} fetch failed: {source:#}", feed.label())
            }
            FetchError::Shape { feed, source } => {
                write!(f, "{} is not an id -> string[] object: {source}", feed.label())
            }
            FetchError::Disconnected => f.write_str("feed fetch thread exited early"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Client(err) | FetchError::Request { source: err, .. } => Some(&**err),
            FetchError::Shape { source, .. } => Some(source),
            FetchError::Disconnected => None,
        }
    }
}

/// Where raw feed bodies come from.
pub trait FeedSource: Send + Sync {
    fn fetch(&self, feed: FeedKind) -> Result<String>;
}

pub struct HttpFeedSource {
    client: &'static Client,
    records_url: String,
    reference_url: String,
}

impl HttpFeedSource {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let client = http_client(config.http_timeout_secs).map_err(FetchError::Client)?;
        Ok(Self {
            client,
            records_url: config.records_url(),
            reference_url: config.reference_url(),
        })
    }

    pub fn url(&self, feed: FeedKind) -> &str {
        match feed {
            FeedKind::Records => &self.records_url,
            FeedKind::Reference => &self.reference_url,
        }
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self, feed: FeedKind) -> Result<String> {
        fetch_body(self.client, self.url(feed))
    }
}

pub fn fetch_body(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        let snippet: String = body.chars().take(200).collect();
        return Err(anyhow::anyhow!("http {}: {}", status, snippet));
    }
    Ok(body)
}

/// Parses `{ "<id>": ["...", ...], ... }`. Anything else, `null` included,
/// is a shape error.
pub fn parse_dictionary_json(raw: &str) -> Result<MatchDictionary, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Fetches both feeds over HTTP.
pub fn load(config: &Config) -> Result<Feeds, FetchError> {
    let source = HttpFeedSource::from_config(config)?;
    load_with(Arc::new(source))
}

/// Fetches both feeds concurrently and returns once both have parsed. The
/// first failure is returned straight away; the other request keeps running
/// in the background and its result is dropped.
pub fn load_with<S>(source: Arc<S>) -> Result<Feeds, FetchError>
where
    S: FeedSource + 'static,
{
    let (tx, rx) = mpsc::channel();
    for feed in [FeedKind::Records, FeedKind::Reference] {
        let tx = tx.clone();
        let source = Arc::clone(&source);
        thread::spawn(move || {
            let _ = tx.send((feed, fetch_dictionary(source.as_ref(), feed)));
        });
    }
    drop(tx);

    let mut records = None;
    let mut reference = None;
    for _ in 0..2 {
        let (feed, result) = rx.recv().map_err(|_| FetchError::Disconnected)?;
        let dict = result?;
        match feed {
            FeedKind::Records => records = Some(dict),
            FeedKind::Reference => reference = Some(dict),
        }
    }

    match (records, reference) {
        (Some(records), Some(reference)) => Ok(Feeds { records, reference }),
        _ => Err(FetchError::Disconnected),
    }
}

fn fetch_dictionary<S>(feeds: &S, feed: FeedKind) -> Result<MatchDictionary, FetchError>
where
    S: FeedSource + ?Sized,
{
    let body = feeds
        .fetch(feed)
        .map_err(|source| FetchError::Request { feed, source })?;
    parse_dictionary_json(&body).map_err(|source| FetchError::Shape { feed, source })
}
