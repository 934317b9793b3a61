//! Remote text feeds.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

mod http;
mod text;

pub use http::HttpFetcher;
pub use text::TextFeed;

mod sealed {
    pub trait Sealed {}
}

/// A source that loads remote content and renders it at intervals.
///
/// Implemented only by feeds in this crate.
pub trait Feed: sealed::Sealed {
    /// Resolved address fetched on every load.
    fn url(&self) -> String;

    /// Starts one fetch. Completion is delivered later as a [`FetchOutcome`].
    fn load(&mut self);

    /// Renders a successfully fetched payload.
    fn onload(&mut self, payload: Option<&str>);

    /// Called when a fetch failed or timed out.
    fn onerror(&mut self);
}

/// Where a feed is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// Display name.
    pub name: String,
    /// Server base address, may be empty when `path` is absolute.
    pub base_url: String,
    /// Resource path below `base_url`, or a full URL.
    pub path: String,
}

impl FeedSource {
    /// Joins `base_url` and `path` with exactly one slash. An absolute `path`
    /// is used as is.
    #[must_use]
    pub fn url(&self) -> String {
        if self.base_url.is_empty() || self.path.contains("://") {
            return self.path.clone();
        }
        if self.path.is_empty() {
            return self.base_url.clone();
        }

        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Why a fetch produced no payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network or protocol error.
    #[error("fetch failed: {0}")]
    Failure(String),
    /// No response within the configured timeout.
    #[error("fetch timed out")]
    Timeout,
}

/// Fetches text from an address.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the response body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Completion of one load, tagged with the load that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Sequence number of the issuing load, starting at 1.
    pub generation: u64,
    /// Payload or failure cause.
    pub result: Result<String, FetchError>,
}

/// Last known state of a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing loaded yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last applied fetch succeeded.
    Ready,
    /// The last applied fetch failed.
    Failed,
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ok",
            Self::Failed => "error",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(base_url: &str, path: &str) -> FeedSource {
        FeedSource {
            name: "status".to_owned(),
            base_url: base_url.to_owned(),
            path: path.to_owned(),
        }
    }

    #[test]
    fn url_joins_with_single_slash() {
        assert_eq!(
            source("http://host:8000/", "/feeds/status.txt").url(),
            "http://host:8000/feeds/status.txt"
        );
        assert_eq!(
            source("http://host:8000", "status").url(),
            "http://host:8000/status"
        );
    }

    #[test]
    fn absolute_path_wins() {
        assert_eq!(
            source("http://host:8000", "https://other/x").url(),
            "https://other/x"
        );
        assert_eq!(source("", "http://a/b").url(), "http://a/b");
        assert_eq!(source("http://a/b", "").url(), "http://a/b");
    }
}
