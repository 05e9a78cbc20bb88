use std::time::Duration;

use thiserror::Error;

/// Failure to obtain a page, whatever the transport.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("render service returned {status} for {url}: {message}")]
    Render {
        status: u16,
        url: String,
        message: String,
    },

    #[error("timed out after {budget:?} loading {url}")]
    Timeout { url: String, budget: Duration },

    #[error("empty document from {url}")]
    EmptyDocument { url: String },

    #[error("no fixture is mapped to {url}")]
    UnmappedFixtureUrl { url: String },

    #[error("fixture not found: {path}")]
    FixtureMissing { path: String },

    #[error("failed to read fixture {path}: {source}")]
    FixtureIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid render service URL \"{url}\": {reason}")]
    InvalidRenderUrl { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unusable markup at {url}: {reason}")]
    Markup { url: String, reason: String },

    #[error("invalid page URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("fetch pool is closed")]
    PoolClosed,
}
