//! Error types shared across the scrape, store and config layers.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The listing page had no "Showing X to Y of Z (P Pages)" summary.
    #[error("pagination summary not found on {url}")]
    PaginationNotFound { url: String },

    #[error("failed to fetch page {page} after {attempts} attempt(s): {source}")]
    PageFetchFailed {
        page: u32,
        attempts: usize,
        #[source]
        source: FetchError,
    },

    /// The listing claims more pages than the configured limit allows.
    #[error("{url} lists {pages} pages, more than the limit of {max}")]
    TooManyPages { url: String, pages: u32, max: u32 },

    /// Every page was fetched but no product could be extracted.
    #[error("no products were scraped from {url}")]
    EmptyResult { url: String },
}

/// A single HTTP fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("server returned status {code} for {url}")]
    Status { code: u16, url: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Transport failures, 5xx and 429 are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { code, .. } => *code == 429 || *code >= 500,
            FetchError::Transport { .. } | FetchError::Body { .. } => true,
        }
    }
}

/// Which product field could not be read from a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Link,
    Price,
    Storage,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Link => "link",
            Field::Price => "price",
            Field::Storage => "storage",
        }
    }
}

/// Recoverable per-record failure. Collected as a diagnostic, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page {page} item {}: missing {}", .container + 1, .field.as_str())]
pub struct FieldExtractionFailed {
    pub page: u32,
    pub container: usize,
    pub field: Field,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot csv error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Required columns are missing or a row cannot be interpreted.
    #[error("snapshot {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid timeout '{value}': {source}")]
    Timeout {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("invalid catalog url '{value}': {source}")]
    Url {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_retryable() {
        let status = |code| FetchError::Status { code, url: "u".into() };
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(403).is_retryable());
    }

    #[test]
    fn field_failure_message_is_one_based() {
        let failure = FieldExtractionFailed { page: 3, container: 0, field: Field::Price };
        assert_eq!(failure.to_string(), "page 3 item 1: missing price");
        let boxed: Box<dyn std::error::Error> = Box::new(failure);
        assert!(boxed.source().is_none());
    }
}
