//! Error types for each stage of a sync run.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty.
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// The Wallabag base URL is not an absolute URL.
    #[error("invalid WALLABAG_URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors returned by the Wallabag API client.
#[derive(Debug, Error)]
pub enum WallabagError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Wallabag API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    /// Could not build an endpoint URL
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// The entry exists but carries no HTML content
    #[error("entry {0} has no content")]
    MissingContent(i64),
}

/// Errors raised while downloading an image for inlining.
#[derive(Debug, Error)]
pub enum ImageError {
    /// HTTP request failed
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The origin answered with a non-success status
    #[error("image origin returned {0}")]
    Status(StatusCode),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised while delivering a document by email.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A configured address could not be parsed
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// The MIME message could not be assembled
    #[error("failed to build email message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP exchange failed
    #[error("SMTP send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The password-grant token request failed; nothing else runs.
    #[error("authentication failed: {0}")]
    Auth(#[source] WallabagError),
}
