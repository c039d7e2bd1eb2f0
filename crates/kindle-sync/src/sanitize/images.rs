//! Image download capability used when inlining.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::error::ImageError;

/// Media type assumed when the origin does not report one.
pub const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Browser-like user agent sent to image origins.
const IMAGE_USER_AGENT: &str = "Mozilla/5.0";

/// Bytes and media type of a downloaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// Content type reported by the origin, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    /// Media type for the data URI, falling back to `image/jpeg`.
    pub fn media_type(&self) -> &str {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_IMAGE_TYPE)
    }

    /// Encode as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Trait for fetching referenced images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download a single image.
    async fn fetch(&self, url: &Url) -> Result<FetchedImage, ImageError>;
}

/// Fetches images over HTTP with a bounded timeout.
pub struct HttpImageFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpImageFetcher {
    /// Create a new HTTP image fetcher.
    pub fn new(timeout: Duration) -> Result<Self, ImageError> {
        let client = Client::builder().build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedImage, ImageError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, IMAGE_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedImage {
            content_type,
            bytes,
        })
    }
}
