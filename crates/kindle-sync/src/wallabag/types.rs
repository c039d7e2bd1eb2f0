//! Wallabag API payloads.

use serde::Deserialize;

/// Response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for the rest of the run.
    pub access_token: String,
}

/// Bearer token valid for the duration of a single run.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Minimal entry record returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

/// Full entry returned by the get-entry endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDetail {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Readable HTML body as stored by the service.
    #[serde(default)]
    pub content: Option<String>,
    /// Address of the original page.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
}

/// One page of the paginated entries listing.
#[derive(Debug, Deserialize)]
pub(crate) struct EntriesPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub pages: u32,
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedItems,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddedItems {
    #[serde(default)]
    pub items: Vec<ArticleSummary>,
}

fn first_page() -> u32 {
    1
}
