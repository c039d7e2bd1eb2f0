//! Wallabag REST API client.

use reqwest::{Client, Response};
use url::Url;

use super::types::{AccessToken, ArticleDetail, ArticleSummary, EntriesPage, TokenResponse};
use crate::config::WallabagConfig;
use crate::error::WallabagError;

/// Entries requested per listing page.
const PAGE_SIZE: u32 = 30;

/// Wallabag API client.
///
/// Requests other than the token call carry the bearer token obtained by
/// [`WallabagClient::authenticate`]. No explicit timeout is set on these calls.
pub struct WallabagClient {
    config: WallabagConfig,
    client: Client,
}

impl WallabagClient {
    /// Create a new Wallabag client.
    pub fn new(config: WallabagConfig) -> Result<Self, WallabagError> {
        let client = Client::builder().build()?;
        Ok(Self { config, client })
    }

    /// Service base URL.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Exchange the stored credentials for a bearer token (password grant).
    pub async fn authenticate(&self) -> Result<AccessToken, WallabagError> {
        let url = self.endpoint("oauth/v2/token")?;
        let form = [
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self.client.post(url).form(&form).send().await?;
        let token: TokenResponse = check_status(response).await?.json().await?;

        tracing::debug!("Obtained Wallabag access token");
        Ok(AccessToken::new(token.access_token))
    }

    /// List every unarchived entry, newest first.
    ///
    /// Walks pages from 1 up to the reported page count, stopping early on
    /// an empty page.
    pub async fn list_unread(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ArticleSummary>, WallabagError> {
        let url = self.endpoint("api/entries.json")?;
        let per_page = PAGE_SIZE.to_string();
        let mut articles = Vec::new();
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let response = self
                .client
                .get(url.clone())
                .header("Authorization", token.bearer())
                .query(&[
                    ("archive", "0"),
                    ("sort", "created"),
                    ("order", "desc"),
                    ("perPage", per_page.as_str()),
                    ("page", page_param.as_str()),
                ])
                .send()
                .await?;

            let listing: EntriesPage = check_status(response).await?.json().await?;
            tracing::debug!(
                page = listing.page,
                pages = listing.pages,
                items = listing.embedded.items.len(),
                "Fetched entries page"
            );
            let received = listing.embedded.items.len();
            articles.extend(listing.embedded.items);

            if received == 0 || page >= listing.pages {
                break;
            }
            page += 1;
        }

        Ok(articles)
    }

    /// Fetch the full entry, including its HTML content.
    pub async fn get_article(
        &self,
        token: &AccessToken,
        id: i64,
    ) -> Result<ArticleDetail, WallabagError> {
        let url = self.entry_url(id)?;
        let response = self
            .client
            .get(url)
            .header("Authorization", token.bearer())
            .send()
            .await?;

        let detail: ArticleDetail = check_status(response).await?.json().await?;
        if detail.content.is_none() {
            return Err(WallabagError::MissingContent(id));
        }
        Ok(detail)
    }

    /// Mark an entry as archived (read).
    pub async fn archive(&self, token: &AccessToken, id: i64) -> Result<(), WallabagError> {
        let url = self.entry_url(id)?;
        let response = self
            .client
            .patch(url)
            .header("Authorization", token.bearer())
            .form(&[("archive", "1")])
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, WallabagError> {
        Ok(self.config.base_url.join(path)?)
    }

    fn entry_url(&self, id: i64) -> Result<Url, WallabagError> {
        self.endpoint(&format!("api/entries/{id}.json"))
    }
}

/// Turn a non-success response into a [`WallabagError::Status`].
async fn check_status(response: Response) -> Result<Response, WallabagError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".into());
    Err(WallabagError::Status { status, body })
}
