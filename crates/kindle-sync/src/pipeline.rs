//! Sync pipeline - orchestrates the authenticate-list-fetch-sanitize-send-archive flow.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::delivery::{attachment_filename, DocumentSender};
use crate::error::SyncError;
use crate::sanitize::{sanitize, ImageFetcher, SanitizedDocument};
use crate::wallabag::{AccessToken, ArticleDetail, ArticleSummary, WallabagClient};

/// Options for a single run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Prepare documents but neither send nor archive.
    pub dry_run: bool,
    /// Max articles to process per run.
    pub limit: Option<usize>,
    /// Also write each sanitized document here.
    pub save_dir: Option<PathBuf>,
}

/// Result of a single run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Number of unread articles listed.
    pub listed: usize,
    /// Number fetched with content.
    pub fetched: usize,
    /// Number emailed.
    pub sent: usize,
    /// Number marked as read.
    pub archived: usize,
    /// Number sanitized without sending (dry run).
    pub prepared: usize,
    /// Number abandoned before being sent.
    pub skipped: usize,
    /// Images inlined across all articles.
    pub images_inlined: usize,
    /// Images removed after failed downloads.
    pub images_dropped: usize,
    /// Errors encountered, as `"{id}: {message}"`.
    pub errors: Vec<String>,
}

/// Per-article outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArticleOutcome {
    Archived,
    /// Sent, but the archive call failed.
    SentOnly,
    Prepared,
    Skipped,
}

/// Sync pipeline orchestrator.
pub struct SyncPipeline {
    wallabag: WallabagClient,
    images: Arc<dyn ImageFetcher>,
    sender: Arc<dyn DocumentSender>,
    options: SyncOptions,
}

impl SyncPipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(
        wallabag: WallabagClient,
        images: Arc<dyn ImageFetcher>,
        sender: Arc<dyn DocumentSender>,
        options: SyncOptions,
    ) -> Self {
        Self {
            wallabag,
            images,
            sender,
            options,
        }
    }

    /// Run once over every unread article.
    ///
    /// Only an authentication failure aborts the run. A listing failure is
    /// reported as an empty listing, and any per-article failure abandons
    /// that article and moves on to the next.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        tracing::info!(dry_run = self.options.dry_run, "Starting Kindle sync");

        let token = match self.wallabag.authenticate().await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "Failed to obtain Wallabag token");
                return Err(SyncError::Auth(e));
            }
        };

        let mut articles = match self.wallabag.list_unread(&token).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list unread articles");
                Vec::new()
            }
        };

        if articles.is_empty() {
            tracing::info!("No unread articles found");
            return Ok(report);
        }

        report.listed = articles.len();
        tracing::info!(count = articles.len(), "Found unread articles");

        if let Some(limit) = self.options.limit {
            if articles.len() > limit {
                tracing::info!(limit, "Limiting articles for this run");
                articles.truncate(limit);
            }
        }

        for article in &articles {
            match self.process(&token, article, &mut report).await {
                ArticleOutcome::Archived => report.archived += 1,
                ArticleOutcome::Prepared => report.prepared += 1,
                ArticleOutcome::Skipped => report.skipped += 1,
                ArticleOutcome::SentOnly => {}
            }
        }

        tracing::info!(
            listed = report.listed,
            sent = report.sent,
            archived = report.archived,
            prepared = report.prepared,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Kindle sync complete"
        );

        Ok(report)
    }

    /// Drive one article through fetch, sanitize, send and archive.
    async fn process(
        &self,
        token: &AccessToken,
        article: &ArticleSummary,
        report: &mut SyncReport,
    ) -> ArticleOutcome {
        let id = article.id;
        tracing::info!(id, title = %article.title, "Processing article");

        let detail = match self.wallabag.get_article(token, id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to fetch article");
                report.errors.push(format!("{id}: fetch failed: {e}"));
                return ArticleOutcome::Skipped;
            }
        };
        report.fetched += 1;
        tracing::debug!(id, domain = ?detail.domain_name, "Fetched article");

        let base_url = self.image_base(&detail);
        let content = detail.content.as_deref().unwrap_or_default();
        let document = sanitize(content, &article.title, &base_url, self.images.as_ref()).await;
        report.images_inlined += document.report.inlined;
        report.images_dropped += document.report.dropped;

        if let Some(dir) = &self.options.save_dir {
            save_document(dir, &article.title, &document, report, id).await;
        }

        if self.options.dry_run {
            tracing::info!(id, bytes = document.html.len(), "Dry run, not sending");
            return ArticleOutcome::Prepared;
        }

        if let Err(e) = self.sender.send(&article.title, &document.html).await {
            tracing::error!(id, title = %article.title, error = %e, "Failed to send article");
            report.errors.push(format!("{id}: send failed: {e}"));
            return ArticleOutcome::Skipped;
        }
        report.sent += 1;

        match self.wallabag.archive(token, id).await {
            Ok(()) => {
                tracing::info!(id, "Marked article as read");
                ArticleOutcome::Archived
            }
            Err(e) => {
                tracing::error!(id, error = %e, "Failed to mark article as read");
                report.errors.push(format!("{id}: archive failed: {e}"));
                ArticleOutcome::SentOnly
            }
        }
    }

    /// The article's own page when known, otherwise the service URL.
    fn image_base(&self, detail: &ArticleDetail) -> Url {
        detail
            .url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or_else(|| self.wallabag.base_url().clone())
    }
}

/// Write a copy of the document under its attachment filename.
async fn save_document(
    dir: &Path,
    title: &str,
    document: &SanitizedDocument,
    report: &mut SyncReport,
    id: i64,
) {
    let path = dir.join(attachment_filename(title));
    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, &document.html).await
    }
    .await;

    match result {
        Ok(()) => tracing::debug!(id, path = %path.display(), "Saved document"),
        Err(e) => {
            tracing::warn!(id, path = %path.display(), error = %e, "Failed to save document");
            report.errors.push(format!("{id}: save failed: {e}"));
        }
    }
}
