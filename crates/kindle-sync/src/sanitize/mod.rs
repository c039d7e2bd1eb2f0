//! Turns stored article HTML into a standalone document.
//!
//! Scripts and styles are removed, every resolvable image is downloaded
//! through an [`ImageFetcher`] and inlined as a `data:` URI, and images that
//! fail to download are removed. Image downloads run one at a time, in
//! document order.

mod images;
mod render;

pub use images::{FetchedImage, HttpImageFetcher, ImageFetcher, DEFAULT_IMAGE_TYPE};

use scraper::{Html, Selector};
use url::Url;

use render::{escape_text, ImageRewrite};

/// Sanitized article ready for delivery.
#[derive(Debug, Clone)]
pub struct SanitizedDocument {
    /// UTF-8 encoded HTML document.
    pub html: Vec<u8>,
    pub report: SanitizeReport,
}

/// What happened to the images of one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Downloaded and inlined.
    pub inlined: usize,
    /// Removed after a failed download.
    pub dropped: usize,
    /// Left as-is (no usable `src`).
    pub untouched: usize,
}

/// Build the standalone document for one article.
pub async fn sanitize(
    html: &str,
    title: &str,
    base_url: &Url,
    images: &dyn ImageFetcher,
) -> SanitizedDocument {
    let sources = image_sources(html);
    let mut report = SanitizeReport::default();
    let mut rewrites = Vec::with_capacity(sources.len());

    for src in sources {
        let Some(target) = src.as_deref().and_then(|s| resolve(base_url, s)) else {
            tracing::debug!(src = ?src, "Leaving image without resolvable source");
            report.untouched += 1;
            rewrites.push(ImageRewrite::Keep);
            continue;
        };

        match images.fetch(&target).await {
            Ok(image) => {
                tracing::debug!(url = %target, bytes = image.bytes.len(), "Inlined image");
                report.inlined += 1;
                rewrites.push(ImageRewrite::Inline(image.to_data_uri()));
            }
            Err(e) => {
                tracing::warn!(url = %target, error = %e, "Failed to download image, removing it");
                report.dropped += 1;
                rewrites.push(ImageRewrite::Drop);
            }
        }
    }

    let body = render::render_body(&Html::parse_document(html), &rewrites);

    SanitizedDocument {
        html: wrap_document(title, &body).into_bytes(),
        report,
    }
}

/// `src` of every `<img>`, in document order.
fn image_sources(html: &str) -> Vec<Option<String>> {
    let document = Html::parse_document(html);
    let img_selector = Selector::parse("img").expect("Invalid img selector");
    document
        .select(&img_selector)
        .map(|img| img.value().attr("src").map(ToString::to_string))
        .collect()
}

/// Resolve an image reference to a fetchable absolute URL.
///
/// Empty references and anything that is not http(s) after joining
/// (including existing `data:` URIs) yield `None`.
fn resolve(base_url: &Url, src: &str) -> Option<Url> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    let url = base_url.join(src).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

fn wrap_document(title: &str, body: &str) -> String {
    let title = escape_text(title);
    format!(
        "<html><head><meta charset=\"UTF-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1>\n{body}</body></html>"
    )
}
