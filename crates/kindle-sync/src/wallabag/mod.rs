//! Wallabag API access: token, listing, entry fetch and archiving.

mod client;
mod types;

pub use client::WallabagClient;
pub use types::{AccessToken, ArticleDetail, ArticleSummary};
