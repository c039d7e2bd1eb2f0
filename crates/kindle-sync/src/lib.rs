//! Wallabag to Kindle synchronisation.
//!
//! This crate provides:
//! - A Wallabag API client (password-grant token, unread listing, entry fetch, archiving)
//! - An HTML sanitizer that strips scripts/styles and inlines images as data URIs
//! - Delivery of the result as an HTML attachment to a send-to-Kindle address
//! - A pipeline that archives an article only after its email was sent

pub mod config;
pub mod delivery;
pub mod error;
pub mod pipeline;
pub mod sanitize;
pub mod wallabag;

// Re-export main types
pub use config::Config;
pub use delivery::{DocumentSender, KindleMailer};
pub use error::{ConfigError, DeliveryError, ImageError, SyncError, WallabagError};
pub use pipeline::{SyncOptions, SyncPipeline, SyncReport};
pub use sanitize::{HttpImageFetcher, ImageFetcher, SanitizedDocument};
pub use wallabag::WallabagClient;
