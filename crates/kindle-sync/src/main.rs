//! Kindle sync CLI - sends unread Wallabag articles to a Kindle.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kindle_sync::{
    Config, HttpImageFetcher, KindleMailer, SyncOptions, SyncPipeline, SyncReport,
    WallabagClient,
};

/// Kindle sync - email unread Wallabag articles to a send-to-Kindle address.
#[derive(Parser)]
#[command(name = "kindle-sync")]
#[command(about = "Send unread Wallabag articles to a Kindle")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Prepare documents but do not send or archive anything
    #[arg(long)]
    dry_run: bool,

    /// Max articles to process this run
    #[arg(long)]
    limit: Option<usize>,

    /// Also write each sanitized document to this directory
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kindle_sync=debug,info")
        } else {
            EnvFilter::new("kindle_sync=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let wallabag = WallabagClient::new(config.wallabag.clone())?;
    let images = HttpImageFetcher::new(config.image_timeout)?;
    let mailer = KindleMailer::new(config.mail.clone())?;

    let options = SyncOptions {
        dry_run: cli.dry_run,
        limit: cli.limit,
        save_dir: cli.save_dir,
    };

    let pipeline = SyncPipeline::new(wallabag, Arc::new(images), Arc::new(mailer), options);
    let report = pipeline.run().await?;

    print!("{}", summary(&report));
    println!("\nDone.");

    Ok(())
}

/// Run summary for stdout, failures included.
fn summary(report: &SyncReport) -> String {
    use std::fmt::Write;

    if report.listed == 0 {
        return "\nNo unread articles found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n📚 Kindle Sync Summary");
    let _ = writeln!(out, "   Listed: {}", report.listed);
    let _ = writeln!(out, "   Sent: {}", report.sent);
    let _ = writeln!(out, "   Archived: {}", report.archived);
    if report.prepared > 0 {
        let _ = writeln!(out, "   Prepared (dry run): {}", report.prepared);
    }
    let _ = writeln!(out, "   Skipped: {}", report.skipped);
    let _ = writeln!(
        out,
        "   Images: {} inlined, {} dropped",
        report.images_inlined, report.images_dropped
    );

    if !report.errors.is_empty() {
        let _ = writeln!(out, "   Errors: {}", report.errors.len());
        for err in &report.errors {
            let _ = writeln!(out, "     - {err}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_errors_with_counts() {
        let report = SyncReport {
            listed: 2,
            sent: 1,
            archived: 1,
            skipped: 1,
            errors: vec!["7: send failed".to_string()],
            ..SyncReport::default()
        };

        let out = summary(&report);
        assert!(out.contains("   Sent: 1"));
        assert!(out.contains("   Errors: 1"));
        assert!(out.contains("     - 7: send failed"));
        assert!(!out.contains("Prepared"));
    }

    #[test]
    fn test_summary_without_articles() {
        let out = summary(&SyncReport::default());
        assert_eq!(out, "\nNo unread articles found.\n");
    }
}
