//! Run configuration sourced from the environment.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Default SMTP host (Gmail).
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (implicit TLS).
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Subject line that asks the Kindle service to convert the attachment.
pub const DEFAULT_SUBJECT: &str = "Convert";

/// Default timeout for a single image download, in seconds.
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 15;

const ENV_WALLABAG_URL: &str = "WALLABAG_URL";
const ENV_WALLABAG_CLIENT_ID: &str = "WALLABAG_CLIENT_ID";
const ENV_WALLABAG_CLIENT_SECRET: &str = "WALLABAG_CLIENT_SECRET";
const ENV_WALLABAG_USERNAME: &str = "WALLABAG_USERNAME";
const ENV_WALLABAG_PASSWORD: &str = "WALLABAG_PASSWORD";
const ENV_GMAIL_USER: &str = "GMAIL_USER";
const ENV_GMAIL_APP_PASSWORD: &str = "GMAIL_APP_PASSWORD";
const ENV_KINDLE_EMAIL: &str = "KINDLE_EMAIL";
const ENV_SMTP_HOST: &str = "SMTP_HOST";
const ENV_SMTP_PORT: &str = "SMTP_PORT";
const ENV_KINDLE_SUBJECT: &str = "KINDLE_SUBJECT";
const ENV_IMAGE_TIMEOUT_SECS: &str = "IMAGE_TIMEOUT_SECS";

/// Credentials for the Wallabag password grant.
#[derive(Clone)]
pub struct WallabagConfig {
    /// Service base URL, e.g. `https://app.wallabag.it`.
    pub base_url: Url,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Outgoing mail settings.
#[derive(Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// Sender address, also the SMTP username.
    pub from_email: String,
    /// App-specific password for the sender account.
    pub app_password: String,
    /// Send-to-Kindle address.
    pub kindle_email: String,
    /// Subject line for every delivery.
    pub subject: String,
}

/// Everything a run needs, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub wallabag: WallabagConfig,
    pub mail: MailConfig,
    /// Bound on each image download.
    pub image_timeout: Duration,
}

impl Config {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `WALLABAG_URL`, `WALLABAG_CLIENT_ID`, `WALLABAG_CLIENT_SECRET`
    /// - `WALLABAG_USERNAME`, `WALLABAG_PASSWORD`
    /// - `GMAIL_USER`, `GMAIL_APP_PASSWORD`, `KINDLE_EMAIL`
    ///
    /// # Optional Environment Variables
    /// - `SMTP_HOST` (default: smtp.gmail.com)
    /// - `SMTP_PORT` (default: 465)
    /// - `KINDLE_SUBJECT` (default: Convert)
    /// - `IMAGE_TIMEOUT_SECS` (default: 15)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let raw_url = required(ENV_WALLABAG_URL);
        let client_id = required(ENV_WALLABAG_CLIENT_ID);
        let client_secret = required(ENV_WALLABAG_CLIENT_SECRET);
        let username = required(ENV_WALLABAG_USERNAME);
        let password = required(ENV_WALLABAG_PASSWORD);
        let from_email = required(ENV_GMAIL_USER);
        let app_password = required(ENV_GMAIL_APP_PASSWORD);
        let kindle_email = required(ENV_KINDLE_EMAIL);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let base_url = parse_base_url(raw_url.trim())?;

        let smtp_host = lookup(ENV_SMTP_HOST)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let smtp_port = lookup(ENV_SMTP_PORT)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);

        let subject = lookup(ENV_KINDLE_SUBJECT)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let image_timeout_secs = lookup(ENV_IMAGE_TIMEOUT_SECS)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_IMAGE_TIMEOUT_SECS);

        Ok(Self {
            wallabag: WallabagConfig {
                base_url,
                client_id,
                client_secret,
                username,
                password,
            },
            mail: MailConfig {
                smtp_host,
                smtp_port,
                from_email,
                app_password,
                kindle_email,
                subject,
            },
            image_timeout: Duration::from_secs(image_timeout_secs),
        })
    }
}

/// Parse the service URL so that relative joins keep any path prefix.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })
}

// we want the Debug impls to not print secrets
impl Debug for WallabagConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WallabagConfig")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl Debug for MailConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("from_email", &self.from_email)
            .field("app_password", &"[redacted]")
            .field("kindle_email", &self.kindle_email)
            .field("subject", &self.subject)
            .finish()
    }
}
