use std::time::Duration;

use crate::error::{Error, Result};

pub fn normalize_env_value(raw: String) -> String {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return inner.trim().to_string();
    }

    trimmed.to_string()
}

pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(normalize_env_value)
        .filter(|s| !s.is_empty())
}

/// Explicit database configuration. Constructed once at process start and
/// injected into `db::connect`; there is no global handle.
#[derive(Clone, Debug)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub sqlx_logging: bool,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            min_connections: 0,
            connect_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(30),
            sqlx_logging: false,
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = env_string("DATABASE_URL")
            .ok_or_else(|| Error::validation("DATABASE_URL is required"))?;
        Ok(Self::new(url))
    }
}

/// Transactional-email configuration. `None` from the environment means
/// mail is disabled and assignment notifications are silently skipped.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub api_url: String,
}

pub const DEFAULT_MAIL_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

impl MailConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env_string("BREVO_API_KEY")?;
        let sender_email = env_string("BREVO_SENDER_EMAIL")?;

        Some(Self {
            api_key,
            sender_email,
            sender_name: env_string("BREVO_SENDER_NAME"),
            api_url: env_string("BREVO_API_URL")
                .unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_quotes() {
        assert_eq!(normalize_env_value("\"sqlite::memory:\"".into()), "sqlite::memory:");
        assert_eq!(normalize_env_value("' spaced '".into()), "spaced");
        assert_eq!(normalize_env_value("  plain  ".into()), "plain");
    }
}
