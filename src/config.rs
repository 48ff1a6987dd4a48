use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REPORT_RECIPIENT: &str = "investor@financeio.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub base_url: String,
    pub report_recipient: String,
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            base_url: DEFAULT_API_URL.to_string(),
            report_recipient: DEFAULT_REPORT_RECIPIENT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DashboardConfig {
    /// Read settings from the environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DashboardConfig::default();

        if let Some(url) = lookup("DASHBOARD_API_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        if let Some(recipient) = lookup("DASHBOARD_REPORT_RECIPIENT").filter(|v| !v.trim().is_empty()) {
            config.report_recipient = recipient.trim().to_string();
        }

        if let Some(raw) = lookup("DASHBOARD_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("DASHBOARD_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
