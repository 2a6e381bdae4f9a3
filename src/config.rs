use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "urnavi-bot/0.1 (+https://urnavi.com)";

/// Runtime settings for one ingest run, resolved from the environment
/// with optional CLI overrides applied on top.
#[derive(Debug, Clone)]
pub struct Settings {
    pub concurrency: usize,
    pub user_agent: String,
    pub horizon_months: u32,
    pub source_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        let concurrency = std::env::var("INGEST_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CONCURRENCY);

        let user_agent = std::env::var("INGEST_USER_AGENT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let horizon_months = std::env::var("INGEST_HORIZON_MONTHS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_HORIZON_MONTHS);

        let timeout_secs = std::env::var("INGEST_SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);

        Self {
            concurrency,
            user_agent,
            horizon_months,
            source_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            horizon_months: DEFAULT_HORIZON_MONTHS,
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
        }
    }
}
