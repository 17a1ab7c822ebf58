use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::intent::ResolvedLimits;
use crate::types::ChannelKind;

/// Process configuration, loaded once at startup and passed into the
/// runner. Channels and the scorer never read the environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    /// Master kill switch. When false the runner refuses all work.
    pub discovery_enabled: bool,
    /// Serper.dev API key. Empty disables the search-engine channel.
    pub serper_api_key: String,
    /// Channels enabled when a request doesn't name its own.
    pub default_channels: Vec<ChannelKind>,
    pub manual_limits: ResolvedLimits,
    pub daily_limits: ResolvedLimits,
    /// Hard ceiling for a single content fetch.
    pub fetch_timeout_secs: u64,
    /// Root directory for persisted run audit logs.
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables. Optional vars fall
    /// back to production defaults.
    pub fn from_env() -> Self {
        let default_channels = env::var("DISCOVERY_CHANNELS")
            .map(|raw| {
                raw.split(',')
                    .filter_map(ChannelKind::from_str_loose)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let default_channels = if default_channels.is_empty() {
            vec![ChannelKind::SearchEngine, ChannelKind::Keyword]
        } else {
            default_channels
        };

        Self {
            discovery_enabled: env_bool("DISCOVERY_ENABLED", true),
            serper_api_key: env::var("SERPER_API_KEY").unwrap_or_default(),
            default_channels,
            manual_limits: ResolvedLimits {
                max_companies: env_u32("DISCOVERY_MANUAL_MAX_COMPANIES", 10),
                max_leads: env_u32("DISCOVERY_MANUAL_MAX_LEADS", 10),
                max_queries: env_u32("DISCOVERY_MANUAL_MAX_QUERIES", 3),
                time_budget_secs: env_u32("DISCOVERY_MANUAL_TIME_BUDGET_SECS", 300) as u64,
            },
            daily_limits: ResolvedLimits {
                max_companies: env_u32("DISCOVERY_DAILY_MAX_COMPANIES", 30),
                max_leads: env_u32("DISCOVERY_DAILY_MAX_LEADS", 30),
                max_queries: env_u32("DISCOVERY_DAILY_MAX_QUERIES", 5),
                time_budget_secs: env_u32("DISCOVERY_DAILY_TIME_BUDGET_SECS", 600) as u64,
            },
            fetch_timeout_secs: env_u32("DISCOVERY_FETCH_TIMEOUT_SECS", 10) as u64,
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
        }
    }

    /// Log the effective configuration without leaking credentials.
    pub fn log_redacted(&self) {
        info!(
            enabled = self.discovery_enabled,
            serper_key_present = !self.serper_api_key.is_empty(),
            channels = %self
                .default_channels
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(","),
            fetch_timeout_secs = self.fetch_timeout_secs,
            data_dir = %self.data_dir.display(),
            "Discovery config loaded"
        );
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
