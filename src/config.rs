//! Application-level configuration loading: IPC location, sync toggles, match format and timings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{match_state::MatchRules, sets::DrawPolicy, turns::TurnFormat};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TOURNEY_LINK_CONFIG_PATH";
/// Directory shared with the game client when none is configured.
const DEFAULT_IPC_ROOT: &str = "ipc";
/// Set index of the tiebreaker in a best-of-nine.
const DEFAULT_TIEBREAKER_INDEX: usize = 4;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Directory holding the IPC files.
    pub ipc_root: PathBuf,
    /// Whether the poller starts enabled.
    pub inbound_sync: bool,
    /// Whether the publisher flush tasks are started.
    pub outbound_sync: bool,
    /// Apply inbound beatmap changes as choices once bans are complete.
    pub auto_pick: bool,
    /// Pick/ban sequence of new matches.
    pub turn_format: TurnFormat,
    /// Set index holding the tiebreaker.
    pub tiebreaker_index: usize,
    /// Resolution of drawn sets.
    pub draw_policy: DrawPolicy,
    /// Inbound poll period.
    pub poll_interval: Duration,
    /// Score flush period.
    pub score_flush: Duration,
    /// Chat flush period.
    pub chat_flush: Duration,
    /// Delay before a failed write is retried.
    pub write_retry: Duration,
    /// Poll period of the beatmap background watcher.
    pub background_poll: Duration,
    /// Base URL of the beatmap lookup service; lookups are disabled when unset.
    pub lookup_url: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        ipc_root = %app_config.ipc_root.display(),
                        format = ?app_config.turn_format,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Rules new matches are created with.
    pub fn match_rules(&self) -> MatchRules {
        MatchRules {
            template: self.turn_format.template(),
            tiebreaker_index: self.tiebreaker_index,
            draw_policy: self.draw_policy,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    ipc_root: Option<PathBuf>,
    inbound_sync: Option<bool>,
    outbound_sync: Option<bool>,
    auto_pick: Option<bool>,
    turn_format: Option<TurnFormat>,
    tiebreaker_index: Option<usize>,
    draw_policy: Option<DrawPolicy>,
    poll_interval_ms: Option<u64>,
    score_flush_ms: Option<u64>,
    chat_flush_ms: Option<u64>,
    write_retry_ms: Option<u64>,
    background_poll_ms: Option<u64>,
    lookup_url: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let millis = |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));

        Self {
            ipc_root: value
                .ipc_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IPC_ROOT)),
            inbound_sync: value.inbound_sync.unwrap_or(true),
            outbound_sync: value.outbound_sync.unwrap_or(true),
            auto_pick: value.auto_pick.unwrap_or(true),
            turn_format: value.turn_format.unwrap_or_default(),
            tiebreaker_index: value.tiebreaker_index.unwrap_or(DEFAULT_TIEBREAKER_INDEX),
            draw_policy: value.draw_policy.unwrap_or_default(),
            poll_interval: millis(value.poll_interval_ms, 250),
            score_flush: millis(value.score_flush_ms, 200),
            chat_flush: millis(value.chat_flush_ms, 500),
            write_retry: millis(value.write_retry_ms, 50),
            background_poll: millis(value.background_poll_ms, 200),
            lookup_url: value.lookup_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_timings() {
        let config = AppConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.score_flush, Duration::from_millis(200));
        assert_eq!(config.chat_flush, Duration::from_millis(500));
        assert_eq!(config.write_retry, Duration::from_millis(50));
        assert_eq!(config.turn_format, TurnFormat::Standard);
        assert_eq!(config.draw_policy, DrawPolicy::RedWins);
        assert_eq!(config.lookup_url, None);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "ipc_root": "/tmp/stable",
                "turn_format": {"format": "extended"},
                "draw_policy": "undetermined",
                "poll_interval_ms": 100,
                "lookup_url": "  "
            }"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.ipc_root, PathBuf::from("/tmp/stable"));
        assert_eq!(config.turn_format, TurnFormat::Extended);
        assert_eq!(config.draw_policy, DrawPolicy::Undetermined);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.score_flush, Duration::from_millis(200));
        assert_eq!(config.tiebreaker_index, 4);
        assert_eq!(config.lookup_url, None);
        assert_eq!(config.match_rules().template.len(), 16);
    }
}
