use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::session::{SessionConfig, SessionError};
use crate::store::{RetryConfig, DEFAULT_WRITE_TIMEOUT};
use crate::sync::ReplicationOrdering;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid [session] settings: {0}")]
    Session(#[from] SessionError),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub session: SessionSettings,
    pub store: StoreSettings,
    pub sync: SyncSettings,
    pub relay: RelaySettings,
}

/// Defaults for new sessions
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub participants: usize,
    pub work_seconds: u32,
    pub rest_seconds: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    /// Relay base URL; local-only when unset
    pub url: Option<String>,
    pub probe_timeout: Duration,
    /// Bound on each snapshot write to the relay
    pub write_timeout: Duration,
    /// Reconnect policy for athlete subscriptions
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub ordering: ReplicationOrdering,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    /// Idle sessions are purged after this long; kept forever when unset
    pub session_ttl: Option<Duration>,
    /// Allow browser requests from any origin
    pub cors_permissive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionSettings {
                participants: 4,
                work_seconds: 40,
                rest_seconds: 20,
            },
            store: StoreSettings {
                url: None,
                probe_timeout: Duration::from_secs(2),
                write_timeout: DEFAULT_WRITE_TIMEOUT,
                retry: RetryConfig::default(),
            },
            sync: SyncSettings {
                ordering: ReplicationOrdering::Newest,
            },
            relay: RelaySettings {
                host: "127.0.0.1".to_string(),
                port: 7420,
                session_ttl: None,
                cors_permissive: true,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlSessionConfig {
    pub participants: Option<usize>,
    pub work_seconds: Option<u32>,
    pub rest_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlStoreConfig {
    pub url: Option<String>,
    pub probe_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
    pub retry_initial_ms: Option<u64>,
    pub retry_max_ms: Option<u64>,
    pub max_retries: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlSyncConfig {
    pub ordering: Option<ReplicationOrdering>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlRelayConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub session_ttl_secs: Option<u64>,
    pub cors_permissive: Option<bool>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub session: Option<TomlSessionConfig>,
    pub store: Option<TomlStoreConfig>,
    pub sync: Option<TomlSyncConfig>,
    pub relay: Option<TomlRelayConfig>,
}

impl Config {
    /// Load from `path`, writing the bundled example there on first run.
    ///
    /// A missing file yields the defaults. A file that does not parse is an
    /// error rather than being silently ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse a config file body on top of the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(session) = toml_config.session {
            if let Some(participants) = session.participants {
                config.session.participants = participants;
            }
            if let Some(work_seconds) = session.work_seconds {
                config.session.work_seconds = work_seconds;
            }
            if let Some(rest_seconds) = session.rest_seconds {
                config.session.rest_seconds = rest_seconds;
            }
            // Reject zero values here rather than at session creation
            config.session_config()?;
        }

        if let Some(store) = toml_config.store {
            if store.url.is_some() {
                config.store.url = store.url;
            }
            if let Some(ms) = store.probe_timeout_ms {
                config.store.probe_timeout = Duration::from_millis(ms);
            }
            if let Some(ms) = store.write_timeout_ms {
                config.store.write_timeout = Duration::from_millis(ms);
            }
            if let Some(ms) = store.retry_initial_ms {
                config.store.retry.initial_delay = Duration::from_millis(ms);
            }
            if let Some(ms) = store.retry_max_ms {
                config.store.retry.max_delay = Duration::from_millis(ms);
            }
            if let Some(max_retries) = store.max_retries {
                config.store.retry.max_retries = max_retries;
            }
        }

        if let Some(sync) = toml_config.sync {
            if let Some(ordering) = sync.ordering {
                config.sync.ordering = ordering;
            }
        }

        if let Some(relay) = toml_config.relay {
            if let Some(host) = relay.host {
                config.relay.host = host;
            }
            if let Some(port) = relay.port {
                config.relay.port = port;
            }
            if let Some(secs) = relay.session_ttl_secs {
                config.relay.session_ttl = Some(Duration::from_secs(secs));
            }
            if let Some(cors_permissive) = relay.cors_permissive {
                config.relay.cors_permissive = cors_permissive;
            }
        }

        Ok(config)
    }

    /// Validated session settings
    pub fn session_config(&self) -> Result<SessionConfig, SessionError> {
        SessionConfig::new(
            self.session.participants,
            self.session.work_seconds,
            self.session.rest_seconds,
        )
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config = Config::from_toml_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_toml_str(
            r#"
            [session]
            participants = 6
            work_seconds = 30

            [store]
            url = "http://localhost:9000"
            probe_timeout_ms = 500
            write_timeout_ms = 1500
            retry_initial_ms = 100
            max_retries = 2

            [sync]
            ordering = "arrival"

            [relay]
            port = 8080
            session_ttl_secs = 60
            cors_permissive = false
            "#,
        )
        .unwrap();

        assert_eq!(config.session.participants, 6);
        assert_eq!(config.session.work_seconds, 30);
        assert_eq!(config.session.rest_seconds, 20);
        assert_eq!(config.store.url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.store.probe_timeout, Duration::from_millis(500));
        assert_eq!(config.sync.ordering, ReplicationOrdering::Arrival);
        assert_eq!(config.relay.host, "127.0.0.1");
        assert_eq!(config.relay.port, 8080);
        assert_eq!(config.relay.session_ttl, Some(Duration::from_secs(60)));
        assert!(!config.relay.cors_permissive);
        assert_eq!(config.store.write_timeout, Duration::from_millis(1500));
        assert_eq!(config.store.retry.initial_delay, Duration::from_millis(100));
        assert_eq!(config.store.retry.max_delay, Duration::from_secs(10));
        assert_eq!(config.store.retry.max_retries, 2);
    }

    #[test]
    fn test_unknown_sections_and_keys_are_errors() {
        let result = Config::from_toml_str("[sesion]
participants = 6
");
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = Config::from_toml_str("[session]
participant = 6
");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_ordering_is_an_error() {
        let result = Config::from_toml_str("[sync]\nordering = \"fastest\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        let result = Config::from_toml_str("[session]\nrest_seconds = 0\n");
        assert!(matches!(result, Err(ConfigError::Session(_))));
    }

    #[test]
    fn test_load_creates_example_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), EXAMPLE_CONFIG);

        fs::write(&path, "[relay]\nport = 9999\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().relay.port, 9999);
    }
}
