//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml, layered with an optional user
//! config file and environment variable overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;
use crate::iam::{ClientOptions, UnmatchedStatus};
use crate::secure::SecureString;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// User config file name inside the platform config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Placeholder shipped in the embedded config.
const PLACEHOLDER_URL: &str = "YOUR_DEVICE_GATEWAY_URL";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub device: DeviceConfig,
    pub iam: IamConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub url: String,
    #[serde(default)]
    pub token: SecureString,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IamConfig {
    #[serde(default)]
    pub report_unmatched_remove_role: bool,
}

impl IamConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            remove_role_unmatched: if self.report_unmatched_remove_role {
                UnmatchedStatus::Report
            } else {
                UnmatchedStatus::Silent
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Get the path to the user config file.
///
/// Returns `~/.config/deviceiam/config.toml` on Linux.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("de", "malvik", "deviceiam")
        .map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE))
}

impl Config {
    /// Load configuration from embedded config.toml, the user config file and
    /// environment variables. The result is not validated yet so callers can
    /// apply command-line overrides first.
    pub fn load() -> Result<Self, ConfigError> {
        let user_file = user_config_path().filter(|p| p.exists());
        Self::load_from(user_file.as_deref(), |key| env::var(key).ok())
    }

    /// Same as [`Config::load`] with explicit sources.
    pub fn load_from(
        user_file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut table = parse_table(CONFIG_TOML, "embedded config.toml")?;

        if let Some(path) = user_file {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let overlay = parse_table(&content, &path.display().to_string())?;
            merge_tables(&mut table, overlay);
            debug!("Applied user configuration from {:?}", path);
        }

        let mut config = toml::Value::Table(table)
            .try_into::<Config>()
            .map_err(|source| ConfigError::Parse {
                origin: "merged configuration".to_string(),
                source,
            })?;

        config.apply_env_overrides(env)?;
        Ok(config)
    }

    fn apply_env_overrides(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = env("DEVICEIAM_URL") {
            self.device.url = url;
        }

        if let Some(token) = env("DEVICEIAM_TOKEN") {
            self.device.token = SecureString::from(token);
        }

        if let Some(timeout) = env("DEVICEIAM_TIMEOUT_SECS") {
            self.device.timeout_secs = timeout.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "DEVICEIAM_TIMEOUT_SECS",
                reason: format!("'{}' is not a number of seconds", timeout),
            })?;
        }

        if let Some(log_level) = env("RUST_LOG") {
            self.logging.level = log_level;
        }

        Ok(())
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.url.is_empty() || self.device.url == PLACEHOLDER_URL {
            return Err(ConfigError::Invalid {
                key: "device.url",
                reason: "device gateway URL not configured. Set DEVICEIAM_URL, pass --url \
                         or update the config file"
                    .to_string(),
            });
        }

        let url = Url::parse(&self.device.url).map_err(|e| ConfigError::Invalid {
            key: "device.url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "device.url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.device.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "device.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_table(content: &str, origin: &str) -> Result<toml::Table, ConfigError> {
    content
        .parse::<toml::Table>()
        .map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
}

/// Recursively overlay `overlay` onto `base`; nested tables merge, everything else replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_parsing() {
        let config = Config::load_from(None, no_env).unwrap();
        assert_eq!(config.device.url, PLACEHOLDER_URL);
        assert!(config.device.token.is_empty());
        assert_eq!(config.device.timeout(), Duration::from_secs(30));
        assert_eq!(config.device.connect_timeout(), Duration::from_secs(10));
        assert!(!config.iam.report_unmatched_remove_role);
        assert_eq!(config.logging.level, "warn");

        // Placeholder URL must not pass validation
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "device.url",
                ..
            })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env = env_of(&[
            ("DEVICEIAM_URL", "https://gateway.local:8443/device/1"),
            ("DEVICEIAM_TOKEN", "secret"),
            ("DEVICEIAM_TIMEOUT_SECS", "5"),
            ("RUST_LOG", "debug"),
        ]);
        let config = Config::load_from(None, env).unwrap();

        assert_eq!(config.device.url, "https://gateway.local:8443/device/1");
        assert_eq!(config.device.token.as_str(), "secret");
        assert_eq!(config.device.timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_timeout_env() {
        let err = Config::load_from(None, env_of(&[("DEVICEIAM_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DEVICEIAM_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_user_file_overlays_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[device]\nurl = \"http://127.0.0.1:8080\"\n\n[iam]\nreport_unmatched_remove_role = true"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path()), no_env).unwrap();

        assert_eq!(config.device.url, "http://127.0.0.1:8080");
        // Keys the user file does not mention keep their defaults
        assert_eq!(config.device.timeout_secs, 30);
        assert_eq!(
            config.iam.client_options().remove_role_unmatched,
            UnmatchedStatus::Report
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_wins_over_user_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nurl = \"http://from-file\"").unwrap();

        let config = Config::load_from(
            Some(file.path()),
            env_of(&[("DEVICEIAM_URL", "http://from-env")]),
        )
        .unwrap();

        assert_eq!(config.device.url, "http://from-env");
    }

    #[test]
    fn test_malformed_user_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device\nurl = ").unwrap();

        let err = Config::load_from(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_user_file() {
        let err =
            Config::load_from(Some(Path::new("/nonexistent/deviceiam.toml")), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::load_from(None, no_env).unwrap();

        config.device.url = "ftp://device".into();
        assert!(config.validate().is_err());

        config.device.url = "not a url".into();
        assert!(config.validate().is_err());

        config.device.url = "http://device".into();
        config.device.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.device.timeout_secs = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_user_config_path() {
        // No home directory in some CI sandboxes
        if let Some(path) = user_config_path() {
            assert!(path.ends_with("deviceiam/config.toml"));
        }
    }

    #[test]
    fn test_merge_tables() {
        let mut base: toml::Table = "[a]\nx = 1\ny = 2\n[b]\nz = 3".parse().unwrap();
        let overlay: toml::Table = "[a]\ny = 20\n[c]\nw = 4".parse().unwrap();

        merge_tables(&mut base, overlay);

        assert_eq!(base["a"]["x"].as_integer(), Some(1));
        assert_eq!(base["a"]["y"].as_integer(), Some(20));
        assert_eq!(base["b"]["z"].as_integer(), Some(3));
        assert_eq!(base["c"]["w"].as_integer(), Some(4));
    }
}
