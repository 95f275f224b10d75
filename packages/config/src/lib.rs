#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Configuration for the courier tracking services.
//!
//! Settings are read from an optional TOML file (path in
//! `COURIER_TRACK_CONFIG`) and then overridden by environment variables:
//!
//! | Variable | Field |
//! | --- | --- |
//! | `ORDER_SERVICE_URL` | [`AppConfig::endpoint`] |
//! | `AUTHORIZED_USERS` | [`AppConfig::allow_list`] (comma-separated) |
//! | `GOOGLE_CLIENT_ID` | [`AppConfig::client_id`] |
//! | `REFRESH_INTERVAL_SECS` | [`AppConfig::refresh_interval_secs`] |
//! | `BIND_ADDR` / `PORT` | [`AppConfig::bind_addr`] / [`AppConfig::port`] |
//! | `GEOCODER_URL` | self-hosted Pelias instance (enables Pelias) |
//! | `ROUTER_URL` | OSRM base URL override |
//!
//! The resulting [`AppConfig`] is passed into the components that need it;
//! nothing reads the environment after startup.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_VAR: &str = "COURIER_TRACK_CONFIG";

/// How often a held order is re-read by default.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting has no value.
    #[error("Missing required setting {key}")]
    Missing {
        /// Environment variable (or TOML key) that must be set.
        key: &'static str,
    },

    /// A setting could not be parsed.
    #[error("Invalid value for {key}: {value}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings shared by the server and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote order service URL.
    pub endpoint: String,
    /// Emails allowed to post courier updates.
    pub allow_list: Vec<String>,
    /// OAuth client id that ID tokens must be issued for.
    pub client_id: String,
    /// Seconds between refreshes of a held order.
    pub refresh_interval_secs: u64,
    /// Server bind address.
    pub bind_addr: String,
    /// Server port.
    pub port: u16,
    /// Self-hosted Pelias instance; when set it is tried before Nominatim.
    pub geocoder_url: Option<String>,
    /// Base URL override for the route service.
    pub router_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            allow_list: Vec::new(),
            client_id: String::new(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            geocoder_url: None,
            router_url: None,
        }
    }
}

impl AppConfig {
    /// Loads the config file named by `COURIER_TRACK_CONFIG` (if any), then
    /// applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, an
    /// override is malformed, or the order service URL is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.is_empty() => {
                log::info!("Reading config from {path}");
                Self::from_file(Path::new(&path))?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parses TOML config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not a valid config.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    /// Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric override does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ORDER_SERVICE_URL") {
            self.endpoint = v;
        }
        if let Some(v) = get("AUTHORIZED_USERS") {
            self.allow_list = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = get("GOOGLE_CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = get("REFRESH_INTERVAL_SECS") {
            self.refresh_interval_secs = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "REFRESH_INTERVAL_SECS",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = get("PORT") {
            self.port = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("GEOCODER_URL") {
            self.geocoder_url = Some(v);
        }
        if let Some(v) = get("ROUTER_URL") {
            self.router_url = Some(v);
        }
        Ok(())
    }

    /// Checks the settings every component needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the endpoint is missing or the refresh
    /// interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "ORDER_SERVICE_URL",
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "REFRESH_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Checks the settings the identity check needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no OAuth client id is set.
    pub fn require_identity(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "GOOGLE_CLIENT_ID",
            });
        }
        if self.allow_list.is_empty() {
            log::warn!("AUTHORIZED_USERS is empty; every courier update will be refused");
        }
        Ok(())
    }

    /// Refresh interval as a [`Duration`].
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_refresh_every_minute() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn parses_toml() {
        let config = AppConfig::from_toml(
            r#"
            endpoint = "https://script.example/exec"
            allow_list = ["a@example.com"]
            client_id = "abc.apps.googleusercontent.com"
            port = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://script.example/exec");
        assert_eq!(config.allow_list, ["a@example.com"]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.refresh_interval_secs, 60);
    }

    #[test]
    fn env_overrides_file() {
        let mut config = AppConfig::from_toml(r#"endpoint = "https://file.example""#).unwrap();
        config
            .apply_overrides(env(&[
                ("ORDER_SERVICE_URL", "https://env.example"),
                ("AUTHORIZED_USERS", "a@example.com, b@example.com,,"),
                ("PORT", "4000"),
                ("GEOCODER_URL", "  "),
            ]))
            .unwrap();
        assert_eq!(config.endpoint, "https://env.example");
        assert_eq!(config.allow_list, ["a@example.com", "b@example.com"]);
        assert_eq!(config.port, 4000);
        assert!(config.geocoder_url.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.apply_overrides(env(&[("PORT", "eighty")])),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
    }

    #[test]
    fn requires_endpoint() {
        assert!(matches!(
            AppConfig::default().validate(),
            Err(ConfigError::Missing {
                key: "ORDER_SERVICE_URL"
            })
        ));
    }

    #[test]
    fn identity_requires_client_id() {
        let config = AppConfig {
            endpoint: "https://script.example".to_string(),
            ..AppConfig::default()
        };
        assert!(config.require_identity().is_err());
    }
}
