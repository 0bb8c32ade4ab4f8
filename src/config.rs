//! Client configuration.
//!
//! Settings are layered: built-in defaults, then `onyx.toml` in the working
//! directory (if present), then an explicit file, then `ONYX_*` environment
//! variables (`ONYX_BASE_URL`, `ONYX_API_KEY`, `ONYX_TIMEOUT_SECS`), then any
//! [`ConfigOverrides`] supplied by the caller.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{OnyxError, OnyxResult};

/// Per-request deadline used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Origin of the Onyx server, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Sent as `Authorization: Bearer <key>` when set.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Highest-priority settings, typically taken from command-line flags.
/// Fields left `None` fall through to the lower layers.
#[derive(Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from files and the environment.
    pub fn load(path: Option<&Path>) -> OnyxResult<Self> {
        Self::load_with(path, ConfigOverrides::default())
    }

    /// Like [`load`](Self::load), with `overrides` applied on top of every
    /// other layer.
    pub fn load_with(path: Option<&Path>, overrides: ConfigOverrides) -> OnyxResult<Self> {
        let mut builder = Config::builder()
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)
            .map_err(|err| OnyxError::Config(err.to_string()))?
            .add_source(File::with_name("onyx").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix("ONYX").try_parsing(true))
            .set_override_option("base_url", overrides.base_url)
            .and_then(|b| b.set_override_option("api_key", overrides.api_key))
            .and_then(|b| {
                b.set_override_option("timeout_secs", overrides.timeout_secs.map(|t| t as i64))
            })
            .map_err(|err| OnyxError::Config(err.to_string()))?
            .build()
            .map_err(|err| OnyxError::Config(err.to_string()))?;

        let parsed: ClientConfig = config
            .try_deserialize()
            .map_err(|err| OnyxError::Config(err.to_string()))?;

        if parsed.base_url.trim().is_empty() {
            return Err(OnyxError::Config("base_url must not be empty".to_string()));
        }
        if parsed.timeout_secs == 0 {
            return Err(OnyxError::Config("timeout_secs must be at least 1".to_string()));
        }

        Ok(parsed)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn new_uses_default_timeout() {
        let cfg = ClientConfig::new("http://localhost:3000");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = ClientConfig::new("http://localhost:3000").with_api_key("sk-secret");
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn loads_explicit_file_and_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(&path, "base_url = \"http://onyx.internal:8080\"\napi_key = \"k\"\n").unwrap();

        let cfg = ClientConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.base_url, "http://onyx.internal:8080");
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn overrides_sit_on_top_of_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(
            &path,
            "base_url = \"http://from-file:8080\"\napi_key = \"file-key\"\ntimeout_secs = 12\n",
        )
        .unwrap();

        let overrides = ConfigOverrides {
            base_url: Some("http://from-flag:9090".to_string()),
            ..Default::default()
        };
        let cfg = ClientConfig::load_with(Some(&path), overrides).unwrap();
        assert_eq!(cfg.base_url, "http://from-flag:9090");
        assert_eq!(cfg.api_key.as_deref(), Some("file-key"));
        assert_eq!(cfg.timeout_secs, 12);

        let overrides = ConfigOverrides {
            api_key: Some("flag-key".to_string()),
            timeout_secs: Some(3),
            ..Default::default()
        };
        let cfg = ClientConfig::load_with(Some(&path), overrides).unwrap();
        assert_eq!(cfg.base_url, "http://from-file:8080");
        assert_eq!(cfg.api_key.as_deref(), Some("flag-key"));
        assert_eq!(cfg.timeout_secs, 3);
    }

    #[test]
    fn zero_timeout_in_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(&path, "base_url = \"http://h:1\"\ntimeout_secs = 0\n").unwrap();
        let err = ClientConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, OnyxError::Config(_)));
    }

    #[test]
    fn missing_explicit_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let err = ClientConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, OnyxError::Config(_)));
    }
}
