//! Session store configuration via `session.toml`
//!
//! A missing file means defaults. Every field is optional; unknown codecs
//! and zero attempt bounds are rejected when the file is loaded.

use serde::{Deserialize, Serialize};
use std::path::Path;

use occ_session_core::{CodecKind, Error, PrefixKeyFormatter, Result, DEFAULT_KEY_PREFIX};

use crate::retry::RetryConfig;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "session.toml";

/// Session store configuration loaded from `session.toml`
///
/// # Example
///
/// ```toml
/// key_prefix = "session:"
/// codec = "json"
///
/// [write_retry]
/// max_attempts = 10
///
/// [destroy_retry]
/// max_attempts = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Namespace prefix prepended to every session id
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Payload codec used when merging conflicting writes
    #[serde(default)]
    pub codec: CodecKind,
    /// Retry policy of the conditional write path
    #[serde(default)]
    pub write_retry: RetryConfig,
    /// Retry policy of the conditional destroy path
    #[serde(default)]
    pub destroy_retry: RetryConfig,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            codec: CodecKind::default(),
            write_retry: RetryConfig::default(),
            destroy_retry: RetryConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Session store configuration
#
# Prefix prepended to every session id to form the store key.
key_prefix = "session:"

# Payload codec used to decode both sides of a write conflict before
# merging: "json" (default) or "msgpack".
codec = "json"

# Conditional write retries. A write that is still conflicting after
# max_attempts is reported as RetryExhausted and its data is lost.
# base_delay_ms = 0 retries immediately; otherwise the delay doubles per
# attempt up to max_delay_ms, optionally with full jitter.
[write_retry]
max_attempts = 10
base_delay_ms = 0
max_delay_ms = 0
jitter = false

# Conditional destroy retries.
[destroy_retry]
max_attempts = 10
"#
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on malformed TOML or invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            Error::Config(format!("Invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the protocol cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.write_retry.max_attempts == 0 {
            return Err(Error::Config(
                "write_retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.destroy_retry.max_attempts == 0 {
            return Err(Error::Config(
                "destroy_retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Key formatter for the configured prefix
    pub fn key_formatter(&self) -> PrefixKeyFormatter {
        PrefixKeyFormatter::new(self.key_prefix.clone())
    }
}
