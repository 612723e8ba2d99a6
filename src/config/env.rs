//! Environment Variable Configuration Provider
//!
//! Environment variables are treated as immutable at runtime because
//! modifying them is not thread-safe.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

/// Prefix used by [`EnvConfigProvider::default_prefix`].
pub const ENV_PREFIX: &str = "LSP_ATTACH_";

/// Read-only environment variable configuration provider.
///
/// Keys map to variable names by upper-casing, splitting camelCase words and
/// replacing `.` with `_`, so `debounceMs` under the default prefix reads
/// `LSP_ATTACH_DEBOUNCE_MS`.
#[derive(Debug, Clone)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment provider with no prefix
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Create an environment provider with a prefix
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Provider reading `LSP_ATTACH_*` variables
    pub fn default_prefix() -> Self {
        Self::prefixed(ENV_PREFIX)
    }

    fn env_key(&self, key: &str) -> String {
        let mut name = String::with_capacity(key.len() + 4);
        for (i, c) in key.chars().enumerate() {
            match c {
                '.' => name.push('_'),
                c if c.is_ascii_uppercase() && i > 0 => {
                    name.push('_');
                    name.push(c);
                }
                c => name.push(c.to_ascii_uppercase()),
            }
        }
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, name),
            None => name,
        }
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.env_key(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }
}
