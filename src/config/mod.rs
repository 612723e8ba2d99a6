//! Pluggable configuration provider system.
//!
//! ```rust,no_run
//! use lsp_attach::config::ConfigBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigBuilder::new()
//!     .env()
//!     .file("lsp-attach.json")
//!     .load()
//!     .await?;
//! println!("detach policy: {:?}", config.detach_policy);
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod file;
pub mod layers;
pub mod manager;
pub mod memory;
pub mod provider;

pub use env::{ENV_PREFIX, EnvConfigProvider};
pub use file::FileConfigProvider;
pub use layers::ConfigLayers;
pub use manager::{DEFAULT_DEBOUNCE_MS, DetachPolicy, MAX_DEBOUNCE_MS, ManagerConfig};
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Key not found: {key}")]
    NotFound { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Fluent builder for [`ConfigLayers`].
///
/// Providers added first take priority.
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add `LSP_ATTACH_*` environment variables
    pub fn env(mut self) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::default_prefix()));
        self
    }

    pub fn env_with_prefix(mut self, prefix: &str) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::prefixed(prefix)));
        self
    }

    pub fn file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.providers.push(Box::new(FileConfigProvider::new(
            path.as_ref().to_path_buf(),
        )));
        self
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> ConfigLayers {
        ConfigLayers::new(self.providers)
    }

    /// Build the layers and read a validated [`ManagerConfig`] from them.
    pub async fn load(self) -> ConfigResult<ManagerConfig> {
        let layers = self.build();
        tracing::debug!(layers = ?layers.names(), "Loading manager config");
        ManagerConfig::load(&layers).await
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "debounceMs".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for debounceMs: must be positive"
        );
    }

    #[test]
    fn test_config_builder() {
        let layers = ConfigBuilder::new()
            .memory(MemoryConfigProvider::named("overrides"))
            .env()
            .build();
        assert_eq!(layers.names(), vec!["overrides", "env"]);
        assert_eq!(layers.len(), 2);
    }

    #[tokio::test]
    async fn test_builder_load_uses_first_provider() {
        let config = ConfigBuilder::new()
            .memory(MemoryConfigProvider::new().value("debounceMs", "40"))
            .memory(MemoryConfigProvider::new().value("debounceMs", "900"))
            .load()
            .await
            .unwrap();
        assert_eq!(config.debounce_ms, 40);
    }
}
