//! Configuration Provider Trait

use serde::de::DeserializeOwned;

use super::ConfigResult;

/// Read-only source of configuration values.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Get a raw configuration value
    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Extension methods for typed configuration access
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a typed configuration value.
    ///
    /// Raw values are read as JSON first; a value that is not valid JSON is
    /// retried as a JSON string so `LSP_ATTACH_DETACH_POLICY=perService`
    /// works without quoting.
    fn get<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
    {
        async move {
            match self.get_raw(key).await? {
                Some(raw) => {
                    let value: T = serde_json::from_str(&raw)
                        .or_else(|_| serde_json::from_value(serde_json::Value::String(raw)))
                        .map_err(|e| super::ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}
