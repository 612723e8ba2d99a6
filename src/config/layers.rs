//! Layered configuration sources.

use super::ConfigResult;
use super::provider::ConfigProvider;

/// Sources built by [`ConfigBuilder`](super::ConfigBuilder), consulted in the
/// order they were added. The first layer holding a key supplies it.
pub struct ConfigLayers {
    layers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigLayers {
    pub(crate) fn new(layers: Vec<Box<dyn ConfigProvider>>) -> Self {
        Self { layers }
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Resolve `key` together with the name of the layer that supplied it.
    pub async fn resolve(&self, key: &str) -> ConfigResult<Option<(&str, String)>> {
        for layer in &self.layers {
            if let Some(value) = layer.get_raw(key).await? {
                tracing::trace!(key, layer = layer.name(), "Config value resolved");
                return Ok(Some((layer.name(), value)));
            }
        }
        Ok(None)
    }
}

#[async_trait::async_trait]
impl ConfigProvider for ConfigLayers {
    fn name(&self) -> &str {
        "layers"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.resolve(key).await?.map(|(_, value)| value))
    }
}

impl std::fmt::Debug for ConfigLayers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLayers")
            .field("layers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory::MemoryConfigProvider;

    fn layers() -> ConfigLayers {
        ConfigLayers::new(vec![
            Box::new(MemoryConfigProvider::named("overrides").value("debounceMs", "50")),
            Box::new(
                MemoryConfigProvider::named("defaults")
                    .value("debounceMs", "500")
                    .value("detachPolicy", "perService"),
            ),
        ])
    }

    #[tokio::test]
    async fn test_earlier_layer_supplies_key() {
        let layers = layers();

        assert_eq!(
            layers.get_raw("debounceMs").await.unwrap(),
            Some("50".to_string())
        );
        assert_eq!(
            layers.get_raw("detachPolicy").await.unwrap(),
            Some("perService".to_string())
        );
        assert_eq!(layers.get_raw("groupNamespace").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_names_source_layer() {
        let layers = layers();

        assert_eq!(
            layers.resolve("debounceMs").await.unwrap(),
            Some(("overrides", "50".to_string()))
        );
        assert_eq!(
            layers.resolve("detachPolicy").await.unwrap(),
            Some(("defaults", "perService".to_string()))
        );
    }

    #[tokio::test]
    async fn test_no_layers_resolves_nothing() {
        let layers = ConfigLayers::new(Vec::new());
        assert!(layers.is_empty());
        assert_eq!(layers.resolve("debounceMs").await.unwrap(), None);
    }
}
