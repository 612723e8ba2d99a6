//! File-based Configuration Provider
//!
//! Loads configuration from a JSON file. A missing file yields no values.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::ConfigResult;
use super::provider::ConfigProvider;

/// File-based configuration provider
pub struct FileConfigProvider {
    path: PathBuf,
    data: Arc<RwLock<Option<HashMap<String, serde_json::Value>>>>,
}

impl FileConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: Arc::new(RwLock::new(None)),
        }
    }

    async fn load(&self) -> ConfigResult<HashMap<String, serde_json::Value>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(HashMap::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let data: HashMap<String, serde_json::Value> = serde_json::from_str(&content)?;
        Ok(data)
    }

    async fn ensure_loaded(&self) -> ConfigResult<()> {
        let mut data = self.data.write().await;
        if data.is_none() {
            *data = Some(self.load().await?);
        }
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait::async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        self.ensure_loaded().await?;

        let data = self.data.read().await;
        let Some(map) = data.as_ref() else {
            return Ok(None);
        };

        // Dotted keys walk nested objects
        let mut parts = key.split('.');
        let mut current = parts.next().and_then(|first| map.get(first));
        for part in parts {
            current = current.and_then(|v| v.get(part));
        }

        match current {
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(v) => Ok(Some(v.to_string())),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_provider_reads_nested_keys() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("lsp-attach.json");

        let config = serde_json::json!({
            "detachPolicy": "perService",
            "debounceMs": 300,
            "highlight": { "namespace": "custom" }
        });
        tokio::fs::write(&config_path, config.to_string())
            .await
            .unwrap();

        let provider = FileConfigProvider::new(config_path);
        assert_eq!(
            provider.get_raw("detachPolicy").await.unwrap(),
            Some("perService".to_string())
        );
        assert_eq!(
            provider.get_raw("debounceMs").await.unwrap(),
            Some("300".to_string())
        );
        assert_eq!(
            provider.get_raw("highlight.namespace").await.unwrap(),
            Some("custom".to_string())
        );
        assert_eq!(provider.get_raw("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_provider_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let provider = FileConfigProvider::new(temp_dir.path().join("absent.json"));
        assert_eq!(provider.get_raw("debounceMs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_provider_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        tokio::fs::write(&config_path, "{ not json").await.unwrap();

        let provider = FileConfigProvider::new(config_path);
        assert!(provider.get_raw("debounceMs").await.is_err());
    }
}
