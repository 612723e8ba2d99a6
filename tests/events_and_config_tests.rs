//! Event and Configuration Tests
//!
//! Cursor debouncing driven into a manager, and layered configuration loading.
//!
//! Run: cargo nextest run --test events_and_config_tests

mod common;

use std::time::Duration;

use common::RecordingService;
use lsp_attach::config::{ConfigError, MemoryConfigProvider};
use lsp_attach::prelude::*;
use tokio::sync::mpsc;

// =============================================================================
// Cursor debouncer
// =============================================================================

mod debounce_tests {
    use super::*;

    const SCOPE: ScopeId = ScopeId(5);

    #[tokio::test(start_paused = true)]
    async fn test_settled_carries_last_position() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = CursorDebouncer::spawn(Duration::from_millis(100), tx);

        debouncer.moved(SCOPE, Position::new(1, 1));
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.moved(SCOPE, Position::new(1, 2));

        let mut kinds = Vec::new();
        loop {
            let event = rx.recv().await.unwrap();
            kinds.push(event.kind());
            if let HostEvent::PositionSettled { scope, position } = event {
                assert_eq!(scope, SCOPE);
                assert_eq!(position, Position::new(1, 2));
                break;
            }
        }

        assert_eq!(
            kinds,
            vec![
                EventKind::PositionMoved,
                EventKind::PositionMoved,
                EventKind::PositionSettled,
            ]
        );
        debouncer.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_drives_manager() {
        let service = RecordingService::highlighting(1);
        let mut manager = AttachmentManager::default();
        manager.on_attach(SCOPE, service.clone()).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = CursorDebouncer::spawn(Duration::from_millis(250), tx);
        debouncer.moved(SCOPE, Position::new(8, 0));

        let start = tokio::time::Instant::now();
        while let Some(event) = rx.recv().await {
            let settled = event.kind() == EventKind::PositionSettled;
            manager.handle(event).unwrap();
            if settled {
                break;
            }
        }

        assert!(start.elapsed() >= Duration::from_millis(250));
        assert_eq!(service.clears(), vec![SCOPE]);
        assert_eq!(service.highlights(), vec![(SCOPE, Position::new(8, 0))]);
        debouncer.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_uses_configured_interval() {
        let config = ManagerConfig::new().debounce(Duration::from_millis(30));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = CursorDebouncer::spawn(config.debounce_duration(), tx);
        assert_eq!(debouncer.debounce(), Duration::from_millis(30));

        debouncer.moved(SCOPE, Position::new(0, 0));
        assert_eq!(rx.recv().await.unwrap().kind(), EventKind::PositionMoved);

        tokio::time::sleep(Duration::from_millis(29)).await;
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await.unwrap().kind(), EventKind::PositionSettled);

        debouncer.shutdown();
        assert!(rx.recv().await.is_none());
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_file_config_loads() {
        let file = config_file(
            r#"{"detachPolicy": "perService", "debounceMs": 75, "requiredCapability": "references"}"#,
        );

        let config = ConfigBuilder::new().file(file.path()).load().await.unwrap();

        assert_eq!(config.detach_policy, DetachPolicy::PerService);
        assert_eq!(config.debounce_ms, 75);
        assert_eq!(config.required_capability, Capability::References);
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new()
            .file(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[tokio::test]
    async fn test_earlier_providers_win() {
        let file = config_file(r#"{"debounceMs": 500, "groupNamespace": "from_file"}"#);

        let config = ConfigBuilder::new()
            .memory(MemoryConfigProvider::new().value("debounceMs", "60"))
            .file(file.path())
            .load()
            .await
            .unwrap();

        assert_eq!(config.debounce_ms, 60);
        assert_eq!(config.group_namespace, "from_file");
    }

    #[tokio::test]
    async fn test_env_overrides_file() {
        // SAFETY: the prefix is unique to this test.
        unsafe { std::env::set_var("LSP_ATTACH_IT_ENV_DETACH_POLICY", "perService") };
        let file = config_file(r#"{"detachPolicy": "scopeWide", "debounceMs": 90}"#);

        let config = ConfigBuilder::new()
            .env_with_prefix("LSP_ATTACH_IT_ENV_")
            .file(file.path())
            .load()
            .await
            .unwrap();

        assert_eq!(config.detach_policy, DetachPolicy::PerService);
        assert_eq!(config.debounce_ms, 90);
    }

    #[tokio::test]
    async fn test_invalid_file_values_rejected() {
        let file = config_file(r#"{"debounceMs": 0, "groupNamespace": ""}"#);

        let result = ConfigBuilder::new().file(file.path()).load().await;

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let file = config_file("{ not json");
        let result = ConfigBuilder::new().file(file.path()).load().await;
        assert!(matches!(result, Err(ConfigError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_loaded_config_drives_manager() {
        let config = ConfigBuilder::new()
            .memory(MemoryConfigProvider::new().value("requiredCapability", "hover"))
            .load()
            .await
            .unwrap();
        let mut manager = AttachmentManager::new(EventBus::new(), config);

        let outcome = manager
            .on_attach(ScopeId(1), RecordingService::highlighting(1))
            .unwrap();
        assert_eq!(outcome, AttachOutcome::Unsupported);
    }
}
