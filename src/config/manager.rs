//! Typed configuration for the attachment manager.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigError, ConfigResult, ValidationErrors};
use crate::capability::Capability;
use crate::events::DEFAULT_GROUP_NAMESPACE;

pub const DEFAULT_DEBOUNCE_MS: u64 = 250;
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// How a detach notification is applied to a scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetachPolicy {
    /// Clear every subscription in the scope's group, then resubscribe the
    /// services that remain attached and still advertise the capability.
    #[default]
    ScopeWide,

    /// Remove only the detaching service's subscriptions.
    PerService,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagerConfig {
    /// Capability a service must advertise to get highlight subscriptions
    pub required_capability: Capability,
    pub detach_policy: DetachPolicy,
    /// Quiet period before a position counts as settled
    pub debounce_ms: u64,
    /// Namespace of the per-scope subscription groups
    pub group_namespace: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            required_capability: Capability::DocumentHighlight,
            detach_policy: DetachPolicy::ScopeWide,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            group_namespace: DEFAULT_GROUP_NAMESPACE.to_string(),
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detach_policy(mut self, policy: DetachPolicy) -> Self {
        self.detach_policy = policy;
        self
    }

    pub fn required_capability(mut self, capability: Capability) -> Self {
        self.required_capability = capability;
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = debounce.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn group_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.group_namespace = namespace.into();
        self
    }

    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Read every field from `provider`, falling back to defaults, and validate.
    pub async fn load<P: ConfigProvider + ?Sized>(provider: &P) -> ConfigResult<Self> {
        let defaults = Self::default();
        let config = Self {
            required_capability: provider
                .get("requiredCapability")
                .await?
                .unwrap_or(defaults.required_capability),
            detach_policy: provider
                .get("detachPolicy")
                .await?
                .unwrap_or(defaults.detach_policy),
            debounce_ms: provider
                .get("debounceMs")
                .await?
                .unwrap_or(defaults.debounce_ms),
            group_namespace: provider
                .get("groupNamespace")
                .await?
                .unwrap_or(defaults.group_namespace),
        };
        config.validate()?;
        tracing::debug!(
            provider = provider.name(),
            detach_policy = ?config.detach_policy,
            debounce_ms = config.debounce_ms,
            "Loaded manager config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if !(1..=MAX_DEBOUNCE_MS).contains(&self.debounce_ms) {
            errors.push(ConfigError::InvalidValue {
                key: "debounceMs".into(),
                message: format!(
                    "must be between 1 and {}, got {}",
                    MAX_DEBOUNCE_MS, self.debounce_ms
                ),
            });
        }

        if self.group_namespace.trim().is_empty() {
            errors.push(ConfigError::InvalidValue {
                key: "groupNamespace".into(),
                message: "must not be empty".into(),
            });
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::ValidationErrors(ValidationErrors(errors))),
        }
    }
}
