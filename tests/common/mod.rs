//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use lsp_attach::capability::{Capability, CapabilitySet};
use lsp_attach::service::{LanguageService, ServiceError};
use lsp_attach::types::{Position, ScopeId, ServiceId};

/// Language service that records every call made to it.
pub struct RecordingService {
    id: ServiceId,
    capabilities: Mutex<CapabilitySet>,
    fail_actions: bool,
    highlights: Mutex<Vec<(ScopeId, Position)>>,
    clears: Mutex<Vec<ScopeId>>,
}

impl RecordingService {
    pub fn highlighting(id: u32) -> Arc<Self> {
        Self::build(id, CapabilitySet::new().with(Capability::DocumentHighlight), false)
    }

    pub fn plain(id: u32) -> Arc<Self> {
        Self::build(id, CapabilitySet::new(), false)
    }

    /// Capable, but every highlight request fails.
    pub fn failing(id: u32) -> Arc<Self> {
        Self::build(id, CapabilitySet::new().with(Capability::DocumentHighlight), true)
    }

    fn build(id: u32, capabilities: CapabilitySet, fail_actions: bool) -> Arc<Self> {
        Arc::new(Self {
            id: ServiceId(id),
            capabilities: Mutex::new(capabilities),
            fail_actions,
            highlights: Mutex::new(Vec::new()),
            clears: Mutex::new(Vec::new()),
        })
    }

    pub fn revoke(&self, capability: Capability) {
        self.capabilities.lock().unwrap().remove(capability);
    }

    pub fn highlights(&self) -> Vec<(ScopeId, Position)> {
        self.highlights.lock().unwrap().clone()
    }

    pub fn clears(&self) -> Vec<ScopeId> {
        self.clears.lock().unwrap().clone()
    }
}

impl LanguageService for RecordingService {
    fn id(&self) -> ServiceId {
        self.id
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn supports(&self, capability: &Capability) -> Result<bool, ServiceError> {
        Ok(self.capabilities.lock().unwrap().supports(*capability))
    }

    fn highlight_occurrences_at(
        &self,
        scope: ScopeId,
        position: Position,
    ) -> Result<(), ServiceError> {
        self.highlights.lock().unwrap().push((scope, position));
        if self.fail_actions {
            return Err(ServiceError::request(self.id, "server crashed"));
        }
        Ok(())
    }

    fn clear_highlights(&self, scope: ScopeId) -> Result<(), ServiceError> {
        self.clears.lock().unwrap().push(scope);
        if self.fail_actions {
            return Err(ServiceError::request(self.id, "server crashed"));
        }
        Ok(())
    }
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lsp_attach=debug")
        .with_test_writer()
        .try_init();
}
