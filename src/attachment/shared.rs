//! Thread-safe handle over an [`AttachmentManager`].

use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    AttachOutcome, AttachmentManager, AttachmentStats, DeliveryReport, DetachOutcome,
    HandleOutcome,
};
use crate::events::{EventBus, EventKind, EventSystem, HostEvent};
use crate::service::LanguageService;
use crate::types::{Position, ScopeId, ServiceId};
use crate::{Error, Result};

/// Cloneable handle that serializes every entry point behind one lock.
///
/// Hosts that deliver notifications from several threads share one of these;
/// each call runs to completion before the next one starts.
pub struct SharedAttachmentManager<E: EventSystem = EventBus> {
    inner: Arc<Mutex<AttachmentManager<E>>>,
}

impl<E: EventSystem> Clone for SharedAttachmentManager<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SharedAttachmentManager<EventBus> {
    fn default() -> Self {
        Self::new(AttachmentManager::default())
    }
}

impl<E: EventSystem> SharedAttachmentManager<E> {
    pub fn new(manager: AttachmentManager<E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, AttachmentManager<E>>> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    pub fn handle(&self, event: HostEvent) -> Result<HandleOutcome> {
        self.lock()?.handle(event)
    }

    pub fn on_attach(
        &self,
        scope: ScopeId,
        service: Arc<dyn LanguageService>,
    ) -> Result<AttachOutcome> {
        self.lock()?.on_attach(scope, service)
    }

    pub fn on_detach(&self, scope: ScopeId, service: ServiceId) -> Result<DetachOutcome> {
        self.lock()?.on_detach(scope, service)
    }

    pub fn on_scope_closed(&self, scope: ScopeId) -> Result<usize> {
        self.lock()?.on_scope_closed(scope)
    }

    pub fn deliver(
        &self,
        kind: EventKind,
        scope: ScopeId,
        position: Position,
    ) -> Result<DeliveryReport> {
        Ok(self.lock()?.deliver(kind, scope, position))
    }

    pub fn stats(&self) -> Result<AttachmentStats> {
        Ok(self.lock()?.stats())
    }

    /// Run `f` with exclusive access to the manager.
    pub fn with<R>(&self, f: impl FnOnce(&mut AttachmentManager<E>) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}

impl<E: EventSystem> std::fmt::Debug for SharedAttachmentManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedAttachmentManager")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
