//! Attachment records.

use std::sync::Arc;

use crate::events::{EventKind, SubscriptionGroup};
use crate::service::LanguageService;
use crate::types::{ServiceId, SubscriptionId};

/// Ties an attached (scope, service) pair to the subscriptions it caused.
#[derive(Clone, Debug)]
pub struct AttachmentRecord {
    service: Arc<dyn LanguageService>,
    group: SubscriptionGroup,
    handles: Vec<(EventKind, SubscriptionId)>,
}

impl AttachmentRecord {
    pub(crate) fn new(
        service: Arc<dyn LanguageService>,
        group: SubscriptionGroup,
        handles: Vec<(EventKind, SubscriptionId)>,
    ) -> Self {
        Self {
            service,
            group,
            handles,
        }
    }

    pub fn service_id(&self) -> ServiceId {
        self.service.id()
    }

    pub fn service(&self) -> &Arc<dyn LanguageService> {
        &self.service
    }

    pub fn group(&self) -> &SubscriptionGroup {
        &self.group
    }

    /// Live handles, in registration order.
    pub fn subscriptions(&self) -> Vec<SubscriptionId> {
        self.handles.iter().map(|(_, id)| *id).collect()
    }

    pub fn owns(&self, id: SubscriptionId) -> bool {
        self.handles.iter().any(|(_, h)| *h == id)
    }

    /// Whether a live handle exists for `kind`.
    pub fn covers(&self, kind: EventKind) -> bool {
        self.handles.iter().any(|(k, _)| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drop handles that are no longer registered with the host.
    pub(crate) fn forget(&mut self, released: &[SubscriptionId]) {
        self.handles.retain(|(_, id)| !released.contains(id));
    }

    pub(crate) fn extend(&mut self, handles: Vec<(EventKind, SubscriptionId)>) {
        self.handles.extend(handles);
    }
}
