//! Host event vocabulary and the event-system seam.
//!
//! Subscriptions are plain values: a [`Handler`] names the owning service and
//! the [`HighlightAction`] to run, so removing one is a lookup by
//! [`SubscriptionId`] rather than a comparison of closures.

mod bus;
pub mod debounce;

pub use bus::EventBus;
pub use debounce::CursorDebouncer;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::service::LanguageService;
use crate::types::{Position, ScopeId, ServiceId, SubscriptionId};

/// Namespace used for subscription groups unless configured otherwise.
pub const DEFAULT_GROUP_NAMESPACE: &str = "lsp_document_highlight";

/// Event classes delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The cursor has not moved for the debounce interval
    PositionSettled,

    /// The cursor moved
    PositionMoved,

    /// A language service attached to a scope
    ServiceAttached,

    /// A language service detached from a scope
    ServiceDetached,

    /// The scope was closed and is about to be destroyed
    ScopeClosed,
}

impl EventKind {
    /// Position events are the only ones handlers can subscribe to.
    pub fn is_position(&self) -> bool {
        matches!(self, EventKind::PositionSettled | EventKind::PositionMoved)
    }

    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::PositionSettled,
            EventKind::PositionMoved,
            EventKind::ServiceAttached,
            EventKind::ServiceDetached,
            EventKind::ScopeClosed,
        ]
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::PositionSettled => write!(f, "position_settled"),
            EventKind::PositionMoved => write!(f, "position_moved"),
            EventKind::ServiceAttached => write!(f, "service_attached"),
            EventKind::ServiceDetached => write!(f, "service_detached"),
            EventKind::ScopeClosed => write!(f, "scope_closed"),
        }
    }
}

/// A notification from the host, routed by
/// [`AttachmentManager::handle`](crate::attachment::AttachmentManager::handle).
#[derive(Clone, Debug)]
pub enum HostEvent {
    ServiceAttached {
        scope: ScopeId,
        service: Arc<dyn LanguageService>,
    },
    ServiceDetached {
        scope: ScopeId,
        service: ServiceId,
    },
    ScopeClosed {
        scope: ScopeId,
    },
    PositionSettled {
        scope: ScopeId,
        position: Position,
    },
    PositionMoved {
        scope: ScopeId,
        position: Position,
    },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::ServiceAttached { .. } => EventKind::ServiceAttached,
            HostEvent::ServiceDetached { .. } => EventKind::ServiceDetached,
            HostEvent::ScopeClosed { .. } => EventKind::ScopeClosed,
            HostEvent::PositionSettled { .. } => EventKind::PositionSettled,
            HostEvent::PositionMoved { .. } => EventKind::PositionMoved,
        }
    }

    pub fn scope(&self) -> ScopeId {
        match self {
            HostEvent::ServiceAttached { scope, .. }
            | HostEvent::ServiceDetached { scope, .. }
            | HostEvent::ScopeClosed { scope }
            | HostEvent::PositionSettled { scope, .. }
            | HostEvent::PositionMoved { scope, .. } => *scope,
        }
    }
}

/// What a subscription does when its event fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightAction {
    /// Highlight occurrences of the symbol under the cursor
    HighlightOccurrences,

    /// Clear occurrence highlights
    ClearHighlights,
}

impl std::fmt::Display for HighlightAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighlightAction::HighlightOccurrences => write!(f, "highlight_occurrences"),
            HighlightAction::ClearHighlights => write!(f, "clear_highlights"),
        }
    }
}

/// Handler reference stored with a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handler {
    pub service: ServiceId,
    pub action: HighlightAction,
}

impl Handler {
    pub fn new(service: ServiceId, action: HighlightAction) -> Self {
        Self { service, action }
    }
}

/// Subscription group keyed by scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionGroup {
    pub namespace: String,
    pub scope: ScopeId,
}

impl SubscriptionGroup {
    pub fn new(namespace: impl Into<String>, scope: ScopeId) -> Self {
        Self {
            namespace: namespace.into(),
            scope,
        }
    }
}

impl std::fmt::Display for SubscriptionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.scope)
    }
}

/// Everything the host needs to register a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub kind: EventKind,
    pub scope: ScopeId,
    pub group: SubscriptionGroup,
    pub handler: Handler,
}

/// A subscription registered with the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub kind: EventKind,
    pub scope: ScopeId,
    pub group: SubscriptionGroup,
    pub handler: Handler,
}

impl Subscription {
    pub fn from_request(id: SubscriptionId, request: SubscriptionRequest) -> Self {
        Self {
            id,
            kind: request.kind,
            scope: request.scope,
            group: request.group,
            handler: request.handler,
        }
    }
}

/// Failures reported by the host's event system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("Subscription to {kind} on scope {scope} rejected: {reason}")]
    Rejected {
        kind: EventKind,
        scope: ScopeId,
        reason: String,
    },

    #[error("Unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),
}

/// The host's event system.
///
/// The manager owns its event system; nothing else may register or remove
/// subscriptions in the groups it manages.
pub trait EventSystem {
    /// Register a subscription and return its handle.
    fn subscribe(&mut self, request: SubscriptionRequest) -> Result<SubscriptionId, EventError>;

    /// Remove a subscription. Removal takes effect immediately.
    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), EventError>;

    /// Subscriptions for `kind` on `scope`, in registration order.
    fn subscribers(&self, kind: EventKind, scope: ScopeId) -> Vec<Subscription>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::PositionSettled.to_string(), "position_settled");
        assert_eq!(EventKind::ScopeClosed.to_string(), "scope_closed");
    }

    #[test]
    fn test_event_kind_is_position() {
        assert!(EventKind::PositionSettled.is_position());
        assert!(EventKind::PositionMoved.is_position());
        assert!(!EventKind::ServiceAttached.is_position());
        assert!(!EventKind::ServiceDetached.is_position());
        assert!(!EventKind::ScopeClosed.is_position());
        assert_eq!(EventKind::all().len(), 5);
    }

    #[test]
    fn test_host_event_kind_and_scope() {
        let event = HostEvent::PositionMoved {
            scope: ScopeId(3),
            position: Position::new(1, 1),
        };
        assert_eq!(event.kind(), EventKind::PositionMoved);
        assert_eq!(event.scope(), ScopeId(3));

        let event = HostEvent::ServiceDetached {
            scope: ScopeId(5),
            service: ServiceId(1),
        };
        assert_eq!(event.kind(), EventKind::ServiceDetached);
        assert_eq!(event.scope(), ScopeId(5));
    }

    #[test]
    fn test_group_display() {
        let group = SubscriptionGroup::new(DEFAULT_GROUP_NAMESPACE, ScopeId(9));
        assert_eq!(group.to_string(), "lsp_document_highlight:9");
    }

    #[test]
    fn test_event_error_display() {
        let err = EventError::Rejected {
            kind: EventKind::PositionSettled,
            scope: ScopeId(1),
            reason: "scope is gone".into(),
        };
        assert_eq!(
            err.to_string(),
            "Subscription to position_settled on scope 1 rejected: scope is gone"
        );
    }
}
