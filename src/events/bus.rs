//! In-memory event system.

use super::{
    EventError, EventKind, EventSystem, Subscription, SubscriptionGroup, SubscriptionRequest,
};
use crate::types::{ScopeId, SubscriptionId};

/// An [`EventSystem`] that keeps subscriptions in registration order.
///
/// Useful for hosts without an event registry of their own and for tests.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn in_group(&self, group: &SubscriptionGroup) -> Vec<&Subscription> {
        self.subscriptions
            .iter()
            .filter(|s| &s.group == group)
            .collect()
    }

    pub fn for_scope(&self, scope: ScopeId) -> Vec<&Subscription> {
        self.subscriptions
            .iter()
            .filter(|s| s.scope == scope)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter()
    }
}

impl EventSystem for EventBus {
    fn subscribe(&mut self, request: SubscriptionRequest) -> Result<SubscriptionId, EventError> {
        if !request.kind.is_position() {
            return Err(EventError::Rejected {
                kind: request.kind,
                scope: request.scope,
                reason: "only position events accept handlers".into(),
            });
        }

        let id = SubscriptionId::new();
        self.subscriptions
            .push(Subscription::from_request(id, request));
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), EventError> {
        let index = self
            .subscriptions
            .iter()
            .position(|s| s.id == id)
            .ok_or(EventError::UnknownSubscription(id))?;
        self.subscriptions.remove(index);
        Ok(())
    }

    fn subscribers(&self, kind: EventKind, scope: ScopeId) -> Vec<Subscription> {
        self.subscriptions
            .iter()
            .filter(|s| s.kind == kind && s.scope == scope)
            .cloned()
            .collect()
    }
}
