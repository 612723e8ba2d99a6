//! Attachment manager: capability-gated highlight subscriptions per scope.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::AttachmentRecord;
use crate::config::{DetachPolicy, ManagerConfig};
use crate::events::{
    EventBus, EventError, EventKind, EventSystem, Handler, HighlightAction, HostEvent,
    Subscription, SubscriptionGroup, SubscriptionRequest,
};
use crate::service::LanguageService;
use crate::types::{Position, ScopeId, ServiceId, SubscriptionId};

/// Subscriptions created for every capable attachment.
const HIGHLIGHT_BINDINGS: [(EventKind, HighlightAction); 2] = [
    (EventKind::PositionSettled, HighlightAction::HighlightOccurrences),
    (EventKind::PositionMoved, HighlightAction::ClearHighlights),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Highlight subscriptions were registered
    Subscribed,
    /// The pair was already attached; nothing changed
    AlreadyAttached,
    /// The service does not advertise the required capability
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetachOutcome {
    /// No record existed for the pair
    NotAttached,
    Detached {
        /// Co-attached services whose subscriptions were restored
        reattached: Vec<ServiceId>,
        /// Co-attached services dropped because they lost the capability
        dropped: Vec<ServiceId>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub invoked: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    Attached(AttachOutcome),
    Detached(DetachOutcome),
    Closed { records: usize },
    Delivered(DeliveryReport),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttachmentStats {
    pub scopes: usize,
    pub records: usize,
    pub subscriptions: usize,
}

/// Keeps "which services are attached to which scopes" and "which
/// subscriptions exist" consistent.
///
/// Entry points run to completion; hosts must deliver events for a scope in
/// the order they happened.
///
/// ```rust
/// use std::sync::Arc;
/// use lsp_attach::attachment::{AttachOutcome, AttachmentManager};
/// # use lsp_attach::capability::Capability;
/// # use lsp_attach::service::{LanguageService, ServiceError};
/// use lsp_attach::types::{Position, ScopeId, ServiceId};
/// # struct Client;
/// # impl LanguageService for Client {
/// #     fn id(&self) -> ServiceId { ServiceId(1) }
/// #     fn name(&self) -> &str { "client" }
/// #     fn supports(&self, _: &Capability) -> Result<bool, ServiceError> { Ok(true) }
/// #     fn highlight_occurrences_at(&self, _: ScopeId, _: Position) -> Result<(), ServiceError> { Ok(()) }
/// #     fn clear_highlights(&self, _: ScopeId) -> Result<(), ServiceError> { Ok(()) }
/// # }
///
/// let mut manager = AttachmentManager::default();
/// let outcome = manager.on_attach(ScopeId(1), Arc::new(Client))?;
/// assert_eq!(outcome, AttachOutcome::Subscribed);
/// assert_eq!(manager.subscription_count(ScopeId(1)), 2);
///
/// manager.on_detach(ScopeId(1), ServiceId(1))?;
/// assert_eq!(manager.subscription_count(ScopeId(1)), 0);
/// # Ok::<(), lsp_attach::Error>(())
/// ```
pub struct AttachmentManager<E: EventSystem = EventBus> {
    events: E,
    config: ManagerConfig,
    scopes: HashMap<ScopeId, BTreeMap<ServiceId, AttachmentRecord>>,
    /// Handles the host failed to release after their record was removed
    stale: HashMap<ScopeId, Vec<SubscriptionId>>,
}

impl Default for AttachmentManager<EventBus> {
    fn default() -> Self {
        Self::new(EventBus::new(), ManagerConfig::default())
    }
}

impl<E: EventSystem> AttachmentManager<E> {
    pub fn new(events: E, config: ManagerConfig) -> Self {
        Self {
            events,
            config,
            scopes: HashMap::new(),
            stale: HashMap::new(),
        }
    }

    pub fn with_events(events: E) -> Self {
        Self::new(events, ManagerConfig::default())
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn into_events(self) -> E {
        self.events
    }

    /// Route a host notification to the matching entry point.
    pub fn handle(&mut self, event: HostEvent) -> crate::Result<HandleOutcome> {
        match event {
            HostEvent::ServiceAttached { scope, service } => self
                .on_attach(scope, service)
                .map(HandleOutcome::Attached),
            HostEvent::ServiceDetached { scope, service } => self
                .on_detach(scope, service)
                .map(HandleOutcome::Detached),
            HostEvent::ScopeClosed { scope } => self
                .on_scope_closed(scope)
                .map(|records| HandleOutcome::Closed { records }),
            HostEvent::PositionSettled { scope, position } => Ok(HandleOutcome::Delivered(
                self.deliver(EventKind::PositionSettled, scope, position),
            )),
            HostEvent::PositionMoved { scope, position } => Ok(HandleOutcome::Delivered(
                self.deliver(EventKind::PositionMoved, scope, position),
            )),
        }
    }

    /// A service attached to `scope`.
    ///
    /// Registers the highlight subscriptions if the service advertises the
    /// required capability. A redundant attach is a no-op. If the host rejects
    /// a registration, handles registered by this call are removed again and
    /// no record is created.
    pub fn on_attach(
        &mut self,
        scope: ScopeId,
        service: Arc<dyn LanguageService>,
    ) -> crate::Result<AttachOutcome> {
        let service_id = service.id();

        if self.is_attached(scope, service_id) {
            tracing::debug!(%scope, service = %service_id, "Service already attached");
            return Ok(AttachOutcome::AlreadyAttached);
        }

        if !self.is_capable(service.as_ref()) {
            tracing::debug!(
                %scope,
                service = %service_id,
                capability = %self.config.required_capability,
                "Service lacks capability, not subscribing"
            );
            return Ok(AttachOutcome::Unsupported);
        }

        let handles = self.register(scope, service.id(), &HIGHLIGHT_BINDINGS)?;
        let record = AttachmentRecord::new(service, self.group(scope), handles);
        self.scopes
            .entry(scope)
            .or_default()
            .insert(service_id, record);

        tracing::debug!(%scope, service = %service_id, "Service attached");
        Ok(AttachOutcome::Subscribed)
    }

    /// A service detached from `scope`. Never fails when no record exists.
    ///
    /// Handles that an earlier detach could not release are retried first.
    pub fn on_detach(
        &mut self,
        scope: ScopeId,
        service: ServiceId,
    ) -> crate::Result<DetachOutcome> {
        if let Err(e) = self.release_stale(scope) {
            tracing::warn!(%scope, error = %e, "Stale handles still registered");
        }

        if !self.is_attached(scope, service) {
            tracing::debug!(%scope, %service, "Detach without record");
            return Ok(DetachOutcome::NotAttached);
        }

        let outcome = match self.config.detach_policy {
            DetachPolicy::PerService => self.detach_service(scope, service)?,
            DetachPolicy::ScopeWide => self.detach_scope_wide(scope, service)?,
        };

        tracing::debug!(%scope, %service, ?outcome, "Service detached");
        Ok(outcome)
    }

    /// The scope is being destroyed: forget every record and release every
    /// subscription it holds. Returns the number of records removed.
    ///
    /// Records are removed even when the host fails to release a handle; the
    /// first such failure is returned after all handles were attempted.
    pub fn on_scope_closed(&mut self, scope: ScopeId) -> crate::Result<usize> {
        let mut first_error = self.release_stale(scope).err();
        self.stale.remove(&scope);

        let records = self.scopes.remove(&scope).unwrap_or_default();
        let count = records.len();
        for (_, mut record) in records {
            if let Err(e) = release(&mut self.events, &mut record) {
                first_error.get_or_insert(e);
            }
        }

        tracing::debug!(%scope, records = count, "Scope closed");
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(count),
        }
    }

    /// Run the handlers registered for a position event on `scope`.
    ///
    /// Failing service actions are logged and counted; they never stop the
    /// remaining handlers.
    pub fn deliver(&self, kind: EventKind, scope: ScopeId, position: Position) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if !kind.is_position() {
            return report;
        }

        for subscription in self.events.subscribers(kind, scope) {
            let Some(record) = self.owning_record(&subscription) else {
                continue;
            };

            let service = record.service();
            let result = match subscription.handler.action {
                HighlightAction::HighlightOccurrences => {
                    service.highlight_occurrences_at(scope, position)
                }
                HighlightAction::ClearHighlights => service.clear_highlights(scope),
            };

            match result {
                Ok(()) => report.invoked += 1,
                Err(e) => {
                    tracing::warn!(
                        %scope,
                        service = %service.id(),
                        action = %subscription.handler.action,
                        error = %e,
                        "Highlight handler failed"
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    pub fn is_attached(&self, scope: ScopeId, service: ServiceId) -> bool {
        self.scopes
            .get(&scope)
            .is_some_and(|records| records.contains_key(&service))
    }

    pub fn attached_services(&self, scope: ScopeId) -> Vec<ServiceId> {
        self.scopes
            .get(&scope)
            .map(|records| records.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn record(&self, scope: ScopeId, service: ServiceId) -> Option<&AttachmentRecord> {
        self.scopes.get(&scope)?.get(&service)
    }

    pub fn records(&self, scope: ScopeId) -> impl Iterator<Item = &AttachmentRecord> {
        self.scopes.get(&scope).into_iter().flat_map(|r| r.values())
    }

    pub fn subscription_count(&self, scope: ScopeId) -> usize {
        self.records(scope).map(AttachmentRecord::len).sum()
    }

    /// Handles on `scope` that no record owns and the host has not released.
    pub fn pending_releases(&self, scope: ScopeId) -> usize {
        self.stale.get(&scope).map_or(0, Vec::len)
    }

    pub fn scopes(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.scopes.keys().copied()
    }

    pub fn stats(&self) -> AttachmentStats {
        self.scopes
            .values()
            .flat_map(|records| records.values())
            .fold(
                AttachmentStats {
                    scopes: self.scopes.len(),
                    ..Default::default()
                },
                |mut stats, record| {
                    stats.records += 1;
                    stats.subscriptions += record.len();
                    stats
                },
            )
    }

    fn group(&self, scope: ScopeId) -> SubscriptionGroup {
        SubscriptionGroup::new(self.config.group_namespace.clone(), scope)
    }

    fn is_capable(&self, service: &dyn LanguageService) -> bool {
        match service.supports(&self.config.required_capability) {
            Ok(supported) => supported,
            Err(e) => {
                tracing::warn!(
                    service = %service.id(),
                    capability = %self.config.required_capability,
                    error = %e,
                    "Capability query failed, treating as unsupported"
                );
                false
            }
        }
    }

    fn owning_record(&self, subscription: &Subscription) -> Option<&AttachmentRecord> {
        if subscription.group.namespace != self.config.group_namespace {
            return None;
        }
        self.record(subscription.scope, subscription.handler.service)
            .filter(|record| record.owns(subscription.id))
    }

    /// Register `bindings` for one service, all or nothing.
    fn register(
        &mut self,
        scope: ScopeId,
        service: ServiceId,
        bindings: &[(EventKind, HighlightAction)],
    ) -> Result<Vec<(EventKind, SubscriptionId)>, EventError> {
        let group = self.group(scope);
        let mut registered = Vec::with_capacity(bindings.len());

        for &(kind, action) in bindings {
            let request = SubscriptionRequest {
                kind,
                scope,
                group: group.clone(),
                handler: Handler::new(service, action),
            };

            match self.events.subscribe(request) {
                Ok(id) => registered.push((kind, id)),
                Err(e) => {
                    for (_, id) in registered {
                        if let Err(rollback) = self.events.unsubscribe(id) {
                            tracing::warn!(
                                %scope,
                                subscription = %id,
                                error = %rollback,
                                "Rollback of partial attach failed"
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(registered)
    }

    /// Retry releasing handles orphaned by a failed detach.
    fn release_stale(&mut self, scope: ScopeId) -> Result<(), EventError> {
        let Some(ids) = self.stale.remove(&scope) else {
            return Ok(());
        };

        let mut first_error = None;
        let mut kept = Vec::new();
        for id in ids {
            if let Err(e) = self.events.unsubscribe(id) {
                kept.push(id);
                first_error.get_or_insert(e);
            }
        }

        if !kept.is_empty() {
            self.stale.insert(scope, kept);
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn orphan(&mut self, scope: ScopeId, record: &AttachmentRecord) {
        if record.is_empty() {
            return;
        }
        tracing::warn!(
            %scope,
            service = %record.service_id(),
            handles = record.len(),
            "Handles outlive their record"
        );
        self.stale
            .entry(scope)
            .or_default()
            .extend(record.subscriptions());
    }

    fn detach_service(
        &mut self,
        scope: ScopeId,
        service: ServiceId,
    ) -> crate::Result<DetachOutcome> {
        if let Some(records) = self.scopes.get_mut(&scope) {
            if let Some(record) = records.get_mut(&service) {
                release(&mut self.events, record)?;
            }
            records.remove(&service);
            if records.is_empty() {
                self.scopes.remove(&scope);
            }
        }

        Ok(DetachOutcome::Detached {
            reattached: Vec::new(),
            dropped: Vec::new(),
        })
    }

    /// Clear the whole group, then restore the services that stay attached.
    ///
    /// Every handle is attempted. The detaching record is removed even when
    /// some of its handles could not be released; those are kept for a later
    /// retry and never delivered to. A remaining service that is still capable
    /// gets back the bindings it lost, so it never stays attached without a
    /// full pair.
    fn detach_scope_wide(
        &mut self,
        scope: ScopeId,
        service: ServiceId,
    ) -> crate::Result<DetachOutcome> {
        let mut records = self.scopes.remove(&scope).unwrap_or_default();
        let mut first_error = None;

        for record in records.values_mut() {
            if let Err(e) = release(&mut self.events, record) {
                first_error.get_or_insert(e);
            }
        }

        if let Some(detached) = records.remove(&service) {
            self.orphan(scope, &detached);
        }

        let mut reattached = Vec::new();
        let mut dropped = Vec::new();

        for (id, mut record) in records {
            if !self.is_capable(record.service().as_ref()) {
                self.orphan(scope, &record);
                dropped.push(id);
                continue;
            }

            let missing: Vec<_> = HIGHLIGHT_BINDINGS
                .into_iter()
                .filter(|(kind, _)| !record.covers(*kind))
                .collect();

            match self.register(scope, id, &missing) {
                Ok(handles) => {
                    record.extend(handles);
                    self.scopes.entry(scope).or_default().insert(id, record);
                    reattached.push(id);
                }
                Err(e) => {
                    tracing::warn!(%scope, service = %id, error = %e, "Reattach failed");
                    self.orphan(scope, &record);
                    dropped.push(id);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(DetachOutcome::Detached {
                reattached,
                dropped,
            }),
        }
    }
}

/// Unregister every handle of `record`. Released handles are forgotten even
/// when a later one fails; the first failure is returned.
fn release<E: EventSystem>(
    events: &mut E,
    record: &mut AttachmentRecord,
) -> Result<(), EventError> {
    let mut released = Vec::with_capacity(record.len());
    let mut first_error = None;

    for id in record.subscriptions() {
        match events.unsubscribe(id) {
            Ok(()) => released.push(id),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    record.forget(&released);
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

impl<E: EventSystem> std::fmt::Debug for AttachmentManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentManager")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
