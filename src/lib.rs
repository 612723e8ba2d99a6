//! # lsp-attach
//!
//! Capability-gated, scope-local highlight subscriptions for language
//! services attached to editor buffers.
//!
//! When a service attaches to a scope and advertises document highlighting,
//! the [`AttachmentManager`] registers two handlers on the host's event
//! system: one highlights occurrences once the cursor settles, the other
//! clears them as soon as it moves. Detaching or closing the scope removes
//! them again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use lsp_attach::prelude::*;
//! # struct Client;
//! # impl LanguageService for Client {
//! #     fn id(&self) -> ServiceId { ServiceId(1) }
//! #     fn name(&self) -> &str { "client" }
//! #     fn supports(&self, _: &Capability) -> std::result::Result<bool, ServiceError> { Ok(true) }
//! #     fn highlight_occurrences_at(&self, _: ScopeId, _: Position) -> std::result::Result<(), ServiceError> { Ok(()) }
//! #     fn clear_highlights(&self, _: ScopeId) -> std::result::Result<(), ServiceError> { Ok(()) }
//! # }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::new().env().load().await?;
//!     let mut manager = AttachmentManager::new(EventBus::new(), config.clone());
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let debouncer = CursorDebouncer::spawn(config.debounce_duration(), tx);
//!
//!     manager.handle(HostEvent::ServiceAttached {
//!         scope: ScopeId(1),
//!         service: Arc::new(Client),
//!     })?;
//!
//!     debouncer.moved(ScopeId(1), Position::new(4, 2));
//!     while let Some(event) = rx.recv().await {
//!         let settled = event.kind() == EventKind::PositionSettled;
//!         manager.handle(event)?;
//!         if settled {
//!             break;
//!         }
//!     }
//!
//!     debouncer.shutdown();
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod attachment;
pub mod capability;
pub mod config;
pub mod events;
pub mod observability;
pub mod prelude;
pub mod service;
pub mod types;

// Re-exports for convenience
pub use attachment::{
    AttachOutcome, AttachmentManager, AttachmentRecord, AttachmentStats, DeliveryReport,
    DetachOutcome, HandleOutcome, SharedAttachmentManager,
};
pub use capability::{Capability, CapabilitySet};
pub use config::{ConfigBuilder, ConfigError, DetachPolicy, ManagerConfig};
pub use events::{
    CursorDebouncer, EventBus, EventError, EventKind, EventSystem, Handler, HighlightAction,
    HostEvent, Subscription, SubscriptionGroup, SubscriptionRequest,
};
pub use service::{LanguageService, ServiceError};
pub use types::{Position, ScopeId, ServiceId, SubscriptionId};

/// Error type for lsp-attach operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The host's event system refused a registration or removal.
    #[error("Event system error: {0}")]
    Event(#[from] EventError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A thread panicked while holding the shared manager.
    #[error("Attachment manager lock poisoned")]
    Poisoned,
}

impl Error {
    /// Whether the host rejected a subscription request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Error::Event(EventError::Rejected { .. }))
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
