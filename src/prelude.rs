//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use lsp_attach::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::Result;

// Attachment
pub use crate::attachment::{
    AttachOutcome, AttachmentManager, DetachOutcome, HandleOutcome, SharedAttachmentManager,
};

// Capabilities and services
pub use crate::capability::{Capability, CapabilitySet};
pub use crate::service::{LanguageService, ServiceError};

// Events
pub use crate::events::{CursorDebouncer, EventBus, EventKind, EventSystem, HostEvent};

// Configuration
pub use crate::config::{ConfigBuilder, DetachPolicy, ManagerConfig};

// Types
pub use crate::types::{Position, ScopeId, ServiceId, SubscriptionId};
