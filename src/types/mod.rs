//! Identifier and position types shared across the crate.

mod ids;
mod position;

pub use ids::{ScopeId, ServiceId, SubscriptionId};
pub use position::Position;
