//! Tracks which language services are attached to which scopes and keeps
//! their highlight subscriptions in step.

mod manager;
mod record;
mod shared;

pub use manager::{
    AttachOutcome, AttachmentManager, AttachmentStats, DeliveryReport, DetachOutcome,
    HandleOutcome,
};
pub use record::AttachmentRecord;
pub use shared::SharedAttachmentManager;
