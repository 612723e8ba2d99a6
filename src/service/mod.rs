//! Language services that attach to scopes.

use crate::capability::Capability;
use crate::types::{Position, ScopeId, ServiceId};

/// Errors reported by a language service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Service {service} request failed: {message}")]
    Request { service: ServiceId, message: String },

    #[error("Service {0} is unavailable")]
    Unavailable(ServiceId),
}

impl ServiceError {
    pub fn request(service: ServiceId, message: impl Into<String>) -> Self {
        ServiceError::Request {
            service,
            message: message.into(),
        }
    }
}

/// An external analysis provider attached to one or more scopes.
///
/// The manager only ever calls these methods synchronously from inside an
/// entry point; implementations that talk to a server out of process should
/// queue the request and return.
///
/// # Example
///
/// ```rust
/// use lsp_attach::capability::{Capability, CapabilitySet};
/// use lsp_attach::service::{LanguageService, ServiceError};
/// use lsp_attach::types::{Position, ScopeId, ServiceId};
///
/// struct Client {
///     id: ServiceId,
///     capabilities: CapabilitySet,
/// }
///
/// impl LanguageService for Client {
///     fn id(&self) -> ServiceId {
///         self.id
///     }
///
///     fn name(&self) -> &str {
///         "rust-analyzer"
///     }
///
///     fn supports(&self, capability: &Capability) -> Result<bool, ServiceError> {
///         Ok(self.capabilities.supports(*capability))
///     }
///
///     fn highlight_occurrences_at(
///         &self,
///         _scope: ScopeId,
///         _position: Position,
///     ) -> Result<(), ServiceError> {
///         Ok(())
///     }
///
///     fn clear_highlights(&self, _scope: ScopeId) -> Result<(), ServiceError> {
///         Ok(())
///     }
/// }
/// ```
pub trait LanguageService: Send + Sync {
    fn id(&self) -> ServiceId;

    fn name(&self) -> &str;

    /// Whether the service advertises `capability`.
    ///
    /// An error is treated by the manager as "not supported".
    fn supports(&self, capability: &Capability) -> Result<bool, ServiceError>;

    /// Highlight the occurrences of the symbol at `position`.
    fn highlight_occurrences_at(
        &self,
        scope: ScopeId,
        position: Position,
    ) -> Result<(), ServiceError>;

    /// Remove every occurrence highlight the service drew in `scope`.
    fn clear_highlights(&self, scope: ScopeId) -> Result<(), ServiceError>;
}

impl std::fmt::Debug for dyn LanguageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageService")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::request(ServiceId(2), "timeout");
        assert_eq!(err.to_string(), "Service 2 request failed: timeout");
        assert_eq!(
            ServiceError::Unavailable(ServiceId(4)).to_string(),
            "Service 4 is unavailable"
        );
    }
}
