//! Error types for flow orchestration.
//!
//! Recoverable failures never escape the flow reducer: local validation
//! and remote rejections become field errors or notices, and transport
//! failures become a generic notice. The only error allowed to escape is
//! [`InvariantViolation`](authflow_core::invariant::InvariantViolation),
//! raised when a remote response falls outside the declared vocabulary.

use thiserror::Error;

/// Result type alias for identity provider operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// A transport-level failure talking to the identity provider.
///
/// Always recoverable: surfaced to the user as a generic notice and
/// logged. The provider owns network-level timeouts; none are enforced
/// here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response arrived but could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
