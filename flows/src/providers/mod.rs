//! Collaborator interfaces.
//!
//! This module defines traits for all external dependencies used by the
//! flow orchestrator. Providers are **interfaces**, not implementations:
//! reducers depend on these traits, and the host supplies concrete
//! implementations.
//!
//! This enables:
//! - **Testing**: mocks (in-memory, deterministic)
//! - **Production**: the real identity provider, router, and toast layer
//! - **Development**: instrumented versions (logging, tracing)

pub mod identity;
pub mod navigation;
pub mod notification;

pub use identity::IdentityProvider;
pub use navigation::Navigator;
pub use notification::NotificationSink;
