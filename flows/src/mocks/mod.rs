//! Mock providers for testing.
//!
//! In-memory, deterministic implementations of the collaborator traits.
//! Responses are scripted per operation and every call is recorded, so
//! tests can assert exactly which remote calls a flow issued.

pub mod identity;
pub mod navigator;
pub mod notifications;

pub use identity::MockIdentityProvider;
pub use navigator::MockNavigator;
pub use notifications::MockNotificationSink;
