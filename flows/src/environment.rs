//! Flow environment.
//!
//! This module defines the environment type for dependency injection
//! in flow reducers.

use crate::config::AuthConfig;
use crate::providers::{IdentityProvider, Navigator, NotificationSink};
use authflow_core::environment::Clock;

/// Flow environment.
///
/// Contains all external dependencies needed by flow reducers.
///
/// # Type Parameters
///
/// - `I`: Identity provider
/// - `N`: Navigation service
/// - `T`: Notification sink
/// - `C`: Clock
#[derive(Clone)]
pub struct AuthEnvironment<I, N, T, C>
where
    I: IdentityProvider + Clone,
    N: Navigator + Clone,
    T: NotificationSink + Clone,
    C: Clock + Clone,
{
    /// Identity provider (remote calls and session checks).
    pub identity: I,

    /// Navigation service (local navigation and provider handoff).
    pub navigator: N,

    /// Notification sink (toasts).
    pub notifications: T,

    /// Clock (timestamps for submission phases).
    pub clock: C,

    /// Static configuration.
    pub config: AuthConfig,
}

impl<I, N, T, C> AuthEnvironment<I, N, T, C>
where
    I: IdentityProvider + Clone,
    N: Navigator + Clone,
    T: NotificationSink + Clone,
    C: Clock + Clone,
{
    /// Create a new flow environment.
    #[must_use]
    pub const fn new(identity: I, navigator: N, notifications: T, clock: C, config: AuthConfig) -> Self {
        Self {
            identity,
            navigator,
            notifications,
            clock,
            config,
        }
    }
}
