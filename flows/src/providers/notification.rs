//! Notification sink interface.

use crate::state::Notice;
use std::future::Future;

/// Toast-style notification sink.
///
/// Fire-and-forget: no return value is consumed by the orchestrator.
pub trait NotificationSink: Send + Sync {
    /// Deliver a notice to the user.
    fn notify(&self, notice: Notice) -> impl Future<Output = ()> + Send;
}
