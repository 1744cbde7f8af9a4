//! Navigation service interface.

use crate::routes::Location;
use std::future::Future;
use url::Url;

/// The host's navigation service (router).
pub trait Navigator: Send + Sync {
    /// Navigate to a local path with optional query parameters.
    fn navigate(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> impl Future<Output = ()> + Send;

    /// The current navigation context, if available yet.
    fn current_location(&self) -> Option<Location>;

    /// Full-page redirect to an external URL.
    ///
    /// This is a terminal action: control does not return to the
    /// orchestrator afterwards.
    fn handoff(&self, url: &Url) -> impl Future<Output = ()> + Send;
}
