//! Mock navigation service for testing.

use crate::providers::Navigator;
use crate::routes::Location;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Debug, Default)]
struct Inner {
    location: Option<Location>,
    navigations: Vec<(String, Vec<(String, String)>)>,
    handoffs: Vec<Url>,
}

/// Mock navigation service.
///
/// Records every local navigation and provider handoff.
#[derive(Debug, Clone, Default)]
pub struct MockNavigator {
    inner: Arc<Mutex<Inner>>,
}

impl MockNavigator {
    /// Create a mock with no navigation context yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock reporting the given location.
    #[must_use]
    pub fn with_location(location: Location) -> Self {
        let navigator = Self::default();
        navigator.set_location(Some(location));
        navigator
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the reported location.
    pub fn set_location(&self, location: Option<Location>) {
        self.lock().location = location;
    }

    /// All recorded local navigations, in order.
    #[must_use]
    pub fn navigations(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.lock().navigations.clone()
    }

    /// Paths of all recorded local navigations, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.lock()
            .navigations
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// All recorded provider handoffs, in order.
    #[must_use]
    pub fn handoffs(&self) -> Vec<Url> {
        self.lock().handoffs.clone()
    }
}

impl Navigator for MockNavigator {
    fn navigate(&self, path: &str, query: &[(String, String)]) -> impl Future<Output = ()> + Send {
        self.lock()
            .navigations
            .push((path.to_string(), query.to_vec()));
        async {}
    }

    fn current_location(&self) -> Option<Location> {
        self.lock().location.clone()
    }

    fn handoff(&self, url: &Url) -> impl Future<Output = ()> + Send {
        self.lock().handoffs.push(url.clone());
        async {}
    }
}
