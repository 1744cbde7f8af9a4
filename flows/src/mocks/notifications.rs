//! Mock notification sink for testing.

use crate::providers::NotificationSink;
use crate::state::{Notice, NoticeSeverity};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock notification sink.
///
/// Records every notice instead of rendering toasts.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationSink {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MockNotificationSink {
    /// Create a new mock sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All recorded notices, in order.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    /// Titles of all recorded error notices.
    #[must_use]
    pub fn error_titles(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|notice| notice.severity == NoticeSeverity::Error)
            .map(|notice| notice.title.clone())
            .collect()
    }
}

impl NotificationSink for MockNotificationSink {
    fn notify(&self, notice: Notice) -> impl Future<Output = ()> + Send {
        self.lock().push(notice);
        async {}
    }
}
