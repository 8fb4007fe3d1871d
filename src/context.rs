//! Shared engine context.
//!
//! [`EngineContext`] bundles the store, the external collaborators and the
//! loaded configuration. It is cheap to clone and is handed to every engine
//! service, so request handling and the rollover job see the same resources
//! without sharing any other in-process state.

use std::sync::Arc;

use crate::config::{ConfigLoader, EngineSettings};
use crate::external::{
    AttachmentStore, Clock, EmployeeDirectory, LogNotifier, NotificationSink,
    StaticUrlAttachments, SystemClock,
};
use crate::store::LeaveStore;

/// Base URL used for attachments when no attachment store is configured.
const DEFAULT_ATTACHMENT_BASE: &str = "/attachments";

/// Resources shared by the engine services.
#[derive(Clone)]
pub struct EngineContext {
    store: Arc<dyn LeaveStore>,
    directory: Arc<dyn EmployeeDirectory>,
    notifier: Arc<dyn NotificationSink>,
    attachments: Arc<dyn AttachmentStore>,
    clock: Arc<dyn Clock>,
    config: Arc<ConfigLoader>,
}

impl EngineContext {
    /// Creates a context with a logging notifier, a static attachment
    /// resolver and the system clock.
    pub fn new(
        store: Arc<dyn LeaveStore>,
        directory: Arc<dyn EmployeeDirectory>,
        config: ConfigLoader,
    ) -> Self {
        Self {
            store,
            directory,
            notifier: Arc::new(LogNotifier),
            attachments: Arc::new(StaticUrlAttachments::new(DEFAULT_ATTACHMENT_BASE)),
            clock: Arc::new(SystemClock),
            config: Arc::new(config),
        }
    }

    /// Replaces the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the attachment store.
    pub fn with_attachments(mut self, attachments: Arc<dyn AttachmentStore>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The leave store.
    pub fn store(&self) -> &dyn LeaveStore {
        self.store.as_ref()
    }

    /// The employee directory.
    pub fn directory(&self) -> &dyn EmployeeDirectory {
        self.directory.as_ref()
    }

    /// The notification sink.
    pub fn notifier(&self) -> &dyn NotificationSink {
        self.notifier.as_ref()
    }

    /// The attachment store.
    pub fn attachments(&self) -> &dyn AttachmentStore {
        self.attachments.as_ref()
    }

    /// The clock.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Shortcut for the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{FixedClock, InMemoryDirectory};
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    #[test]
    fn test_context_is_clone_send_sync() {
        fn assert_traits<T: Clone + Send + Sync>() {}
        assert_traits::<EngineContext>();
    }

    #[test]
    fn test_with_clock_replaces_clock() {
        let ctx = EngineContext::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryDirectory::new()),
            ConfigLoader::from_parts(EngineSettings::default(), Vec::new()),
        )
        .with_clock(Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
        )));

        assert_eq!(ctx.clock().current_year(), 2030);
        assert_eq!(ctx.settings().conflict_retry_limit, 3);
    }
}
