//! AppConfigStore - Published Configuration
//!
//! Single-slot cell holding the durable config for the whole process. One
//! writer (the submission controller), any number of readers.

use crate::domain::FirebaseConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Destination for a successfully persisted config
pub trait ConfigSink: Send + Sync {
    /// Current published config, if any
    fn snapshot(&self) -> Option<FirebaseConfig>;

    /// Replace the published config as one whole value
    fn replace(&self, config: FirebaseConfig);
}

/// Observable store for the application's config
#[derive(Clone)]
pub struct AppConfigStore {
    sender: Arc<watch::Sender<Option<FirebaseConfig>>>,
}

impl AppConfigStore {
    /// Create a store seeded with `initial`
    pub fn new(initial: Option<FirebaseConfig>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Watch for replacements
    pub fn subscribe(&self) -> watch::Receiver<Option<FirebaseConfig>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Option<FirebaseConfig> {
        self.sender.borrow().clone()
    }
}

impl Default for AppConfigStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for AppConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfigStore")
            .field("config", &*self.sender.borrow())
            .finish()
    }
}

impl ConfigSink for AppConfigStore {
    fn snapshot(&self) -> Option<FirebaseConfig> {
        self.current()
    }

    fn replace(&self, config: FirebaseConfig) {
        info!(project_id = %config.project_id, "Publishing updated config");
        self.sender.send_replace(Some(config));
    }
}
