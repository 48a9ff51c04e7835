/// Per-lobby typed change-event broadcast registry.
pub mod feed;
/// Lobby lifecycle stage machine.
pub mod stage;
/// Client-session reconciliation views over the change feed.
pub mod view;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::party_store::PartyStore, error::ServiceError, llm::LlmProvider,
    state::feed::FeedRegistry,
};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Buffered events per lobby feed channel before slow subscribers lag.
const FEED_CHANNEL_CAPACITY: usize = 64;

/// Central application state: the storage slot, the change-feed registry,
/// the degraded flag, runtime configuration, and the optional LLM provider.
pub struct AppState {
    party_store: RwLock<Option<Arc<dyn PartyStore>>>,
    feed: FeedRegistry,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    llm: Option<Arc<dyn LlmProvider>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply. The application starts in degraded mode until a storage
    /// backend is installed.
    pub fn new(config: AppConfig, llm: Option<Arc<dyn LlmProvider>>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            party_store: RwLock::new(None),
            feed: FeedRegistry::new(FEED_CHANNEL_CAPACITY),
            degraded: degraded_tx,
            config,
            llm,
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn party_store(&self) -> Option<Arc<dyn PartyStore>> {
        let guard = self.party_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current store or fail with the degraded-mode error.
    pub async fn require_party_store(&self) -> Result<Arc<dyn PartyStore>, ServiceError> {
        self.party_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn install_party_store(&self, store: Arc<dyn PartyStore>) {
        {
            let mut guard = self.party_store.write().await;
            *guard = Some(store);
        }
        self.set_degraded(false);
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_party_store(&self) {
        {
            let mut guard = self.party_store.write().await;
            guard.take();
        }
        self.set_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Flip the degraded flag, notifying watchers on change.
    pub fn set_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Subscribe to degraded-mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// The per-lobby change feed registry.
    pub fn feed(&self) -> &FeedRegistry {
        &self.feed
    }

    /// Loaded runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The configured LLM provider, if any. `None` means every generation
    /// request takes the deterministic fallback path.
    pub fn llm(&self) -> Option<Arc<dyn LlmProvider>> {
        self.llm.clone()
    }
}
