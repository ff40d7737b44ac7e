//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use soldash_analytics::Dashboard;
use tokio::sync::{Mutex, RwLock};

use crate::config::ServerConfig;
use crate::events::EventBroadcaster;
use crate::provider::{DataProvider, InMemoryProvider};
use crate::store::RecordStore;

/// Latest live game state pushed by the browser extension.
#[derive(Debug, Clone)]
pub struct LiveGame {
    /// Opaque payload as received.
    pub data: serde_json::Value,
    /// When it was received.
    pub last_updated: DateTime<Utc>,
}

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Imported records.
    store: Arc<RecordStore>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Refresh coordinator: notifier state and notification log.
    dashboard: Arc<Mutex<Dashboard>>,
    /// Event broadcaster for SSE notifications.
    broadcaster: Arc<EventBroadcaster>,
    /// Source of pattern snapshots.
    provider: Arc<dyn DataProvider>,
    /// Live game cache.
    live_game: Arc<RwLock<Option<LiveGame>>>,
}

impl AppState {
    /// Create new application state backed by the in-memory provider.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(RecordStore::new());
        let provider = Arc::new(InMemoryProvider::new(store.clone()));
        Self::with_provider(config, store, provider)
    }

    /// Create application state with an explicit provider.
    pub fn with_provider(
        config: ServerConfig,
        store: Arc<RecordStore>,
        provider: Arc<dyn DataProvider>,
    ) -> Self {
        let dashboard = Dashboard::new(config.default_window, config.notification_capacity);
        Self {
            store,
            config: Arc::new(config),
            dashboard: Arc::new(Mutex::new(dashboard)),
            broadcaster: Arc::new(EventBroadcaster::new()),
            provider,
            live_game: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a reference to the record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the refresh coordinator.
    pub fn dashboard(&self) -> &Arc<Mutex<Dashboard>> {
        &self.dashboard
    }

    /// Get a reference to the event broadcaster.
    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    /// Get a reference to the data provider.
    pub fn provider(&self) -> &Arc<dyn DataProvider> {
        &self.provider
    }

    /// Get a reference to the live game cache.
    pub fn live_game(&self) -> &Arc<RwLock<Option<LiveGame>>> {
        &self.live_game
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
