//! Persistence gateway
//!
//! The world lives in the store under [`WORLD_KEY`] in the editable form.
//! Edits only *schedule* a save; the save runs once no further edit has
//! arrived for [`SAVE_DEBOUNCE`]. Store failures are logged and never reach
//! the caller, since the in-memory world stays authoritative.

use std::time::Duration;

use tilesmith_core::codec::{parse_editable, serialize_editable};
use tilesmith_core::{EditorConfig, World};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::store::{KeyValueStore, StoreError};

pub const WORLD_KEY: &str = "world";
pub const SELECTED_MAP_KEY: &str = "selected_map";
/// Quiet period before a scheduled save runs
pub const SAVE_DEBOUNCE: Duration = Duration::from_secs(1);

/// Trailing-edge debounce deadline
///
/// Every `schedule` moves the deadline to `now + delay`, so a burst of edits
/// produces a single save after the last one.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(SAVE_DEBOUNCE)
    }
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending save if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending save, returning whether there was one
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

/// Loads the world at startup and writes it back, debounced
pub struct PersistenceGateway<S> {
    store: S,
    debouncer: SaveDebouncer,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            debouncer: SaveDebouncer::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build the configured world and overlay whatever the store holds
    pub async fn load(&self, config: &EditorConfig) -> World {
        let mut world = World::build_from_config(config);
        match self.store.get(WORLD_KEY).await {
            Ok(Some(text)) => match parse_editable(&text) {
                Ok(stored) => {
                    world.overlay_persisted(&stored);
                    info!("Restored world with {} map(s)", world.maps.len());
                }
                Err(e) => warn!("Ignoring stored world: {}", e),
            },
            Ok(None) => info!("No stored world, starting from configuration"),
            Err(e) => error!("Failed to read stored world: {}", e),
        }
        world
    }

    /// Stored selected map index, or 0 when absent or out of range
    pub async fn load_selected_map(&self, map_count: usize) -> usize {
        let stored = match self.store.get(SELECTED_MAP_KEY).await {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to read selected map: {}", e);
                None
            }
        };
        stored
            .and_then(|text| text.trim().parse::<usize>().ok())
            .filter(|&index| index < map_count)
            .unwrap_or(0)
    }

    /// Persist the selected map index immediately
    pub async fn save_selected_map(&mut self, index: usize) -> bool {
        match self
            .store
            .put(SELECTED_MAP_KEY, &index.to_string())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save selected map: {}", e);
                false
            }
        }
    }

    /// Restart the debounce window
    pub fn schedule_save(&mut self) {
        self.debouncer.schedule(Instant::now());
    }

    pub fn is_save_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn save_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Run the scheduled save if the quiet period has elapsed
    pub async fn save_if_due(&mut self, world: &World) -> bool {
        if self.debouncer.take_due(Instant::now()) {
            self.save(world).await
        } else {
            false
        }
    }

    /// Run the scheduled save now, if there is one
    pub async fn flush(&mut self, world: &World) -> bool {
        if self.debouncer.cancel() {
            self.save(world).await
        } else {
            false
        }
    }

    /// Resolve once the scheduled save is due; never resolves when nothing
    /// is scheduled
    pub async fn wait_until_due(&self) {
        match self.debouncer.deadline() {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    /// Wipe the store and drop any pending save
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.debouncer.cancel();
        self.store.clear().await?;
        warn!("Store cleared");
        Ok(())
    }

    async fn save(&mut self, world: &World) -> bool {
        let text = match serialize_editable(world) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode world: {}", e);
                return false;
            }
        };
        match self.store.put(WORLD_KEY, &text).await {
            Ok(()) => {
                debug!("Saved world ({} bytes)", text.len());
                true
            }
            Err(e) => {
                error!("Failed to save world: {}", e);
                false
            }
        }
    }
}
