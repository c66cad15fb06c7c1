//! Editor session
//!
//! Owns the world, the catalog and its GID table, the interaction machine and
//! the persistence gateway. Every edit goes through [`EditorSession::apply`],
//! which mutates the selected map, records a [`WorldEvent`] and schedules a
//! debounced save.

use std::path::PathBuf;

use thiserror::Error;
use tilesmith_core::codec::{parse_editable, serialize_editable, serialize_runtime, ParseError};
use tilesmith_core::{Catalog, EditorConfig, GidTable, LayerType, TileMap, World, DEFAULT_LAYER};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::interaction::{EditAction, Interaction, Tool};
use crate::persistence::PersistenceGateway;
use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode world: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no map at index {0}")]
    NoSuchMap(usize),
    #[error("no layer '{0}' in the selected map")]
    NoSuchLayer(String),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Change notifications, drained by whoever redraws or reports
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    CellsChanged {
        map: String,
        layer: String,
        count: usize,
    },
    EntityAdded {
        map: String,
        id: Uuid,
    },
    EntityRemoved {
        map: String,
        id: Uuid,
    },
    /// The world was replaced by an import
    Imported,
    MapSelected(usize),
}

pub struct EditorSession<S> {
    world: World,
    catalog: Catalog,
    gids: GidTable,
    interaction: Interaction,
    persistence: PersistenceGateway<S>,
    selected_map: usize,
    selected_layer: String,
    events: Vec<WorldEvent>,
}

impl<S: KeyValueStore> EditorSession<S> {
    /// Build the catalog, restore the stored world and selected map
    pub async fn start(config: &EditorConfig, store: S) -> Self {
        let (catalog, issues) = config.build_catalog();
        if !issues.is_empty() {
            warn!("Configuration has {} issue(s)", issues.len());
        }
        let gids = catalog.gid_table();

        let persistence = PersistenceGateway::new(store);
        let world = persistence.load(config).await;
        let invalid = world.invalid_tiles(&catalog);
        if invalid > 0 {
            warn!("{} stored tile(s) reference unknown tilesets or indices", invalid);
        }
        let selected_map = persistence.load_selected_map(world.maps.len()).await;
        let selected_layer = default_layer(world.maps.get(selected_map));

        info!(
            "Session started: {} map(s), {} tileset(s), {} GID(s)",
            world.maps.len(),
            catalog.tilesets().len(),
            gids.total()
        );

        Self {
            interaction: Interaction::new(world.tile_size),
            world,
            catalog,
            gids,
            persistence,
            selected_map,
            selected_layer,
            events: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn gids(&self) -> &GidTable {
        &self.gids
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn persistence(&self) -> &PersistenceGateway<S> {
        &self.persistence
    }

    pub fn selected_map_index(&self) -> usize {
        self.selected_map
    }

    pub fn selected_map(&self) -> Option<&TileMap> {
        self.world.maps.get(self.selected_map)
    }

    pub fn selected_layer(&self) -> &str {
        &self.selected_layer
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn select_tool(&mut self, tool: Tool) {
        debug!("Tool: {:?}", tool);
        self.interaction.select_tool(tool);
    }

    pub fn set_fill_mode(&mut self, enabled: bool) {
        self.interaction.set_fill_mode(enabled);
    }

    pub fn cancel(&mut self) {
        self.interaction.cancel();
    }

    /// Switch maps and persist the choice right away
    pub async fn select_map(&mut self, index: usize) -> Result<(), SessionError> {
        let map = self
            .world
            .maps
            .get(index)
            .ok_or(SessionError::NoSuchMap(index))?;
        if map.layer(&self.selected_layer).is_none() {
            self.selected_layer = default_layer(Some(map));
        }
        self.interaction.cancel_drag();
        self.selected_map = index;
        self.events.push(WorldEvent::MapSelected(index));
        self.persistence.save_selected_map(index).await;
        Ok(())
    }

    pub fn select_layer(&mut self, name: &str) -> Result<(), SessionError> {
        let exists = self
            .selected_map()
            .is_some_and(|map| map.layer(name).is_some());
        if !exists {
            return Err(SessionError::NoSuchLayer(name.to_string()));
        }
        self.selected_layer = name.to_string();
        Ok(())
    }

    /// Returns whether the world changed
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        let action = self.interaction.pointer_down(x, y);
        self.apply_opt(action)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let action = self.interaction.pointer_move(x, y);
        self.apply_opt(action)
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        let action = self.interaction.pointer_up(x, y);
        self.apply_opt(action)
    }

    fn apply_opt(&mut self, action: Option<EditAction>) -> bool {
        action.is_some_and(|action| self.apply(action))
    }

    /// Apply one edit to the selected map; writes outside the map are
    /// clipped and an edit that changes nothing records no event
    pub fn apply(&mut self, action: EditAction) -> bool {
        let tile_size = self.world.tile_size;
        let Some(map) = self.world.maps.get_mut(self.selected_map) else {
            return false;
        };
        let layer = self.selected_layer.as_str();

        let event = match action {
            EditAction::PlacePattern { cell, pattern } => {
                let Some(pattern) = self.catalog.pattern(&pattern) else {
                    warn!("Unknown pattern '{}'", pattern);
                    return false;
                };
                let count = map.add_pattern(layer, cell, pattern);
                (count > 0).then(|| cells_changed(map, layer, count))
            }
            EditAction::FillRegion { from, to, pattern } => {
                let Some(pattern) = self.catalog.pattern(&pattern) else {
                    warn!("Unknown pattern '{}'", pattern);
                    return false;
                };
                let count = map.repeat_pattern_in_region(layer, from, to, pattern);
                (count > 0).then(|| cells_changed(map, layer, count))
            }
            EditAction::PlaceCollision { cell, shape } => map
                .add_collision(cell, shape)
                .then(|| cells_changed(map, tilesmith_core::COLLISION_LAYER, 1)),
            EditAction::PlaceEntity { cell, entity } => {
                let Some(def) = self.catalog.entity(&entity) else {
                    warn!("Unknown entity '{}'", entity);
                    return false;
                };
                if !map.contains(cell) {
                    return false;
                }
                let (x, y) = cell.origin(tile_size);
                let id = map.add_entity(def, tile_size, x as u32, y as u32);
                Some(WorldEvent::EntityAdded {
                    map: map.name.clone(),
                    id,
                })
            }
            EditAction::Delete { cell, x, y } => {
                if LayerType::for_name(layer) == LayerType::Entities {
                    map.delete_entity_by_position(layer, x, y)
                        .map(|removed| WorldEvent::EntityRemoved {
                            map: map.name.clone(),
                            id: removed.id,
                        })
                } else {
                    map.clear_cell(layer, cell)
                        .then(|| cells_changed(map, layer, 1))
                }
            }
        };

        match event {
            Some(event) => {
                self.events.push(event);
                self.persistence.schedule_save();
                true
            }
            None => false,
        }
    }

    /// Editable form of the current world
    pub fn export_editable(&self) -> Result<String, SessionError> {
        Ok(serialize_editable(&self.world)?)
    }

    /// Runtime form of the current world
    pub fn export_runtime(&self) -> Result<String, SessionError> {
        Ok(serialize_runtime(&self.world, &self.catalog)?)
    }

    /// Replace the world with parsed editable text; on error the current
    /// world is left untouched
    pub fn import(&mut self, text: &str) -> Result<(), SessionError> {
        let world = parse_editable(text)?;
        let invalid = world.invalid_tiles(&self.catalog);
        if invalid > 0 {
            warn!("Imported world has {} tile(s) outside the catalog", invalid);
        }
        info!("Imported world with {} map(s)", world.maps.len());

        self.world = world;
        self.interaction = Interaction::new(self.world.tile_size);
        if self.selected_map >= self.world.maps.len() {
            self.selected_map = 0;
        }
        let map = self.world.maps.get(self.selected_map);
        if map.map_or(true, |m| m.layer(&self.selected_layer).is_none()) {
            self.selected_layer = default_layer(map);
        }
        self.events.push(WorldEvent::Imported);
        self.persistence.schedule_save();
        Ok(())
    }

    pub async fn save_if_due(&mut self) -> bool {
        self.persistence.save_if_due(&self.world).await
    }

    pub async fn flush(&mut self) -> bool {
        self.persistence.flush(&self.world).await
    }

    /// Sleep until a scheduled save is due, then run it
    pub async fn wait_for_save(&mut self) -> bool {
        self.persistence.wait_until_due().await;
        self.save_if_due().await
    }

    /// Wipe the store; the in-memory world is kept
    pub async fn clear_store(&mut self) -> Result<(), SessionError> {
        Ok(self.persistence.clear().await?)
    }
}

fn cells_changed(map: &TileMap, layer: &str, count: usize) -> WorldEvent {
    WorldEvent::CellsChanged {
        map: map.name.clone(),
        layer: layer.to_string(),
        count,
    }
}

/// First layer of a map, which is the first configured layer
fn default_layer(map: Option<&TileMap>) -> String {
    map.and_then(|m| m.layers.first())
        .map(|l| l.name.clone())
        .unwrap_or_else(|| DEFAULT_LAYER.to_string())
}
