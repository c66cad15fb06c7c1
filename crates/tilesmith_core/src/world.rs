//! The world: every map of a project

use tracing::debug;

use crate::{Catalog, Cell, EditorConfig, LayerData, TileMap};

/// Format version written into the editable form
pub const FORMAT_VERSION: &str = "0.1";
/// Tile size used when none is configured
pub const DEFAULT_TILE_SIZE: u32 = 8;
/// Map created when the configuration declares none
pub const DEFAULT_MAP_NAME: &str = "default";
pub const DEFAULT_MAP_WIDTH: u32 = 32;
pub const DEFAULT_MAP_HEIGHT: u32 = 22;
/// Layer created when the configuration declares none
pub const DEFAULT_LAYER: &str = "bg";

/// Root aggregate owning all maps
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub version: String,
    /// Tile size in pixels
    pub tile_size: u32,
    pub maps: Vec<TileMap>,
}

impl Default for World {
    fn default() -> Self {
        Self::build_from_config(&EditorConfig::default())
    }
}

impl World {
    /// Build the configured structure with empty layers. Every map receives
    /// every configured layer plus `collision` and `entities`.
    pub fn build_from_config(config: &EditorConfig) -> Self {
        let layer_names = config.layer_names();
        let maps = config
            .maps
            .iter()
            .map(|decl| TileMap::new(decl.name.clone(), decl.width, decl.height, &layer_names))
            .collect();
        Self {
            version: config.version.clone(),
            tile_size: config.tile_size,
            maps,
        }
    }

    /// Copy stored content into the configured structure
    ///
    /// Maps and layers are matched by name. The configuration decides which
    /// maps and layers exist and how big they are; content only present in
    /// `persisted` is dropped. When dimensions differ, cells are copied by
    /// position and clipped to the configured size.
    pub fn overlay_persisted(&mut self, persisted: &World) {
        for map in &mut self.maps {
            let Some(stored) = persisted.maps.iter().find(|m| m.name == map.name) else {
                debug!("No stored data for map '{}'", map.name);
                continue;
            };
            for layer in &mut map.layers {
                let Some(stored_layer) = stored.layer(&layer.name) else {
                    continue;
                };
                match (&mut layer.data, &stored_layer.data) {
                    (LayerData::Tiles(cells), LayerData::Tiles(source)) => {
                        copy_grid(cells, map.width, source, stored.width, stored.height);
                    }
                    (LayerData::Collision(cells), LayerData::Collision(source)) => {
                        copy_grid(cells, map.width, source, stored.width, stored.height);
                    }
                    (LayerData::Entities(entities), LayerData::Entities(source)) => {
                        entities.clone_from(source);
                    }
                    _ => {}
                }
            }
        }
    }

    pub fn map(&self, name: &str) -> Option<&TileMap> {
        self.maps.iter().find(|m| m.name == name)
    }

    pub fn map_mut(&mut self, name: &str) -> Option<&mut TileMap> {
        self.maps.iter_mut().find(|m| m.name == name)
    }

    pub fn map_index(&self, name: &str) -> Option<usize> {
        self.maps.iter().position(|m| m.name == name)
    }

    /// Cell under a map pixel position
    pub fn cell_at(&self, px: f32, py: f32) -> Cell {
        Cell::from_pixel(px, py, self.tile_size)
    }

    /// Count tile cells that break the catalog invariant (unknown tileset or
    /// local index past the tileset's tile count)
    pub fn invalid_tiles(&self, catalog: &Catalog) -> usize {
        self.maps
            .iter()
            .flat_map(|m| &m.layers)
            .map(|layer| match &layer.data {
                LayerData::Tiles(cells) => cells
                    .iter()
                    .flatten()
                    .filter(|t| !catalog.is_valid_tile(t))
                    .count(),
                _ => 0,
            })
            .sum()
    }
}

/// Copy a `source_width × source_height` grid into `target` (row-major,
/// `target_width` wide), keeping each cell's (x, y) position
fn copy_grid<T: Clone>(
    target: &mut [T],
    target_width: u32,
    source: &[T],
    source_width: u32,
    source_height: u32,
) {
    if target_width == 0 || source_width == 0 {
        return;
    }
    let target_height = target.len() as u32 / target_width;
    let width = target_width.min(source_width) as usize;
    let height = target_height.min(source_height);
    for y in 0..height {
        let from = y as usize * source_width as usize;
        let to = y as usize * target_width as usize;
        let (Some(src), Some(dst)) = (
            source.get(from..from + width),
            target.get_mut(to..to + width),
        ) else {
            break;
        };
        dst.clone_from_slice(src);
    }
}
