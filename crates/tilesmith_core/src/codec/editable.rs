//! Editable (lossless) encoding
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "tile_size": 8,
//!   "maps": [
//!     {
//!       "name": "default",
//!       "width": 32,
//!       "height": 22,
//!       "layers": [
//!         { "name": "bg", "data": [null, 3, ...], "tilesetNames": [null, "terrain", ...] },
//!         { "name": "collision", "data": [0, 1, ...] },
//!         { "name": "entities", "data": [{ "id": "...", "entity": "bush", "x": 8, "y": 0, "width": 8, "height": 8 }] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{pretty, project_layer, ParseError};
use crate::{
    grid_size, CollisionShape, EntityPlacement, Layer, LayerData, LayerType, TileMap, TileRef,
    World, DEFAULT_TILE_SIZE,
};

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

/// Top level of the editable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableWorld {
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    pub maps: Vec<EditableMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableMap {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub layers: Vec<EditableLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableLayer {
    pub name: String,
    #[serde(default)]
    pub data: Value,
    /// Per-cell tileset names, tile layers only
    #[serde(
        rename = "tilesetNames",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tileset_names: Option<Vec<Option<String>>>,
}

impl EditableWorld {
    /// Project a world into the editable form
    pub fn from_world(world: &World) -> Self {
        Self {
            version: world.version.clone(),
            tile_size: world.tile_size,
            maps: world
                .maps
                .iter()
                .map(|map| EditableMap {
                    name: map.name.clone(),
                    width: map.width,
                    height: map.height,
                    layers: map.layers.iter().map(encode_layer).collect(),
                })
                .collect(),
        }
    }

    /// Rebuild the world; mandatory layers are appended when missing
    pub fn into_world(self) -> Result<World, ParseError> {
        let mut maps = Vec::with_capacity(self.maps.len());
        for editable in self.maps {
            if grid_size(editable.width, editable.height).is_none() {
                return Err(ParseError::Dimensions {
                    map: editable.name,
                    width: editable.width,
                    height: editable.height,
                });
            }
            let mut map = TileMap {
                name: editable.name,
                width: editable.width,
                height: editable.height,
                layers: Vec::with_capacity(editable.layers.len()),
            };
            for layer in editable.layers {
                if map.layer(&layer.name).is_some() {
                    warn!(
                        "Map '{}' has duplicate layer '{}', keeping the first",
                        map.name, layer.name
                    );
                    continue;
                }
                let decoded = decode_layer(&map, layer)?;
                map.layers.push(decoded);
            }
            map.ensure_mandatory_layers();
            maps.push(map);
        }
        Ok(World {
            version: self.version,
            tile_size: self.tile_size,
            maps,
        })
    }
}

fn encode_layer(layer: &Layer) -> EditableLayer {
    let tileset_names = match &layer.data {
        LayerData::Tiles(cells) => Some(
            cells
                .iter()
                .map(|cell| cell.as_ref().map(|t| t.tileset.clone()))
                .collect(),
        ),
        _ => None,
    };
    EditableLayer {
        name: layer.name.clone(),
        data: project_layer(layer, |tile| tile.index),
        tileset_names,
    }
}

fn decode_layer(map: &TileMap, layer: EditableLayer) -> Result<Layer, ParseError> {
    let size = map.cell_count();
    let malformed = |e: serde_json::Error| ParseError::Layer {
        map: map.name.clone(),
        layer: layer.name.clone(),
        reason: e.to_string(),
    };
    let raw = match layer.data {
        Value::Null => Value::Array(Vec::new()),
        other => other,
    };

    let data = match LayerType::for_name(&layer.name) {
        LayerType::Tiles => {
            let indices: Vec<Option<u32>> = serde_json::from_value(raw).map_err(malformed)?;
            let names = layer.tileset_names.unwrap_or_default();
            let mut unnamed = 0usize;
            let mut cells: Vec<Option<TileRef>> = indices
                .into_iter()
                .enumerate()
                .map(|(i, index)| {
                    let index = index?;
                    match names.get(i).cloned().flatten() {
                        Some(tileset) => Some(TileRef { tileset, index }),
                        None => {
                            unnamed += 1;
                            None
                        }
                    }
                })
                .collect();
            if unnamed > 0 {
                warn!(
                    "Map '{}' layer '{}': dropped {} tile(s) without a tileset name",
                    map.name, layer.name, unnamed
                );
            }
            fit(&mut cells, size, None, map, &layer.name);
            LayerData::Tiles(cells)
        }
        LayerType::Collision => {
            let mut codes: Vec<CollisionShape> =
                serde_json::from_value(raw).map_err(malformed)?;
            fit(&mut codes, size, CollisionShape::Empty, map, &layer.name);
            LayerData::Collision(codes)
        }
        LayerType::Entities => {
            let entities: Vec<EntityPlacement> = serde_json::from_value(raw).map_err(malformed)?;
            LayerData::Entities(entities)
        }
    };

    Ok(Layer {
        name: layer.name,
        data,
    })
}

/// Pad or truncate a grid to the map's cell count
fn fit<T: Clone>(cells: &mut Vec<T>, size: usize, empty: T, map: &TileMap, layer: &str) {
    if cells.len() != size {
        debug!(
            "Map '{}' layer '{}' has {} cells, expected {}; resizing",
            map.name,
            layer,
            cells.len(),
            size
        );
        cells.resize(size, empty);
    }
}

/// Render a world in the editable form
pub fn serialize_editable(world: &World) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(EditableWorld::from_world(world))?;
    Ok(pretty::to_pretty_string(&value))
}

/// Parse editable-form text back into a world
pub fn parse_editable(text: &str) -> Result<World, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.get("maps").is_some_and(Value::is_array) {
        return Err(ParseError::MissingMaps);
    }
    let editable: EditableWorld = serde_json::from_value(value)?;
    editable.into_world()
}
