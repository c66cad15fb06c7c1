//! Encodings of a [`World`](crate::World)
//!
//! Two representations are derived from the same world snapshot:
//!
//! - **Editable form** ([`editable`]) - lossless JSON that keeps tileset-local
//!   indices plus a parallel array of tileset names. Used for persistence and
//!   import/export, and parsed back with [`parse_editable`].
//! - **Runtime form** ([`runtime`]) - one-way JSON for games: tile cells are
//!   flattened to GIDs and tilesets and animations are listed alongside.
//!
//! Both go through [`project_layer`], so the per-cell rules cannot drift
//! apart, and both are rendered with [`pretty::to_pretty_string`].

pub mod editable;
pub mod pretty;
pub mod runtime;

pub use editable::{parse_editable, serialize_editable, EditableLayer, EditableMap, EditableWorld};
pub use runtime::{serialize_runtime, RuntimeLayer, RuntimeMap, RuntimeTileset, RuntimeWorld};

use serde_json::Value;
use thiserror::Error;

use crate::{Layer, LayerData, TileRef};

/// Import text that cannot be turned into a world
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing or malformed 'maps' field")]
    MissingMaps,
    #[error("map '{map}' is {width}x{height}, larger than {max} cells", max = crate::MAX_MAP_CELLS)]
    Dimensions {
        map: String,
        width: u32,
        height: u32,
    },
    #[error("map '{map}' layer '{layer}': {reason}")]
    Layer {
        map: String,
        layer: String,
        reason: String,
    },
}

/// Encode a layer's data, turning each tile cell into a number with `encode`
///
/// Collision codes and entity placements pass through unchanged.
pub fn project_layer(layer: &Layer, mut encode: impl FnMut(&TileRef) -> u32) -> Value {
    match &layer.data {
        LayerData::Tiles(cells) => Value::Array(
            cells
                .iter()
                .map(|cell| match cell {
                    Some(tile) => Value::from(encode(tile)),
                    None => Value::Null,
                })
                .collect(),
        ),
        LayerData::Collision(codes) => {
            Value::Array(codes.iter().map(|c| Value::from(c.code())).collect())
        }
        LayerData::Entities(entities) => {
            serde_json::to_value(entities).unwrap_or_else(|_| Value::Array(Vec::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, CollisionShape, TileMap, ENTITIES_LAYER};
    use serde_json::json;

    #[test]
    fn test_project_tile_layer() {
        let mut map = TileMap::new("a", 3, 1, &["bg"]);
        map.add_tile("bg", Cell::new(1, 0), Some(TileRef::new("t", 4)));

        let value = project_layer(map.layer("bg").unwrap(), |t| t.index + 100);
        assert_eq!(value, json!([null, 104, null]));
    }

    #[test]
    fn test_project_passes_collision_and_entities_through() {
        let mut map = TileMap::new("a", 2, 1, &["bg"]);
        map.add_collision(Cell::new(1, 0), CollisionShape::BottomRight);
        let value = project_layer(map.layer("collision").unwrap(), |_| 999);
        assert_eq!(value, json!([0, 4]));

        let value = project_layer(map.layer(ENTITIES_LAYER).unwrap(), |_| 999);
        assert_eq!(value, json!([]));
    }
}
