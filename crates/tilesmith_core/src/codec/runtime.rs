//! Runtime (GID-flattened) encoding
//!
//! One-way projection consumed by games. Tile cells become global indices so
//! a loader only needs the `tilesets` list to find the atlas a cell belongs
//! to. Maps are keyed by name and written in name order.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{pretty, project_layer};
use crate::{Catalog, GidTable, TileMap, World};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeWorld {
    pub tile_size: u32,
    pub tilesets: Vec<RuntimeTileset>,
    pub maps: BTreeMap<String, RuntimeMap>,
    /// Animation frames as GIDs
    pub animations: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeTileset {
    /// Registered tileset name
    pub id: String,
    /// Atlas file name
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// First global index of this tileset
    pub gid: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeMap {
    pub tiles_wide: u32,
    pub tiles_high: u32,
    pub layers: Vec<RuntimeLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeLayer {
    pub name: String,
    pub data: Value,
}

impl RuntimeWorld {
    pub fn from_world(world: &World, catalog: &Catalog, gids: &GidTable) -> Self {
        let tilesets = catalog
            .tilesets()
            .iter()
            .map(|tileset| RuntimeTileset {
                id: tileset.name.clone(),
                name: tileset.file_name().to_string(),
                width: tileset.width,
                height: tileset.height,
                gid: gids.offset(&tileset.name).unwrap_or(0),
            })
            .collect();

        let maps = world
            .maps
            .iter()
            .map(|map| (map.name.clone(), runtime_map(map, gids)))
            .collect();

        let animations = catalog
            .animations()
            .iter()
            .map(|animation| {
                let offset = gids.offset(&animation.tileset).unwrap_or_else(|| {
                    warn!(
                        "Animation uses unregistered tileset '{}', frames left unshifted",
                        animation.tileset
                    );
                    0
                });
                animation
                    .tiles
                    .iter()
                    .map(|tile| tile.saturating_add(offset))
                    .collect()
            })
            .collect();

        Self {
            tile_size: world.tile_size,
            tilesets,
            maps,
            animations,
        }
    }
}

fn runtime_map(map: &TileMap, gids: &GidTable) -> RuntimeMap {
    let mut unresolved = 0usize;
    let layers = map
        .layers
        .iter()
        .map(|layer| RuntimeLayer {
            name: layer.name.clone(),
            data: project_layer(layer, |tile| match gids.global_index(tile) {
                Some(gid) => gid,
                None => {
                    unresolved += 1;
                    tile.index
                }
            }),
        })
        .collect();
    if unresolved > 0 {
        warn!(
            "Map '{}': {} tile(s) reference unregistered tilesets or indices outside their \
             tileset, exported with offset 0",
            map.name, unresolved
        );
    }
    RuntimeMap {
        tiles_wide: map.width,
        tiles_high: map.height,
        layers,
    }
}

/// Render a world in the runtime form
pub fn serialize_runtime(world: &World, catalog: &Catalog) -> Result<String, serde_json::Error> {
    let gids = catalog.gid_table();
    let value = serde_json::to_value(RuntimeWorld::from_world(world, catalog, &gids))?;
    Ok(pretty::to_pretty_string(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Animation, Cell, CollisionShape, TileRef, Tileset};
    use serde_json::json;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        // 4 tiles, then 6 tiles
        catalog.register_tileset(Tileset::new("T1", "assets/t1.png", 16, 16, 8));
        catalog.register_tileset(Tileset::new("T2", "assets/t2.png", 24, 16, 8));
        catalog.add_animation(Animation {
            tileset: "T2".to_string(),
            tiles: vec![0, 1, 2],
        });
        catalog
    }

    fn world() -> World {
        let mut world = World::default();
        let map = &mut world.maps[0];
        map.add_tile("bg", Cell::new(0, 0), Some(TileRef::new("T1", 3)));
        map.add_tile("bg", Cell::new(1, 0), Some(TileRef::new("T2", 3)));
        map.add_collision(Cell::new(2, 0), CollisionShape::Full);
        world
    }

    #[test]
    fn test_tiles_become_gids() {
        let catalog = catalog();
        let gids = catalog.gid_table();
        let runtime = RuntimeWorld::from_world(&world(), &catalog, &gids);

        let map = &runtime.maps["default"];
        assert_eq!((map.tiles_wide, map.tiles_high), (32, 22));
        let bg = &map.layers[0].data;
        assert_eq!(bg[0], json!(3));
        assert_eq!(bg[1], json!(7));
        assert_eq!(bg[2], Value::Null);

        let collision = &map.layers[1].data;
        assert_eq!(collision[2], json!(1));
        assert_eq!(map.layers[2].data, json!([]));
    }

    #[test]
    fn test_tilesets_and_animations() {
        let catalog = catalog();
        let gids = catalog.gid_table();
        let runtime = RuntimeWorld::from_world(&world(), &catalog, &gids);

        assert_eq!(
            runtime.tilesets[1],
            RuntimeTileset {
                id: "T2".to_string(),
                name: "t2.png".to_string(),
                width: 24,
                height: 16,
                gid: 4,
            }
        );
        assert_eq!(runtime.animations, vec![vec![4, 5, 6]]);
    }

    #[test]
    fn test_unregistered_tileset_offset_is_zero() {
        let mut world = World::default();
        world.maps[0].add_tile("bg", Cell::new(0, 0), Some(TileRef::new("missing", 5)));
        let catalog = catalog();
        let runtime = RuntimeWorld::from_world(&world, &catalog, &catalog.gid_table());

        assert_eq!(runtime.maps["default"].layers[0].data[0], json!(5));
    }

    #[test]
    fn test_index_outside_tileset_keeps_local_index() {
        let text = r#"{"maps": [{"name": "default", "width": 1, "height": 1,
            "layers": [{"name": "bg", "data": [4294967295], "tilesetNames": ["T2"]}]}]}"#;
        let world = crate::codec::parse_editable(text).unwrap();

        let value: Value = serde_json::from_str(&serialize_runtime(&world, &catalog()).unwrap())
            .unwrap();
        assert_eq!(
            value["maps"]["default"]["layers"][0]["data"][0],
            json!(4294967295u32)
        );
    }

    #[test]
    fn test_serialized_shape() {
        let text = serialize_runtime(&world(), &catalog()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["tile_size"], json!(8));
        assert_eq!(value["tilesets"][0]["gid"], json!(0));
        assert_eq!(value["maps"]["default"]["layers"][0]["name"], json!("bg"));
        assert_eq!(value["maps"]["default"]["layers"][0]["data"][1], json!(7));
        assert!(value.get("version").is_none());
    }
}
