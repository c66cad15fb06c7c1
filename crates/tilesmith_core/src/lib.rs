//! Core data structures for tilesmith
//!
//! This crate provides the fundamental types for representing tile-based worlds:
//! - `World` - All maps of a project, plus format version and tile size
//! - `TileMap` - A named grid owning its layers
//! - `Layer` - A single layer (tiles, collision codes or entity placements)
//! - `Tileset` / `Catalog` - Registered atlases, patterns, entity definitions and animations
//! - `GidTable` - Flat global tile indices across all registered tilesets
//! - `codec` - The editable (round-trippable) and runtime (GID-flattened) encodings
//! - `EditorConfig` - Startup configuration declaring the world's structure

mod catalog;
mod collision;
mod config;
mod entity;
mod gid;
mod layer;
mod map;
mod tileset;
mod world;

pub mod codec;

pub use catalog::{Animation, Catalog, EntityDef, Pattern};
pub use collision::{CollisionShape, InvalidCollisionCode};
pub use config::{
    AnimationDecl, ConfigError, EditorConfig, EntityDecl, LayerDecl, MapDecl, PatternDecl,
    TilesetDecl,
};
pub use entity::EntityPlacement;
pub use gid::GidTable;
pub use layer::{Layer, LayerData, LayerType, COLLISION_LAYER, ENTITIES_LAYER};
pub use map::{grid_size, Cell, TileMap, MAX_MAP_CELLS};
pub use tileset::{TileRef, Tileset};
pub use world::{
    World, DEFAULT_LAYER, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_NAME, DEFAULT_MAP_WIDTH,
    DEFAULT_TILE_SIZE, FORMAT_VERSION,
};
