//! Layer types for tile, collision and entity layers

use crate::{CollisionShape, EntityPlacement, TileRef};

/// Name of the mandatory collision layer
pub const COLLISION_LAYER: &str = "collision";
/// Name of the mandatory entities layer
pub const ENTITIES_LAYER: &str = "entities";

/// A named layer of a map
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub data: LayerData,
}

impl Layer {
    /// Create an empty layer whose kind follows from its name
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let name = name.into();
        let size = width as usize * height as usize;
        let data = match LayerType::for_name(&name) {
            LayerType::Tiles => LayerData::Tiles(vec![None; size]),
            LayerType::Collision => LayerData::Collision(vec![CollisionShape::Empty; size]),
            LayerType::Entities => LayerData::Entities(Vec::new()),
        };
        Self { name, data }
    }

    /// Get the type of this layer
    pub fn layer_type(&self) -> LayerType {
        match &self.data {
            LayerData::Tiles(_) => LayerType::Tiles,
            LayerData::Collision(_) => LayerType::Collision,
            LayerData::Entities(_) => LayerType::Entities,
        }
    }

    /// Check if the layer holds no content
    pub fn is_empty(&self) -> bool {
        match &self.data {
            LayerData::Tiles(tiles) => tiles.iter().all(Option::is_none),
            LayerData::Collision(codes) => codes.iter().all(|c| !c.is_solid()),
            LayerData::Entities(entities) => entities.is_empty(),
        }
    }
}

/// The type of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    Tiles,
    Collision,
    Entities,
}

impl LayerType {
    /// Reserved names select the collision and entities kinds; any other
    /// name is a tile layer.
    pub fn for_name(name: &str) -> Self {
        match name {
            COLLISION_LAYER => LayerType::Collision,
            ENTITIES_LAYER => LayerType::Entities,
            _ => LayerType::Tiles,
        }
    }
}

/// The data contained in a layer
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    /// Row-major cells, `None` is empty
    Tiles(Vec<Option<TileRef>>),
    /// Row-major collision codes
    Collision(Vec<CollisionShape>),
    /// Placements in insertion order
    Entities(Vec<EntityPlacement>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_layer() {
        let layer = Layer::new("bg", 10, 10);

        assert_eq!(layer.name, "bg");
        assert_eq!(layer.layer_type(), LayerType::Tiles);
        assert!(layer.is_empty());

        if let LayerData::Tiles(tiles) = &layer.data {
            assert_eq!(tiles.len(), 100);
        } else {
            panic!("Expected tile layer");
        }
    }

    #[test]
    fn test_reserved_names() {
        let collision = Layer::new(COLLISION_LAYER, 4, 2);
        assert_eq!(collision.layer_type(), LayerType::Collision);
        if let LayerData::Collision(codes) = &collision.data {
            assert_eq!(codes.len(), 8);
        } else {
            panic!("Expected collision layer");
        }

        let entities = Layer::new(ENTITIES_LAYER, 4, 2);
        assert_eq!(entities.layer_type(), LayerType::Entities);
        assert!(entities.is_empty());
    }
}
