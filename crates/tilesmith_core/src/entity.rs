//! Entity placements stored in a map's entities layer

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An entity placed in a map
///
/// The placement references its definition by id; the pixel footprint is
/// copied at placement time so hit-testing and runtime export do not need
/// the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPlacement {
    /// Stable identifier for this placement
    pub id: Uuid,
    /// Id of the entity definition
    pub entity: String,
    /// Position in map pixels (top-left corner)
    pub x: u32,
    pub y: u32,
    /// Footprint in pixels
    pub width: u32,
    pub height: u32,
}

impl EntityPlacement {
    /// Create a new placement with a fresh id
    pub fn new(entity: impl Into<String>, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity: entity.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a pixel point lies inside the footprint `[x, x+width) × [y, y+height)`
    pub fn contains(&self, px: f32, py: f32) -> bool {
        let (x, y) = (self.x as f32, self.y as f32);
        px >= x && px < x + self.width as f32 && py >= y && py < y + self.height as f32
    }
}
