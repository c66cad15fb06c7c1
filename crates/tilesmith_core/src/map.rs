//! Maps and the placement operations that mutate them
//!
//! All writes are bounds-checked. A write outside the map is not an error:
//! it is clipped or ignored, and the operation reports how much it changed.

use uuid::Uuid;

use crate::{
    CollisionShape, EntityDef, EntityPlacement, Layer, LayerData, Pattern, TileRef,
    COLLISION_LAYER, ENTITIES_LAYER,
};

/// Grid position in tiles; may lie outside a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a pixel position
    pub fn from_pixel(px: f32, py: f32, tile_size: u32) -> Self {
        let size = tile_size.max(1) as f32;
        Self {
            x: (px / size).floor() as i32,
            y: (py / size).floor() as i32,
        }
    }

    /// Top-left pixel of this cell
    pub fn origin(self, tile_size: u32) -> (i64, i64) {
        (
            self.x as i64 * tile_size as i64,
            self.y as i64 * tile_size as i64,
        )
    }
}

/// Largest number of cells a map may hold
pub const MAX_MAP_CELLS: usize = 1 << 22;

/// Cell count of a `width` x `height` grid, or `None` if it exceeds
/// [`MAX_MAP_CELLS`]
pub fn grid_size(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&size| size <= MAX_MAP_CELLS)
}

/// A named rectangular grid of layers
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    pub name: String,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    pub layers: Vec<Layer>,
}

impl TileMap {
    /// Create a map with empty layers; `collision` and `entities` are
    /// appended if not listed.
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        width: u32,
        height: u32,
        layer_names: &[S],
    ) -> Self {
        let mut map = Self {
            name: name.into(),
            width,
            height,
            layers: Vec::with_capacity(layer_names.len() + 2),
        };
        for layer_name in layer_names {
            let layer_name = layer_name.as_ref();
            if map.layer(layer_name).is_none() {
                map.layers.push(Layer::new(layer_name, width, height));
            }
        }
        map.ensure_mandatory_layers();
        map
    }

    /// Append the collision and entities layers if missing
    pub fn ensure_mandatory_layers(&mut self) {
        for name in [COLLISION_LAYER, ENTITIES_LAYER] {
            if self.layer(name).is_none() {
                self.layers.push(Layer::new(name, self.width, self.height));
            }
        }
    }

    /// Number of cells in a grid layer
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Flat index of a cell, or `None` outside the map
    pub fn cell_index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as u32, cell.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cell_index(cell).is_some()
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// Read a tile cell
    pub fn tile(&self, layer: &str, cell: Cell) -> Option<&TileRef> {
        let index = self.cell_index(cell)?;
        match &self.layer(layer)?.data {
            LayerData::Tiles(tiles) => tiles.get(index)?.as_ref(),
            _ => None,
        }
    }

    /// Read a collision cell
    pub fn collision(&self, cell: Cell) -> Option<CollisionShape> {
        let index = self.cell_index(cell)?;
        match &self.layer(COLLISION_LAYER)?.data {
            LayerData::Collision(codes) => codes.get(index).copied(),
            _ => None,
        }
    }

    /// Placements of the entities layer
    pub fn entities(&self) -> &[EntityPlacement] {
        match self.layer(ENTITIES_LAYER).map(|l| &l.data) {
            Some(LayerData::Entities(entities)) => entities,
            _ => &[],
        }
    }

    fn tiles_mut(&mut self, layer: &str) -> Option<&mut Vec<Option<TileRef>>> {
        match &mut self.layer_mut(layer)?.data {
            LayerData::Tiles(tiles) => Some(tiles),
            _ => None,
        }
    }

    /// Write one tile cell; `None` clears it. Returns `false` if the cell is
    /// outside the map or the layer is not a tile layer.
    pub fn add_tile(&mut self, layer: &str, cell: Cell, value: Option<TileRef>) -> bool {
        let Some(index) = self.cell_index(cell) else {
            return false;
        };
        let Some(tiles) = self.tiles_mut(layer) else {
            return false;
        };
        match tiles.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Stamp a pattern with its top-left at `origin`, clipping at the map
    /// edges. Returns the number of cells written.
    pub fn add_pattern(&mut self, layer: &str, origin: Cell, pattern: &Pattern) -> usize {
        let mut written = 0;
        for py in 0..pattern.height {
            for px in 0..pattern.width {
                let cell = Cell::new(origin.x + px as i32, origin.y + py as i32);
                if self.add_tile(layer, cell, pattern.tile(px, py).cloned()) {
                    written += 1;
                }
            }
        }
        written
    }

    /// Tile the rectangle spanned by `a` and `b` (inclusive, any corner
    /// order) with a pattern. Cell (rx, ry) of the rectangle receives pattern
    /// cell (rx mod width, ry mod height). Returns the number of cells written.
    pub fn repeat_pattern_in_region(
        &mut self,
        layer: &str,
        a: Cell,
        b: Cell,
        pattern: &Pattern,
    ) -> usize {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        let mut written = 0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = (x - min_x) as u32 % pattern.width;
                let py = (y - min_y) as u32 % pattern.height;
                if self.add_tile(layer, Cell::new(x, y), pattern.tile(px, py).cloned()) {
                    written += 1;
                }
            }
        }
        written
    }

    /// Write a collision shape; `Empty` is rejected (use `clear_cell`)
    pub fn add_collision(&mut self, cell: Cell, shape: CollisionShape) -> bool {
        if !shape.is_solid() {
            return false;
        }
        self.set_collision(cell, shape)
    }

    fn set_collision(&mut self, cell: Cell, shape: CollisionShape) -> bool {
        let Some(index) = self.cell_index(cell) else {
            return false;
        };
        let Some(layer) = self.layer_mut(COLLISION_LAYER) else {
            return false;
        };
        match &mut layer.data {
            LayerData::Collision(codes) => match codes.get_mut(index) {
                Some(slot) => {
                    *slot = shape;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Append a placement of `entity` at pixel (x, y) and return its id
    pub fn add_entity(&mut self, entity: &EntityDef, tile_size: u32, x: u32, y: u32) -> Uuid {
        let (width, height) = entity.footprint(tile_size);
        let placement = EntityPlacement::new(entity.id.clone(), x, y, width, height);
        let id = placement.id;
        self.ensure_mandatory_layers();
        if let Some(Layer {
            data: LayerData::Entities(entities),
            ..
        }) = self.layer_mut(ENTITIES_LAYER)
        {
            entities.push(placement);
        }
        id
    }

    /// Remove the first placement whose footprint contains the pixel point
    pub fn delete_entity_by_position(
        &mut self,
        layer: &str,
        x: f32,
        y: f32,
    ) -> Option<EntityPlacement> {
        let Some(Layer {
            data: LayerData::Entities(entities),
            ..
        }) = self.layer_mut(layer)
        else {
            return None;
        };
        let position = entities.iter().position(|e| e.contains(x, y))?;
        Some(entities.remove(position))
    }

    /// Remove a placement by id
    pub fn remove_entity(&mut self, id: Uuid) -> Option<EntityPlacement> {
        let Some(Layer {
            data: LayerData::Entities(entities),
            ..
        }) = self.layer_mut(ENTITIES_LAYER)
        else {
            return None;
        };
        let position = entities.iter().position(|e| e.id == id)?;
        Some(entities.remove(position))
    }

    /// Clear one cell of a grid layer: tiles become empty, collision becomes
    /// code 0. Entities layers are not cell-based and are left untouched.
    pub fn clear_cell(&mut self, layer: &str, cell: Cell) -> bool {
        if layer == COLLISION_LAYER {
            self.set_collision(cell, CollisionShape::Empty)
        } else {
            self.add_tile(layer, cell, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(index: u32) -> Option<TileRef> {
        Some(TileRef::new("terrain", index))
    }

    fn abcd() -> Pattern {
        // [[A, B], [C, D]]
        Pattern::new("abcd", 2, 2, vec![tile(0), tile(1), tile(2), tile(3)]).unwrap()
    }

    fn bush() -> EntityDef {
        EntityDef {
            id: "bush".to_string(),
            tileset: "terrain".to_string(),
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_mandatory_layers_appended() {
        let map = TileMap::new("a", 4, 4, &["bg", "fg"]);
        let names: Vec<_> = map.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["bg", "fg", "collision", "entities"]);

        let map = TileMap::new("b", 4, 4, &["entities", "bg"]);
        let names: Vec<_> = map.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["entities", "bg", "collision"]);
    }

    #[test]
    fn test_add_tile_bounds() {
        let mut map = TileMap::new("a", 4, 3, &["bg"]);

        assert!(map.add_tile("bg", Cell::new(3, 2), tile(7)));
        assert_eq!(map.tile("bg", Cell::new(3, 2)), tile(7).as_ref());

        assert!(!map.add_tile("bg", Cell::new(4, 0), tile(1)));
        assert!(!map.add_tile("bg", Cell::new(-1, 0), tile(1)));
        assert!(!map.add_tile("bg", Cell::new(0, 3), tile(1)));
        assert!(!map.add_tile("missing", Cell::new(0, 0), tile(1)));
        assert!(!map.add_tile("collision", Cell::new(0, 0), tile(1)));
    }

    #[test]
    fn test_add_pattern_clips_at_edges() {
        let mut map = TileMap::new("a", 3, 3, &["bg"]);

        let written = map.add_pattern("bg", Cell::new(2, 2), &abcd());
        assert_eq!(written, 1);
        assert_eq!(map.tile("bg", Cell::new(2, 2)), tile(0).as_ref());

        let written = map.add_pattern("bg", Cell::new(-1, -1), &abcd());
        assert_eq!(written, 1);
        assert_eq!(map.tile("bg", Cell::new(0, 0)), tile(3).as_ref());
    }

    #[test]
    fn test_add_pattern_overwrites() {
        let mut map = TileMap::new("a", 4, 4, &["bg"]);
        map.add_pattern("bg", Cell::new(0, 0), &abcd());
        map.add_pattern("bg", Cell::new(1, 1), &abcd());

        assert_eq!(map.tile("bg", Cell::new(0, 0)), tile(0).as_ref());
        assert_eq!(map.tile("bg", Cell::new(1, 1)), tile(0).as_ref());
        assert_eq!(map.tile("bg", Cell::new(2, 2)), tile(3).as_ref());
    }

    #[test]
    fn test_repeat_pattern_wraps() {
        let mut map = TileMap::new("a", 8, 8, &["bg"]);

        let written = map.repeat_pattern_in_region("bg", Cell::new(0, 0), Cell::new(3, 1), &abcd());
        assert_eq!(written, 8);

        assert_eq!(map.tile("bg", Cell::new(2, 0)), tile(0).as_ref());
        assert_eq!(map.tile("bg", Cell::new(3, 0)), tile(1).as_ref());
        assert_eq!(map.tile("bg", Cell::new(2, 1)), tile(2).as_ref());
        assert_eq!(map.tile("bg", Cell::new(3, 1)), tile(3).as_ref());
        assert_eq!(map.tile("bg", Cell::new(4, 0)), None);
        assert_eq!(map.tile("bg", Cell::new(0, 2)), None);
    }

    #[test]
    fn test_repeat_pattern_corner_order_independent() {
        let mut forward = TileMap::new("a", 8, 8, &["bg"]);
        let mut backward = forward.clone();

        forward.repeat_pattern_in_region("bg", Cell::new(1, 1), Cell::new(5, 4), &abcd());
        backward.repeat_pattern_in_region("bg", Cell::new(5, 4), Cell::new(1, 1), &abcd());
        assert_eq!(forward, backward);

        let mut mixed = TileMap::new("a", 8, 8, &["bg"]);
        mixed.repeat_pattern_in_region("bg", Cell::new(5, 1), Cell::new(1, 4), &abcd());
        assert_eq!(forward, mixed);
    }

    #[test]
    fn test_repeat_pattern_clips_outside_map() {
        let mut map = TileMap::new("a", 2, 2, &["bg"]);
        let written = map.repeat_pattern_in_region("bg", Cell::new(-1, -1), Cell::new(2, 2), &abcd());
        assert_eq!(written, 4);
        // (0,0) is rectangle-relative (1,1)
        assert_eq!(map.tile("bg", Cell::new(0, 0)), tile(3).as_ref());
    }

    #[test]
    fn test_collision() {
        let mut map = TileMap::new("a", 4, 4, &["bg"]);

        assert!(map.add_collision(Cell::new(1, 1), CollisionShape::TopRight));
        assert_eq!(map.collision(Cell::new(1, 1)), Some(CollisionShape::TopRight));
        assert!(!map.add_collision(Cell::new(1, 1), CollisionShape::Empty));
        assert!(!map.add_collision(Cell::new(9, 9), CollisionShape::Full));

        assert!(map.clear_cell(COLLISION_LAYER, Cell::new(1, 1)));
        assert_eq!(map.collision(Cell::new(1, 1)), Some(CollisionShape::Empty));
    }

    #[test]
    fn test_delete_entity_by_position() {
        let mut map = TileMap::new("a", 32, 32, &["bg"]);
        let id = map.add_entity(&bush(), 8, 10, 10);
        assert_eq!(map.entities().len(), 1);

        assert!(map
            .delete_entity_by_position(ENTITIES_LAYER, 100.0, 100.0)
            .is_none());
        assert_eq!(map.entities().len(), 1);

        let removed = map.delete_entity_by_position(ENTITIES_LAYER, 12.0, 12.0).unwrap();
        assert_eq!(removed.id, id);
        assert!(map.entities().is_empty());
    }

    #[test]
    fn test_delete_removes_first_match_only() {
        let mut map = TileMap::new("a", 32, 32, &["bg"]);
        let first = map.add_entity(&bush(), 8, 0, 0);
        let second = map.add_entity(&bush(), 8, 4, 4);

        let removed = map.delete_entity_by_position(ENTITIES_LAYER, 5.0, 5.0).unwrap();
        assert_eq!(removed.id, first);
        assert_eq!(map.entities()[0].id, second);
    }

    #[test]
    fn test_placement_ids_survive_deletion() {
        let mut map = TileMap::new("a", 32, 32, &["bg"]);
        let first = map.add_entity(&bush(), 8, 0, 0);
        let second = map.add_entity(&bush(), 8, 16, 0);

        map.remove_entity(first);
        assert_eq!(map.entities()[0].id, second);
        assert!(map.remove_entity(first).is_none());
    }

    #[test]
    fn test_cell_from_pixel() {
        assert_eq!(Cell::from_pixel(0.0, 7.9, 8), Cell::new(0, 0));
        assert_eq!(Cell::from_pixel(8.0, 17.0, 8), Cell::new(1, 2));
        assert_eq!(Cell::from_pixel(-0.5, 3.0, 8), Cell::new(-1, 0));
        assert_eq!(Cell::new(2, 3).origin(8), (16, 24));
    }
}
