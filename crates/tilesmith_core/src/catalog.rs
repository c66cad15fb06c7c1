//! Registry of tilesets, patterns, entity definitions and animations

use crate::{GidTable, TileRef, Tileset};
use tracing::warn;

/// A named, read-only block of tile references
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub name: String,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Row-major cells, `width * height` long
    pub tiles: Vec<Option<TileRef>>,
}

impl Pattern {
    /// Create a pattern from row-major cells; returns `None` if the cell
    /// count does not match the dimensions or the pattern is empty.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        tiles: Vec<Option<TileRef>>,
    ) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize);
        if width == 0 || height == 0 || expected != Some(tiles.len()) {
            return None;
        }
        Some(Self {
            name: name.into(),
            width,
            height,
            tiles,
        })
    }

    /// Cut a rectangular region (in tiles) out of an atlas
    pub fn from_region(
        name: impl Into<String>,
        tileset: &Tileset,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let last_column = x.checked_add(width.checked_sub(1)?)?;
        let last_row = y.checked_add(height.checked_sub(1)?)?;
        tileset.index_at(last_column, last_row)?;

        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for row in y..=last_row {
            for column in x..=last_column {
                let index = tileset.index_at(column, row)?;
                tiles.push(Some(TileRef::new(tileset.name.clone(), index)));
            }
        }
        Self::new(name, width, height, tiles)
    }

    /// Cell at (x, y) within the pattern
    pub fn tile(&self, x: u32, y: u32) -> Option<&TileRef> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles[y as usize * self.width as usize + x as usize].as_ref()
    }
}

/// Template for placing entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    pub id: String,
    /// Tileset the entity's sprite is cut from
    pub tileset: String,
    /// Sprite region origin in the atlas, in tiles
    pub x: u32,
    pub y: u32,
    /// Footprint in tiles
    pub width: u32,
    pub height: u32,
}

impl EntityDef {
    /// Footprint in pixels
    pub fn footprint(&self, tile_size: u32) -> (u32, u32) {
        (self.width * tile_size, self.height * tile_size)
    }
}

/// Frame sequence of one tileset, as local tile indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub tileset: String,
    pub tiles: Vec<u32>,
}

/// Everything the editor can place, registered once at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Registration order determines GID banding
    tilesets: Vec<Tileset>,
    patterns: Vec<Pattern>,
    entities: Vec<EntityDef>,
    animations: Vec<Animation>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tileset; names must be unique. Returns `false` if the name
    /// is already taken.
    pub fn register_tileset(&mut self, tileset: Tileset) -> bool {
        if self.tileset(&tileset.name).is_some() {
            warn!("Tileset '{}' is already registered, ignoring", tileset.name);
            return false;
        }
        self.tilesets.push(tileset);
        true
    }

    /// Register a pattern. Every cell must reference a valid tile.
    pub fn add_pattern(&mut self, pattern: Pattern) -> bool {
        if let Some(bad) = pattern.tiles.iter().flatten().find(|t| !self.is_valid_tile(t)) {
            warn!(
                "Pattern '{}' references invalid tile {}#{}, ignoring",
                pattern.name, bad.tileset, bad.index
            );
            return false;
        }
        if self.pattern(&pattern.name).is_some() {
            warn!("Pattern '{}' is already registered, ignoring", pattern.name);
            return false;
        }
        self.patterns.push(pattern);
        true
    }

    /// Register an entity definition
    pub fn add_entity(&mut self, entity: EntityDef) -> bool {
        if self.entity(&entity.id).is_some() {
            warn!("Entity '{}' is already registered, ignoring", entity.id);
            return false;
        }
        self.entities.push(entity);
        true
    }

    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn entities(&self) -> &[EntityDef] {
        &self.entities
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn tileset(&self, name: &str) -> Option<&Tileset> {
        self.tilesets.iter().find(|t| t.name == name)
    }

    pub fn pattern(&self, name: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    pub fn entity(&self, id: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Check the tile-cell invariant: the local index lies within the
    /// tileset's tile count
    pub fn is_valid_tile(&self, tile: &TileRef) -> bool {
        self.tileset(&tile.tileset)
            .is_some_and(|t| t.contains(tile.index))
    }

    /// Compute the GID table for the current registration order
    pub fn gid_table(&self) -> GidTable {
        GidTable::compute(&self.tilesets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain() -> Tileset {
        Tileset::new("terrain", "terrain.png", 32, 32, 8)
    }

    #[test]
    fn test_pattern_from_region() {
        let pattern = Pattern::from_region("grass", &terrain(), 1, 1, 2, 2).unwrap();

        assert_eq!((pattern.width, pattern.height), (2, 2));
        assert_eq!(pattern.tile(0, 0), Some(&TileRef::new("terrain", 5)));
        assert_eq!(pattern.tile(1, 0), Some(&TileRef::new("terrain", 6)));
        assert_eq!(pattern.tile(0, 1), Some(&TileRef::new("terrain", 9)));
        assert_eq!(pattern.tile(1, 1), Some(&TileRef::new("terrain", 10)));
        assert_eq!(pattern.tile(2, 0), None);
    }

    #[test]
    fn test_pattern_region_outside_atlas() {
        assert!(Pattern::from_region("bad", &terrain(), 3, 3, 2, 1).is_none());
        assert!(Pattern::from_region("empty", &terrain(), 0, 0, 0, 1).is_none());
    }

    #[test]
    fn test_pattern_region_near_u32_max() {
        let terrain = terrain();
        assert!(Pattern::from_region("wide", &terrain, 0, 0, u32::MAX, u32::MAX).is_none());
        assert!(Pattern::from_region("far", &terrain, u32::MAX, 1, 2, 1).is_none());
        assert!(Pattern::from_region("low", &terrain, 1, u32::MAX - 1, 1, 2).is_none());
        assert!(Pattern::new("huge", u32::MAX, u32::MAX, Vec::new()).is_none());
    }

    #[test]
    fn test_duplicate_tileset_rejected() {
        let mut catalog = Catalog::new();
        assert!(catalog.register_tileset(terrain()));
        assert!(!catalog.register_tileset(terrain()));
        assert_eq!(catalog.tilesets().len(), 1);
    }

    #[test]
    fn test_tile_validity() {
        let mut catalog = Catalog::new();
        catalog.register_tileset(terrain());

        assert!(catalog.is_valid_tile(&TileRef::new("terrain", 15)));
        assert!(!catalog.is_valid_tile(&TileRef::new("terrain", 16)));
        assert!(!catalog.is_valid_tile(&TileRef::new("missing", 0)));
    }

    #[test]
    fn test_pattern_with_unknown_tileset_rejected() {
        let mut catalog = Catalog::new();
        let pattern =
            Pattern::new("ghost", 1, 1, vec![Some(TileRef::new("missing", 0))]).unwrap();
        assert!(!catalog.add_pattern(pattern));
        assert!(catalog.patterns().is_empty());
    }

    #[test]
    fn test_entity_footprint() {
        let bush = EntityDef {
            id: "bush".to_string(),
            tileset: "terrain".to_string(),
            x: 0,
            y: 0,
            width: 2,
            height: 1,
        };
        assert_eq!(bush.footprint(8), (16, 8));
    }
}
