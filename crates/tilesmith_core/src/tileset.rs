//! Tileset atlases and tile references

use serde::{Deserialize, Serialize};

/// Reference to one tile of a registered tileset
///
/// `index` is local to the tileset (row-major, starting at 0).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRef {
    pub tileset: String,
    pub index: u32,
}

impl TileRef {
    pub fn new(tileset: impl Into<String>, index: u32) -> Self {
        Self {
            tileset: tileset.into(),
            index,
        }
    }
}

/// A registered atlas sliced into equally sized square tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    /// Unique registration name
    pub name: String,
    /// Path to the image file (relative to the asset path)
    pub src: String,
    /// Atlas width in pixels
    pub width: u32,
    /// Atlas height in pixels
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
}

impl Tileset {
    /// Create a tileset from its pixel size; partial tiles at the right and
    /// bottom edges are not addressable.
    pub fn new(
        name: impl Into<String>,
        src: impl Into<String>,
        width: u32,
        height: u32,
        tile_size: u32,
    ) -> Self {
        let (columns, rows) = match width.checked_div(tile_size) {
            // the tile count must fit a u32
            Some(columns) if columns.checked_mul(height / tile_size).is_some() => {
                (columns, height / tile_size)
            }
            _ => (0, 0),
        };
        Self {
            name: name.into(),
            src: src.into(),
            width,
            height,
            columns,
            rows,
        }
    }

    /// Total number of tiles in this atlas
    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Check if a local index addresses a tile of this atlas
    pub fn contains(&self, index: u32) -> bool {
        index < self.tile_count()
    }

    /// Local index of the tile at (column, row)
    pub fn index_at(&self, column: u32, row: u32) -> Option<u32> {
        if column < self.columns && row < self.rows {
            Some(row * self.columns + column)
        } else {
            None
        }
    }

    /// Convert a local index to (column, row)
    pub fn grid_position(&self, index: u32) -> Option<(u32, u32)> {
        if !self.contains(index) {
            return None;
        }
        Some((index % self.columns, index / self.columns))
    }

    /// Image file name without its directory
    pub fn file_name(&self) -> &str {
        self.src
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.src.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_count_from_pixel_size() {
        let tileset = Tileset::new("terrain", "tiles/terrain.png", 128, 64, 8);

        assert_eq!(tileset.columns, 16);
        assert_eq!(tileset.rows, 8);
        assert_eq!(tileset.tile_count(), 128);
        assert!(tileset.contains(127));
        assert!(!tileset.contains(128));
    }

    #[test]
    fn test_partial_tiles_are_ignored() {
        let tileset = Tileset::new("odd", "odd.png", 30, 17, 8);
        assert_eq!((tileset.columns, tileset.rows), (3, 2));
    }

    #[test]
    fn test_oversized_atlas_has_no_tiles() {
        let tileset = Tileset::new("vast", "vast.png", u32::MAX, u32::MAX, 1);
        assert_eq!(tileset.tile_count(), 0);
        assert_eq!(tileset.index_at(0, 0), None);
        assert_eq!(Tileset::new("z", "z.png", 8, 8, 0).tile_count(), 0);
    }

    #[test]
    fn test_grid_position() {
        let tileset = Tileset::new("terrain", "terrain.png", 32, 32, 8);

        assert_eq!(tileset.index_at(1, 2), Some(9));
        assert_eq!(tileset.grid_position(9), Some((1, 2)));
        assert_eq!(tileset.index_at(4, 0), None);
        assert_eq!(tileset.grid_position(16), None);
    }

    #[test]
    fn test_file_name() {
        let tileset = Tileset::new("a", "images/atlas/a.png", 8, 8, 8);
        assert_eq!(tileset.file_name(), "a.png");
        assert_eq!(Tileset::new("b", "b.png", 8, 8, 8).file_name(), "b.png");
    }
}
