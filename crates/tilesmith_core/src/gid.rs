//! Global tile identifiers
//!
//! Every registered tileset is given a GID offset so a tile from any atlas can
//! be stored as one flat integer:
//!
//! ```text
//! offset[0] = 0
//! offset[i] = offset[i - 1] + tile_count[i - 1]
//! gid       = offset[tileset] + local_index
//! ```
//!
//! The table depends on registration order. Reordering tilesets silently
//! invalidates any runtime data exported under the previous order.

use crate::{TileRef, Tileset};

#[derive(Debug, Clone, PartialEq, Eq)]
struct GidBand {
    tileset: String,
    offset: u32,
    count: u32,
}

/// Mapping from tileset name to GID offset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GidTable {
    bands: Vec<GidBand>,
}

impl GidTable {
    /// Compute offsets for tilesets in registration order
    pub fn compute<'a>(tilesets: impl IntoIterator<Item = &'a Tileset>) -> Self {
        let mut next = 0u32;
        let bands = tilesets
            .into_iter()
            .map(|tileset| {
                let band = GidBand {
                    tileset: tileset.name.clone(),
                    offset: next,
                    count: tileset.tile_count(),
                };
                next = next.saturating_add(band.count);
                band
            })
            .collect();
        Self { bands }
    }

    /// GID offset of a tileset
    pub fn offset(&self, tileset: &str) -> Option<u32> {
        self.bands
            .iter()
            .find(|b| b.tileset == tileset)
            .map(|b| b.offset)
    }

    /// Flat index of a tile; `None` if the tileset is not registered or
    /// the index lies outside its band
    pub fn global_index(&self, tile: &TileRef) -> Option<u32> {
        self.bands
            .iter()
            .find(|b| b.tileset == tile.tileset)
            .filter(|b| tile.index < b.count)
            .and_then(|b| b.offset.checked_add(tile.index))
    }

    /// Reverse lookup: which tileset band a GID falls into
    pub fn resolve(&self, gid: u32) -> Option<TileRef> {
        self.bands
            .iter()
            .find(|b| gid >= b.offset && gid - b.offset < b.count)
            .map(|b| TileRef::new(b.tileset.clone(), gid - b.offset))
    }

    /// Number of GIDs in use
    pub fn total(&self) -> u32 {
        self.bands
            .last()
            .map(|b| b.offset.saturating_add(b.count))
            .unwrap_or(0)
    }

    /// Iterate `(tileset, offset)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.bands.iter().map(|b| (b.tileset.as_str(), b.offset))
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-row atlases with 4, 6 and 10 tiles
    fn tilesets() -> Vec<Tileset> {
        vec![
            Tileset::new("T1", "t1.png", 32, 8, 8),
            Tileset::new("T2", "t2.png", 48, 8, 8),
            Tileset::new("T3", "t3.png", 80, 8, 8),
        ]
    }

    #[test]
    fn test_offsets_follow_registration_order() {
        let table = GidTable::compute(&tilesets());

        assert_eq!(table.offset("T1"), Some(0));
        assert_eq!(table.offset("T2"), Some(4));
        assert_eq!(table.offset("T3"), Some(10));
        assert_eq!(table.total(), 20);
        assert_eq!(table.global_index(&TileRef::new("T2", 3)), Some(7));
    }

    #[test]
    fn test_unknown_tileset() {
        let table = GidTable::compute(&tilesets());
        assert_eq!(table.offset("T4"), None);
        assert_eq!(table.global_index(&TileRef::new("T4", 0)), None);
    }

    #[test]
    fn test_index_outside_band() {
        let table = GidTable::compute(&tilesets());
        assert_eq!(table.global_index(&TileRef::new("T2", 5)), Some(9));
        assert_eq!(table.global_index(&TileRef::new("T2", 6)), None);
        assert_eq!(table.global_index(&TileRef::new("T2", u32::MAX)), None);
    }

    #[test]
    fn test_recompute_is_idempotent_but_order_sensitive() {
        let mut sets = tilesets();
        assert_eq!(GidTable::compute(&sets), GidTable::compute(&sets));

        sets.reverse();
        let reversed = GidTable::compute(&sets);
        assert_eq!(reversed.offset("T3"), Some(0));
        assert_eq!(reversed.offset("T1"), Some(16));
    }

    #[test]
    fn test_gids_are_unique() {
        let sets = tilesets();
        let table = GidTable::compute(&sets);
        let mut seen = std::collections::HashSet::new();
        for tileset in &sets {
            for index in 0..tileset.tile_count() {
                let gid = table
                    .global_index(&TileRef::new(tileset.name.clone(), index))
                    .unwrap();
                assert!(seen.insert(gid), "duplicate gid {gid}");
            }
        }
        assert_eq!(seen.len() as u32, table.total());
    }

    #[test]
    fn test_resolve() {
        let table = GidTable::compute(&tilesets());

        assert_eq!(table.resolve(0), Some(TileRef::new("T1", 0)));
        assert_eq!(table.resolve(7), Some(TileRef::new("T2", 3)));
        assert_eq!(table.resolve(19), Some(TileRef::new("T3", 9)));
        assert_eq!(table.resolve(20), None);
    }
}
