//! Startup configuration
//!
//! The configuration declares the structure of the world (maps and layers)
//! and everything that can be placed (tilesets, patterns, entities,
//! animations). It is read once at startup from a TOML file:
//!
//! ```toml
//! version = "0.1"
//! tile_size = 8
//! asset_path = "images/"
//!
//! maps = [{ name = "overworld", width = 32, height = 22 }]
//! layers = [{ name = "bg" }, { name = "fg" }]
//! tilesets = [{ name = "terrain", src = "terrain.png" }]
//! patterns = [{ tileset = "terrain", data = [0, 0, 2, 2], name = "grass" }]
//! entities = [{ id = "bush", tileset = "terrain", data = [4, 0, 1, 1] }]
//! animations = [{ tileset = "terrain", tiles = [8, 9, 10] }]
//! ```
//!
//! Configuration problems are never fatal. Each top-level field is read on
//! its own; a malformed field falls back to its default and is reported as a
//! [`ConfigError`].

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    grid_size, Animation, Catalog, EntityDef, Pattern, Tileset, DEFAULT_LAYER,
    DEFAULT_MAP_HEIGHT, DEFAULT_MAP_NAME, DEFAULT_MAP_WIDTH, DEFAULT_TILE_SIZE, FORMAT_VERSION,
    MAX_MAP_CELLS,
};

/// A configuration problem; the affected value was replaced by its default
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config is not valid TOML: {0}")]
    Syntax(String),
    #[error("field '{field}' is malformed, using default: {message}")]
    InvalidField { field: String, message: String },
    #[error("unknown field '{0}' ignored")]
    UnknownField(String),
    #[error("tileset '{name}' has no usable size: {reason}")]
    UnresolvedTileset { name: String, reason: String },
    #[error("{kind} '{name}' skipped: {reason}")]
    InvalidEntry {
        kind: &'static str,
        name: String,
        reason: String,
    },
}

fn default_map_width() -> u32 {
    DEFAULT_MAP_WIDTH
}

fn default_map_height() -> u32 {
    DEFAULT_MAP_HEIGHT
}

/// A map declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDecl {
    pub name: String,
    #[serde(default = "default_map_width")]
    pub width: u32,
    #[serde(default = "default_map_height")]
    pub height: u32,
}

/// A layer declaration; every map receives every declared layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDecl {
    pub name: String,
}

/// A tileset declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetDecl {
    pub name: String,
    /// Image path relative to `asset_path`
    pub src: String,
    /// Pixel width; read from the image header when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Pixel height; read from the image header when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl TilesetDecl {
    /// Pixel size of the atlas, probing the image file if not declared
    pub fn pixel_size(&self, asset_path: &Path) -> Result<(u32, u32), ConfigError> {
        if let (Some(width), Some(height)) = (self.width, self.height) {
            return Ok((width, height));
        }
        image::image_dimensions(asset_path.join(&self.src)).map_err(|e| {
            ConfigError::UnresolvedTileset {
                name: self.name.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// A pattern declaration: `data = [x, y]` or `[x, y, width, height]`, a
/// region of the atlas in tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub tileset: String,
    pub data: Vec<u32>,
}

/// An entity declaration: `data` selects the sprite region like a pattern;
/// its size is the entity's footprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDecl {
    pub id: String,
    pub tileset: String,
    pub data: Vec<u32>,
}

/// An animation declaration: frames as local tile indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDecl {
    pub tileset: String,
    pub tiles: Vec<u32>,
}

/// Editor startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub version: String,
    /// Tile size in pixels (square tiles)
    pub tile_size: u32,
    /// Directory tileset `src` paths are relative to
    pub asset_path: PathBuf,
    pub maps: Vec<MapDecl>,
    pub layers: Vec<LayerDecl>,
    pub tilesets: Vec<TilesetDecl>,
    pub patterns: Vec<PatternDecl>,
    pub entities: Vec<EntityDecl>,
    pub animations: Vec<AnimationDecl>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            tile_size: DEFAULT_TILE_SIZE,
            asset_path: PathBuf::new(),
            maps: default_maps(),
            layers: default_layers(),
            tilesets: Vec::new(),
            patterns: Vec::new(),
            entities: Vec::new(),
            animations: Vec::new(),
        }
    }
}

fn default_maps() -> Vec<MapDecl> {
    vec![MapDecl {
        name: DEFAULT_MAP_NAME.to_string(),
        width: DEFAULT_MAP_WIDTH,
        height: DEFAULT_MAP_HEIGHT,
    }]
}

fn default_layers() -> Vec<LayerDecl> {
    vec![LayerDecl {
        name: DEFAULT_LAYER.to_string(),
    }]
}

fn report(issues: &mut Vec<ConfigError>, issue: ConfigError) {
    warn!("{}", issue);
    issues.push(issue);
}

/// Move one top-level field out of the table into `slot`, keeping the
/// default when it does not deserialize
fn take_field<T: DeserializeOwned>(
    table: &mut toml::Table,
    key: &str,
    slot: &mut T,
    issues: &mut Vec<ConfigError>,
) {
    let Some(value) = table.remove(key) else {
        return;
    };
    match value.try_into::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(e) => report(
            issues,
            ConfigError::InvalidField {
                field: key.to_string(),
                message: e.to_string(),
            },
        ),
    }
}

/// `[x, y]` or `[x, y, width, height]`
fn region(data: &[u32]) -> Option<(u32, u32, u32, u32)> {
    match *data {
        [x, y] => Some((x, y, 1, 1)),
        [x, y, width, height] if width > 0 && height > 0 => Some((x, y, width, height)),
        _ => None,
    }
}

impl EditorConfig {
    /// Parse a TOML configuration; problems are returned alongside the
    /// (defaulted) result
    pub fn from_toml_str(text: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut issues = Vec::new();

        let mut table = match toml::from_str::<toml::Table>(text) {
            Ok(table) => table,
            Err(e) => {
                report(&mut issues, ConfigError::Syntax(e.to_string()));
                return (config, issues);
            }
        };

        take_field(&mut table, "version", &mut config.version, &mut issues);
        take_field(&mut table, "tile_size", &mut config.tile_size, &mut issues);
        take_field(&mut table, "asset_path", &mut config.asset_path, &mut issues);
        take_field(&mut table, "maps", &mut config.maps, &mut issues);
        take_field(&mut table, "layers", &mut config.layers, &mut issues);
        take_field(&mut table, "tilesets", &mut config.tilesets, &mut issues);
        take_field(&mut table, "patterns", &mut config.patterns, &mut issues);
        take_field(&mut table, "entities", &mut config.entities, &mut issues);
        take_field(&mut table, "animations", &mut config.animations, &mut issues);

        for key in table.keys() {
            report(&mut issues, ConfigError::UnknownField(key.clone()));
        }

        if config.tile_size == 0 {
            report(
                &mut issues,
                ConfigError::InvalidField {
                    field: "tile_size".to_string(),
                    message: "must be greater than zero".to_string(),
                },
            );
            config.tile_size = DEFAULT_TILE_SIZE;
        }
        config.maps.retain(|decl| {
            let fits = grid_size(decl.width, decl.height).is_some();
            if !fits {
                report(
                    &mut issues,
                    ConfigError::InvalidEntry {
                        kind: "map",
                        name: decl.name.clone(),
                        reason: format!(
                            "{}x{} exceeds {} cells",
                            decl.width, decl.height, MAX_MAP_CELLS
                        ),
                    },
                );
            }
            fits
        });
        if config.maps.is_empty() {
            config.maps = default_maps();
        }
        if config.layers.is_empty() {
            config.layers = default_layers();
        }

        (config, issues)
    }

    /// Load a configuration file; a missing or unreadable file yields the
    /// default configuration
    pub fn load(path: &Path) -> (Self, Vec<ConfigError>) {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let (mut config, issues) = Self::from_toml_str(&text);
                if config.asset_path.is_relative() {
                    if let Some(dir) = path.parent() {
                        config.asset_path = dir.join(&config.asset_path);
                    }
                }
                (config, issues)
            }
            Err(source) => {
                let mut issues = Vec::new();
                report(
                    &mut issues,
                    ConfigError::Io {
                        path: path.to_path_buf(),
                        source,
                    },
                );
                (Self::default(), issues)
            }
        }
    }

    /// Names of the configured layers, in order
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Register everything the configuration declares
    ///
    /// Tilesets whose size cannot be determined are still registered (with
    /// zero tiles) so the registration order, and with it the GID banding,
    /// stays as declared.
    pub fn build_catalog(&self) -> (Catalog, Vec<ConfigError>) {
        let mut catalog = Catalog::new();
        let mut issues = Vec::new();

        for decl in &self.tilesets {
            let (width, height) = match decl.pixel_size(&self.asset_path) {
                Ok(size) => size,
                Err(e) => {
                    report(&mut issues, e);
                    (0, 0)
                }
            };
            catalog.register_tileset(Tileset::new(
                decl.name.clone(),
                decl.src.clone(),
                width,
                height,
                self.tile_size,
            ));
        }

        for (index, decl) in self.patterns.iter().enumerate() {
            let name = decl
                .name
                .clone()
                .unwrap_or_else(|| format!("{}:{}", decl.tileset, index));
            let pattern = catalog.tileset(&decl.tileset).and_then(|tileset| {
                let (x, y, width, height) = region(&decl.data)?;
                Pattern::from_region(name.clone(), tileset, x, y, width, height)
            });
            match pattern {
                Some(pattern) => {
                    catalog.add_pattern(pattern);
                }
                None => report(
                    &mut issues,
                    ConfigError::InvalidEntry {
                        kind: "pattern",
                        name,
                        reason: format!(
                            "region {:?} is not inside tileset '{}'",
                            decl.data, decl.tileset
                        ),
                    },
                ),
            }
        }

        for decl in &self.entities {
            let entity = catalog.tileset(&decl.tileset).and_then(|tileset| {
                let (x, y, width, height) = region(&decl.data)?;
                tileset.index_at(x.checked_add(width - 1)?, y.checked_add(height - 1)?)?;
                Some(EntityDef {
                    id: decl.id.clone(),
                    tileset: decl.tileset.clone(),
                    x,
                    y,
                    width,
                    height,
                })
            });
            match entity {
                Some(entity) => {
                    catalog.add_entity(entity);
                }
                None => report(
                    &mut issues,
                    ConfigError::InvalidEntry {
                        kind: "entity",
                        name: decl.id.clone(),
                        reason: format!(
                            "region {:?} is not inside tileset '{}'",
                            decl.data, decl.tileset
                        ),
                    },
                ),
            }
        }

        for decl in &self.animations {
            let valid = catalog
                .tileset(&decl.tileset)
                .is_some_and(|t| decl.tiles.iter().all(|&i| t.contains(i)));
            if valid {
                catalog.add_animation(Animation {
                    tileset: decl.tileset.clone(),
                    tiles: decl.tiles.clone(),
                });
            } else {
                report(
                    &mut issues,
                    ConfigError::InvalidEntry {
                        kind: "animation",
                        name: decl.tileset.clone(),
                        reason: format!("frames {:?} are not all in the tileset", decl.tiles),
                    },
                );
            }
        }

        (catalog, issues)
    }
}
