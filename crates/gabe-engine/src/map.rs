//! Level map parsing.
//!
//! A map file holds several level sections. Each section starts with a
//! header line containing `level N:` (case-insensitive), may carry a
//! `biome: <name>` line, and otherwise consists of literal tile rows:
//!
//! ```text
//! level 1:
//! biome: snow
//!       C C
//! 1   -----  E
//! ------  -----
//! ```
//!
//! [`load`] turns one section into a [`LevelMap`]: the [`TileGrid`], one
//! [`SpawnDescriptor`] per non-empty cell, the resolved [`PlayerSpawn`], and
//! the [`Biome`]. Parsing is pure, so loading the same text twice yields
//! identical maps.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::TILE_SIZE;
use crate::geometry::Vec2;

/// Ground tiles left of this pixel column are candidates for the fallback
/// player spawn.
const FALLBACK_SPAWN_MAX_X: f64 = 200.0;

/// Cell origin used when the map has neither a start marker nor usable ground.
const DEFAULT_SPAWN_CELL: Vec2 = Vec2 { x: 100.0, y: 100.0 };

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while locating or reading a level section.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The map file could not be read.
    #[error("map file {} could not be read: {source}", path.display())]
    MapFileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `level N:` header exists for the requested level.
    #[error("level {level} not found in map")]
    LevelNotFound { level: u32 },
}

// ---------------------------------------------------------------------------
// Tile table
// ---------------------------------------------------------------------------

/// What a map cell spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TileKind {
    Ground,
    Box,
    Coin,
    Spikes,
    Water,
    Start,
    Exit,
    PatrolEnemy,
    FollowerEnemy,
    LuckyBlock,
    Ladder,
}

impl TileKind {
    /// Look up the fixed character table. Unknown characters spawn nothing.
    pub fn from_char(c: char) -> Option<Self> {
        let kind = match c {
            '-' => Self::Ground,
            'B' => Self::Box,
            'C' => Self::Coin,
            'S' => Self::Spikes,
            'W' => Self::Water,
            '1' => Self::Start,
            'E' => Self::Exit,
            'X' => Self::PatrolEnemy,
            'Y' => Self::FollowerEnemy,
            '?' => Self::LuckyBlock,
            '#' => Self::Ladder,
            _ => return None,
        };
        Some(kind)
    }
}

/// One entity to create when the level is instantiated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnDescriptor {
    pub kind: TileKind,
    pub col: usize,
    pub row: usize,
}

impl SpawnDescriptor {
    /// Top-left pixel of the cell.
    pub fn origin(&self) -> Vec2 {
        cell_origin(self.col, self.row)
    }
}

fn cell_origin(col: usize, row: usize) -> Vec2 {
    Vec2::new(col as f64 * TILE_SIZE, row as f64 * TILE_SIZE)
}

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// The literal rows of one level section.
///
/// Rows keep their original length; cells past the end of a short row read
/// as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl TileGrid {
    fn from_rows(rows: Vec<Vec<char>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Width in tiles (longest row).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles (row count).
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Character at a cell; `None` outside a row's own length.
    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        self.rows.get(row)?.get(col).copied()
    }

    /// Row `row` as a string.
    pub fn row(&self, row: usize) -> Option<String> {
        self.rows.get(row).map(|r| r.iter().collect())
    }

    pub fn pixel_width(&self) -> f64 {
        self.width as f64 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> f64 {
        self.rows.len() as f64 * TILE_SIZE
    }
}

// ---------------------------------------------------------------------------
// Biome
// ---------------------------------------------------------------------------

/// Cosmetic theme of a level. Never affects collision geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Biome {
    #[default]
    Grass,
    Sand,
    Snow,
    Stone,
    Dirt,
}

/// Art selected by a biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiomeAssets {
    pub ground_texture: &'static str,
    pub background: &'static str,
}

impl Biome {
    /// Map a `biome:` value to a biome; unknown names fall back to grass.
    pub fn from_name(name: &str) -> Option<Self> {
        let biome = match name.trim().to_ascii_lowercase().as_str() {
            "grass" => Self::Grass,
            "sand" | "desert" => Self::Sand,
            "snow" => Self::Snow,
            "stone" => Self::Stone,
            "dirt" => Self::Dirt,
            _ => return None,
        };
        Some(biome)
    }

    pub fn assets(self) -> BiomeAssets {
        match self {
            Self::Grass => BiomeAssets {
                ground_texture: "terrain_grass_block",
                background: "background_clouds",
            },
            Self::Sand => BiomeAssets {
                ground_texture: "terrain_sand_block",
                background: "background_color_desert",
            },
            Self::Snow => BiomeAssets {
                ground_texture: "terrain_snow_block",
                background: "background_color_hills",
            },
            Self::Stone => BiomeAssets {
                ground_texture: "terrain_stone_block",
                background: "background_color_mushrooms",
            },
            Self::Dirt => BiomeAssets {
                ground_texture: "terrain_dirt_block",
                background: "background_color_trees",
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Player spawn
// ---------------------------------------------------------------------------

/// Which rule produced the player spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SpawnSource {
    /// A `1` cell.
    Marker,
    /// No marker: the cell above the lowest ground tile near the left edge.
    GroundFallback,
    /// No marker and no usable ground.
    Default,
}

/// Cell the player starts in. The player's feet rest on the cell's bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerSpawn {
    pub cell: Vec2,
    pub source: SpawnSource,
}

// ---------------------------------------------------------------------------
// LevelMap
// ---------------------------------------------------------------------------

/// A parsed level section.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMap {
    pub level: u32,
    pub grid: TileGrid,
    pub spawns: Vec<SpawnDescriptor>,
    pub player_spawn: PlayerSpawn,
    pub biome: Biome,
}

/// Read `path` and parse its section for `level`.
///
/// # Errors
///
/// [`MapError::MapFileMissing`] if the file cannot be read, otherwise as
/// [`load`].
pub fn load_file(path: impl AsRef<Path>, level: u32) -> Result<LevelMap, MapError> {
    load(&read_file(path)?, level)
}

/// Read a whole map file.
///
/// # Errors
///
/// [`MapError::MapFileMissing`] if the file cannot be read.
pub fn read_file(path: impl AsRef<Path>) -> Result<String, MapError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| MapError::MapFileMissing {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the section for `level` out of a multi-level map text.
///
/// # Errors
///
/// [`MapError::LevelNotFound`] if no header names `level`.
pub fn load(text: &str, level: u32) -> Result<LevelMap, MapError> {
    let lines: Vec<&str> = text.lines().collect();

    let start = lines
        .iter()
        .position(|line| parse_header(line) == Some(level))
        .ok_or(MapError::LevelNotFound { level })?
        + 1;
    let end = lines[start..]
        .iter()
        .position(|line| parse_header(line).is_some())
        .map_or(lines.len(), |offset| start + offset);

    let mut biome = Biome::default();
    let mut rows = Vec::new();
    for line in &lines[start..end] {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(name) = biome_value(line) {
            biome = Biome::from_name(name).unwrap_or_else(|| {
                warn!(level, biome = name, "unknown biome, using grass");
                Biome::Grass
            });
            continue;
        }
        rows.push(line.chars().collect::<Vec<char>>());
    }
    let grid = TileGrid::from_rows(rows);

    let mut spawns = Vec::new();
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            if let Some(kind) = grid.cell(col, row).and_then(TileKind::from_char) {
                spawns.push(SpawnDescriptor { kind, col, row });
            }
        }
    }

    let player_spawn = resolve_player_spawn(level, &spawns);
    debug!(
        level,
        width = grid.width(),
        height = grid.height(),
        spawns = spawns.len(),
        "parsed level section"
    );

    Ok(LevelMap {
        level,
        grid,
        spawns,
        player_spawn,
        biome,
    })
}

/// Header numbers in file order.
pub fn level_numbers(text: &str) -> Vec<u32> {
    text.lines().filter_map(parse_header).collect()
}

/// Parse a `level N:` header anywhere in the line.
fn parse_header(line: &str) -> Option<u32> {
    let lower = line.to_ascii_lowercase();
    let mut rest = lower.as_str();
    while let Some(pos) = rest.find("level") {
        let after = &rest[pos + "level".len()..];
        let trimmed = after.trim_start_matches(' ');
        if trimmed.len() < after.len() {
            let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
            let tail = trimmed[digits.len()..].trim_start_matches(' ');
            if !digits.is_empty() && tail.starts_with(':') {
                if let Ok(n) = digits.parse::<u32>() {
                    if n > 0 {
                        return Some(n);
                    }
                }
            }
        }
        rest = after;
    }
    None
}

fn biome_value(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let (key, value) = trimmed.split_once(':')?;
    key.trim().eq_ignore_ascii_case("biome").then(|| value.trim())
}

fn resolve_player_spawn(level: u32, spawns: &[SpawnDescriptor]) -> PlayerSpawn {
    let markers: Vec<&SpawnDescriptor> =
        spawns.iter().filter(|s| s.kind == TileKind::Start).collect();
    if markers.len() > 1 {
        warn!(level, count = markers.len(), "several start markers, using the last one");
    }
    if let Some(marker) = markers.last() {
        return PlayerSpawn {
            cell: marker.origin(),
            source: SpawnSource::Marker,
        };
    }

    let lowest_ground = spawns
        .iter()
        .filter(|s| s.kind == TileKind::Ground && s.origin().x < FALLBACK_SPAWN_MAX_X)
        .fold(None::<&SpawnDescriptor>, |best, s| match best {
            Some(b) if b.row >= s.row => Some(b),
            _ => Some(s),
        });

    match lowest_ground {
        Some(ground) => {
            let origin = ground.origin();
            warn!(level, x = origin.x, y = origin.y, "no start marker, spawning above ground");
            PlayerSpawn {
                cell: Vec2::new(origin.x, origin.y - TILE_SIZE),
                source: SpawnSource::GroundFallback,
            }
        }
        None => {
            warn!(level, "no start marker and no ground near the left edge, using default spawn");
            PlayerSpawn {
                cell: DEFAULT_SPAWN_CELL,
                source: SpawnSource::Default,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LEVELS: &str = "\
Level 1:
biome: snow
  C
1--E
level 2:
-1-
---
";

    #[test]
    fn finds_section_case_insensitively() {
        let map = load(TWO_LEVELS, 1).unwrap();
        assert_eq!(map.grid.height(), 2);
        assert_eq!(map.grid.width(), 4);
        assert_eq!(map.biome, Biome::Snow);
    }

    #[test]
    fn section_ends_at_next_header() {
        let map = load(TWO_LEVELS, 2).unwrap();
        assert_eq!(map.grid.height(), 2);
        assert_eq!(map.grid.row(0).as_deref(), Some("-1-"));
        assert_eq!(map.biome, Biome::Grass);
    }

    #[test]
    fn missing_level_is_an_error() {
        let err = load(TWO_LEVELS, 3).unwrap_err();
        assert!(matches!(err, MapError::LevelNotFound { level: 3 }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_file("/definitely/not/here/maps.txt", 1).unwrap_err();
        assert!(matches!(err, MapError::MapFileMissing { .. }));
    }

    #[test]
    fn rows_are_kept_verbatim() {
        let map = load("level 1:\n  1 \r\n--\n", 1).unwrap();
        assert_eq!(map.grid.row(0).as_deref(), Some("  1 "));
        assert_eq!(map.grid.width(), 4);
        assert_eq!(map.grid.cell(3, 1), None);
        assert_eq!(map.player_spawn.cell, Vec2::new(2.0 * TILE_SIZE, 0.0));
    }

    #[test]
    fn character_table_covers_every_kind() {
        let map = load("level 1:\n-BCSW1EXY?#z.\n", 1).unwrap();
        let kinds: Vec<TileKind> = map.spawns.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TileKind::Ground,
                TileKind::Box,
                TileKind::Coin,
                TileKind::Spikes,
                TileKind::Water,
                TileKind::Start,
                TileKind::Exit,
                TileKind::PatrolEnemy,
                TileKind::FollowerEnemy,
                TileKind::LuckyBlock,
                TileKind::Ladder,
            ]
        );
    }

    #[test]
    fn spawn_falls_back_to_lowest_left_ground() {
        let map = load("level 1:\n-\n\n--\n", 1).unwrap();
        assert_eq!(map.player_spawn.source, SpawnSource::GroundFallback);
        // Lowest ground is row 2; the player starts one cell above it.
        assert_eq!(map.player_spawn.cell, Vec2::new(0.0, TILE_SIZE));
    }

    #[test]
    fn spawn_ignores_ground_far_to_the_right() {
        let map = load("level 1:\n     ---\n", 1).unwrap();
        assert_eq!(map.player_spawn.source, SpawnSource::Default);
        assert_eq!(map.player_spawn.cell, DEFAULT_SPAWN_CELL);
    }

    #[test]
    fn last_start_marker_wins() {
        let map = load("level 1:\n1  1\n", 1).unwrap();
        assert_eq!(map.player_spawn.cell, Vec2::new(3.0 * TILE_SIZE, 0.0));
    }

    #[test]
    fn unknown_biome_falls_back_to_grass() {
        let map = load("level 1:\nbiome: lava\n1\n", 1).unwrap();
        assert_eq!(map.biome, Biome::Grass);
        assert_eq!(map.grid.height(), 1);
    }

    #[test]
    fn header_parsing() {
        assert_eq!(parse_header("level 12:"), Some(12));
        assert_eq!(parse_header("== LEVEL 3: the cave =="), Some(3));
        assert_eq!(parse_header("level 0:"), None);
        assert_eq!(parse_header("level one:"), None);
        assert_eq!(parse_header("levels 2:"), None);
        assert_eq!(level_numbers(TWO_LEVELS), vec![1, 2]);
    }

    #[test]
    fn biome_assets_are_distinct_per_biome() {
        assert_eq!(Biome::Grass.assets().ground_texture, "terrain_grass_block");
        assert_ne!(Biome::Snow.assets(), Biome::Sand.assets());
    }
}
