//! Fixed-size level layouts
//!
//! A map is an 18x24 grid of wall tiles, one tile per 32px cell. Layouts are
//! written as rows of characters: `#` block, `=` ledge, anything else empty.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{WallSet, WallTile};
use crate::consts::{MAP_COLS, MAP_ROWS};
use crate::error::ConfigError;

/// Built-in layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapId {
    One,
    Two,
}

const MAP_ONE: [&str; MAP_ROWS] = [
    "########################",
    "........................",
    "........................",
    "........................",
    "###=====.........=====##",
    "#......................#",
    "#......................#",
    "#.......========.......#",
    "#......................#",
    "#......................#",
    "#===........#.......===#",
    "#...........#..........#",
    "#...........#..........#",
    "#.....=====.....=====..#",
    "#......................#",
    "#......................#",
    "#......................#",
    "########################",
];

const MAP_TWO: [&str; MAP_ROWS] = [
    "########################",
    "........................",
    "........................",
    "........................",
    "#######..........#######",
    "#......................#",
    "#..........##..........#",
    "#....====..##..====....#",
    "#..........##..........#",
    "#......................#",
    "#==..................==#",
    "#......................#",
    "#.......========.......#",
    "#......................#",
    "#...===..........===...#",
    "#......................#",
    "#......................#",
    "########################",
];

type Grid = [[WallTile; MAP_COLS]; MAP_ROWS];

fn tile_from_char(c: char) -> WallTile {
    match c {
        '#' => WallTile::Block,
        '=' => WallTile::Ledge,
        _ => WallTile::None,
    }
}

/// Rows past the grid are dropped and short rows padded with empty cells
fn grid_from_rows<S: AsRef<str>>(rows: &[S]) -> Grid {
    let mut grid = [[WallTile::None; MAP_COLS]; MAP_ROWS];
    for (row, line) in grid.iter_mut().zip(rows) {
        for (cell, c) in row.iter_mut().zip(line.as_ref().chars()) {
            *cell = tile_from_char(c);
        }
    }
    grid
}

/// On-disk map description
#[derive(Debug, Deserialize, Serialize)]
struct MapFile {
    name: String,
    rows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    name: String,
    tiles: Grid,
}

impl Map {
    pub fn builtin(id: MapId) -> Self {
        let (name, rows) = match id {
            MapId::One => ("map one", &MAP_ONE),
            MapId::Two => ("map two", &MAP_TWO),
        };
        Self {
            name: name.to_string(),
            tiles: grid_from_rows(rows),
        }
    }

    /// Parse a layout that must be exactly 18 rows of 24 cells
    pub fn from_rows<S: AsRef<str>>(name: impl Into<String>, rows: &[S]) -> Result<Self, ConfigError> {
        if rows.len() != MAP_ROWS {
            return Err(ConfigError::InvalidMap(format!(
                "expected {} rows, found {}",
                MAP_ROWS,
                rows.len()
            )));
        }
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.as_ref().chars().count() != MAP_COLS)
        {
            return Err(ConfigError::InvalidMap(format!(
                "row {} has {} cells, expected {}",
                index,
                row.as_ref().chars().count(),
                MAP_COLS
            )));
        }
        Ok(Self {
            name: name.into(),
            tiles: grid_from_rows(rows),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: MapFile = serde_json::from_str(json)?;
        Self::from_rows(file.name, &file.rows)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let map = Self::from_json(&json)?;
        log::info!("Loaded map '{}' from {:?}", map.name, path);
        Ok(map)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tile(&self, row: usize, col: usize) -> WallTile {
        self.tiles
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or_default()
    }

    /// Every non-empty cell as `(row, col, tile)`, row-major
    pub fn walls(&self) -> impl Iterator<Item = (usize, usize, WallTile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, tile)| **tile != WallTile::None)
                .map(move |(col, tile)| (row, col, *tile))
        })
    }
}

/// Roll a layout and skin: 0 and 1 pick map one, 2 and 3 map two
pub fn select(rng: &mut impl Rng) -> (MapId, WallSet) {
    match rng.random_range(0..4u32) {
        0 => (MapId::One, WallSet::Purple),
        1 => (MapId::One, WallSet::Green),
        2 => (MapId::Two, WallSet::Red),
        _ => (MapId::Two, WallSet::Orange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_builtin_layouts_fill_the_grid() {
        for rows in [&MAP_ONE, &MAP_TWO] {
            assert!(rows.iter().all(|row| row.len() == MAP_COLS));
            assert!(Map::from_rows("check", rows).is_ok());
        }
        let map = Map::builtin(MapId::One);
        assert_eq!(map.tile(0, 0), WallTile::Block);
        assert_eq!(map.tile(4, 3), WallTile::Ledge);
        assert_eq!(map.tile(1, 0), WallTile::None);
        assert_eq!(map.tile(99, 99), WallTile::None);
    }

    #[test]
    fn test_walls_skip_empty_cells() {
        let map = Map::builtin(MapId::Two);
        let walls: Vec<_> = map.walls().collect();
        assert!(walls.iter().all(|&(_, _, tile)| tile != WallTile::None));
        assert_eq!(walls[0], (0, 0, WallTile::Block));
        assert_eq!(walls.iter().filter(|(row, ..)| *row == 0).count(), MAP_COLS);
    }

    #[test]
    fn test_json_map_is_validated() {
        let rows: Vec<String> = MAP_ONE.iter().map(|r| r.to_string()).collect();
        let json = serde_json::json!({ "name": "custom", "rows": rows }).to_string();
        let map = Map::from_json(&json).unwrap();
        assert_eq!(map.name(), "custom");
        assert_eq!(map, Map { name: "custom".into(), ..Map::builtin(MapId::One) });

        let short = serde_json::json!({ "name": "short", "rows": ["####"] }).to_string();
        assert!(matches!(Map::from_json(&short), Err(ConfigError::InvalidMap(_))));
        assert!(matches!(Map::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_select_is_seeded() {
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(select(&mut a), select(&mut b));
        }
    }
}
