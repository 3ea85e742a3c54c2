/// The static cell grid: walls, floor and entity markers.
///
/// Coordinates are `(x, y)` with `x` the column and `y` the row.  World
/// positions are floats in cell units; `floor()` of a position gives the
/// cell it lies in.

use std::path::Path;

use crate::error::GridError;

pub const FLOOR: u8 = 0;
pub const WALL: u8 = 1;
/// Highest legal marker code.
pub const MAX_CODE: u8 = 11;

const BUILTIN_MAP: &str = include_str!("../maps/town.txt");

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cells: Vec<u8>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build a grid from rows.  Rows must be non-empty, of equal length and
    /// contain only codes `0..=11`.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &code) in row.iter().enumerate() {
                if code > MAX_CODE {
                    return Err(GridError::UnknownCode {
                        x,
                        y,
                        code: code as u32,
                    });
                }
            }
            cells.extend(row);
        }

        Ok(Grid { cells, width, height })
    }

    /// Parse the text map format: one row per line, cells separated by
    /// commas and/or whitespace.  Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row_index = rows.len();
            let mut row = Vec::new();
            for (col, token) in line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .enumerate()
            {
                let code: u32 = token.parse().map_err(|_| GridError::BadToken {
                    row: row_index,
                    col,
                    token: token.to_string(),
                })?;
                if code > MAX_CODE as u32 {
                    return Err(GridError::UnknownCode {
                        x: col,
                        y: row_index,
                        code,
                    });
                }
                row.push(code as u8);
            }
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn load(path: &Path) -> Result<Self, GridError> {
        let text = std::fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// The embedded town map.
    pub fn builtin() -> Result<Self, GridError> {
        Self::parse(BUILTIN_MAP)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell code at integer coordinates, `None` outside the grid.
    pub fn cell(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width + x as usize])
    }

    /// Whether the cell containing world position `(x, y)` blocks movement.
    /// Anything outside the grid counts as solid.
    pub fn is_solid_at(&self, x: f64, y: f64) -> bool {
        match self.cell(x.floor() as i64, y.floor() as i64) {
            Some(code) => code == WALL,
            None => true,
        }
    }

    pub fn is_walkable_at(&self, x: f64, y: f64) -> bool {
        !self.is_solid_at(x, y)
    }

    /// Every `(x, y, code)` holding an entity marker (codes 2..=11).
    pub fn markers(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, &code)| {
            if code > WALL {
                Some((i % self.width, i / self.width, code))
            } else {
                None
            }
        })
    }

    /// Floor cells that are not on the outer ring, row-major.
    pub fn open_interior_cells(&self) -> Vec<(usize, usize)> {
        let mut open = Vec::new();
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                if self.cells[y * self.width + x] == FLOOR {
                    open.push((x, y));
                }
            }
        }
        open
    }

    /// Spawn point: first floor cell found by growing square rings around
    /// the map centre, returned as that cell's centre.  Falls back to the
    /// centre cell when the map has no floor at all.
    pub fn find_spawn(&self) -> (f64, f64) {
        let cx = (self.width / 2) as i64;
        let cy = (self.height / 2) as i64;
        let max_radius = self.width.max(self.height) as i64;

        for radius in 0..max_radius {
            for x in (cx - radius)..=(cx + radius) {
                for y in (cy - radius)..=(cy + radius) {
                    if self.cell(x, y) == Some(FLOOR) {
                        return (x as f64 + 0.5, y as f64 + 0.5);
                    }
                }
            }
        }

        (cx as f64 + 0.5, cy as f64 + 0.5)
    }
}
