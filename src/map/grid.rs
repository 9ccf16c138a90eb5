//! The tile grid every actor moves through.

use bevy_ecs::resource::Resource;
use glam::{IVec2, Vec2};
use strum_macros::AsRefStr;
use tracing::{debug, trace};

use crate::constants::{RAW_BOARD, TILE_SIZE};
use crate::error::ParseError;
use crate::map::parser::BoardParser;

/// The content of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
pub enum CellKind {
    Wall,
    /// Open space that never held food.
    Empty,
    /// Open space whose food has been eaten.
    Floor,
    Pellet,
    PowerPellet,
    /// Returned for any query outside the grid; always impassable.
    OutOfBounds,
}

impl CellKind {
    pub fn is_passable(self) -> bool {
        !matches!(self, CellKind::Wall | CellKind::OutOfBounds)
    }

    pub fn is_food(self) -> bool {
        matches!(self, CellKind::Pellet | CellKind::PowerPellet)
    }
}

/// What was eaten by [`Maze::consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consumed {
    Pellet,
    PowerPellet,
}

/// The maze: a fixed-size grid of cells plus the pristine template it was built from.
///
/// Dimensions never change after construction. Food only ever turns into
/// [`CellKind::Floor`], and only [`Maze::reset`] brings it back.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    template: Vec<CellKind>,
    cells: Vec<CellKind>,
    rows: usize,
    columns: usize,
}

impl Maze {
    /// Builds a maze from text rows (see [`BoardParser`] for the alphabet).
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ParseError> {
        let parsed = BoardParser::parse_board(rows)?;
        debug!(rows = parsed.rows, columns = parsed.columns, "Maze parsed");
        Ok(Self {
            template: parsed.cells.clone(),
            cells: parsed.cells,
            rows: parsed.rows,
            columns: parsed.columns,
        })
    }

    /// The built-in board.
    pub fn classic() -> Result<Self, ParseError> {
        Self::from_rows(&RAW_BOARD)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.columns {
            return None;
        }
        Some(row as usize * self.columns + col as usize)
    }

    /// Returns the cell at `(row, col)`, or [`CellKind::OutOfBounds`] outside the grid.
    pub fn cell_at(&self, row: i32, col: i32) -> CellKind {
        self.index(row, col).map_or(CellKind::OutOfBounds, |i| self.cells[i])
    }

    /// Same as [`Maze::cell_at`], for a tile coordinate (`x` = column, `y` = row).
    pub fn cell_at_tile(&self, tile: IVec2) -> CellKind {
        self.cell_at(tile.y, tile.x)
    }

    pub fn is_passable(&self, tile: IVec2) -> bool {
        self.cell_at_tile(tile).is_passable()
    }

    /// Eats the food at `(row, col)`, if there is any.
    ///
    /// This is the only way cells change during play.
    pub fn consume(&mut self, row: i32, col: i32) -> Option<Consumed> {
        let index = self.index(row, col)?;
        let consumed = match self.cells[index] {
            CellKind::Pellet => Consumed::Pellet,
            CellKind::PowerPellet => Consumed::PowerPellet,
            _ => return None,
        };
        self.cells[index] = CellKind::Floor;
        trace!(row, col, kind = ?consumed, "Cell consumed");
        Some(consumed)
    }

    /// True once no pellet or power pellet remains.
    pub fn is_fully_cleared(&self) -> bool {
        !self.cells.iter().any(|cell| cell.is_food())
    }

    pub fn remaining_food(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_food()).count()
    }

    /// Restores every cell from the template.
    pub fn reset(&mut self) {
        self.cells.clone_from(&self.template);
        debug!(food = self.remaining_food(), "Maze reset");
    }

    /// Size of the maze in pixels.
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows as f32) * TILE_SIZE
    }

    /// The four fixed corner anchors (pixel space) used for roaming and fleeing.
    pub fn corner_anchors(&self) -> [Vec2; 4] {
        let far_x = self.columns as f32 - 2.0;
        let far_y = self.rows as f32 - 2.0;
        [
            Vec2::new(1.0, 1.0) * TILE_SIZE,
            Vec2::new(1.0, far_y) * TILE_SIZE,
            Vec2::new(far_x, 1.0) * TILE_SIZE,
            Vec2::new(far_x, far_y) * TILE_SIZE,
        ]
    }

    /// Iterates over every tile coordinate with its content, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (IVec2, CellKind)> + '_ {
        self.cells.iter().enumerate().map(|(i, cell)| {
            let tile = IVec2::new((i % self.columns) as i32, (i / self.columns) as i32);
            (tile, *cell)
        })
    }
}
