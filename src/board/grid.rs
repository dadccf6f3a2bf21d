use std::collections::BTreeSet;

use crate::board::cell::Cell;
use crate::session::SessionError;

/// Fixed-size rectangular orchard. Cells are stored row-major and owned
/// outright; nothing the caller holds can alias them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from rows of cells. `rows[y][x]` is the cell at `(x, y)`.
    ///
    /// Every cell is cloned into the grid. Fails if there are no rows, the
    /// first row is empty, or the rows differ in length.
    pub fn new(rows: &[Vec<Cell>]) -> Result<Self, SessionError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(SessionError::EmptyBoard);
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(SessionError::RaggedBoard {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }

        Ok(Grid {
            width,
            height: rows.len(),
            cells: rows.iter().flatten().cloned().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// The cell at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let i = self.index(x, y)?;
        Some(&mut self.cells[i])
    }

    /// True when `(x, y)` is on the board and holds something other than `Empty`.
    pub fn has_object(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(cell) if *cell != Cell::Empty)
    }

    /// Swap in a new cell, returning the old one. Out-of-bounds positions
    /// are left alone and hand the new cell back as `Err`.
    pub fn replace(&mut self, x: i32, y: i32, cell: Cell) -> Result<Cell, Cell> {
        match self.get_mut(x, y) {
            Some(slot) => Ok(std::mem::replace(slot, cell)),
            None => Err(cell),
        }
    }

    /// All cells with their `(x, y)` coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (((i % width) as i32, (i / width) as i32), cell))
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// Every distinct fruit kind growing anywhere on the board.
    pub fn tree_kinds(&self) -> BTreeSet<String> {
        self.cells
            .iter()
            .filter_map(Cell::as_tree)
            .map(|tree| tree.kind().to_string())
            .collect()
    }
}
