use std::sync::atomic::{AtomicU64, Ordering};

use super::Cell;
use super::flood::{Flood, flood_fill};

/// Grid coordinate. Signed so that neighbor arithmetic can step off the edge.
pub type Pos = (i32, i32);

/// Orthogonal offsets in the fixed order +x, -x, +y, -y
pub const NEIGHBORS_4: [Pos; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// All eight surrounding offsets, row by row
pub const NEIGHBORS_8: [Pos; 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Diagonal offsets
pub const DIAGONALS: [Pos; 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Read access to a rectangular field of cells.
///
/// Everything outside `[0, cols) × [0, rows)` reads as [`Cell::Empty`], but
/// [`CellView::is_empty`] only answers `true` for in-bounds cells: the
/// outside of the grid is not space that can be grown into.
pub trait CellView {
    /// `(cols, rows)`
    fn dimensions(&self) -> (i32, i32);

    /// Cell at position, `Empty` when out of bounds
    fn get(&self, x: i32, y: i32) -> Cell;

    /// Number of alive cells
    fn alive_count(&self) -> usize;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let (cols, rows) = self.dimensions();
        x >= 0 && y >= 0 && x < cols && y < rows
    }

    fn is_alive(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_alive()
    }

    fn is_empty(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.get(x, y).is_empty()
    }

    /// Whether the cell lies on the outermost ring of the grid
    fn is_border(&self, x: i32, y: i32) -> bool {
        let (cols, rows) = self.dimensions();
        self.in_bounds(x, y) && (x == 0 || y == 0 || x == cols - 1 || y == rows - 1)
    }

    /// In-bounds orthogonal neighbors
    fn neighbors_4(&self, x: i32, y: i32) -> impl Iterator<Item = Pos> {
        let (cols, rows) = self.dimensions();
        NEIGHBORS_4
            .into_iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
            .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < cols && ny < rows)
    }

    /// In-bounds neighbors including diagonals
    fn neighbors_8(&self, x: i32, y: i32) -> impl Iterator<Item = Pos> {
        let (cols, rows) = self.dimensions();
        NEIGHBORS_8
            .into_iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
            .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < cols && ny < rows)
    }

    fn alive_neighbors_4(&self, x: i32, y: i32) -> usize {
        self.neighbors_4(x, y).filter(|&(nx, ny)| self.is_alive(nx, ny)).count()
    }

    fn alive_neighbors_8(&self, x: i32, y: i32) -> usize {
        self.neighbors_8(x, y).filter(|&(nx, ny)| self.is_alive(nx, ny)).count()
    }

    fn has_alive_neighbor_4(&self, x: i32, y: i32) -> bool {
        self.neighbors_4(x, y).any(|(nx, ny)| self.is_alive(nx, ny))
    }

    /// All alive cells in row-major order
    fn alive_cells(&self) -> Vec<Pos> {
        let (cols, rows) = self.dimensions();
        (0..rows)
            .flat_map(|y| (0..cols).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_alive(x, y))
            .collect()
    }

    /// Alive cells 4-connected to `seed` (empty mask if the seed is not alive)
    fn connected_component(&self, seed: Pos) -> CellMask {
        let (cols, rows) = self.dimensions();
        if !self.is_alive(seed.0, seed.1) {
            return CellMask::new(cols, rows);
        }
        let flood = flood_fill(cols, rows, [seed], |(x, y)| self.is_alive(x, y), |_, _| false);
        CellMask::from_flood(&flood)
    }

    /// Empty cells reachable from the grid border through empty cells only.
    ///
    /// Any empty cell missing from the result is an enclosed interior void.
    fn true_outside_cells(&self) -> CellMask {
        let (cols, rows) = self.dimensions();
        let seeds = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_border(x, y) && self.is_empty(x, y));
        let flood = flood_fill(cols, rows, seeds, |(x, y)| self.is_empty(x, y), |_, _| false);
        CellMask::from_flood(&flood)
    }
}

/// Grid stores the binary cell states of one growth layer.
///
/// Every mutation that changes a cell takes a fresh stamp from a
/// process-wide counter, so a stamp identifies one exact grid content.
#[derive(Clone, Debug)]
pub struct Grid {
    cols: i32,
    rows: i32,
    cells: Vec<Cell>,
    alive: usize,
    stamp: u64,
}

impl Grid {
    /// Create a new grid with every cell empty
    pub fn new(cols: i32, rows: i32) -> Self {
        let cols = cols.max(0);
        let rows = rows.max(0);
        Self {
            cols,
            rows,
            cells: vec![Cell::Empty; cols as usize * rows as usize],
            alive: 0,
            stamp: next_stamp(),
        }
    }

    /// Convert 2D coordinates to 1D index
    const fn get_index(&self, x: i32, y: i32) -> usize {
        y as usize * self.cols as usize + x as usize
    }

    /// Set cell at position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.get_index(x, y);
        let old = self.cells[idx];
        if old == cell {
            return;
        }
        match cell {
            Cell::Alive => self.alive += 1,
            Cell::Empty => self.alive -= 1,
        }
        self.cells[idx] = cell;
        self.stamp = next_stamp();
    }

    /// Mutation stamp of the current contents
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// OR another grid of the same size into this one
    pub fn union_with(&mut self, other: &Grid) {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        for (x, y) in other.alive_cells() {
            self.set(x, y, Cell::Alive);
        }
    }

    /// Force every listed position empty
    pub fn clear_cells(&mut self, cells: impl IntoIterator<Item = Pos>) {
        for (x, y) in cells {
            self.set(x, y, Cell::Empty);
        }
    }

    /// Iterate over all cells with their positions
    pub fn iter_cells(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        (0..self.rows)
            .flat_map(move |y| (0..self.cols).map(move |x| (x, y)))
            .map(|(x, y)| (x, y, self.cells[self.get_index(x, y)]))
    }
}

impl CellView for Grid {
    fn dimensions(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    fn get(&self, x: i32, y: i32) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[self.get_index(x, y)]
        } else {
            Cell::Empty
        }
    }

    fn alive_count(&self) -> usize {
        self.alive
    }
}

/// A grid seen with exactly one cell overridden.
///
/// Stands in for "place, test, revert": legality checks read through an
/// overlay instead of mutating the shared grid, which keeps them safe to
/// run from several threads at once.
#[derive(Clone, Copy, Debug)]
pub struct Overlay<'g> {
    base: &'g Grid,
    pos: Pos,
    cell: Cell,
}

impl<'g> Overlay<'g> {
    /// `base` with `pos` forced alive
    pub fn placed(base: &'g Grid, pos: Pos) -> Self {
        Self { base, pos, cell: Cell::Alive }
    }

    /// `base` with `pos` forced empty
    pub fn removed(base: &'g Grid, pos: Pos) -> Self {
        Self { base, pos, cell: Cell::Empty }
    }

    pub fn base(&self) -> &'g Grid {
        self.base
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }
}

impl CellView for Overlay<'_> {
    fn dimensions(&self) -> (i32, i32) {
        self.base.dimensions()
    }

    fn get(&self, x: i32, y: i32) -> Cell {
        if (x, y) == self.pos && self.base.in_bounds(x, y) {
            self.cell
        } else {
            self.base.get(x, y)
        }
    }

    fn alive_count(&self) -> usize {
        let (x, y) = self.pos;
        if !self.base.in_bounds(x, y) {
            return self.base.alive_count();
        }
        match (self.base.get(x, y), self.cell) {
            (Cell::Empty, Cell::Alive) => self.base.alive_count() + 1,
            (Cell::Alive, Cell::Empty) => self.base.alive_count() - 1,
            _ => self.base.alive_count(),
        }
    }
}

/// Boolean membership over the cells of a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellMask {
    cols: i32,
    rows: i32,
    bits: Vec<bool>,
    len: usize,
}

impl CellMask {
    pub fn new(cols: i32, rows: i32) -> Self {
        let cols = cols.max(0);
        let rows = rows.max(0);
        Self { cols, rows, bits: vec![false; cols as usize * rows as usize], len: 0 }
    }

    /// Mask of every cell a flood fill visited
    pub fn from_flood(flood: &Flood) -> Self {
        let (cols, rows) = flood.dimensions();
        let mut mask = Self::new(cols, rows);
        for (x, y) in flood.visited() {
            mask.insert(x, y);
        }
        mask
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && x < self.cols
            && y < self.rows
            && self.bits[y as usize * self.cols as usize + x as usize]
    }

    /// Add a position; out-of-bounds positions are ignored
    pub fn insert(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return;
        }
        let idx = y as usize * self.cols as usize + x as usize;
        if !self.bits[idx] {
            self.bits[idx] = true;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Member positions in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        let cols = self.cols;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| ((i % cols as usize) as i32, (i / cols as usize) as i32))
    }
}

/// Cached true-outside set, refreshed whenever the grid stamp changes.
#[derive(Debug, Default)]
pub struct OutsideCache {
    entry: Option<(u64, CellMask)>,
}

impl OutsideCache {
    /// True-outside cells of `grid`, recomputed only on stamp mismatch
    pub fn get(&mut self, grid: &Grid) -> &CellMask {
        if self.entry.as_ref().is_some_and(|(stamp, _)| *stamp != grid.stamp()) {
            self.entry = None;
        }
        &self
            .entry
            .get_or_insert_with(|| (grid.stamp(), grid.true_outside_cells()))
            .1
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
