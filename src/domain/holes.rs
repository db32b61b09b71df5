use std::collections::BTreeSet;

use super::grid::{CellMask, CellView, Grid, Pos};

/// Positions that stay empty on every layer once an earlier layer left
/// them enclosed. The set only grows.
#[derive(Clone, Debug, Default)]
pub struct VerticalHoleTracker {
    holes: BTreeSet<Pos>,
}

impl VerticalHoleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.holes.contains(&(x, y))
    }

    /// Returns whether the position was new
    pub fn insert(&mut self, x: i32, y: i32) -> bool {
        self.holes.insert((x, y))
    }

    pub fn len(&self) -> usize {
        self.holes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    /// Positions in `(x, y)` order
    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.holes.iter().copied()
    }

    /// Force every tracked position empty in `grid`
    pub fn mask(&self, grid: &mut Grid) {
        grid.clear_cells(self.iter());
    }

    /// Record every enclosed void of a finalized layer. Returns how many
    /// positions were added.
    pub fn sync_from(&mut self, grid: &Grid, outside: &CellMask) -> usize {
        let before = self.holes.len();
        for (x, y, cell) in grid.iter_cells() {
            if cell.is_empty() && !outside.contains(x, y) {
                self.holes.insert((x, y));
            }
        }
        self.holes.len() - before
    }

    /// [`Self::sync_from`] computing the outside set itself
    pub fn sync_from_grid(&mut self, grid: &Grid) -> usize {
        let outside = grid.true_outside_cells();
        self.sync_from(grid, &outside)
    }
}
