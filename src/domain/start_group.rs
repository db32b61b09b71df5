use tracing::warn;

use super::constraints::SpatialConstraints;
use super::grid::{CellView, Grid, Pos};
use super::Cell;

/// Seed shape stamped around a chosen start position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Footprint {
    /// The chosen cell only
    Single,
    /// 2x2 block with the chosen cell at its top-left
    #[default]
    Square2,
    /// 3x3 block centered on the chosen cell
    Square3,
}

impl Footprint {
    /// Footprint with exactly `count` cells (1, 4 or 9)
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Footprint::Single),
            4 => Some(Footprint::Square2),
            9 => Some(Footprint::Square3),
            _ => None,
        }
    }

    pub fn cell_count(self) -> usize {
        match self {
            Footprint::Single => 1,
            Footprint::Square2 => 4,
            Footprint::Square3 => 9,
        }
    }

    /// Footprint cells around `(x, y)`, row by row
    pub fn cells_at(self, x: i32, y: i32) -> Vec<Pos> {
        match self {
            Footprint::Single => vec![(x, y)],
            Footprint::Square2 => vec![(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)],
            Footprint::Square3 => (-1..=1)
                .flat_map(|dy| (-1..=1).map(move |dx| (x + dx, y + dy)))
                .collect(),
        }
    }
}

/// Seed cells of one independently grown cluster.
///
/// The first cell of the group that is alive in a grid acts as the
/// group's connectivity anchor there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartGroup {
    cells: Vec<Pos>,
}

impl StartGroup {
    pub fn new(cells: Vec<Pos>) -> Self {
        Self { cells }
    }

    /// Stamp a footprint at `(x, y)`, keeping only allowed cells. `None`
    /// when no cell survives.
    pub fn from_footprint(
        x: i32,
        y: i32,
        footprint: Footprint,
        constraints: &SpatialConstraints,
    ) -> Option<Self> {
        let (valid, rejected): (Vec<Pos>, Vec<Pos>) = footprint
            .cells_at(x, y)
            .into_iter()
            .partition(|&(cx, cy)| constraints.is_allowed(cx, cy));
        if !rejected.is_empty() {
            warn!(?rejected, "start cells outside the allowed area were dropped");
        }
        (!valid.is_empty()).then(|| Self::new(valid))
    }

    pub fn cells(&self) -> &[Pos] {
        &self.cells
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    /// First start cell alive in `view`
    pub fn live_anchor<V: CellView>(&self, view: &V) -> Option<Pos> {
        self.cells.iter().copied().find(|&(x, y)| view.is_alive(x, y))
    }

    /// Set every allowed start cell alive
    pub fn place_on(&self, grid: &mut Grid, constraints: &SpatialConstraints) {
        for &(x, y) in &self.cells {
            if constraints.is_allowed(x, y) {
                grid.set(x, y, Cell::Alive);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraints::GridFrame;
    use glam::DVec2;

    fn open(cols: i32, rows: i32) -> SpatialConstraints {
        SpatialConstraints::unbounded(GridFrame::new(DVec2::ZERO, 1.0, cols, rows)).build()
    }

    #[test]
    fn test_footprint_counts() {
        assert_eq!(Footprint::from_count(1), Some(Footprint::Single));
        assert_eq!(Footprint::from_count(9), Some(Footprint::Square3));
        assert_eq!(Footprint::from_count(5), None);
        assert_eq!(Footprint::default().cell_count(), 4);
        for fp in [Footprint::Single, Footprint::Square2, Footprint::Square3] {
            assert_eq!(fp.cells_at(5, 5).len(), fp.cell_count());
        }
        assert_eq!(Footprint::Square3.cells_at(1, 1)[0], (0, 0));
        assert_eq!(Footprint::Square2.cells_at(1, 1)[3], (2, 2));
    }

    #[test]
    fn test_footprint_clipped_to_allowed_area() {
        let constraints = open(5, 5);
        let group = StartGroup::from_footprint(0, 0, Footprint::Square3, &constraints).unwrap();
        assert_eq!(group.cells(), &[(0, 0), (1, 0), (0, 1), (1, 1)]);

        assert!(StartGroup::from_footprint(-5, -5, Footprint::Single, &constraints).is_none());
    }

    #[test]
    fn test_live_anchor_and_place() {
        let constraints = open(5, 5);
        let group = StartGroup::new(vec![(1, 1), (2, 1), (9, 9)]);
        let mut grid = Grid::new(5, 5);
        assert_eq!(group.live_anchor(&grid), None);

        group.place_on(&mut grid, &constraints);
        assert_eq!(grid.alive_count(), 2);
        assert_eq!(group.live_anchor(&grid), Some((1, 1)));

        grid.set(1, 1, Cell::Empty);
        assert_eq!(group.live_anchor(&grid), Some((2, 1)));
        assert!(group.contains((9, 9)));
    }
}
