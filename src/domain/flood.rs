//! Breadth-first flood fill shared by every reachability query on a grid.
//!
//! One routine serves the true-outside search, connected components,
//! the reach-to-edge test and distance-to-outside lookups. Callers decide
//! which cells may be entered (`expand`) and when the search is done
//! (`stop`). Neighborhood is always 4-connected.

use std::collections::VecDeque;

use super::grid::{NEIGHBORS_4, Pos};

/// Outcome of a flood fill.
#[derive(Clone, Debug)]
pub struct Flood {
    cols: i32,
    rows: i32,
    /// BFS depth per cell, `u32::MAX` where the fill never reached
    depth: Vec<u32>,
    /// First visited cell that satisfied the stop predicate
    stopped_at: Option<(Pos, u32)>,
}

impl Flood {
    /// `(cols, rows)` of the lattice that was filled
    pub fn dimensions(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    /// Whether the fill visited `(x, y)`
    pub fn reached(&self, x: i32, y: i32) -> bool {
        self.depth_at(x, y).is_some()
    }

    /// BFS depth at which `(x, y)` was visited
    pub fn depth_at(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return None;
        }
        let d = self.depth[y as usize * self.cols as usize + x as usize];
        (d != u32::MAX).then_some(d)
    }

    /// Cell and depth where the stop predicate fired, if it did
    pub fn stopped_at(&self) -> Option<(Pos, u32)> {
        self.stopped_at
    }

    /// Number of visited cells
    pub fn visited_count(&self) -> usize {
        self.depth.iter().filter(|&&d| d != u32::MAX).count()
    }

    /// Iterate over visited positions in row-major order
    pub fn visited(&self) -> impl Iterator<Item = Pos> + '_ {
        let cols = self.cols;
        self.depth
            .iter()
            .enumerate()
            .filter(|(_, d)| **d != u32::MAX)
            .map(move |(i, _)| ((i % cols as usize) as i32, (i / cols as usize) as i32))
    }
}

/// Multi-source BFS over a `cols × rows` lattice.
///
/// Seeds are visited at depth 0 (out-of-bounds seeds are ignored). A
/// neighbor is entered only when `expand` accepts it. `stop` is evaluated
/// on every visited cell, seeds included; the first cell it accepts ends
/// the search and is reported through [`Flood::stopped_at`].
pub fn flood_fill<E, S>(
    cols: i32,
    rows: i32,
    seeds: impl IntoIterator<Item = Pos>,
    mut expand: E,
    mut stop: S,
) -> Flood
where
    E: FnMut(Pos) -> bool,
    S: FnMut(Pos, u32) -> bool,
{
    let len = cols.max(0) as usize * rows.max(0) as usize;
    let mut flood = Flood {
        cols,
        rows,
        depth: vec![u32::MAX; len],
        stopped_at: None,
    };
    let in_bounds = |x: i32, y: i32| x >= 0 && y >= 0 && x < cols && y < rows;
    let mut queue = VecDeque::new();

    for (x, y) in seeds {
        if !in_bounds(x, y) {
            continue;
        }
        let idx = y as usize * cols as usize + x as usize;
        if flood.depth[idx] != u32::MAX {
            continue;
        }
        flood.depth[idx] = 0;
        if stop((x, y), 0) {
            flood.stopped_at = Some(((x, y), 0));
            return flood;
        }
        queue.push_back((x, y));
    }

    while let Some((cx, cy)) = queue.pop_front() {
        let d = flood.depth[cy as usize * cols as usize + cx as usize];
        for (dx, dy) in NEIGHBORS_4 {
            let (nx, ny) = (cx + dx, cy + dy);
            if !in_bounds(nx, ny) {
                continue;
            }
            let idx = ny as usize * cols as usize + nx as usize;
            if flood.depth[idx] != u32::MAX || !expand((nx, ny)) {
                continue;
            }
            flood.depth[idx] = d + 1;
            if stop((nx, ny), d + 1) {
                flood.stopped_at = Some(((nx, ny), d + 1));
                return flood;
            }
            queue.push_back((nx, ny));
        }
    }

    flood
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_field_depths_are_manhattan() {
        let flood = flood_fill(5, 5, [(0, 0)], |_| true, |_, _| false);
        assert_eq!(flood.depth_at(0, 0), Some(0));
        assert_eq!(flood.depth_at(4, 4), Some(8));
        assert_eq!(flood.depth_at(2, 3), Some(5));
        assert_eq!(flood.visited_count(), 25);
        assert!(flood.stopped_at().is_none());
    }

    #[test]
    fn test_expand_predicate_walls_off_cells() {
        // Vertical wall at x == 2
        let flood = flood_fill(5, 5, [(0, 0)], |(x, _)| x != 2, |_, _| false);
        assert!(flood.reached(1, 4));
        assert!(!flood.reached(2, 0));
        assert!(!flood.reached(3, 0));
        assert_eq!(flood.visited_count(), 10);
    }

    #[test]
    fn test_stop_reports_first_hit() {
        let flood = flood_fill(10, 1, [(0, 0)], |_| true, |(x, _), _| x == 6);
        assert_eq!(flood.stopped_at(), Some(((6, 0), 6)));
        assert!(!flood.reached(7, 0));
    }

    #[test]
    fn test_stop_checked_on_seed() {
        let flood = flood_fill(3, 3, [(1, 1)], |_| true, |_, d| d == 0);
        assert_eq!(flood.stopped_at(), Some(((1, 1), 0)));
    }

    #[test]
    fn test_out_of_bounds_seeds_ignored() {
        let flood = flood_fill(3, 3, [(-1, 0), (5, 5)], |_| true, |_, _| false);
        assert_eq!(flood.visited_count(), 0);
        assert!(!flood.reached(-1, 0));
    }

    #[test]
    fn test_visited_iterates_row_major() {
        let flood = flood_fill(3, 2, [(2, 1)], |(_, y)| y == 1, |_, _| false);
        let cells: Vec<_> = flood.visited().collect();
        assert_eq!(cells, vec![(0, 1), (1, 1), (2, 1)]);
    }
}
