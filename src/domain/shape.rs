//! Local shape measures used by scoring and the width rules.
//!
//! All helpers are pure reads over a [`CellView`] and never look past the
//! immediate run or neighborhood of the queried cell.

use super::grid::{CellView, DIAGONALS, Pos};

/// Alive cells stepping from `(x, y)` in direction `(dx, dy)`, excluding
/// the start cell
fn run_from<V: CellView>(view: &V, x: i32, y: i32, dx: i32, dy: i32) -> usize {
    let (mut cx, mut cy) = (x + dx, y + dy);
    let mut n = 0;
    while view.is_alive(cx, cy) {
        n += 1;
        cx += dx;
        cy += dy;
    }
    n
}

/// Horizontal and vertical run lengths through `(x, y)`, counting the
/// cell itself whatever its state
pub fn run_lengths<V: CellView>(view: &V, x: i32, y: i32) -> (usize, usize) {
    let h = 1 + run_from(view, x, y, -1, 0) + run_from(view, x, y, 1, 0);
    let v = 1 + run_from(view, x, y, 0, -1) + run_from(view, x, y, 0, 1);
    (h, v)
}

/// Width at `pos` across the direction of travel from `from`.
///
/// A horizontal step measures the vertical run and vice versa. A zero
/// step has width 1.
pub fn perpendicular_width<V: CellView>(view: &V, pos: Pos, from: Pos) -> usize {
    let (x, y) = pos;
    let (dx, dy) = (x - from.0, y - from.1);
    if dx == 0 && dy == 0 {
        return 1;
    }
    let (h, v) = run_lengths(view, x, y);
    if dx != 0 { v } else { h }
}

/// Open sides of a cell, with the grid border counting as an open side
pub fn edge_count<V: CellView>(view: &V, x: i32, y: i32) -> usize {
    let (cols, rows) = view.dimensions();
    let open = view.neighbors_4(x, y).filter(|&(nx, ny)| !view.is_alive(nx, ny)).count();
    let border_x = usize::from(x == 0 || x == cols - 1);
    let border_y = usize::from(y == 0 || y == rows - 1);
    open + border_x + border_y
}

/// Rewards filling bays and corners, penalizes peninsulas.
pub fn smoothness_score<V: CellView>(view: &V, x: i32, y: i32) -> f64 {
    let n4 = view.alive_neighbors_4(x, y);
    let n8 = view.alive_neighbors_8(x, y);

    let mut score = n4 as f64 * 2.0 + (n8 - n4) as f64 * 1.5;
    match n4 {
        1 => score -= 2.0,
        2 => {
            let mut alive = view.neighbors_4(x, y).filter(|&(nx, ny)| view.is_alive(nx, ny));
            if let (Some(a), Some(b)) = (alive.next(), alive.next()) {
                if a.0 != b.0 && a.1 != b.1 {
                    score += 3.0;
                }
            }
        }
        n if n >= 3 => score += 4.0,
        _ => {}
    }
    score
}

/// Filled diagonals plus concave corners this cell would complete.
pub fn convexity_score<V: CellView>(view: &V, x: i32, y: i32) -> f64 {
    let mut corners = 0;
    let mut concave = 0;
    for (dx, dy) in DIAGONALS {
        let diagonal = view.is_alive(x + dx, y + dy);
        if diagonal {
            corners += 1;
        } else if view.is_alive(x + dx, y) && view.is_alive(x, y + dy) {
            concave += 1;
        }
    }
    corners as f64 * 0.5 + concave as f64 * 2.0
}

/// Width band a layer aims for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidthBand {
    pub min: usize,
    pub preferred: usize,
    pub bonus: f64,
    pub balance: f64,
}

impl WidthBand {
    fn axis_score(&self, count: usize) -> f64 {
        let (min, pref, c) = (self.min as f64, self.preferred as f64, count as f64);
        if c < min {
            -self.bonus * (min - c) * 0.5
        } else if c <= pref {
            self.bonus * (c - min) * 0.5
        } else {
            self.bonus * (pref - min) * 0.5
        }
    }
}

/// Symmetric width score: each axis against the band, plus a balance
/// bonus when both axes are at least 2 wide.
pub fn width_score<V: CellView>(view: &V, x: i32, y: i32, band: &WidthBand) -> f64 {
    let (h, v) = run_lengths(view, x, y);
    let mut score = band.axis_score(h) + band.axis_score(v);
    if h >= 2 && v >= 2 {
        let ratio = h.min(v) as f64 / h.max(v) as f64;
        score += band.bonus * ratio * band.balance;
    }
    score
}
