use super::{GrowthEngine, LayerContext, Probe, Snapshot};
use crate::domain::flood::flood_fill;
use crate::domain::grid::{CellView, Grid, Pos};
use crate::domain::shape::{perpendicular_width, run_lengths};
use crate::domain::start_group::StartGroup;

impl GrowthEngine<'_> {
    /// Whether `group` may grow into `pos` on `grid`.
    pub fn can_place(
        &self,
        grid: &Grid,
        pos: Pos,
        group: &StartGroup,
        layer: &LayerContext<'_>,
    ) -> bool {
        let outside = grid.true_outside_cells();
        let snap = Snapshot::new(grid, &outside, group);
        self.probe_is_legal(&Probe::new(&snap, pos), layer)
    }

    /// Ordered placement checks; the first failure rejects.
    pub(super) fn probe_is_legal(&self, probe: &Probe<'_, '_>, layer: &LayerContext<'_>) -> bool {
        let (x, y) = probe.pos;
        let grid = probe.grid();

        if !self.constraints.is_allowed(x, y)
            || layer.holes.contains(x, y)
            || grid.is_alive(x, y)
            || !grid.has_alive_neighbor_4(x, y)
        {
            return false;
        }
        if let Some(lower) = layer.lower {
            if self.run.strict_support(self.settings) && !lower.is_alive(x, y) {
                return false;
            }
        }
        if !joins_anchor(probe) {
            return false;
        }
        if layer.params.free_form {
            return true;
        }

        self.meets_min_width(grid, probe.pos, layer)
            && self.meets_max_line(grid, probe.pos, layer)
            && self.keeps_light(probe, layer)
            && self.keeps_branch_end_wide(probe, layer)
    }

    fn meets_min_width(&self, grid: &Grid, (x, y): Pos, layer: &LayerContext<'_>) -> bool {
        let min = layer.params.width.min;
        if min <= 1 {
            return true;
        }
        let (h, v) = run_lengths(grid, x, y);
        h >= min || v >= min
    }

    fn meets_max_line(&self, grid: &Grid, (x, y): Pos, layer: &LayerContext<'_>) -> bool {
        let max = layer.params.max_line;
        if max >= self.settings.max_line_cutover {
            return true;
        }
        let (h, v) = run_lengths(grid, x, y);
        h <= max || v <= max
    }

    /// No enclosed void may form, and the candidate and its alive
    /// neighbors must stay within the light distance of the outside.
    fn keeps_light(&self, probe: &Probe<'_, '_>, layer: &LayerContext<'_>) -> bool {
        if self.would_enclose_void(probe) {
            return false;
        }
        let max = layer.params.light_distance;
        let unreachable = self.settings.unreachable_distance;
        if probe.distance_to_outside(probe.pos, unreachable) > max {
            return false;
        }
        let overlay = probe.overlay();
        let (x, y) = probe.pos;
        overlay
            .neighbors_4(x, y)
            .filter(|&(nx, ny)| overlay.is_alive(nx, ny))
            .all(|n| probe.distance_to_outside(n, unreachable) <= max)
    }

    /// Whether some empty neighbor would lose its way to the grid edge.
    /// The search counts a path reaching `hole_reach_depth` as open.
    fn would_enclose_void(&self, probe: &Probe<'_, '_>) -> bool {
        let overlay = probe.overlay();
        let (cols, rows) = overlay.dimensions();
        let depth = self.settings.hole_reach_depth;
        let (x, y) = probe.pos;
        overlay
            .neighbors_4(x, y)
            .filter(|&(nx, ny)| overlay.is_empty(nx, ny))
            .any(|start| {
                let flood = flood_fill(
                    cols,
                    rows,
                    [start],
                    |(cx, cy)| overlay.is_empty(cx, cy),
                    |(cx, cy), d| d >= depth || overlay.is_border(cx, cy),
                );
                flood.stopped_at().is_none()
            })
    }

    /// Rejects a branch end that would extend a thin finger past the
    /// allowed length.
    ///
    /// The walk back along the finger follows the first alive neighbor in
    /// +x, -x, +y, -y order. At a fork only that one branch is measured,
    /// so a wide alternative path does not rescue the candidate.
    fn keeps_branch_end_wide(&self, probe: &Probe<'_, '_>, layer: &LayerContext<'_>) -> bool {
        let params = layer.params;
        let grid = probe.grid();
        if grid.alive_count() < params.min_cells_for_width_check
            || params.min_branch_end_width <= 1
        {
            return true;
        }

        let overlay = probe.overlay();
        let (x, y) = probe.pos;
        if overlay.alive_neighbors_4(x, y) >= 2 {
            return true;
        }
        let next_alive = |(cx, cy): Pos, previous: Pos| {
            overlay
                .neighbors_4(cx, cy)
                .find(|&n| n != previous && overlay.is_alive(n.0, n.1))
        };
        let Some(mut current) = next_alive(probe.pos, probe.pos) else {
            return false;
        };

        let mut previous = probe.pos;
        let mut thin_length = 1;
        loop {
            if perpendicular_width(&overlay, current, previous) >= params.min_branch_end_width {
                break;
            }
            thin_length += 1;
            if thin_length > params.max_thin_finger_length {
                break;
            }
            match next_alive(current, previous) {
                Some(next) => {
                    previous = current;
                    current = next;
                }
                None => break,
            }
        }
        thin_length <= params.max_thin_finger_length
    }
}

/// The candidate joins the anchor's component when one of its neighbors
/// is already in it. Without a live anchor anything goes.
fn joins_anchor(probe: &Probe<'_, '_>) -> bool {
    let Some(component) = &probe.snap.anchor_component else {
        return true;
    };
    let (x, y) = probe.pos;
    probe
        .grid()
        .neighbors_4(x, y)
        .any(|(nx, ny)| component.contains(nx, ny))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{grid_from, open_constraints};
    use super::*;
    use crate::domain::holes::VerticalHoleTracker;
    use crate::domain::preset::{LayerParams, PresetTable};
    use crate::domain::settings::{GrowthSettings, RunParams};

    struct Fixture {
        settings: GrowthSettings,
        params: LayerParams,
        holes: VerticalHoleTracker,
    }

    impl Fixture {
        fn new(function: &str) -> Self {
            let settings = GrowthSettings::default();
            let params = PresetTable::default().resolve(function, &settings);
            Self { settings, params, holes: VerticalHoleTracker::new() }
        }

        fn layer(&self) -> LayerContext<'_> {
            LayerContext { index: 0, params: &self.params, lower: None, holes: &self.holes }
        }
    }

    #[test]
    fn test_basic_rules() {
        let fx = Fixture::new("Industry");
        let constraints = open_constraints(6, 6);
        let group = StartGroup::new(vec![(1, 1)]);
        let groups = [group.clone()];
        let run = RunParams::default();
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &groups, run);
        let grid = grid_from(&["......", ".##...", "......", "......", "......", "......"]);
        let ctx = fx.layer();

        assert!(engine.can_place(&grid, (3, 1), &group, &ctx));
        // Already alive
        assert!(!engine.can_place(&grid, (2, 1), &group, &ctx));
        // No alive neighbor
        assert!(!engine.can_place(&grid, (4, 4), &group, &ctx));
        // Outside the grid
        assert!(!engine.can_place(&grid, (-1, 1), &group, &ctx));
    }

    #[test]
    fn test_vertical_hole_blocks() {
        let mut fx = Fixture::new("Industry");
        fx.holes.insert(3, 1);
        let constraints = open_constraints(6, 6);
        let group = StartGroup::new(vec![(1, 1)]);
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &[], RunParams::default());
        let grid = grid_from(&["......", ".##...", "......", "......", "......", "......"]);
        assert!(!engine.can_place(&grid, (3, 1), &group, &fx.layer()));
        assert!(engine.can_place(&grid, (2, 2), &group, &fx.layer()));
    }

    #[test]
    fn test_connectivity_to_anchor() {
        let fx = Fixture::new("Industry");
        let constraints = open_constraints(7, 3);
        let group = StartGroup::new(vec![(0, 1)]);
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &[], RunParams::default());
        // Anchor island on the left, stray cell on the right
        let grid = grid_from(&[".......", "##...#.", "......."]);
        let ctx = fx.layer();
        assert!(engine.can_place(&grid, (2, 1), &group, &ctx));
        assert!(!engine.can_place(&grid, (4, 1), &group, &ctx));

        // A dead anchor allows any extension
        let orphan = StartGroup::new(vec![(6, 2)]);
        assert!(engine.can_place(&grid, (4, 1), &orphan, &ctx));
    }

    #[test]
    fn test_strict_support_requires_cell_below() {
        let fx = Fixture::new("Industry");
        let constraints = open_constraints(4, 4);
        let group = StartGroup::new(vec![(0, 0)]);
        let run = RunParams { inheritance: 1.0, freedom: 0.0 };
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &[], run);
        let grid = grid_from(&["#...", "....", "....", "...."]);
        let lower = grid_from(&["##..", "....", "....", "...."]);
        let ctx = LayerContext { lower: Some(&lower), ..fx.layer() };
        assert!(engine.can_place(&grid, (1, 0), &group, &ctx));
        assert!(!engine.can_place(&grid, (0, 1), &group, &ctx));
    }

    #[test]
    fn test_max_line_rejects_long_runs() {
        let fx = Fixture::new("Living");
        let constraints = open_constraints(9, 5);
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &[], RunParams::default());
        let ctx = fx.layer();

        let row = grid_from(&[".........", ".........", ".####....", ".........", "........."]);
        let group = StartGroup::new(vec![(1, 2)]);
        // The row grows to 5 but the column through the cell is 1
        assert!(engine.can_place(&row, (5, 2), &group, &ctx));

        let corner = grid_from(&["....#....", "....#....", "....#....", "....#....", "####....."]);
        let group = StartGroup::new(vec![(0, 4)]);
        // Both runs through (4, 4) would be 5 long
        assert!(!engine.can_place(&corner, (4, 4), &group, &ctx));
    }

    #[test]
    fn test_light_rule_rejects_enclosed_void() {
        let fx = Fixture::new("Living");
        let constraints = open_constraints(7, 7);
        let group = StartGroup::new(vec![(2, 2)]);
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &[], RunParams::default());
        let ctx = fx.layer();

        // Ring around (3, 3) open only at (3, 4)
        let notched = grid_from(&[
            ".......",
            ".......",
            "..###..",
            "..#.#..",
            "..#.#..",
            ".......",
            ".......",
        ]);
        assert!(!engine.can_place(&notched, (3, 4), &group, &ctx));
        assert!(engine.can_place(&notched, (1, 2), &group, &ctx));
    }

    #[test]
    fn test_light_distance_limits_thickness() {
        let mut fx = Fixture::new("Industry");
        fx.params.free_form = false;
        fx.params.light_distance = 1;
        fx.params.max_line = 100;
        let constraints = open_constraints(9, 9);
        let group = StartGroup::new(vec![(1, 4)]);
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &[], RunParams::default());
        let grid = grid_from(&[
            ".........",
            ".........",
            ".........",
            ".###.....",
            ".###.....",
            ".###.....",
            ".........",
            ".........",
            ".........",
        ]);
        let ctx = fx.layer();
        // With (4, 4) placed, (3, 4) is two steps from the outside
        assert!(!engine.can_place(&grid, (4, 4), &group, &ctx));

        let thin = grid_from(&[
            ".........",
            ".........",
            ".........",
            ".........",
            ".###.....",
            ".........",
            ".........",
            ".........",
            ".........",
        ]);
        assert!(engine.can_place(&thin, (4, 4), &group, &ctx));
    }

    #[test]
    fn test_branch_end_rejects_long_thin_finger() {
        let mut fx = Fixture::new("Living");
        fx.params.min_cells_for_width_check = 0;
        fx.params.max_line = 100;
        fx.params.light_distance = 20;
        let constraints = open_constraints(10, 7);
        let group = StartGroup::new(vec![(1, 2)]);
        let engine = GrowthEngine::new(&fx.settings, &constraints, &[], &[], RunParams::default());
        let ctx = fx.layer();

        // 3x3 body with a one-cell finger of length 2 to the right
        let grid = grid_from(&[
            "..........",
            "..........",
            ".###......",
            ".#####....",
            ".###......",
            "..........",
            "..........",
        ]);
        // Extending the finger: candidate, (5, 3) and (4, 3) are all thin
        assert!(!engine.can_place(&grid, (6, 3), &group, &ctx));
        // Two neighbors: not a branch end
        assert!(engine.can_place(&grid, (4, 2), &group, &ctx));
        // Walking down from (5, 2) meets the full row at once
        assert!(engine.can_place(&grid, (5, 2), &group, &ctx));
    }
}
