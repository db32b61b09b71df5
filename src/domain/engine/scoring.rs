use super::{GrowthEngine, LayerContext, Probe, Snapshot};
use crate::domain::grid::{CellView, Grid, Pos};
use crate::domain::shape::{convexity_score, smoothness_score, width_score};

impl GrowthEngine<'_> {
    /// Desirability of growing into `pos` on `grid`. Higher is better;
    /// negative infinity means a growth point vetoes the cell.
    pub fn score_candidate(&self, grid: &Grid, pos: Pos, layer: &LayerContext<'_>) -> f64 {
        let outside = grid.true_outside_cells();
        let snap = Snapshot { grid, outside: &outside, anchor_component: None };
        self.score_probe(&Probe::new(&snap, pos), layer)
    }

    pub(super) fn score_probe(&self, probe: &Probe<'_, '_>, layer: &LayerContext<'_>) -> f64 {
        let (x, y) = probe.pos;
        let grid = probe.grid();
        let settings = self.settings;
        let params = layer.params;
        let mut score = 0.0;

        for gp in self.growth_points {
            let influence = gp.influence(self.constraints.frame(), x, y);
            if influence < settings.hard_blockade_threshold {
                return f64::NEG_INFINITY;
            }
            score += influence * settings.weights.growth_point;
        }

        score += grid.alive_neighbors_4(x, y) as f64 * params.weight_connected;
        score += smoothness_score(grid, x, y) * params.weight_smoothness;
        score += convexity_score(grid, x, y) * params.weight_convexity;

        if let Some(lower) = layer.lower {
            let inheritance = self.run.inheritance;
            if lower.is_alive(x, y) {
                score += settings.layer_support_bonus * inheritance;
            } else {
                score -= settings.layer_overhang_penalty * (1.0 - self.run.freedom) * inheritance;
            }
        }

        score += self.light_score(grid, x, y, layer.index) * params.weight_light;
        score += self.obstacle_magnitude(x, y) * params.weight_obstacle;

        if params.edge_bonus != 0.0 {
            let dist = probe.distance_to_outside(probe.pos, settings.unreachable_distance);
            if dist <= params.edge_distance_threshold {
                score += params.edge_bonus;
            }
        }

        score + width_score(grid, x, y, &params.width)
    }

    /// Sun exposure by position relative to the grid center, in `[0, 1]`
    /// plus a per-layer height bonus.
    fn light_score(&self, grid: &Grid, x: i32, y: i32, layer_index: usize) -> f64 {
        let [sx, sy, _] = self.settings.sun_direction;
        let len = sx.hypot(sy);
        if len == 0.0 {
            return 0.5;
        }
        let (cols, rows) = grid.dimensions();
        let dx = (x as f64 - cols as f64 / 2.0) / cols.max(1) as f64;
        let dy = (y as f64 - rows as f64 / 2.0) / rows.max(1) as f64;
        let dot = (dx * sx + dy * sy) / len;
        (dot + 1.0) / 2.0 + layer_index as f64 * self.settings.light_height_bonus
    }

    /// Obstacle proximity, positive; the obstacle weight makes it a penalty
    fn obstacle_magnitude(&self, x: i32, y: i32) -> f64 {
        let settings = self.settings;
        if self.constraints.is_obstacle(x, y) {
            settings.obstacle_cell_penalty
        } else {
            self.constraints.adjacent_obstacles(x, y) as f64 * settings.obstacle_adjacent_penalty
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::DVec2;

    use super::super::fixtures::{grid_from, open_constraints};
    use super::*;
    use crate::domain::constraints::{GridFrame, SpatialConstraints};
    use crate::domain::geometry::Polyline;
    use crate::domain::growth_point::GrowthPoint;
    use crate::domain::holes::VerticalHoleTracker;
    use crate::domain::preset::LayerParams;
    use crate::domain::settings::{GrowthSettings, RunParams, Weights};
    use crate::domain::shape::WidthBand;

    /// Settings and params where only the 4-neighbor count scores
    fn connectivity_only() -> (GrowthSettings, LayerParams) {
        let settings = GrowthSettings {
            weights: Weights { light: 0.0, obstacle: 0.0, ..Weights::default() },
            ..GrowthSettings::default()
        };
        let mut params = LayerParams::from_settings("Test", &settings);
        params.weight_connected = 1.0;
        params.weight_smoothness = 0.0;
        params.weight_convexity = 0.0;
        params.edge_bonus = 0.0;
        params.width = WidthBand { min: 1, preferred: 1, bonus: 0.0, balance: 0.0 };
        (settings, params)
    }

    fn layer<'a>(params: &'a LayerParams, holes: &'a VerticalHoleTracker) -> LayerContext<'a> {
        LayerContext { index: 0, params, lower: None, holes }
    }

    #[test]
    fn test_connectivity_only_score_is_neighbor_count() {
        let (settings, params) = connectivity_only();
        let constraints = open_constraints(5, 5);
        let engine = GrowthEngine::new(&settings, &constraints, &[], &[], RunParams::default());
        let holes = VerticalHoleTracker::new();
        let grid = grid_from(&[
            ".....",
            ".#.#.",
            "..#..",
            ".....",
            ".....",
        ]);
        let ctx = layer(&params, &holes);
        assert_eq!(engine.score_candidate(&grid, (2, 1), &ctx), 3.0);
        assert_eq!(engine.score_candidate(&grid, (2, 3), &ctx), 1.0);
        assert_eq!(engine.score_candidate(&grid, (0, 0), &ctx), 0.0);
    }

    #[test]
    fn test_repeller_vetoes_cell() {
        let (settings, params) = connectivity_only();
        let constraints = open_constraints(10, 10);
        // Cell (2, 2) has its center at (2.5, 2.5)
        let points = [GrowthPoint::point(DVec2::new(2.5, 2.5), -8.0, 3.0)];
        let engine = GrowthEngine::new(&settings, &constraints, &points, &[], RunParams::default());
        let holes = VerticalHoleTracker::new();
        let grid = Grid::new(10, 10);
        let ctx = layer(&params, &holes);
        assert_eq!(engine.score_candidate(&grid, (2, 2), &ctx), f64::NEG_INFINITY);
        // Far away the repeller has no say
        assert_eq!(engine.score_candidate(&grid, (9, 9), &ctx), 0.0);
    }

    #[test]
    fn test_attractor_raises_score() {
        let (settings, params) = connectivity_only();
        let constraints = open_constraints(10, 10);
        let points = [GrowthPoint::point(DVec2::new(0.5, 0.5), 1.0, 4.0)];
        let engine = GrowthEngine::new(&settings, &constraints, &points, &[], RunParams::default());
        let holes = VerticalHoleTracker::new();
        let grid = Grid::new(10, 10);
        let ctx = layer(&params, &holes);
        // Full strength times the growth point weight
        assert!((engine.score_candidate(&grid, (0, 0), &ctx) - 2.0).abs() < 1e-12);
        assert!(engine.score_candidate(&grid, (1, 0), &ctx) < 2.0);
    }

    #[test]
    fn test_layer_support_bonus_and_penalty() {
        let (settings, params) = connectivity_only();
        let constraints = open_constraints(4, 4);
        let run = RunParams { inheritance: 0.5, freedom: 0.3 };
        let engine = GrowthEngine::new(&settings, &constraints, &[], &[], run);
        let holes = VerticalHoleTracker::new();
        let lower = grid_from(&["#...", "....", "....", "...."]);
        let grid = Grid::new(4, 4);
        let ctx = LayerContext { index: 1, params: &params, lower: Some(&lower), holes: &holes };

        assert!((engine.score_candidate(&grid, (0, 0), &ctx) - 1.5).abs() < 1e-12);
        assert!((engine.score_candidate(&grid, (3, 3), &ctx) + 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_light_favors_sun_side() {
        let (settings, mut params) = connectivity_only();
        params.weight_light = 1.0;
        let constraints = open_constraints(10, 10);
        let engine = GrowthEngine::new(&settings, &constraints, &[], &[], RunParams::default());
        let holes = VerticalHoleTracker::new();
        let grid = Grid::new(10, 10);
        let ctx = layer(&params, &holes);
        let toward = engine.score_candidate(&grid, (9, 9), &ctx);
        let away = engine.score_candidate(&grid, (0, 0), &ctx);
        assert!(toward > away);
        assert!((0.0..=1.0).contains(&toward));

        let upper = LayerContext { index: 4, ..ctx };
        let lifted = engine.score_candidate(&grid, (9, 9), &upper);
        assert!((lifted - toward - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_obstacle_lowers_score() {
        let (settings, mut params) = connectivity_only();
        params.weight_obstacle = -1.2;
        let constraints =
            SpatialConstraints::unbounded(GridFrame::new(DVec2::ZERO, 1.0, 10, 10))
                .obstacle(Arc::new(Polyline::new(vec![DVec2::new(5.0, 5.0)])))
                .build();
        let engine = GrowthEngine::new(&settings, &constraints, &[], &[], RunParams::default());
        let holes = VerticalHoleTracker::new();
        let grid = Grid::new(10, 10);
        let ctx = layer(&params, &holes);
        assert!((engine.score_candidate(&grid, (4, 4), &ctx) + 12.0).abs() < 1e-12);
        assert!((engine.score_candidate(&grid, (3, 4), &ctx) + 0.6).abs() < 1e-12);
        assert_eq!(engine.score_candidate(&grid, (0, 0), &ctx), 0.0);
    }

    #[test]
    fn test_edge_bonus_near_outside_only() {
        let (settings, mut params) = connectivity_only();
        params.weight_connected = 0.0;
        params.edge_bonus = 3.0;
        let constraints = open_constraints(9, 9);
        let engine = GrowthEngine::new(&settings, &constraints, &[], &[], RunParams::default());
        let holes = VerticalHoleTracker::new();
        let ctx = layer(&params, &holes);

        // Solid block with an enclosed center; nothing is outside
        let mut blob = grid_from(&["#########"; 9]);
        blob.set(4, 4, crate::domain::Cell::Empty);
        assert_eq!(engine.score_candidate(&blob, (4, 4), &ctx), 0.0);

        assert_eq!(engine.score_candidate(&Grid::new(9, 9), (0, 0), &ctx), 3.0);
    }
}
