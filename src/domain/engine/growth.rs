use std::collections::BTreeSet;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::SliceRandom;
use tracing::debug;

use super::{GrowthEngine, LayerContext, Probe, Snapshot};
use crate::domain::Cell;
use crate::domain::flood::flood_fill;
use crate::domain::grid::{CellMask, CellView, Grid, OutsideCache, Overlay, Pos};
use crate::domain::holes::VerticalHoleTracker;
use crate::domain::start_group::StartGroup;

/// What one growth pass did to a grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Cells placed by the weighted main loop
    pub placed: usize,
    /// Cells placed by supplementary growth toward the minimum
    pub extra: usize,
    /// Cells removed to respect the maximum
    pub pruned: usize,
}

impl GrowthEngine<'_> {
    /// Empty allowed cells within the frontier radius of any alive cell,
    /// minus vertical holes. Sorted, without duplicates.
    pub fn frontier_candidates(&self, grid: &Grid, holes: &VerticalHoleTracker) -> Vec<Pos> {
        let r = self.settings.frontier_radius;
        let mut candidates = BTreeSet::new();
        for (cx, cy) in grid.alive_cells() {
            for dy in -r..=r {
                for dx in -r..=r {
                    let (x, y) = (cx + dx, cy + dy);
                    if grid.is_empty(x, y)
                        && self.constraints.is_allowed(x, y)
                        && !holes.contains(x, y)
                    {
                        candidates.insert((x, y));
                    }
                }
            }
        }
        candidates.into_iter().collect()
    }

    /// Grow one group's grid for a layer: weighted frontier steps up to the
    /// layer's quota, then supplementary growth toward the minimum, then
    /// pruning down to the maximum.
    pub fn grow_layer<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        group: &StartGroup,
        layer: &LayerContext<'_>,
        rng: &mut R,
    ) -> GrowthReport {
        let quota = self.settings.schedule.quota(layer.index);
        let mut report = GrowthReport::default();
        let mut cache = OutsideCache::default();

        for _ in 0..self.settings.max_grow_attempts {
            if report.placed >= quota.grow {
                break;
            }
            let candidates = self.frontier_candidates(grid, layer.holes);
            if candidates.is_empty() {
                break;
            }
            let pick = {
                let snap = Snapshot::new(grid, cache.get(grid), group);
                let scored = self.evaluate(&snap, &candidates, layer);
                self.select(scored, rng)
            };
            // Evaluation is pure, so an unchanged grid cannot do better
            let Some((x, y)) = pick else {
                debug!(layer = layer.index, placed = report.placed, "no legal candidates left");
                break;
            };
            grid.set(x, y, Cell::Alive);
            report.placed += 1;
        }

        for _ in 0..self.settings.extra_rounds {
            let alive = grid.alive_count();
            if alive >= quota.min_cells {
                break;
            }
            let grew = self.grow_extra(grid, group, quota.min_cells - alive, layer, rng);
            if grew == 0 {
                break;
            }
            report.extra += grew;
        }

        if grid.alive_count() > quota.max_cells {
            report.pruned = self.prune_to_max(grid, group, quota.max_cells, rng);
        }
        report
    }

    /// Up to `need` unweighted placements: each attempt shuffles the
    /// frontier and places the first legal cell among the first few.
    pub fn grow_extra<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        group: &StartGroup,
        need: usize,
        layer: &LayerContext<'_>,
        rng: &mut R,
    ) -> usize {
        let mut cache = OutsideCache::default();
        let mut placed = 0;
        for _ in 0..self.settings.extra_attempts {
            if placed >= need {
                break;
            }
            let mut candidates = self.frontier_candidates(grid, layer.holes);
            if candidates.is_empty() {
                break;
            }
            candidates.shuffle(rng);
            let pick = {
                let snap = Snapshot::new(grid, cache.get(grid), group);
                candidates
                    .iter()
                    .take(self.settings.extra_tries)
                    .copied()
                    .find(|&pos| self.probe_is_legal(&Probe::new(&snap, pos), layer))
            };
            if let Some((x, y)) = pick {
                grid.set(x, y, Cell::Alive);
                placed += 1;
            }
        }
        placed
    }

    /// Remove low-neighbor cells until at most `max_cells` remain. Start
    /// cells stay, and no removal may split the group's structure. Stops
    /// early when no cell can go. Returns the number removed.
    pub fn prune_to_max<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        group: &StartGroup,
        max_cells: usize,
        rng: &mut R,
    ) -> usize {
        let mut removed = 0;
        while grid.alive_count() > max_cells {
            let mut cells: Vec<Pos> = grid
                .alive_cells()
                .into_iter()
                .filter(|&pos| !self.is_start_cell(pos))
                .collect();
            // Shuffle first so that the stable sort breaks ties randomly
            cells.shuffle(rng);
            cells.sort_by_key(|&(x, y)| grid.alive_neighbors_4(x, y));

            let Some((x, y)) = cells.into_iter().find(|&pos| keeps_connected(grid, pos, group))
            else {
                debug!(alive = grid.alive_count(), max_cells, "no removable cell left");
                break;
            };
            grid.set(x, y, Cell::Empty);
            removed += 1;
        }
        removed
    }

    /// Drop alive non-start cells without a live 4-neighbor
    pub fn remove_isolated(&self, grid: &mut Grid) -> usize {
        let isolated: Vec<Pos> = grid
            .alive_cells()
            .into_iter()
            .filter(|&(x, y)| !grid.has_alive_neighbor_4(x, y) && !self.is_start_cell((x, y)))
            .collect();
        let count = isolated.len();
        grid.clear_cells(isolated);
        count
    }

    /// Set every allowed start cell of every group alive
    pub fn enforce_start_cells(&self, grid: &mut Grid) {
        for group in self.groups {
            group.place_on(grid, self.constraints);
        }
    }

    /// Drop alive cells not 4-connected to any live start cell. A grid
    /// with no live start cell is left alone.
    pub fn retain_anchored(&self, grid: &mut Grid) -> usize {
        let seeds: Vec<Pos> = self
            .groups
            .iter()
            .flat_map(|g| g.cells().iter().copied())
            .filter(|&(x, y)| grid.is_alive(x, y))
            .collect();
        if seeds.is_empty() {
            return 0;
        }
        let (cols, rows) = grid.dimensions();
        let flood = flood_fill(cols, rows, seeds, |(x, y)| grid.is_alive(x, y), |_, _| false);
        let anchored = CellMask::from_flood(&flood);
        let stray: Vec<Pos> = grid
            .alive_cells()
            .into_iter()
            .filter(|&(x, y)| !anchored.contains(x, y))
            .collect();
        let count = stray.len();
        grid.clear_cells(stray);
        count
    }

    /// Grow every start group in its own grid, union the results and
    /// clean up the combined layer.
    pub fn grow_groups<R: Rng + ?Sized>(&self, layer: &LayerContext<'_>, rng: &mut R) -> Grid {
        let (cols, rows) = self.constraints.dimensions();
        let mut combined = Grid::new(cols, rows);

        for (i, group) in self.groups.iter().enumerate() {
            let mut grid = Grid::new(cols, rows);
            group.place_on(&mut grid, self.constraints);
            layer.holes.mask(&mut grid);
            let report = self.grow_layer(&mut grid, group, layer, rng);
            debug!(
                layer = layer.index,
                group = i,
                placed = report.placed,
                extra = report.extra,
                pruned = report.pruned,
                cells = grid.alive_count(),
                "group grown"
            );
            combined.union_with(&grid);
        }

        let isolated = self.remove_isolated(&mut combined);
        self.enforce_start_cells(&mut combined);
        layer.holes.mask(&mut combined);
        let stray = self.retain_anchored(&mut combined);
        if isolated + stray > 0 {
            debug!(layer = layer.index, isolated, stray, "cleanup removed cells");
        }
        combined
    }

    /// Weighted draw among the best `top_k` scored candidates
    fn select<R: Rng + ?Sized>(&self, mut scored: Vec<(Pos, f64)>, rng: &mut R) -> Option<Pos> {
        if scored.is_empty() {
            return None;
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.settings.top_k.max(1));
        let weights: Vec<f64> = scored.iter().map(|&(_, s)| self.selection_weight(s)).collect();
        let index = WeightedIndex::new(&weights).map_or(0, |dist| dist.sample(rng));
        Some(scored[index].0)
    }

    fn selection_weight(&self, score: f64) -> f64 {
        let settings = self.settings;
        if score < settings.strongly_negative_threshold {
            settings.strongly_negative_weight
        } else if score < 0.0 {
            settings.negative_score_weight
        } else {
            (score * 0.5).min(700.0).exp()
        }
    }
}

/// Whether removing `pos` keeps every remaining cell attached to the
/// group's live anchor
fn keeps_connected(grid: &Grid, pos: Pos, group: &StartGroup) -> bool {
    let view = Overlay::removed(grid, pos);
    match group.live_anchor(&view) {
        Some(anchor) => view.connected_component(anchor).len() == view.alive_count(),
        None => true,
    }
}
