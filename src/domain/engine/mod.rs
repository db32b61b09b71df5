//! The growth engine: scoring, placement legality and the frontier loop.
//!
//! Every check reads an immutable [`Grid`] through a [`Snapshot`] taken at
//! the start of a growth step. A candidate is examined through a
//! [`Probe`], which sees the grid with that one cell placed. Placement
//! happens only between steps, on the caller's thread.

mod growth;
mod legality;
mod scoring;

use std::borrow::Cow;
use std::cell::OnceCell;

use rayon::prelude::*;

use super::constraints::SpatialConstraints;
use super::evaluation::EvaluationMode;
use super::flood::flood_fill;
use super::grid::{CellMask, CellView, Grid, Overlay, Pos};
use super::growth_point::GrowthPoint;
use super::holes::VerticalHoleTracker;
use super::preset::LayerParams;
use super::settings::{GrowthSettings, RunParams};
use super::start_group::StartGroup;

pub use growth::GrowthReport;

/// Run-wide inputs shared by every layer.
pub struct GrowthEngine<'a> {
    settings: &'a GrowthSettings,
    constraints: &'a SpatialConstraints,
    growth_points: &'a [GrowthPoint],
    groups: &'a [StartGroup],
    run: RunParams,
    mode: EvaluationMode,
}

/// What one layer grows against.
#[derive(Clone, Copy, Debug)]
pub struct LayerContext<'a> {
    pub index: usize,
    pub params: &'a LayerParams,
    /// Finalized layer below, if any
    pub lower: Option<&'a Grid>,
    pub holes: &'a VerticalHoleTracker,
}

impl<'a> GrowthEngine<'a> {
    pub fn new(
        settings: &'a GrowthSettings,
        constraints: &'a SpatialConstraints,
        growth_points: &'a [GrowthPoint],
        groups: &'a [StartGroup],
        run: RunParams,
    ) -> Self {
        Self {
            settings,
            constraints,
            growth_points,
            groups,
            run,
            mode: EvaluationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn settings(&self) -> &GrowthSettings {
        self.settings
    }

    pub fn constraints(&self) -> &SpatialConstraints {
        self.constraints
    }

    pub fn groups(&self) -> &[StartGroup] {
        self.groups
    }

    /// Whether `pos` is a seed cell of any group
    fn is_start_cell(&self, pos: Pos) -> bool {
        self.groups.iter().any(|g| g.contains(pos))
    }

    /// Legal candidates with their scores, in candidate order. Vetoed
    /// candidates are dropped.
    fn evaluate(
        &self,
        snap: &Snapshot<'_>,
        candidates: &[Pos],
        layer: &LayerContext<'_>,
    ) -> Vec<(Pos, f64)> {
        let one = |&pos: &Pos| -> Option<(Pos, f64)> {
            let probe = Probe::new(snap, pos);
            if !self.probe_is_legal(&probe, layer) {
                return None;
            }
            let score = self.score_probe(&probe, layer);
            (score > f64::NEG_INFINITY).then_some((pos, score))
        };
        match self.mode {
            EvaluationMode::Serial => candidates.iter().filter_map(one).collect(),
            EvaluationMode::Parallel => candidates.par_iter().filter_map(one).collect(),
        }
    }
}

/// A grid frozen for one growth step, with the values every candidate
/// shares computed once.
pub(crate) struct Snapshot<'g> {
    grid: &'g Grid,
    outside: &'g CellMask,
    /// Component of the group's live anchor, `None` when no start cell
    /// is alive
    anchor_component: Option<CellMask>,
}

impl<'g> Snapshot<'g> {
    fn new(grid: &'g Grid, outside: &'g CellMask, group: &StartGroup) -> Self {
        let anchor_component = group.live_anchor(grid).map(|a| grid.connected_component(a));
        Self { grid, outside, anchor_component }
    }
}

/// One candidate seen as placed on a snapshot.
pub(crate) struct Probe<'s, 'g> {
    snap: &'s Snapshot<'g>,
    pos: Pos,
    placed_outside: OnceCell<Cow<'s, CellMask>>,
}

impl<'s, 'g> Probe<'s, 'g> {
    fn new(snap: &'s Snapshot<'g>, pos: Pos) -> Self {
        Self { snap, pos, placed_outside: OnceCell::new() }
    }

    fn grid(&self) -> &'g Grid {
        self.snap.grid
    }

    fn overlay(&self) -> Overlay<'g> {
        Overlay::placed(self.snap.grid, self.pos)
    }

    /// True-outside set with the candidate placed. Placing a cell that
    /// is not itself outside leaves the set unchanged.
    fn outside(&self) -> &CellMask {
        self.placed_outside.get_or_init(|| {
            let (x, y) = self.pos;
            if self.snap.outside.contains(x, y) {
                Cow::Owned(self.overlay().true_outside_cells())
            } else {
                Cow::Borrowed(self.snap.outside)
            }
        })
    }

    /// Hops from `from` to the nearest true-outside cell with the
    /// candidate placed; `unreachable` when there is none.
    fn distance_to_outside(&self, from: Pos, unreachable: u32) -> u32 {
        distance_to_outside(self.grid(), self.outside(), from, unreachable)
    }
}

/// BFS hops from `from` to the nearest cell of `outside`, stepping over
/// any in-bounds cell.
pub(crate) fn distance_to_outside<V: CellView>(
    view: &V,
    outside: &CellMask,
    from: Pos,
    unreachable: u32,
) -> u32 {
    let (cols, rows) = view.dimensions();
    flood_fill(cols, rows, [from], |_| true, |(x, y), _| outside.contains(x, y))
        .stopped_at()
        .map_or(unreachable, |(_, d)| d)
}
