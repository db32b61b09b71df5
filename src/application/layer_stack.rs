use rand::Rng;
use tracing::info;

use super::events::{RenderEvent, RenderSink};
use crate::domain::{
    function_color, CellView, EvaluationMode, Grid, GrowthEngine, GrowthPoint, GrowthSettings,
    LayerContext, PresetTable, RunParams, SpatialConstraints, StartGroup, VerticalHoleTracker,
    START_COLOR,
};
use crate::error::GrowthError;

/// Everything a run needs, fixed before the first layer grows.
#[derive(Debug)]
pub struct RunSetup {
    pub settings: GrowthSettings,
    pub presets: PresetTable,
    pub constraints: SpatialConstraints,
    pub growth_points: Vec<GrowthPoint>,
    pub groups: Vec<StartGroup>,
    pub run: RunParams,
    /// Function tag of every layer, bottom first
    pub functions: Vec<String>,
}

/// One finalized layer.
#[derive(Clone, Debug)]
pub struct Layer {
    pub index: usize,
    pub function: String,
    pub grid: Grid,
}

/// LayerStack grows layers one at a time on top of each other.
/// Each finished layer is the support reference and hole source for
/// the next one.
#[derive(Debug)]
pub struct LayerStack {
    setup: RunSetup,
    mode: EvaluationMode,
    layers: Vec<Layer>,
    holes: VerticalHoleTracker,
}

impl LayerStack {
    /// Validate a setup. Fails when there is nothing to grow.
    pub fn new(setup: RunSetup) -> Result<Self, GrowthError> {
        if setup.groups.iter().all(|g| g.cells().is_empty()) {
            return Err(GrowthError::NoStartCells);
        }
        if setup.functions.is_empty() {
            return Err(GrowthError::NoLayers);
        }
        Ok(Self {
            setup,
            mode: EvaluationMode::default(),
            layers: Vec::new(),
            holes: VerticalHoleTracker::new(),
        })
    }

    /// Set the candidate evaluation mode (builder pattern)
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn setup(&self) -> &RunSetup {
        &self.setup
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn holes(&self) -> &VerticalHoleTracker {
        &self.holes
    }

    /// Layers declared for the run
    pub fn planned_layers(&self) -> usize {
        self.setup.functions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.layers.len() >= self.planned_layers()
    }

    /// Alive cells over every finalized layer
    pub fn total_cells(&self) -> usize {
        self.layers.iter().map(|l| l.grid.alive_count()).sum()
    }

    /// Grow the next layer, record its holes and emit its cells. Returns
    /// `None` once every declared layer exists.
    pub fn step<R, S>(&mut self, rng: &mut R, sink: &mut S) -> Option<&Layer>
    where
        R: Rng + ?Sized,
        S: RenderSink + ?Sized,
    {
        let index = self.layers.len();
        let function = self.setup.functions.get(index)?.clone();
        let setup = &self.setup;
        let params = setup.presets.resolve(&function, &setup.settings);

        let grid = {
            let engine = GrowthEngine::new(
                &setup.settings,
                &setup.constraints,
                &setup.growth_points,
                &setup.groups,
                setup.run,
            )
            .with_mode(self.mode);
            let layer = LayerContext {
                index,
                params: &params,
                lower: self.layers.last().map(|l| &l.grid),
                holes: &self.holes,
            };
            engine.grow_groups(&layer, rng)
        };

        let new_holes = self.holes.sync_from_grid(&grid);
        info!(
            layer = index,
            function = %function,
            cells = grid.alive_count(),
            new_holes,
            holes = self.holes.len(),
            "layer finalized"
        );

        let color = function_color(&function);
        for (x, y) in grid.alive_cells() {
            let is_start = setup.groups.iter().any(|g| g.contains((x, y)));
            let color = if is_start { START_COLOR } else { color };
            sink.emit(RenderEvent::CellAlive { x, y, layer: index, color });
        }

        self.layers.push(Layer { index, function, grid });
        self.layers.last()
    }

    /// Grow every remaining layer. Returns the number of layers grown.
    pub fn run<R, S>(&mut self, rng: &mut R, sink: &mut S) -> usize
    where
        R: Rng + ?Sized,
        S: RenderSink + ?Sized,
    {
        let mut grown = 0;
        while self.step(rng, sink).is_some() {
            grown += 1;
        }
        info!(
            layers = self.layers.len(),
            total_cells = self.total_cells(),
            vertical_holes = self.holes.len(),
            "run finished"
        );
        grown
    }
}
