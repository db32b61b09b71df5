use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::events::RenderSink;
use super::layer_stack::LayerStack;
use super::scenario::Scenario;
use crate::domain::EvaluationMode;
use crate::error::GrowthError;

/// Playback drives a layer stack over time for the viewer.
/// A layer is grown per tick interval while running; reset rebuilds the
/// stack from the same scenario and seed.
pub struct Playback {
    scenario: Scenario,
    seed: u64,
    stack: LayerStack,
    rng: StdRng,
    pub is_running: bool,
    pub update_timer: f32,
    pub layers_per_second: f32,
    pub last_step_ms: f32,
}

impl Playback {
    pub fn new(scenario: Scenario, seed: u64, mode: EvaluationMode) -> Result<Self, GrowthError> {
        let stack = LayerStack::new(scenario.clone().into_setup()?)?.with_mode(mode);
        Ok(Self {
            scenario,
            seed,
            stack,
            rng: StdRng::seed_from_u64(seed),
            is_running: false,
            update_timer: 0.0,
            layers_per_second: 2.0,
            last_step_ms: 0.0,
        })
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Set running state (builder pattern)
    pub fn with_running(mut self, running: bool) -> Self {
        self.is_running = running;
        self
    }

    /// Toggle play/pause; a finished stack stays paused
    pub fn toggle_running(mut self) -> Self {
        self.is_running = !self.is_running && !self.stack.is_complete();
        self
    }

    pub fn adjust_speed(mut self, delta: f32) -> Self {
        self.layers_per_second = (self.layers_per_second + delta).clamp(0.5, 20.0);
        self
    }

    /// Grow one layer now. Returns false once the stack is complete.
    pub fn step<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let start = Instant::now();
        let grown = self.stack.step(&mut self.rng, sink).is_some();
        self.last_step_ms = start.elapsed().as_secs_f32() * 1000.0;
        if grown {
            debug!(layer = self.stack.layers().len(), ms = self.last_step_ms, "stepped");
        }
        if self.stack.is_complete() {
            self.is_running = false;
        }
        grown
    }

    /// Advance by one frame
    pub fn tick<S: RenderSink + ?Sized>(&mut self, delta_time: f32, sink: &mut S) -> bool {
        if !self.is_running {
            return false;
        }
        self.update_timer += delta_time;
        if self.update_timer < 1.0 / self.layers_per_second {
            return false;
        }
        self.update_timer = 0.0;
        self.step(sink)
    }

    /// Start over from layer 0 with the run seed
    pub fn reset<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), GrowthError> {
        let mode = self.stack.mode();
        self.stack = LayerStack::new(self.scenario.clone().into_setup()?)?.with_mode(mode);
        self.rng = StdRng::seed_from_u64(self.seed);
        self.is_running = false;
        self.update_timer = 0.0;
        sink.clear_all();
        info!(seed = self.seed, "playback reset");
        Ok(())
    }
}
