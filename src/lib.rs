// Domain layer - growth engine, constraints, shape analysis
pub mod domain;

// Application layer - layer stacking, scenarios, playback
pub mod application;

pub mod error;

// Infrastructure layer - UI, rendering, input
pub mod ui;
pub mod rendering;
pub mod input;

// Re-exports for convenience
pub use domain::{EvaluationMode, Grid, GrowthEngine, GrowthSettings, PresetTable};
pub use application::{
    LayerStack, OrbitCamera, Playback, RenderEvent, RenderSink, RunSetup, Scenario,
};
pub use error::GrowthError;
pub use ui::Button;
