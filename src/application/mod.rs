mod camera;
mod events;
mod layer_stack;
mod playback;
mod scenario;

pub use camera::OrbitCamera;
pub use events::{RenderEvent, RenderSink};
pub use layer_stack::{Layer, LayerStack, RunSetup};
pub use playback::Playback;
pub use scenario::{GridSize, GrowthPointSpec, Scenario, ShapeSpec, StartGroupSpec};
