mod cell;
mod grid;
pub mod flood;
mod geometry;
mod constraints;
mod growth_point;
pub mod shape;
mod holes;
mod preset;
mod settings;
mod start_group;
mod evaluation;
mod engine;

pub use cell::Cell;
pub use grid::{CellMask, CellView, Grid, OutsideCache, Overlay, Pos, NEIGHBORS_4, NEIGHBORS_8};
pub use geometry::{GeometryError, Polygon, Polyline, Region};
pub use constraints::{GridFrame, SpatialConstraints, SpatialConstraintsBuilder};
pub use growth_point::{Attractor, GrowthPoint};
pub use shape::WidthBand;
pub use holes::VerticalHoleTracker;
pub use preset::{FunctionPreset, LayerParams, PresetTable};
pub use settings::{
    function_color, GrowthSettings, LayerQuota, LayerSchedule, Rgb, RunParams, Weights,
    DEFAULT_COLOR, START_COLOR,
};
pub use start_group::{Footprint, StartGroup};
pub use evaluation::EvaluationMode;
pub use engine::{GrowthEngine, GrowthReport, LayerContext};
