//! Scenario files: everything a run needs, as JSON.
//!
//! Every field is optional. Scalars that cannot be used (an unparseable
//! footprint count, a fraction outside `0..=1`, NaN) fall back to their
//! defaults with a warning instead of failing the run. Only problems that
//! make growth impossible (no boundary extent, a grid over the cell
//! ceiling, no usable start cell) are errors.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::layer_stack::RunSetup;
use crate::domain::{
    Footprint, GridFrame, GrowthPoint, GrowthSettings, Polygon, Polyline, PresetTable, Region,
    RunParams, SpatialConstraints, StartGroup,
};
use crate::error::GrowthError;

const DEFAULT_LAYER_COUNT: usize = 20;
const MAX_LAYER_COUNT: usize = 50;
const LAYER_CYCLE: [&str; 3] = ["Work", "Living", "Industry"];
const OVERFLOW_FUNCTION: &str = "Living";

/// Grid size used when no boundary is given
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub cols: i32,
    pub rows: i32,
}

impl Default for GridSize {
    fn default() -> Self {
        Self { cols: 40, rows: 40 }
    }
}

/// Obstacle outline, closed or open
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Polygon { points: Vec<[f64; 2]> },
    Polyline { points: Vec<[f64; 2]> },
}

impl ShapeSpec {
    fn into_region(self) -> Arc<dyn Region> {
        match self {
            ShapeSpec::Polygon { points } => Arc::new(Polygon::new(to_points(points))),
            ShapeSpec::Polyline { points } => Arc::new(Polyline::new(to_points(points))),
        }
    }
}

/// One start group: a click position expanded to a footprint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartGroupSpec {
    /// World position
    pub position: Option<[f64; 2]>,
    /// Grid cell; used when no world position is given
    pub cell: Option<[i32; 2]>,
    /// 1, 4 or 9, as a number or a string
    pub count: Value,
}

/// A point or curve growth point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthPointSpec {
    pub position: Option<[f64; 2]>,
    pub curve: Option<Vec<[f64; 2]>>,
    pub strength: f64,
    /// In cells
    pub radius: f64,
}

impl Default for GrowthPointSpec {
    fn default() -> Self {
        Self { position: None, curve: None, strength: 1.0, radius: 10.0 }
    }
}

/// A complete run description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub settings: GrowthSettings,
    /// Replaces the built-in preset table when present
    pub presets: Option<PresetTable>,
    /// Closed site outline in world units
    pub boundary: Option<Vec<[f64; 2]>>,
    pub grid: GridSize,
    pub membranes: Vec<Vec<[f64; 2]>>,
    pub outer_lines: Vec<Vec<[f64; 2]>>,
    pub obstacles: Vec<ShapeSpec>,
    pub start_groups: Vec<StartGroupSpec>,
    pub growth_points: Vec<GrowthPointSpec>,
    /// Function tag per layer, bottom first
    pub layers: Vec<String>,
    pub layer_count: Value,
    pub inheritance: Value,
    pub freedom: Value,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, GrowthError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrowthError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| GrowthError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    /// A small site with an obstacle, an attractor and two start groups
    pub fn demo() -> Self {
        Self {
            boundary: Some(vec![[0.0, 0.0], [90.0, 0.0], [90.0, 60.0], [0.0, 60.0]]),
            obstacles: vec![ShapeSpec::Polygon {
                points: vec![[40.0, 24.0], [50.0, 24.0], [50.0, 36.0], [40.0, 36.0]],
            }],
            start_groups: vec![
                StartGroupSpec { position: Some([24.0, 30.0]), ..StartGroupSpec::default() },
                StartGroupSpec { position: Some([66.0, 30.0]), ..StartGroupSpec::default() },
            ],
            growth_points: vec![GrowthPointSpec {
                position: Some([45.0, 55.0]),
                strength: 1.5,
                radius: 8.0,
                ..GrowthPointSpec::default()
            }],
            layer_count: Value::from(12),
            ..Self::default()
        }
    }

    /// Rasterize the site and resolve every fallback.
    pub fn into_setup(self) -> Result<RunSetup, GrowthError> {
        let settings = self.settings;
        let builder = match self.boundary {
            Some(points) => {
                let boundary: Arc<dyn Region> = Arc::new(Polygon::new(to_points(points)));
                let (cell_size, max_cells) = (settings.cell_size, settings.max_grid_cells);
                SpatialConstraints::bounded_by(boundary, cell_size, max_cells)?
            }
            None => {
                let GridSize { cols, rows } = self.grid;
                let cells = cols.max(0) as u64 * rows.max(0) as u64;
                if cells > settings.max_grid_cells {
                    return Err(GrowthError::GridTooLarge {
                        cols: cols as u64,
                        rows: rows as u64,
                        limit: settings.max_grid_cells,
                    });
                }
                let frame = GridFrame::new(DVec2::ZERO, settings.cell_size, cols, rows);
                SpatialConstraints::unbounded(frame)
            }
        };

        let builder = self
            .membranes
            .into_iter()
            .fold(builder, |b, m| b.membrane(Arc::new(Polygon::new(to_points(m)))));
        let builder = self
            .outer_lines
            .into_iter()
            .fold(builder, |b, l| b.outer_line(Arc::new(Polyline::new(to_points(l)))));
        let constraints = self
            .obstacles
            .into_iter()
            .fold(builder, |b, o| b.obstacle(o.into_region()))
            .clearances(settings.obstacle_clearance, settings.outer_line_clearance)
            .build();

        let frame = *constraints.frame();
        let specs = if self.start_groups.is_empty() {
            vec![StartGroupSpec::default()]
        } else {
            self.start_groups
        };
        let groups: Vec<StartGroup> = specs
            .iter()
            .enumerate()
            .filter_map(|(i, spec)| {
                let (x, y) = start_cell(spec, i, &frame);
                let footprint = footprint_from(&spec.count);
                let group = StartGroup::from_footprint(x, y, footprint, &constraints);
                if group.is_none() {
                    warn!(group = i, x, y, "start group has no allowed cell, dropped");
                }
                group
            })
            .collect();
        if groups.is_empty() {
            return Err(GrowthError::NoStartCells);
        }

        let growth_points = self.growth_points.into_iter().filter_map(growth_point).collect();
        let functions = layer_functions(&self.layers, &self.layer_count);
        let defaults = RunParams::default();
        let run = RunParams {
            inheritance: fraction(&self.inheritance, "inheritance", defaults.inheritance),
            freedom: fraction(&self.freedom, "freedom", defaults.freedom),
        };

        info!(
            cols = frame.cols(),
            rows = frame.rows(),
            allowed = constraints.allowed_count(),
            groups = groups.len(),
            layers = functions.len(),
            "scenario ready"
        );
        Ok(RunSetup {
            settings,
            presets: self.presets.unwrap_or_default(),
            constraints,
            growth_points,
            groups,
            run,
            functions,
        })
    }
}

fn to_points(points: Vec<[f64; 2]>) -> Vec<DVec2> {
    points.into_iter().map(DVec2::from).collect()
}

/// Start cell of group `index`: world position, explicit cell, or the
/// default third of the grid
fn start_cell(spec: &StartGroupSpec, index: usize, frame: &GridFrame) -> (i32, i32) {
    if let Some(p) = spec.position {
        return frame.world_to_cell(DVec2::from(p));
    }
    if let Some([x, y]) = spec.cell {
        return (x, y);
    }
    let x = if index == 0 { frame.cols() / 3 } else { frame.cols() * 2 / 3 };
    (x, frame.rows() / 2)
}

fn footprint_from(count: &Value) -> Footprint {
    let parsed = match count {
        Value::Null => return Footprint::default(),
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed.and_then(|n| Footprint::from_count(n as usize)) {
        Some(fp) => fp,
        None => {
            warn!(%count, "start cell count must be 1, 4 or 9; using 4");
            Footprint::default()
        }
    }
}

fn growth_point(spec: GrowthPointSpec) -> Option<GrowthPoint> {
    if !(spec.strength.is_finite() && spec.radius.is_finite()) {
        warn!(
            strength = spec.strength,
            radius = spec.radius,
            "growth point with non-finite values skipped"
        );
        return None;
    }
    match (spec.position, spec.curve) {
        (Some(p), _) => Some(GrowthPoint::point(DVec2::from(p), spec.strength, spec.radius)),
        (None, Some(curve)) => Some(GrowthPoint::curve(
            Arc::new(Polyline::new(to_points(curve))),
            spec.strength,
            spec.radius,
        )),
        (None, None) => {
            warn!("growth point without position or curve skipped");
            None
        }
    }
}

/// Expand the declared functions to the layer count. With no list the
/// layers cycle Work, Living, Industry; past the end of a list they are
/// Living.
fn layer_functions(declared: &[String], count: &Value) -> Vec<String> {
    let fallback = if declared.is_empty() { DEFAULT_LAYER_COUNT } else { declared.len() };
    let count = match count {
        Value::Null => fallback,
        other => match other.as_u64().map(|n| n as usize) {
            Some(n) if (1..=MAX_LAYER_COUNT).contains(&n) => n,
            _ => {
                warn!(%other, fallback, "layer count must be between 1 and {MAX_LAYER_COUNT}");
                fallback
            }
        },
    };
    (0..count)
        .map(|i| match declared.get(i) {
            Some(f) => f.clone(),
            None if declared.is_empty() => LAYER_CYCLE[i % LAYER_CYCLE.len()].to_string(),
            None => OVERFLOW_FUNCTION.to_string(),
        })
        .collect()
}

fn fraction(value: &Value, name: &str, default: f64) -> f64 {
    match value {
        Value::Null => default,
        other => match other.as_f64() {
            Some(v) if (0.0..=1.0).contains(&v) => v,
            _ => {
                warn!(%other, default, "{name} must be a number between 0 and 1");
                default
            }
        },
    }
}
