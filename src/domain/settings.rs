//! Global defaults and run-level parameters.
//!
//! Per-layer values come from [`super::preset::PresetTable::resolve`];
//! everything here is the fallback those lookups land on.

use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Scoring weights without a per-function override
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub growth_point: f64,
    pub connected: f64,
    pub smoothness: f64,
    pub convexity: f64,
    pub light: f64,
    pub obstacle: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            growth_point: 2.0,
            connected: 1.8,
            smoothness: 1.5,
            convexity: 1.2,
            light: 0.6,
            obstacle: -1.2,
        }
    }
}

/// Per-layer growth targets. Lists are indexed by layer; the last entry
/// repeats for deeper layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSchedule {
    pub grow_quota: Vec<usize>,
    pub min_cells: Vec<usize>,
    pub max_cells: Vec<usize>,
}

/// Targets for one layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerQuota {
    /// Placements the main loop aims for
    pub grow: usize,
    pub min_cells: usize,
    pub max_cells: usize,
}

impl Default for LayerSchedule {
    fn default() -> Self {
        Self {
            grow_quota: vec![28, 13, 12, 12, 12, 11, 10, 10, 10, 9, 8, 8, 8, 7, 6, 6, 6, 5, 4, 4],
            min_cells: std::iter::once(120).chain((30..=120).rev().step_by(5)).collect(),
            max_cells: (55..=150).rev().step_by(5).collect(),
        }
    }
}

impl LayerSchedule {
    /// Same targets for every layer
    pub fn uniform(grow: usize, min_cells: usize, max_cells: usize) -> Self {
        Self { grow_quota: vec![grow], min_cells: vec![min_cells], max_cells: vec![max_cells] }
    }

    pub fn quota(&self, layer: usize) -> LayerQuota {
        fn pick(values: &[usize], layer: usize) -> usize {
            values.get(layer).or(values.last()).copied().unwrap_or(0)
        }
        LayerQuota {
            grow: pick(&self.grow_quota, layer),
            min_cells: pick(&self.min_cells, layer),
            max_cells: pick(&self.max_cells, layer),
        }
    }
}

/// Every global default and threshold the engine consults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthSettings {
    /// World units per cell
    pub cell_size: f64,

    pub min_width: usize,
    pub preferred_width: usize,
    pub width_score_bonus: f64,
    pub balance_bonus_weight: f64,
    pub max_line: usize,
    /// At or above this the max-line rule is skipped
    pub max_line_cutover: usize,
    pub min_branch_end_width: usize,
    pub min_cells_for_width_check: usize,
    pub max_thin_finger_length: usize,

    pub weights: Weights,
    /// Growth point influence below this vetoes a cell outright
    pub hard_blockade_threshold: f64,
    pub strongly_negative_threshold: f64,
    pub strongly_negative_weight: f64,
    pub negative_score_weight: f64,

    pub layer_support_bonus: f64,
    pub layer_overhang_penalty: f64,
    /// Freedom below this restricts growth to supported cells
    pub strict_support_threshold: f64,

    pub default_light_distance: u32,
    /// At or above this light distance all shape rules are skipped
    pub free_form_light_distance: u32,
    pub edge_distance_threshold: u32,
    pub edge_bonus: f64,
    pub obstacle_cell_penalty: f64,
    pub obstacle_adjacent_penalty: f64,

    /// Cap on main-loop steps per layer. A step either places a cell or
    /// ends the loop, so this also caps placements.
    pub max_grow_attempts: usize,
    pub frontier_radius: i32,
    pub top_k: usize,
    pub extra_rounds: usize,
    pub extra_attempts: usize,
    pub extra_tries: usize,
    /// Depth at which the reach-to-edge search gives up and reports success
    pub hole_reach_depth: u32,
    /// Distance reported when no outside cell is reachable
    pub unreachable_distance: u32,

    pub sun_direction: [f64; 3],
    pub light_height_bonus: f64,

    pub max_grid_cells: u64,
    /// In cells
    pub obstacle_clearance: f64,
    /// In cells
    pub outer_line_clearance: f64,

    pub schedule: LayerSchedule,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            cell_size: 3.0,
            min_width: 1,
            preferred_width: 4,
            width_score_bonus: 5.0,
            balance_bonus_weight: 0.5,
            max_line: 4,
            max_line_cutover: 50,
            min_branch_end_width: 2,
            min_cells_for_width_check: 30,
            max_thin_finger_length: 2,
            weights: Weights::default(),
            hard_blockade_threshold: -5.0,
            strongly_negative_threshold: -20.0,
            strongly_negative_weight: 0.001,
            negative_score_weight: 0.3,
            layer_support_bonus: 3.0,
            layer_overhang_penalty: 2.0,
            strict_support_threshold: 0.1,
            default_light_distance: 3,
            free_form_light_distance: 30,
            edge_distance_threshold: 2,
            edge_bonus: 3.0,
            obstacle_cell_penalty: 10.0,
            obstacle_adjacent_penalty: 0.5,
            max_grow_attempts: 2000,
            frontier_radius: 2,
            top_k: 20,
            extra_rounds: 10,
            extra_attempts: 500,
            extra_tries: 10,
            hole_reach_depth: 20,
            unreachable_distance: 9999,
            sun_direction: [0.5, 0.7, 0.8],
            light_height_bonus: 0.05,
            max_grid_cells: 300_000,
            obstacle_clearance: 1.0,
            outer_line_clearance: 0.5,
            schedule: LayerSchedule::default(),
        }
    }
}

/// How strongly each layer follows the one below. Fixed for a whole run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    /// 0 = ignore the lower layer, 1 = follow it closely
    pub inheritance: f64,
    /// 0 = no overhangs, 1 = free growth
    pub freedom: f64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self { inheritance: 0.5, freedom: 0.3 }
    }
}

impl RunParams {
    /// Whether cells may only grow on top of alive cells below
    pub fn strict_support(&self, settings: &GrowthSettings) -> bool {
        self.freedom < settings.strict_support_threshold
    }
}

/// Display color for a layer function tag
pub fn function_color(function: &str) -> Rgb {
    match function {
        "Work" => Rgb(200, 80, 80),
        "Living" => Rgb(80, 200, 120),
        "Industry" => Rgb(120, 120, 200),
        _ => DEFAULT_COLOR,
    }
}

pub const START_COLOR: Rgb = Rgb(255, 215, 0);
pub const DEFAULT_COLOR: Rgb = Rgb(180, 180, 180);
