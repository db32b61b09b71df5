//! Per-function parameter overrides.
//!
//! A layer declares a function tag ("Living", "Work", ...). Before the
//! layer grows, its tag is resolved once against the [`PresetTable`] into
//! a [`LayerParams`] value; scoring and legality read only that value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::settings::GrowthSettings;
use super::shape::WidthBand;

/// Overrides for one function tag. Unset fields use the global default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionPreset {
    pub light_distance: Option<u32>,
    pub preferred_width: Option<usize>,
    pub min_width: Option<usize>,
    pub edge_bonus: Option<f64>,
    pub edge_distance_threshold: Option<u32>,
    pub weight_smoothness: Option<f64>,
    pub weight_convexity: Option<f64>,
    pub weight_connected: Option<f64>,
    pub weight_light: Option<f64>,
    /// Negative values penalize obstacle proximity
    pub weight_obstacle: Option<f64>,
    pub max_thin_finger_length: Option<usize>,
    pub width_score_bonus: Option<f64>,
    pub balance_bonus_weight: Option<f64>,
    pub min_branch_end_width: Option<usize>,
    pub min_cells_for_width_check: Option<usize>,
    pub max_line: Option<usize>,
}

impl FunctionPreset {
    /// Apartments: plenty of daylight, moderate depth
    pub fn living() -> Self {
        Self {
            light_distance: Some(5),
            preferred_width: Some(5),
            min_width: Some(2),
            edge_bonus: Some(2.0),
            weight_smoothness: Some(2.0),
            weight_convexity: Some(1.5),
            max_thin_finger_length: Some(2),
            width_score_bonus: Some(5.0),
            balance_bonus_weight: Some(0.5),
            weight_connected: Some(3.0),
            min_branch_end_width: Some(2),
            ..Self::default()
        }
    }

    /// Offices: deeper floor plates, fewer branches
    pub fn work() -> Self {
        Self {
            light_distance: Some(8),
            preferred_width: Some(8),
            min_width: Some(2),
            edge_bonus: Some(0.5),
            weight_smoothness: Some(3.0),
            weight_convexity: Some(2.5),
            max_thin_finger_length: Some(1),
            width_score_bonus: Some(8.0),
            balance_bonus_weight: Some(0.6),
            weight_connected: Some(6.0),
            min_branch_end_width: Some(3),
            ..Self::default()
        }
    }

    /// Halls: one compact blob, no light rules
    pub fn industry() -> Self {
        Self {
            light_distance: Some(100),
            preferred_width: Some(25),
            min_width: Some(1),
            edge_bonus: Some(-1.0),
            weight_smoothness: Some(6.0),
            weight_convexity: Some(4.0),
            max_thin_finger_length: Some(2),
            width_score_bonus: Some(15.0),
            balance_bonus_weight: Some(0.8),
            weight_connected: Some(12.0),
            min_branch_end_width: Some(2),
            min_cells_for_width_check: Some(50),
            max_line: Some(100),
            ..Self::default()
        }
    }
}

/// Immutable parameters for growing one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerParams {
    pub function: String,
    pub light_distance: u32,
    /// Light distance at or past the free-form cutover: shape rules off
    pub free_form: bool,
    pub width: WidthBand,
    pub edge_bonus: f64,
    pub edge_distance_threshold: u32,
    pub weight_connected: f64,
    pub weight_smoothness: f64,
    pub weight_convexity: f64,
    pub weight_light: f64,
    pub weight_obstacle: f64,
    pub max_line: usize,
    pub min_branch_end_width: usize,
    pub min_cells_for_width_check: usize,
    pub max_thin_finger_length: usize,
}

impl LayerParams {
    /// Parameters with no preset applied
    pub fn from_settings(function: impl Into<String>, settings: &GrowthSettings) -> Self {
        Self::merge(function.into(), &FunctionPreset::default(), settings)
    }

    fn merge(function: String, preset: &FunctionPreset, settings: &GrowthSettings) -> Self {
        let light_distance = preset.light_distance.unwrap_or(settings.default_light_distance);
        Self {
            function,
            light_distance,
            free_form: light_distance >= settings.free_form_light_distance,
            width: WidthBand {
                min: preset.min_width.unwrap_or(settings.min_width),
                preferred: preset.preferred_width.unwrap_or(settings.preferred_width),
                bonus: preset.width_score_bonus.unwrap_or(settings.width_score_bonus),
                balance: preset.balance_bonus_weight.unwrap_or(settings.balance_bonus_weight),
            },
            edge_bonus: preset.edge_bonus.unwrap_or(settings.edge_bonus),
            edge_distance_threshold: preset
                .edge_distance_threshold
                .unwrap_or(settings.edge_distance_threshold),
            weight_connected: preset.weight_connected.unwrap_or(settings.weights.connected),
            weight_smoothness: preset.weight_smoothness.unwrap_or(settings.weights.smoothness),
            weight_convexity: preset.weight_convexity.unwrap_or(settings.weights.convexity),
            weight_light: preset.weight_light.unwrap_or(settings.weights.light),
            weight_obstacle: preset.weight_obstacle.unwrap_or(settings.weights.obstacle),
            max_line: preset.max_line.unwrap_or(settings.max_line),
            min_branch_end_width: preset
                .min_branch_end_width
                .unwrap_or(settings.min_branch_end_width),
            min_cells_for_width_check: preset
                .min_cells_for_width_check
                .unwrap_or(settings.min_cells_for_width_check),
            max_thin_finger_length: preset
                .max_thin_finger_length
                .unwrap_or(settings.max_thin_finger_length),
        }
    }
}

/// Function tag → preset, with a fallback entry for unknown tags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresetTable {
    presets: BTreeMap<String, FunctionPreset>,
    fallback: String,
}

impl Default for PresetTable {
    fn default() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert("Living".to_string(), FunctionPreset::living());
        presets.insert("Work".to_string(), FunctionPreset::work());
        presets.insert("Industry".to_string(), FunctionPreset::industry());
        Self { presets, fallback: "Work".to_string() }
    }
}

impl PresetTable {
    /// Table with no entries; every layer uses the global defaults
    pub fn empty() -> Self {
        Self { presets: BTreeMap::new(), fallback: String::new() }
    }

    /// Add or replace a preset
    pub fn insert(&mut self, name: impl Into<String>, preset: FunctionPreset) {
        self.presets.insert(name.into(), preset);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionPreset> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Resolve a layer's function tag. Unknown tags use the fallback
    /// preset; with no fallback either, the global defaults apply.
    pub fn resolve(&self, function: &str, settings: &GrowthSettings) -> LayerParams {
        let preset = self.presets.get(function).or_else(|| {
            debug!(function, fallback = %self.fallback, "no preset for function, using fallback");
            self.presets.get(&self.fallback)
        });
        match preset {
            Some(p) => LayerParams::merge(function.to_string(), p, settings),
            None => LayerParams::from_settings(function, settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_builtin_presets() {
        let settings = GrowthSettings::default();
        let table = PresetTable::default();

        let living = table.resolve("Living", &settings);
        assert_eq!(living.light_distance, 5);
        assert_eq!(living.width.preferred, 5);
        assert_eq!(living.weight_connected, 3.0);
        assert!(!living.free_form);
        // Not overridden by Living
        assert_eq!(living.max_line, 4);
        assert_eq!(living.min_cells_for_width_check, 30);

        let industry = table.resolve("Industry", &settings);
        assert!(industry.free_form);
        assert_eq!(industry.max_line, 100);
        assert_eq!(industry.min_cells_for_width_check, 50);
    }

    #[test]
    fn test_unknown_function_uses_work() {
        let settings = GrowthSettings::default();
        let table = PresetTable::default();
        let params = table.resolve("Retail", &settings);
        assert_eq!(params.function, "Retail");
        assert_eq!(params.light_distance, 8);
        assert_eq!(params.min_branch_end_width, 3);
    }

    #[test]
    fn test_empty_table_uses_globals() {
        let settings = GrowthSettings::default();
        let params = PresetTable::empty().resolve("Living", &settings);
        assert_eq!(params, LayerParams::from_settings("Living", &settings));
        assert_eq!(params.light_distance, 3);
        assert_eq!(params.weight_connected, 1.8);
        assert_eq!(params.width, WidthBand { min: 1, preferred: 4, bonus: 5.0, balance: 0.5 });
    }

    #[test]
    fn test_preset_from_json() {
        let preset: FunctionPreset =
            serde_json::from_str(r#"{ "light_distance": 40, "edge_bonus": 1.5 }"#).unwrap();
        let mut table = PresetTable::empty();
        table.insert("Hall", preset);
        let params = table.resolve("Hall", &GrowthSettings::default());
        assert!(params.free_form);
        assert_eq!(params.edge_bonus, 1.5);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Hall"]);
    }

    #[test]
    fn test_light_and_obstacle_weights_follow_preset() {
        let settings = GrowthSettings::default();
        let mut table = PresetTable::empty();
        table.insert(
            "Clinic",
            FunctionPreset {
                weight_light: Some(2.5),
                weight_obstacle: Some(-4.0),
                ..FunctionPreset::default()
            },
        );
        table.insert("Plain", FunctionPreset::default());

        let clinic = table.resolve("Clinic", &settings);
        assert_eq!(clinic.weight_light, 2.5);
        assert_eq!(clinic.weight_obstacle, -4.0);

        let plain = table.resolve("Plain", &settings);
        assert_eq!(plain.weight_light, 0.6);
        assert_eq!(plain.weight_obstacle, -1.2);
    }
}
