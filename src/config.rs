//! Processing configuration (C16): the knobs an `extract_frame` call can
//! override, serialized the way a CLI `--config` file or an embedding host
//! would supply them.

use serde::{Deserialize, Serialize};

use crate::crop::{DEFAULT_CROP_INSET, DEFAULT_MIN_ROTATION_DEG};
use crate::crop::CropConfig;
use crate::floodfill::DEFAULT_MAX_PIXELS;
use crate::orientation::{DEFAULT_REFINE_ITERATIONS, DEFAULT_REFINE_WINDOW_DEG};
use crate::predicate::white_boundary;
use crate::predicate::Predicate;
use crate::rect::{RectConfig, DEFAULT_MIN_AREA};

/// Every field a caller may override for a single `extract_frame` call.
/// Unknown fields are rejected rather than silently ignored, so a typo in a
/// config file surfaces immediately instead of falling back to a default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ProcessingConfig {
    #[serde(default = "default_white_threshold")]
    pub white_threshold: u8,
    #[serde(default = "default_min_area")]
    pub min_area: f64,
    #[serde(default = "default_max_pixels")]
    pub max_pixels: usize,
    #[serde(default)]
    pub padding: f64,
    #[serde(default = "default_crop_inset")]
    pub crop_inset: u32,
    #[serde(default = "default_min_rotation")]
    pub min_rotation: f64,
    #[serde(default)]
    pub use_pca: bool,
    #[serde(default)]
    pub enable_angle_refine: bool,
    #[serde(default = "default_angle_refine_window")]
    pub angle_refine_window: f64,
    #[serde(default = "default_angle_refine_iterations")]
    pub angle_refine_iterations: u32,
}

fn default_white_threshold() -> u8 {
    220
}
fn default_min_area() -> f64 {
    DEFAULT_MIN_AREA
}
fn default_max_pixels() -> usize {
    DEFAULT_MAX_PIXELS
}
fn default_crop_inset() -> u32 {
    DEFAULT_CROP_INSET
}
fn default_min_rotation() -> f64 {
    DEFAULT_MIN_ROTATION_DEG
}
fn default_angle_refine_window() -> f64 {
    DEFAULT_REFINE_WINDOW_DEG
}
fn default_angle_refine_iterations() -> u32 {
    DEFAULT_REFINE_ITERATIONS
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            white_threshold: default_white_threshold(),
            min_area: default_min_area(),
            max_pixels: default_max_pixels(),
            padding: 0.0,
            crop_inset: default_crop_inset(),
            min_rotation: default_min_rotation(),
            use_pca: false,
            enable_angle_refine: false,
            angle_refine_window: default_angle_refine_window(),
            angle_refine_iterations: default_angle_refine_iterations(),
        }
    }
}

impl ProcessingConfig {
    pub fn predicate(&self) -> Predicate {
        white_boundary(self.white_threshold)
    }

    pub fn rect_config(&self) -> RectConfig {
        RectConfig {
            min_area: self.min_area,
            use_pca: self.use_pca,
            enable_angle_refine: self.enable_angle_refine,
            angle_refine_window: self.angle_refine_window,
            angle_refine_iterations: self.angle_refine_iterations,
        }
    }

    pub fn crop_config(&self) -> CropConfig {
        CropConfig { padding: self.padding, crop_inset: self.crop_inset, min_rotation: self.min_rotation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let config = ProcessingConfig::default();
        assert_eq!(config.white_threshold, 220);
        assert_eq!(config.min_area, 100.0);
        assert_eq!(config.max_pixels, 2_000_000);
        assert_eq!(config.padding, 0.0);
        assert_eq!(config.crop_inset, 8);
        assert_eq!(config.min_rotation, 0.2);
        assert!(!config.use_pca);
        assert!(!config.enable_angle_refine);
        assert_eq!(config.angle_refine_window, 3.0);
        assert_eq!(config.angle_refine_iterations, 10);
    }

    #[test]
    fn partial_json_fills_in_remaining_defaults() {
        let config: ProcessingConfig = serde_json::from_str(r#"{"whiteThreshold": 200}"#).unwrap();
        assert_eq!(config.white_threshold, 200);
        assert_eq!(config.min_area, 100.0);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result: Result<ProcessingConfig, _> = serde_json::from_str(r#"{"bogusField": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = ProcessingConfig { white_threshold: 180, ..Default::default() };
        let json = serde_json::to_string(&config).unwrap();
        let back: ProcessingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
