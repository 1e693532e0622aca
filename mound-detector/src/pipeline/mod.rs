//! Reproject → filter → grid → smooth → detect → map.

pub mod builder;
pub mod runner;

use pcd_core::{raster::PixelAnchor, region::BoundingBox};

use crate::smoothing::BorderMode;

pub use builder::MoundPipelineBuilder;
pub use runner::{Detector, MoundPipeline};

/// Tunable thresholds of a run. Defaults are the values the Hopewell
/// earthworks survey was processed with.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Points at or above this elevation (canopy, structures) are dropped.
    pub height_cutoff: f64,
    /// Smoothed cells below this elevation are never reported.
    pub elevation_threshold: f64,
    pub sigma: f64,
    pub border: BorderMode,
    pub min_distance: usize,
    pub exclude_border: bool,
    pub anchor: PixelAnchor,
    /// Optional second crop applied after the polygon.
    pub bbox: Option<BoundingBox>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            height_cutoff: 670.0,
            elevation_threshold: 646.0,
            sigma: 2.0,
            border: BorderMode::Nearest,
            min_distance: 1,
            exclude_border: true,
            anchor: PixelAnchor::Center,
            bbox: None,
        }
    }
}
