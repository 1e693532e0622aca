//! Finds mound-shaped local maxima in a LiDAR survey.
//!
//! A [`MoundPipeline`] reprojects a raw cloud to WGS84, crops it to a region
//! of interest, drops tall returns, grids the remainder into an elevation
//! raster, smooths it and reports the local maxima as geographic points.

pub mod error;
pub mod extrema;
pub mod mapping;
pub mod pipeline;
pub mod smoothing;

pub use error::{MoundError, PipelineError, Stage};
pub use extrema::{ExtremaDetector, Peak};
pub use mapping::{GridToGeographicMapper, Mound};
pub use pipeline::{Detector, MoundPipeline, MoundPipelineBuilder, PipelineConfig};
pub use smoothing::{BorderMode, Smoother};
