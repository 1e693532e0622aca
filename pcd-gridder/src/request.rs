use std::fmt;

use pcd_core::{pointcloud::point::SurveyPoint, raster::ElevationRaster};

use crate::error::GriddingError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridAlgorithm {
    /// Inverse distance to a power over all points.
    InverseDistance { power: f64, smoothing: f64 },
    /// Value of the closest point.
    NearestNeighbor,
}

impl Default for GridAlgorithm {
    fn default() -> Self {
        Self::InverseDistance {
            power: 2.0,
            smoothing: 0.0,
        }
    }
}

impl GridAlgorithm {
    /// Algorithm argument in `gdal_grid -a` syntax.
    pub fn gdal_arg(&self) -> String {
        match self {
            Self::InverseDistance { power, smoothing } => {
                format!("invdist:power={power}:smoothing={smoothing}")
            }
            Self::NearestNeighbor => "nearest".to_string(),
        }
    }
}

impl fmt::Display for GridAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.gdal_arg())
    }
}

/// Output raster size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
        }
    }
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn check(&self) -> Result<(), GriddingError> {
        if self.width == 0 || self.height == 0 {
            return Err(GriddingError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Scatter set plus interpolation parameters. Points are (easting, northing,
/// elevation) in whatever horizontal units the caller uses.
#[derive(Debug, Clone, Copy)]
pub struct GridRequest<'a> {
    pub points: &'a [SurveyPoint],
    pub algorithm: GridAlgorithm,
    pub size: GridSize,
}

/// Scatter in, georeferenced raster out.
pub trait Gridder {
    fn grid(&self, request: &GridRequest<'_>) -> Result<ElevationRaster, GriddingError>;

    fn name(&self) -> &'static str;
}
