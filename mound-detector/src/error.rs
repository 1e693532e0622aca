use std::fmt;

use coordinate_transformer::ProjectionError;
use pcd_core::raster::RasterError;
use pcd_gridder::GriddingError;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Reproject,
    PolygonFilter,
    BoundingBoxFilter,
    HeightFilter,
    Gridding,
    Smoothing,
    ExtremaDetection,
    Mapping,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reproject => "reproject",
            Self::PolygonFilter => "polygon filter",
            Self::BoundingBoxFilter => "bounding-box filter",
            Self::HeightFilter => "height filter",
            Self::Gridding => "gridding",
            Self::Smoothing => "smoothing",
            Self::ExtremaDetection => "extrema detection",
            Self::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MoundError {
    #[error("projection failed: {0}")]
    Projection(ProjectionError),
    #[error("coordinate arrays differ in length: x={x}, y={y}, z={z}")]
    ShapeMismatch { x: usize, y: usize, z: usize },
    #[error("gridding failed: {0}")]
    GriddingFailure(GriddingError),
    #[error("no points left after {filter}")]
    EmptyRegion { filter: String },
    #[error("degenerate raster: {0}")]
    DegenerateRaster(#[from] RasterError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ProjectionError> for MoundError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::ShapeMismatch { x, y, z } => Self::ShapeMismatch { x, y, z },
            other => Self::Projection(other),
        }
    }
}

impl From<GriddingError> for MoundError {
    fn from(err: GriddingError) -> Self {
        match err {
            GriddingError::Degenerate(raster) => Self::DegenerateRaster(raster),
            other => Self::GriddingFailure(other),
        }
    }
}

/// A stage failure with the number of records that reached the stage.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed with {records} records: {kind}")]
pub struct PipelineError {
    pub stage: Stage,
    pub records: usize,
    #[source]
    pub kind: MoundError,
}

impl PipelineError {
    pub fn new(stage: Stage, records: usize, kind: impl Into<MoundError>) -> Self {
        Self {
            stage,
            records,
            kind: kind.into(),
        }
    }

    /// An empty region is an answer (no mounds), not a malfunction.
    pub fn is_empty_region(&self) -> bool {
        matches!(self.kind, MoundError::EmptyRegion { .. })
    }
}
