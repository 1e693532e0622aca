use coordinate_transformer::CoordinateReprojector;
use pcd_core::region::{Polygon, RegionFilter};
use pcd_gridder::{GridAlgorithm, GridSize, Gridder, InProcessGridder, SurfaceReconstructor};

use super::{runner::MoundPipeline, PipelineConfig};
use crate::{error::MoundError, extrema::ExtremaDetector, smoothing::Smoother};

/// Assembles a [`MoundPipeline`] from a region, thresholds and collaborators.
///
/// Defaults: PROJ reprojection from the cloud's own CRS, in-process gridding
/// with inverse distance squared on a 256 x 256 grid.
pub struct MoundPipelineBuilder {
    region: Polygon,
    config: PipelineConfig,
    reprojector: CoordinateReprojector,
    gridder: Box<dyn Gridder>,
    algorithm: GridAlgorithm,
    size: GridSize,
}

impl MoundPipelineBuilder {
    pub fn new(region: Polygon) -> Self {
        Self {
            region,
            config: PipelineConfig::default(),
            reprojector: CoordinateReprojector::default(),
            gridder: Box::new(InProcessGridder),
            algorithm: GridAlgorithm::default(),
            size: GridSize::default(),
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reprojector(mut self, reprojector: CoordinateReprojector) -> Self {
        self.reprojector = reprojector;
        self
    }

    pub fn gridder(mut self, gridder: Box<dyn Gridder>) -> Self {
        self.gridder = gridder;
        self
    }

    pub fn algorithm(mut self, algorithm: GridAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn grid_size(mut self, size: GridSize) -> Self {
        self.size = size;
        self
    }

    /// Rejects configurations that could only fail later (zero sigma, zero
    /// grid, NaN thresholds).
    pub fn build(self) -> Result<MoundPipeline, MoundError> {
        let config = self.config;
        if config.height_cutoff.is_nan() {
            return Err(MoundError::InvalidConfig("height cutoff is NaN".into()));
        }
        self.size.check().map_err(MoundError::from)?;

        let smoother = Smoother::new(config.sigma)?.with_border(config.border);
        let detector = ExtremaDetector::new(config.elevation_threshold)
            .with_min_distance(config.min_distance)
            .with_exclude_border(config.exclude_border);
        detector.validate()?;

        let mut filters = vec![RegionFilter::Polygon(self.region)];
        if let Some(bbox) = config.bbox {
            filters.push(RegionFilter::BoundingBox(bbox));
        }
        filters.push(RegionFilter::HeightBelow(config.height_cutoff));

        let reconstructor = SurfaceReconstructor::new(self.gridder)
            .with_algorithm(self.algorithm)
            .with_size(self.size);

        log::debug!(
            "pipeline: height < {}, peaks >= {}, sigma {}, {:?} border, {} gridding with {}",
            config.height_cutoff,
            config.elevation_threshold,
            config.sigma,
            config.border,
            reconstructor.gridder_name(),
            self.algorithm
        );

        Ok(MoundPipeline {
            reprojector: self.reprojector,
            filters,
            reconstructor,
            smoother,
            detector,
            anchor: config.anchor,
        })
    }
}
