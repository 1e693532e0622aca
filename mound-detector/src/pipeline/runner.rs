use std::time::Instant;

use coordinate_transformer::CoordinateReprojector;
use pcd_core::{
    pointcloud::point::RawPointCloud,
    raster::{PixelAnchor, RasterError},
    region::RegionFilter,
};
use pcd_gridder::SurfaceReconstructor;

use crate::{
    error::{MoundError, PipelineError, Stage},
    extrema::ExtremaDetector,
    mapping::{GridToGeographicMapper, Mound},
    smoothing::Smoother,
};

pub trait Detector {
    fn execute(&self, cloud: RawPointCloud) -> Result<Vec<Mound>, PipelineError>;
}

/// One configured run over a point cloud. Built by
/// [`MoundPipelineBuilder`](super::MoundPipelineBuilder).
///
/// `PipelineError::records` counts points up to and including gridding and
/// raster cells afterwards.
pub struct MoundPipeline {
    pub(crate) reprojector: CoordinateReprojector,
    pub(crate) filters: Vec<RegionFilter>,
    pub(crate) reconstructor: SurfaceReconstructor,
    pub(crate) smoother: Smoother,
    pub(crate) detector: ExtremaDetector,
    pub(crate) anchor: PixelAnchor,
}

fn filter_stage(filter: &RegionFilter) -> Stage {
    match filter {
        RegionFilter::Polygon(_) => Stage::PolygonFilter,
        RegionFilter::BoundingBox(_) => Stage::BoundingBoxFilter,
        RegionFilter::HeightBelow(_) => Stage::HeightFilter,
    }
}

impl Detector for MoundPipeline {
    fn execute(&self, cloud: RawPointCloud) -> Result<Vec<Mound>, PipelineError> {
        let total = cloud.len();

        let start = Instant::now();
        let mut points = self
            .reprojector
            .reproject(cloud)
            .map_err(|e| PipelineError::new(Stage::Reproject, total, e))?;
        log::info!("reprojected {} points in {:?}", points.len(), start.elapsed());

        for filter in &self.filters {
            let stage = filter_stage(filter);
            let before = points.len();
            points = filter.apply(points);
            log::info!("{}: kept {} of {} points", filter, points.len(), before);
            if points.is_empty() {
                return Err(PipelineError::new(
                    stage,
                    before,
                    MoundError::EmptyRegion {
                        filter: filter.to_string(),
                    },
                ));
            }
        }

        let scattered = points.len();
        let raster = self
            .reconstructor
            .reconstruct(points)
            .map_err(|e| PipelineError::new(Stage::Gridding, scattered, e))?;
        let cells = raster.len();

        let start = Instant::now();
        let smoothed = self
            .smoother
            .smooth(&raster)
            .map_err(|e| PipelineError::new(Stage::Smoothing, cells, e))?;
        log::info!(
            "smoothed {} cells (sigma {}) in {:?}",
            cells,
            self.smoother.sigma(),
            start.elapsed()
        );

        let peaks = self
            .detector
            .detect(&smoothed)
            .map_err(|e| PipelineError::new(Stage::ExtremaDetection, cells, e))?;
        log::info!(
            "found {} local maxima >= {}",
            peaks.len(),
            self.detector.threshold
        );

        if !smoothed.transform().is_invertible() {
            return Err(PipelineError::new(
                Stage::Mapping,
                peaks.len(),
                MoundError::DegenerateRaster(RasterError::DegenerateTransform(
                    *smoothed.transform(),
                )),
            ));
        }
        let mapper = GridToGeographicMapper::new(*smoothed.transform()).with_anchor(self.anchor);
        Ok(mapper.map_peaks(&peaks))
    }
}
