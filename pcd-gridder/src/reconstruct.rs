use pcd_core::{pointcloud::point::SurveyPoint, raster::ElevationRaster};

use crate::{
    error::GriddingError,
    request::{GridAlgorithm, GridRequest, GridSize, Gridder},
};

/// Turns a filtered scatter set into a validated elevation raster.
pub struct SurfaceReconstructor {
    gridder: Box<dyn Gridder>,
    pub algorithm: GridAlgorithm,
    pub size: GridSize,
}

impl SurfaceReconstructor {
    pub fn new(gridder: Box<dyn Gridder>) -> Self {
        Self {
            gridder,
            algorithm: GridAlgorithm::default(),
            size: GridSize::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: GridAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_size(mut self, size: GridSize) -> Self {
        self.size = size;
        self
    }

    pub fn gridder_name(&self) -> &'static str {
        self.gridder.name()
    }

    /// Fails with [`GriddingError::Degenerate`] when the raster has zero
    /// extent, a non-invertible transform, or no finite cell.
    pub fn reconstruct(&self, points: Vec<SurveyPoint>) -> Result<ElevationRaster, GriddingError> {
        let start = std::time::Instant::now();
        let request = GridRequest {
            points: &points,
            algorithm: self.algorithm,
            size: self.size,
        };
        let raster = self.gridder.grid(&request)?;
        raster.validate()?;

        log::info!(
            "reconstructed {}x{} surface from {} points with {} in {:?}",
            raster.ncol(),
            raster.nrow(),
            points.len(),
            self.gridder.name(),
            start.elapsed()
        );
        Ok(raster)
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::raster::GeoTransform;

    use super::*;
    use crate::interpolate::InProcessGridder;

    struct FixedGridder(ElevationRaster);

    impl Gridder for FixedGridder {
        fn grid(&self, _request: &GridRequest<'_>) -> Result<ElevationRaster, GriddingError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn scatter() -> Vec<SurveyPoint> {
        vec![
            SurveyPoint::new(0.0, 0.0, 1.0),
            SurveyPoint::new(10.0, 0.0, 2.0),
            SurveyPoint::new(5.0, 10.0, 3.0),
        ]
    }

    #[test]
    fn in_process_reconstruction() {
        let reconstructor =
            SurfaceReconstructor::new(Box::new(InProcessGridder)).with_size(GridSize::new(8, 6));
        let raster = reconstructor.reconstruct(scatter()).unwrap();
        assert_eq!((raster.nrow(), raster.ncol()), (6, 8));
        assert_eq!(raster.finite_count(), 48);
        let (lo, hi) = raster.value_range().unwrap();
        assert!(lo >= 1.0 && hi <= 3.0);
    }

    #[test]
    fn all_nan_raster_is_degenerate() {
        let transform = GeoTransform::north_up(0.0, 10.0, 1.0, -1.0);
        let raster = ElevationRaster::new(2, 2, vec![f64::NAN; 4], transform).unwrap();
        let err = SurfaceReconstructor::new(Box::new(FixedGridder(raster)))
            .reconstruct(scatter())
            .unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn zero_extent_raster_is_degenerate() {
        let transform = GeoTransform::north_up(0.0, 10.0, 1.0, -1.0);
        let raster = ElevationRaster::new(0, 0, Vec::new(), transform).unwrap();
        let err = SurfaceReconstructor::new(Box::new(FixedGridder(raster)))
            .reconstruct(scatter())
            .unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn gridder_errors_pass_through() {
        let err = SurfaceReconstructor::new(Box::new(InProcessGridder))
            .reconstruct(Vec::new())
            .unwrap_err();
        assert!(matches!(err, GriddingError::EmptyScatter));
        assert!(!err.is_degenerate());
    }
}
