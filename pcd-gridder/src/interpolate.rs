use pcd_core::{
    pointcloud::point::SurveyPoint,
    raster::{ElevationRaster, GeoTransform},
};
use rayon::{
    iter::{IndexedParallelIterator as _, ParallelIterator as _},
    slice::ParallelSliceMut as _,
};

use crate::{
    error::GriddingError,
    request::{GridAlgorithm, GridRequest, Gridder},
};

/// Squared distance below which a scatter point is taken as the cell value.
const COINCIDENT_DISTANCE_SQ: f64 = 1e-13;

/// In-process equivalent of `gdal_grid` for the supported algorithms.
///
/// The grid spans the scatter's bounding box, north-up, with its origin at
/// `(xmin, ymax)`. Cell values are evaluated at cell centers. Rows are
/// computed in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessGridder;

impl InProcessGridder {
    pub fn new() -> Self {
        Self
    }
}

impl Gridder for InProcessGridder {
    fn grid(&self, request: &GridRequest<'_>) -> Result<ElevationRaster, GriddingError> {
        let points = request.points;
        if points.is_empty() {
            return Err(GriddingError::EmptyScatter);
        }
        request.size.check()?;
        let (width, height) = (request.size.width, request.size.height);

        let (xmin, xmax, ymin, ymax) = extent(points);
        let dx = (xmax - xmin) / width as f64;
        let dy = (ymax - ymin) / height as f64;
        let transform = GeoTransform::north_up(xmin, ymax, dx, -dy);

        let mut data = vec![f64::NAN; width * height];
        data.par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, cells)| {
                let y = ymax - (row as f64 + 0.5) * dy;
                for (col, cell) in cells.iter_mut().enumerate() {
                    let x = xmin + (col as f64 + 0.5) * dx;
                    *cell = match request.algorithm {
                        GridAlgorithm::InverseDistance { power, smoothing } => {
                            inverse_distance(points, x, y, power, smoothing)
                        }
                        GridAlgorithm::NearestNeighbor => nearest(points, x, y),
                    };
                }
            });

        log::debug!(
            "gridded {} points to {}x{} with {}",
            points.len(),
            width,
            height,
            request.algorithm
        );
        Ok(ElevationRaster::new(height, width, data, transform)?)
    }

    fn name(&self) -> &'static str {
        "in-process"
    }
}

fn extent(points: &[SurveyPoint]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(xmin, xmax, ymin, ymax), p| (xmin.min(p.x), xmax.max(p.x), ymin.min(p.y), ymax.max(p.y)),
    )
}

fn inverse_distance(points: &[SurveyPoint], x: f64, y: f64, power: f64, smoothing: f64) -> f64 {
    let half_power = power / 2.0;
    let smoothing_sq = smoothing * smoothing;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for p in points {
        let d2 = (p.x - x).powi(2) + (p.y - y).powi(2) + smoothing_sq;
        if d2 < COINCIDENT_DISTANCE_SQ {
            return p.z;
        }
        let w = 1.0 / d2.powf(half_power);
        numerator += w * p.z;
        denominator += w;
    }

    if denominator > 0.0 {
        numerator / denominator
    } else {
        f64::NAN
    }
}

/// Ties go to the first point in input order.
fn nearest(points: &[SurveyPoint], x: f64, y: f64) -> f64 {
    let mut best = f64::INFINITY;
    let mut value = f64::NAN;
    for p in points {
        let d2 = (p.x - x).powi(2) + (p.y - y).powi(2);
        if d2 < best {
            best = d2;
            value = p.z;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::GridSize;

    fn corners() -> Vec<SurveyPoint> {
        vec![
            SurveyPoint::new(0.0, 0.0, 10.0),
            SurveyPoint::new(4.0, 0.0, 20.0),
            SurveyPoint::new(0.0, 4.0, 30.0),
            SurveyPoint::new(4.0, 4.0, 40.0),
        ]
    }

    #[test]
    fn grid_spans_scatter_extent_north_up() {
        let points = corners();
        let raster = InProcessGridder
            .grid(&GridRequest {
                points: &points,
                algorithm: GridAlgorithm::NearestNeighbor,
                size: GridSize::new(4, 2),
            })
            .unwrap();

        assert_eq!((raster.nrow(), raster.ncol()), (2, 4));
        assert_eq!(raster.transform().to_gdal(), [0.0, 1.0, 0.0, 4.0, 0.0, -2.0]);
        // top row is northern
        assert_eq!(raster.row(0), &[30.0, 30.0, 40.0, 40.0]);
        assert_eq!(raster.row(1), &[10.0, 10.0, 20.0, 20.0]);
    }

    #[test]
    fn inverse_distance_is_symmetric_at_center() {
        let points = corners();
        let raster = InProcessGridder
            .grid(&GridRequest {
                points: &points,
                algorithm: GridAlgorithm::default(),
                size: GridSize::new(1, 1),
            })
            .unwrap();
        assert!((raster[(0, 0)] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_point_value_is_returned() {
        let points = [SurveyPoint::new(1.0, 1.0, 7.0), SurveyPoint::new(5.0, 5.0, 100.0)];
        assert_eq!(inverse_distance(&points, 1.0, 1.0, 2.0, 0.0), 7.0);
        // smoothing moves the evaluation off the sample
        assert!(inverse_distance(&points, 1.0, 1.0, 2.0, 1.0) > 7.0);
    }

    #[test]
    fn nearest_ties_resolve_to_first_point() {
        let points = [SurveyPoint::new(0.0, 0.0, 1.0), SurveyPoint::new(2.0, 0.0, 2.0)];
        assert_eq!(nearest(&points, 1.0, 0.0), 1.0);
    }

    #[test]
    fn collinear_scatter_gives_degenerate_transform() {
        let points = [SurveyPoint::new(0.0, 0.0, 1.0), SurveyPoint::new(0.0, 5.0, 2.0)];
        let raster = InProcessGridder
            .grid(&GridRequest {
                points: &points,
                algorithm: GridAlgorithm::default(),
                size: GridSize::new(3, 3),
            })
            .unwrap();
        assert!(raster.validate().is_err());
    }

    #[test]
    fn empty_scatter() {
        assert!(matches!(
            InProcessGridder.grid(&GridRequest {
                points: &[],
                algorithm: GridAlgorithm::default(),
                size: GridSize::default(),
            }),
            Err(GriddingError::EmptyScatter)
        ));
    }
}
