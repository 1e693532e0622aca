use std::ops::Index;

use super::{GeoTransform, RasterError};

/// Row-major elevation grid with its georeferencing.
///
/// NaN marks cells without data. The transform is fixed at construction;
/// derived rasters (see [`ElevationRaster::with_values`]) inherit it unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationRaster {
    nrow: usize,
    ncol: usize,
    data: Vec<f64>,
    transform: GeoTransform,
}

impl ElevationRaster {
    pub fn new(
        nrow: usize,
        ncol: usize,
        data: Vec<f64>,
        transform: GeoTransform,
    ) -> Result<Self, RasterError> {
        if data.len() != nrow * ncol {
            return Err(RasterError::SizeMismatch {
                expected: nrow * ncol,
                actual: data.len(),
            });
        }
        Ok(Self {
            nrow,
            ncol,
            data,
            transform,
        })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>], transform: GeoTransform) -> Result<Self, RasterError> {
        let nrow = rows.len();
        let ncol = rows.first().map_or(0, Vec::len);
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(nrow, ncol, data, transform)
    }

    pub fn nrow(&self) -> usize {
        self.nrow
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.nrow && col < self.ncol {
            Some(self.data[row * self.ncol + col])
        } else {
            None
        }
    }

    /// Finite value at a signed position; NaN and out-of-range both yield `None`.
    #[inline]
    pub fn get_finite(&self, row: isize, col: isize) -> Option<f64> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize).filter(|v| v.is_finite())
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.ncol..(row + 1) * self.ncol]
    }

    pub fn finite_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    /// (min, max) over finite cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Same shape and transform, new samples.
    pub fn with_values(&self, data: Vec<f64>) -> Result<Self, RasterError> {
        Self::new(self.nrow, self.ncol, data, self.transform)
    }

    /// Checks that the raster covers a real area and holds at least one finite sample.
    pub fn validate(&self) -> Result<(), RasterError> {
        if self.nrow == 0 || self.ncol == 0 {
            return Err(RasterError::ZeroExtent {
                nrow: self.nrow,
                ncol: self.ncol,
            });
        }
        if !self.transform.is_finite() || !self.transform.is_invertible() {
            return Err(RasterError::DegenerateTransform(self.transform));
        }
        if self.finite_count() == 0 {
            return Err(RasterError::NoFiniteCells(self.len()));
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for ElevationRaster {
    type Output = f64;
    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        &self.data[r * self.ncol + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> GeoTransform {
        GeoTransform::north_up(0.0, 3.0, 1.0, -1.0)
    }

    #[test]
    fn size_must_match() {
        let err = ElevationRaster::new(2, 2, vec![1.0; 3], transform()).unwrap_err();
        assert!(matches!(
            err,
            RasterError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn accessors() {
        let rows = [vec![1.0, 2.0, 3.0], vec![4.0, f64::NAN, 6.0]];
        let raster = ElevationRaster::from_rows(&rows, transform()).unwrap();
        assert_eq!(raster.nrow(), 2);
        assert_eq!(raster.ncol(), 3);
        assert_eq!(raster[(1, 2)], 6.0);
        assert_eq!(raster.get(2, 0), None);
        assert_eq!(raster.get_finite(1, 1), None);
        assert_eq!(raster.get_finite(-1, 0), None);
        assert_eq!(raster.get_finite(0, 1), Some(2.0));
        assert_eq!(raster.row(1)[0], 4.0);
        assert_eq!(raster.finite_count(), 5);
        assert_eq!(raster.value_range(), Some((1.0, 6.0)));
    }

    #[test]
    fn derived_raster_keeps_transform() {
        let raster = ElevationRaster::new(1, 2, vec![1.0, 2.0], transform()).unwrap();
        let derived = raster.with_values(vec![5.0, 6.0]).unwrap();
        assert_eq!(derived.transform(), raster.transform());
        assert!(raster.with_values(vec![1.0]).is_err());
    }

    #[test]
    fn validation() {
        let empty = ElevationRaster::new(0, 0, vec![], transform()).unwrap();
        assert!(matches!(empty.validate(), Err(RasterError::ZeroExtent { .. })));

        let nan = ElevationRaster::new(1, 2, vec![f64::NAN; 2], transform()).unwrap();
        assert!(matches!(nan.validate(), Err(RasterError::NoFiniteCells(2))));

        let flat = GeoTransform::north_up(0.0, 0.0, 0.0, -1.0);
        let collapsed = ElevationRaster::new(1, 1, vec![1.0], flat).unwrap();
        assert!(matches!(
            collapsed.validate(),
            Err(RasterError::DegenerateTransform(_))
        ));

        let ok = ElevationRaster::new(1, 1, vec![1.0], transform()).unwrap();
        assert!(ok.validate().is_ok());
    }
}
