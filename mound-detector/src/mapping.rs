use pcd_core::{
    pointcloud::point::GeoPoint,
    raster::{GeoTransform, PixelAnchor},
};

use crate::extrema::Peak;

/// A detected mound: where it is and how high the smoothed surface is there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mound {
    pub position: GeoPoint,
    pub elevation: f64,
    pub row: usize,
    pub col: usize,
}

/// Converts raster cell indices to geographic coordinates and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridToGeographicMapper {
    transform: GeoTransform,
    anchor: PixelAnchor,
}

impl GridToGeographicMapper {
    pub fn new(transform: GeoTransform) -> Self {
        Self {
            transform,
            anchor: PixelAnchor::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: PixelAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn anchor(&self) -> PixelAnchor {
        self.anchor
    }

    pub fn map(&self, row: usize, col: usize) -> GeoPoint {
        let a = self.anchor.offset();
        let (lon, lat) = self.transform.apply(col as f64 + a, row as f64 + a);
        GeoPoint::new(lon, lat)
    }

    /// Nearest cell to `(lon, lat)`. `None` if the transform is singular or the
    /// position falls before the first row or column.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let (col, row) = self.transform.invert(lon, lat)?;
        let a = self.anchor.offset();
        let (col, row) = ((col - a).round(), (row - a).round());
        if !(col.is_finite() && row.is_finite()) || col < 0.0 || row < 0.0 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    pub fn map_peaks(&self, peaks: &[Peak]) -> Vec<Mound> {
        peaks
            .iter()
            .map(|p| Mound {
                position: self.map(p.row, p.col),
                elevation: p.value,
                row: p.row,
                col: p.col,
            })
            .collect()
    }
}
