use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single survey record.
///
/// Before reprojection `x`/`y` hold native easting/northing; after
/// reprojection they hold longitude/latitude in decimal degrees. `z` is
/// always the scaled elevation and is never reprojected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurveyPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SurveyPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn lon(&self) -> f64 {
        self.x
    }

    pub fn lat(&self) -> f64 {
        self.y
    }

    pub fn elevation(&self) -> f64 {
        self.z
    }

    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.x, self.y)
    }
}

/// WGS84 longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

// LAS data coordinates are expressed as i32 records.
// The actual coordinates are calculated based on a combination of scale and offset, as follows
// x = (X * scale[0]) + offset[0]
#[derive(Debug, Clone)]
pub struct RawPointCloud {
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    pub z: Vec<i32>,
    pub metadata: Metadata,
}

impl RawPointCloud {
    pub fn new(
        x: Vec<i32>,
        y: Vec<i32>,
        z: Vec<i32>,
        scale: [f64; 3],
        coordinate_system: impl Into<String>,
    ) -> Self {
        let metadata = Metadata {
            point_count: x.len(),
            scale,
            offset: [0.0; 3],
            coordinate_system: coordinate_system.into(),
            other: HashMap::new(),
        };
        Self { x, y, z, metadata }
    }

    pub fn with_offset(mut self, offset: [f64; 3]) -> Self {
        self.metadata.offset = offset;
        self
    }

    /// Lengths of the X, Y and Z arrays, in that order.
    pub fn lengths(&self) -> [usize; 3] {
        [self.x.len(), self.y.len(), self.z.len()]
    }

    pub fn is_consistent(&self) -> bool {
        self.x.len() == self.y.len() && self.y.len() == self.z.len()
    }

    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len()).min(self.z.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scaled native coordinates, in record order.
    ///
    /// Stops at the shortest of the three arrays; check [`Self::is_consistent`] first.
    pub fn iter_scaled(&self) -> impl Iterator<Item = SurveyPoint> + '_ {
        let scale = self.metadata.scale;
        let offset = self.metadata.offset;
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(move |((&x, &y), &z)| SurveyPoint {
                x: x as f64 * scale[0] + offset[0],
                y: y as f64 * scale[1] + offset[1],
                z: z as f64 * scale[2] + offset[2],
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub scale: [f64; 3],
    pub offset: [f64; 3],
    /// Native CRS descriptor: WKT or any string PROJ accepts (e.g. `EPSG:3735`).
    pub coordinate_system: String,
    pub other: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_is_componentwise() {
        let cloud = RawPointCloud::new(
            vec![100, 200],
            vec![300, 400],
            vec![65000, 65100],
            [0.01, 0.01, 0.01],
            "EPSG:3735",
        );
        let scaled: Vec<SurveyPoint> = cloud.iter_scaled().collect();
        assert_eq!(scaled.len(), 2);
        assert!((scaled[0].x - 1.0).abs() < 1e-12);
        assert!((scaled[1].y - 4.0).abs() < 1e-12);
        assert!((scaled[1].z - 651.0).abs() < 1e-9);
    }

    #[test]
    fn offset_is_added_after_scaling() {
        let cloud = RawPointCloud::new(vec![10], vec![20], vec![30], [0.5, 0.5, 0.1], "")
            .with_offset([1000.0, 2000.0, 100.0]);
        let p = cloud.iter_scaled().next().unwrap();
        assert_eq!(p, SurveyPoint::new(1005.0, 2010.0, 103.0));
    }

    #[test]
    fn inconsistent_lengths_are_reported() {
        let cloud = RawPointCloud::new(vec![1, 2], vec![1], vec![1, 2], [1.0; 3], "");
        assert!(!cloud.is_consistent());
        assert_eq!(cloud.lengths(), [2, 1, 2]);
        assert_eq!(cloud.len(), 1);
    }
}
