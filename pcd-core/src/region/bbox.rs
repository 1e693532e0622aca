use serde::{Deserialize, Serialize};

use crate::pointcloud::point::GeoPoint;

use super::RegionError;

/// Axis-aligned (lon, lat) box, inclusive on all four bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn new(
        lon_min: f64,
        lat_min: f64,
        lon_max: f64,
        lat_max: f64,
    ) -> Result<Self, RegionError> {
        let raw = [lon_min, lat_min, lon_max, lat_max];
        if raw.iter().any(|v| !v.is_finite()) || lon_min > lon_max || lat_min > lat_max {
            return Err(RegionError::InvalidBoundingBox(raw));
        }
        Ok(Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        })
    }

    /// Smallest box holding every point, `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    lon_min: p.lon,
                    lat_min: p.lat,
                    lon_max: p.lon,
                    lat_max: p.lat,
                },
                Some(b) => Self {
                    lon_min: b.lon_min.min(p.lon),
                    lat_min: b.lat_min.min(p.lat),
                    lon_max: b.lon_max.max(p.lon),
                    lat_max: b.lat_max.max(p.lat),
                },
            })
        })
    }

    /// Same box grown by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            lon_min: self.lon_min - margin,
            lat_min: self.lat_min - margin,
            lon_max: self.lon_max + margin,
            lat_max: self.lat_max + margin,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.lon_min <= lon && lon <= self.lon_max && self.lat_min <= lat && lat <= self.lat_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let bbox = BoundingBox::new(-83.0, 39.0, -82.0, 40.0).unwrap();
        assert!(bbox.contains(-83.0, 39.0));
        assert!(bbox.contains(-82.0, 40.0));
        assert!(bbox.contains(-82.5, 39.5));
        assert!(!bbox.contains(-81.9999, 39.5));
        assert!(!bbox.contains(-82.5, 38.9999));
    }

    #[test]
    fn inverted_box_is_rejected() {
        assert!(BoundingBox::new(1.0, 0.0, 0.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn enclosing_box() {
        let bbox = BoundingBox::enclosing([
            GeoPoint::new(1.0, 5.0),
            GeoPoint::new(-2.0, 3.0),
            GeoPoint::new(4.0, -1.0),
        ])
        .unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 4.0, 5.0).unwrap());
        assert!(BoundingBox::enclosing(std::iter::empty()).is_none());
    }
}
