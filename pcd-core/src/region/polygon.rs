use crate::pointcloud::point::GeoPoint;

use super::{BoundingBox, RegionError};

/// Points closer than this to an edge (in coordinate units) count as on the boundary.
pub const EDGE_TOLERANCE: f64 = 1e-12;

/// Closed region-of-interest ring in (lon, lat).
///
/// Containment uses the even-odd crossing rule. Points on an edge or a
/// vertex are inside.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<GeoPoint>,
    bounds: BoundingBox,
    // bounds grown so points within EDGE_TOLERANCE of an edge pass the precheck
    reach: BoundingBox,
}

impl Polygon {
    pub fn new(mut vertices: Vec<GeoPoint>) -> Result<Self, RegionError> {
        if let Some(index) = vertices
            .iter()
            .position(|v| !v.lon.is_finite() || !v.lat.is_finite())
        {
            return Err(RegionError::NonFiniteVertex { index });
        }

        vertices.dedup();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(RegionError::DegeneratePolygon(vertices.len()));
        }

        let bounds = BoundingBox::enclosing(vertices.iter().copied())
            .ok_or(RegionError::DegeneratePolygon(0))?;

        // a point may sit EDGE_TOLERANCE off the line and EDGE_TOLERANCE past
        // an endpoint, so each axis can overshoot by up to sqrt(2) of it
        let reach = bounds.expanded(2.0 * EDGE_TOLERANCE);

        Ok(Self {
            vertices,
            bounds,
            reach,
        })
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self, RegionError> {
        Self::new(
            coords
                .iter()
                .map(|&(lon, lat)| GeoPoint::new(lon, lat))
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if !self.reach.contains(lon, lat) {
            return false;
        }

        let v = &self.vertices;
        let mut inside = false;
        let mut j = v.len() - 1;
        for i in 0..v.len() {
            let (a, b) = (v[j], v[i]);
            if on_segment(a, b, lon, lat) {
                return true;
            }
            if (b.lat > lat) != (a.lat > lat) {
                let x_cross = b.lon + (lat - b.lat) * (a.lon - b.lon) / (a.lat - b.lat);
                if lon < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn on_segment(a: GeoPoint, b: GeoPoint, x: f64, y: f64) -> bool {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let len = dx.hypot(dy);

    // |cross| / len is the perpendicular distance to the supporting line
    let cross = dx * (y - a.lat) - dy * (x - a.lon);
    if cross.abs() > EDGE_TOLERANCE * len {
        return false;
    }

    let dot = (x - a.lon) * dx + (y - a.lat) * dy;
    let slack = EDGE_TOLERANCE * len;
    dot >= -slack && dot <= len * len + slack
}
