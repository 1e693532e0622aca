//! Spatial triage over survey records.
//!
//! Every function returns indices (or records) in ascending original order and
//! leaves its input untouched.

use std::fmt;

use crate::pointcloud::point::SurveyPoint;

use super::{BoundingBox, Polygon};

pub fn indices_in_polygon(points: &[SurveyPoint], polygon: &Polygon) -> Vec<usize> {
    select(points, |p| polygon.contains(p.lon(), p.lat()))
}

pub fn indices_in_bbox(points: &[SurveyPoint], bbox: &BoundingBox) -> Vec<usize> {
    select(points, |p| bbox.contains(p.lon(), p.lat()))
}

/// Indices where `value < cutoff`.
///
/// Strict comparison: used to drop tall vertical features (canopy). Not to be
/// confused with the `>=` threshold of peak detection.
pub fn indices_below(values: &[f64], cutoff: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v < cutoff)
        .map(|(i, _)| i)
        .collect()
}

fn select<F: Fn(&SurveyPoint) -> bool>(points: &[SurveyPoint], keep: F) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| keep(p))
        .map(|(i, _)| i)
        .collect()
}

/// One triage step applied to an owned record sequence.
#[derive(Debug, Clone)]
pub enum RegionFilter {
    Polygon(Polygon),
    BoundingBox(BoundingBox),
    /// Keep records whose elevation is strictly below the cutoff.
    HeightBelow(f64),
}

impl RegionFilter {
    pub fn indices(&self, points: &[SurveyPoint]) -> Vec<usize> {
        match self {
            Self::Polygon(polygon) => indices_in_polygon(points, polygon),
            Self::BoundingBox(bbox) => indices_in_bbox(points, bbox),
            Self::HeightBelow(cutoff) => select(points, |p| p.elevation() < *cutoff),
        }
    }

    pub fn apply(&self, points: Vec<SurveyPoint>) -> Vec<SurveyPoint> {
        let keep = self.indices(&points);
        if keep.len() == points.len() {
            return points;
        }
        keep.into_iter().map(|i| points[i]).collect()
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polygon(polygon) => write!(f, "polygon ({} vertices)", polygon.vertices().len()),
            Self::BoundingBox(b) => write!(
                f,
                "bbox ({}, {}, {}, {})",
                b.lon_min, b.lat_min, b.lon_max, b.lat_max
            ),
            Self::HeightBelow(cutoff) => write!(f, "height < {cutoff}"),
        }
    }
}
