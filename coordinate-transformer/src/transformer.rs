use pcd_core::pointcloud::point::SurveyPoint;
use proj_sys_transformer::{Direction, ProjOptions, ProjTransformer};

use crate::error::ProjectionError;

/// WGS84 geographic 2D; axis order is normalized to (lon, lat).
pub const WGS84_GEOGRAPHIC: &str = "EPSG:4326";

pub enum PointTransformer {
    Identity,
    Proj(ProjTransformer),
}

impl PointTransformer {
    pub fn new(source: &str, target: &str, options: &ProjOptions) -> Result<Self, ProjectionError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ProjectionError::MissingDescriptor);
        }
        if source == target.trim() {
            return Ok(Self::Identity);
        }

        Ok(Self::Proj(ProjTransformer::new(source, target, options)?))
    }

    pub fn to_wgs84(source: &str, options: &ProjOptions) -> Result<Self, ProjectionError> {
        Self::new(source, WGS84_GEOGRAPHIC, options)
    }

    pub fn transform_points_in_place(
        &mut self,
        points: &mut [SurveyPoint],
    ) -> Result<(), ProjectionError> {
        self.run(points, Direction::Forward)
    }

    pub fn inverse_points_in_place(
        &mut self,
        points: &mut [SurveyPoint],
    ) -> Result<(), ProjectionError> {
        self.run(points, Direction::Inverse)
    }

    fn run(
        &mut self,
        points: &mut [SurveyPoint],
        direction: Direction,
    ) -> Result<(), ProjectionError> {
        match self {
            Self::Identity => Ok(()),
            Self::Proj(t) => t
                .transform_xy_in_place(points, direction)
                .map_err(ProjectionError::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform() {
        let mut transformer =
            PointTransformer::new(WGS84_GEOGRAPHIC, WGS84_GEOGRAPHIC, &ProjOptions::default())
                .unwrap();
        assert!(matches!(transformer, PointTransformer::Identity));
        let mut points = vec![SurveyPoint::new(1.0, 2.0, 3.0)];
        transformer.transform_points_in_place(&mut points).unwrap();
        transformer.inverse_points_in_place(&mut points).unwrap();
        assert_eq!(points[0], SurveyPoint::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_descriptor_is_rejected() {
        let result = PointTransformer::to_wgs84("  ", &ProjOptions::default());
        assert!(matches!(result, Err(ProjectionError::MissingDescriptor)));
    }

    #[test]
    fn unparseable_descriptor_is_a_projection_error() {
        let result = PointTransformer::to_wgs84("PROJCS[\"broken\"", &ProjOptions::default());
        assert!(matches!(result, Err(ProjectionError::Proj(_))));
    }
}
