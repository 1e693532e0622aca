use pcd_core::pointcloud::point::{RawPointCloud, SurveyPoint};
use proj_sys_transformer::ProjOptions;

use crate::{error::ProjectionError, transformer::PointTransformer};

/// Scales raw cloud records and reprojects them to WGS84 (lon, lat).
///
/// Elevations are scaled but never reprojected. Record order and count are
/// preserved.
#[derive(Debug, Clone, Default)]
pub struct CoordinateReprojector {
    options: ProjOptions,
    source_crs: Option<String>,
    identity: bool,
}

impl CoordinateReprojector {
    pub fn new(options: ProjOptions) -> Self {
        Self {
            options,
            source_crs: None,
            identity: false,
        }
    }

    /// For clouds whose scaled coordinates are already (lon, lat).
    pub fn identity() -> Self {
        Self {
            identity: true,
            ..Self::default()
        }
    }

    /// Use `crs` instead of the descriptor stored in the cloud.
    pub fn with_source_crs(mut self, crs: impl Into<String>) -> Self {
        self.source_crs = Some(crs.into());
        self
    }

    pub fn transformer_for(
        &self,
        cloud: &RawPointCloud,
    ) -> Result<PointTransformer, ProjectionError> {
        if self.identity {
            return Ok(PointTransformer::Identity);
        }
        let source = self
            .source_crs
            .as_deref()
            .unwrap_or(&cloud.metadata.coordinate_system);
        PointTransformer::to_wgs84(source, &self.options)
    }

    pub fn reproject(&self, cloud: RawPointCloud) -> Result<Vec<SurveyPoint>, ProjectionError> {
        if !cloud.is_consistent() {
            let [x, y, z] = cloud.lengths();
            return Err(ProjectionError::ShapeMismatch { x, y, z });
        }

        let mut transformer = self.transformer_for(&cloud)?;
        let mut points: Vec<SurveyPoint> = cloud.iter_scaled().collect();
        transformer.transform_points_in_place(&mut points)?;

        log::debug!(
            "reprojected {} points (scale {:?}, offset {:?})",
            points.len(),
            cloud.metadata.scale,
            cloud.metadata.offset
        );
        Ok(points)
    }
}
