pub mod las;

use pcd_core::pointcloud::point::RawPointCloud;

use crate::error::ParseError;

/// Read-only provider of a raw point cloud.
pub trait PointCloudReader {
    fn read_cloud(&mut self) -> Result<RawPointCloud, ParseError>;
}
