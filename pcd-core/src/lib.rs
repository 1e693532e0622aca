pub mod pointcloud;
pub mod raster;
pub mod region;
