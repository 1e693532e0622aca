mod error;
mod reprojector;
mod transformer;

pub use error::ProjectionError;
pub use proj_sys_transformer::{Direction, ProjError, ProjOptions};
pub use reprojector::CoordinateReprojector;
pub use transformer::{PointTransformer, WGS84_GEOGRAPHIC};
