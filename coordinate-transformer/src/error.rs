use proj_sys_transformer::ProjError;

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("point cloud has no coordinate system descriptor")]
    MissingDescriptor,
    #[error(transparent)]
    Proj(#[from] ProjError),
    #[error("coordinate arrays differ in length: x={x}, y={y}, z={z}")]
    ShapeMismatch { x: usize, y: usize, z: usize },
}
