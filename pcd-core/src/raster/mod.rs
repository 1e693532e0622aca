mod grid;
mod transform;

pub use grid::ElevationRaster;
pub use transform::{GeoTransform, PixelAnchor};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("raster data has {actual} samples, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("raster has zero extent ({nrow} x {ncol})")]
    ZeroExtent { nrow: usize, ncol: usize },
    #[error("raster transform covers no area: {0:?}")]
    DegenerateTransform(GeoTransform),
    #[error("all {0} raster cells are NaN or infinite")]
    NoFiniteCells(usize),
}
