mod bbox;
pub mod filter;
mod polygon;

pub use bbox::BoundingBox;
pub use filter::RegionFilter;
pub use polygon::Polygon;

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("polygon needs at least 3 distinct vertices, got {0}")]
    DegeneratePolygon(usize),
    #[error("polygon vertex {index} is not finite")]
    NonFiniteVertex { index: usize },
    #[error("bounding box is inverted or not finite: {0:?}")]
    InvalidBoundingBox([f64; 4]),
}
