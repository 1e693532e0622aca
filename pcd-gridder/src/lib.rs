//! Scatter-to-raster reconstruction.
//!
//! [`Gridder`] is the narrow seam to the gridding engine: scatter points in,
//! georeferenced raster out. [`GdalGridCommand`] drives the external
//! `gdal_grid` tool; [`InProcessGridder`] implements the same algorithms
//! in-process. [`SurfaceReconstructor`] wraps either and validates the result.

pub mod error;
pub mod exchange;
pub mod gdal;
pub mod interpolate;
pub mod reconstruct;
pub mod request;

pub use error::GriddingError;
pub use exchange::ScatterExchange;
pub use gdal::GdalGridCommand;
pub use interpolate::InProcessGridder;
pub use reconstruct::SurfaceReconstructor;
pub use request::{GridAlgorithm, GridRequest, GridSize, Gridder};
