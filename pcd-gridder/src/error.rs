use std::{path::PathBuf, time::Duration};

use pcd_core::raster::RasterError;

#[derive(Debug, thiserror::Error)]
pub enum GriddingError {
    #[error("no scatter points to grid")]
    EmptyScatter,
    #[error("invalid grid size {width} x {height}")]
    InvalidSize { width: usize, height: usize },
    #[error("failed to write scatter exchange files: {0}")]
    Exchange(#[from] std::io::Error),
    #[error("failed to write scatter CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for {program:?}: {source}")]
    Wait {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{program:?} exited with {status}: {stderr}")]
    ExitStatus {
        program: PathBuf,
        status: String,
        stderr: String,
    },
    #[error("{program:?} did not finish within {timeout:?}")]
    Timeout { program: PathBuf, timeout: Duration },
    #[error("gridding produced no raster at {0:?}")]
    NoOutput(PathBuf),
    #[error("failed to decode gridded GeoTIFF: {0}")]
    GeoTiff(#[from] tiff::TiffError),
    #[error("gridded GeoTIFF has no georeferencing tags")]
    MissingGeoreference,
    #[error("unsupported GeoTIFF sample format")]
    UnsupportedSampleFormat,
    #[error("degenerate raster: {0}")]
    Degenerate(#[from] RasterError),
}

impl GriddingError {
    /// Failures worth a second attempt of the external tool.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ExitStatus { .. } | Self::Timeout { .. } | Self::NoOutput(_)
        )
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }
}
