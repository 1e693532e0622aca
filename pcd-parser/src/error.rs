use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("LAS error: {0}")]
    Las(#[from] las::Error),
    #[error("point {index} cannot be stored as a raw integer coordinate")]
    RawOverflow { index: usize },
    #[error("invalid region document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid region geometry: {0}")]
    Geometry(String),
    #[error(transparent)]
    Region(#[from] pcd_core::region::RegionError),
}
