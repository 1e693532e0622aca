//! Output sinks for detected mounds.

mod csv_output;
mod geojson_output;
mod shapefile_output;

use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use mound_detector::Mound;
use serde::{Deserialize, Serialize};

pub use csv_output::write_csv;
pub use geojson_output::{to_feature_collection, write_geojson};
pub use shapefile_output::{write_shapefile, WGS84_ESRI_WKT};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to write shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),
    #[error("{0}")]
    ShapefileField(String),
    #[error("{0} output is written to a path, not a stream")]
    NotStreamable(OutputFormat),
    #[error("unknown output format {0:?} (expected csv, geojson or shapefile)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    GeoJson,
    /// ESRI point shapefile with a WGS84 `.prj`.
    Shapefile,
}

impl OutputFormat {
    /// `.json` and `.geojson` select GeoJSON, `.shp` a shapefile; anything else CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json" | "geojson") => Self::GeoJson,
            Some("shp") => Self::Shapefile,
            _ => Self::Csv,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "geojson" | "json" => Ok(Self::GeoJson),
            "shapefile" | "shp" => Ok(Self::Shapefile),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::GeoJson => "geojson",
            Self::Shapefile => "shapefile",
        })
    }
}

/// One output row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoundRecord {
    pub lon: f64,
    pub lat: f64,
    pub elevation: f64,
    pub row: usize,
    pub col: usize,
}

impl From<&Mound> for MoundRecord {
    fn from(m: &Mound) -> Self {
        Self {
            lon: m.position.lon,
            lat: m.position.lat,
            elevation: m.elevation,
            row: m.row,
            col: m.col,
        }
    }
}

/// Streams CSV or GeoJSON. Shapefiles span several files and go through
/// [`export_to_path`].
pub fn write_mounds<W: Write>(
    writer: W,
    format: OutputFormat,
    mounds: &[Mound],
) -> Result<(), ExportError> {
    match format {
        OutputFormat::Csv => write_csv(writer, mounds),
        OutputFormat::GeoJson => write_geojson(writer, mounds),
        OutputFormat::Shapefile => Err(ExportError::NotStreamable(format)),
    }
}

/// Creates (or truncates) `path` and writes every mound to it. An empty slice
/// still produces a valid, empty document.
pub fn export_to_path(
    path: &Path,
    format: OutputFormat,
    mounds: &[Mound],
) -> Result<(), ExportError> {
    if format == OutputFormat::Shapefile {
        write_shapefile(path, mounds)?;
    } else {
        let io_err = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        write_mounds(&mut writer, format, mounds)?;
        writer.flush().map_err(io_err)?;
    }

    log::info!("wrote {} mounds to {:?} ({})", mounds.len(), path, format);
    Ok(())
}
