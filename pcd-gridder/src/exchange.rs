use std::{
    fs,
    path::{Path, PathBuf},
};

use pcd_core::pointcloud::point::SurveyPoint;
use tempfile::TempDir;

use crate::error::GriddingError;

/// OGR layer name the VRT exposes.
pub const LAYER_NAME: &str = "dem";

const CSV_FILE: &str = "dem.csv";
const VRT_FILE: &str = "dem.vrt";
const OUTPUT_FILE: &str = "surface.tif";
const LOG_FILE: &str = "gdal_grid.log";

/// Scratch directory holding the scatter CSV, its VRT descriptor and the
/// gridded output.
///
/// The directory and everything in it is removed when the value is dropped,
/// whether gridding succeeded or not.
#[derive(Debug)]
pub struct ScatterExchange {
    dir: TempDir,
    csv_path: PathBuf,
    vrt_path: PathBuf,
}

impl ScatterExchange {
    /// Writes the exchange files under `work_root` (system temp dir if `None`).
    pub fn create(points: &[SurveyPoint], work_root: Option<&Path>) -> Result<Self, GriddingError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("mound-grid-");
        let dir = match work_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let csv_path = dir.path().join(CSV_FILE);
        let vrt_path = dir.path().join(VRT_FILE);

        write_scatter_csv(&csv_path, points)?;
        fs::write(&vrt_path, vrt_document(&csv_path))?;

        log::debug!(
            "wrote {} scatter points to {:?}",
            points.len(),
            dir.path()
        );
        Ok(Self {
            dir,
            csv_path,
            vrt_path,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn vrt_path(&self) -> &Path {
        &self.vrt_path
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join(LOG_FILE)
    }

    /// Removes the directory now, reporting any I/O error instead of ignoring it.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

/// `Easting,Northing,Elevation` with shortest round-trip float formatting.
fn write_scatter_csv(path: &Path, points: &[SurveyPoint]) -> Result<(), GriddingError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Easting", "Northing", "Elevation"])?;
    for p in points {
        writer.serialize((p.x, p.y, p.z))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn vrt_document(csv_path: &Path) -> String {
    let source = xml_escape(&csv_path.to_string_lossy());
    format!(
        "<OGRVRTDataSource>\n\
         \x20 <OGRVRTLayer name=\"{LAYER_NAME}\">\n\
         \x20   <SrcDataSource>{source}</SrcDataSource>\n\
         \x20   <GeometryType>wkbPoint</GeometryType>\n\
         \x20   <GeometryField encoding=\"PointFromColumns\" x=\"Easting\" y=\"Northing\" z=\"Elevation\"/>\n\
         \x20 </OGRVRTLayer>\n\
         </OGRVRTDataSource>\n"
    )
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_files_are_written_and_removed() {
        let root = tempfile::tempdir().unwrap();
        let points = [
            SurveyPoint::new(-83.4312345678901, 39.37, 650.125),
            SurveyPoint::new(-83.43, 39.3712, 651.0),
        ];

        let exchange = ScatterExchange::create(&points, Some(root.path())).unwrap();
        let dir = exchange.dir().to_path_buf();
        assert!(dir.starts_with(root.path()));

        let csv = fs::read_to_string(exchange.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Easting,Northing,Elevation");
        assert_eq!(lines.len(), 3);
        let first: Vec<f64> = lines[1].split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(first, vec![points[0].x, points[0].y, points[0].z]);

        let vrt = fs::read_to_string(exchange.vrt_path()).unwrap();
        assert!(vrt.contains("<OGRVRTLayer name=\"dem\">"));
        assert!(vrt.contains("x=\"Easting\" y=\"Northing\" z=\"Elevation\""));
        assert!(vrt.contains("dem.csv</SrcDataSource>"));

        drop(exchange);
        assert!(!dir.exists());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn source_path_is_escaped() {
        let doc = vrt_document(Path::new("/tmp/a&b<c>.csv"));
        assert!(doc.contains("<SrcDataSource>/tmp/a&amp;b&lt;c&gt;.csv</SrcDataSource>"));
    }
}
