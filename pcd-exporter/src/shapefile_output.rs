use std::{fs, path::Path};

use mound_detector::Mound;
use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, Writer,
};

use crate::ExportError;

/// ESRI flavour of WGS84 geographic coordinates, written as the `.prj` sidecar.
pub const WGS84_ESRI_WKT: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",\
SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],PRIMEM[\"Greenwich\",0.0],\
UNIT[\"Degree\",0.0174532925199433]]";

fn field(name: &str) -> Result<FieldName, ExportError> {
    FieldName::try_from(name)
        .map_err(|e| ExportError::ShapefileField(format!("invalid field name {name:?}: {e:?}")))
}

/// Point shapefile (`.shp`, `.shx`, `.dbf`) plus a WGS84 `.prj` next to `path`.
///
/// The attribute table carries `RANK`, `ELEVATION`, `ROW` and `COL`.
pub fn write_shapefile(path: &Path, mounds: &[Mound]) -> Result<(), ExportError> {
    let table = TableWriterBuilder::new()
        .add_numeric_field(field("RANK")?, 10, 0)
        .add_numeric_field(field("ELEVATION")?, 16, 4)
        .add_numeric_field(field("ROW")?, 10, 0)
        .add_numeric_field(field("COL")?, 10, 0);

    let shp_path = path.with_extension("shp");
    {
        let mut writer = Writer::from_path(&shp_path, table)?;
        for (rank, mound) in mounds.iter().enumerate() {
            let point = Point::new(mound.position.lon, mound.position.lat);
            let mut record = Record::default();
            record.insert("RANK".to_string(), FieldValue::Numeric(Some(rank as f64)));
            record.insert(
                "ELEVATION".to_string(),
                FieldValue::Numeric(Some(mound.elevation)),
            );
            record.insert("ROW".to_string(), FieldValue::Numeric(Some(mound.row as f64)));
            record.insert("COL".to_string(), FieldValue::Numeric(Some(mound.col as f64)));
            writer.write_shape_and_record(&point, &record)?;
        }
        // headers are patched with the final extent when the writer drops
    }

    let prj_path = path.with_extension("prj");
    fs::write(&prj_path, WGS84_ESRI_WKT).map_err(|source| ExportError::Io {
        path: prj_path,
        source,
    })?;
    Ok(())
}
