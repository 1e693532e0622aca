use std::io::Write;

use mound_detector::Mound;

use crate::{ExportError, MoundRecord};

/// `lon,lat,elevation,row,col`, header always written.
pub fn write_csv<W: Write>(writer: W, mounds: &[Mound]) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(["lon", "lat", "elevation", "row", "col"])?;
    for mound in mounds {
        writer.serialize(MoundRecord::from(mound))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
