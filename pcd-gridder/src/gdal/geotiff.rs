use std::{fs::File, io::BufReader, path::Path};

use pcd_core::raster::{ElevationRaster, GeoTransform};
use tiff::{
    decoder::{Decoder, DecodingResult},
    tags::Tag,
};

use crate::error::GriddingError;

const MODEL_TRANSFORMATION_TAG: u16 = 34264;
const GDAL_NODATA_TAG: u16 = 42113;

/// Reads the first band of a single-image GeoTIFF as an [`ElevationRaster`].
///
/// Georeferencing comes from `ModelTransformationTag` when present, else from
/// `ModelPixelScaleTag` + `ModelTiepointTag`. Cells equal to the GDAL nodata
/// value become NaN.
pub fn read_geotiff(path: &Path) -> Result<ElevationRaster, GriddingError> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;
    let ncol = width as usize;
    let nrow = height as usize;

    let transform = read_transform(&mut decoder)?;
    let nodata = read_nodata(&mut decoder)?;

    let raw: Vec<f64> = match decoder.read_image()? {
        DecodingResult::F64(v) => v,
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        _ => return Err(GriddingError::UnsupportedSampleFormat),
    };

    // pixel-interleaved; keep band 0
    let cells = nrow * ncol;
    let bands = if cells == 0 { 1 } else { (raw.len() / cells).max(1) };
    let mut data: Vec<f64> = if bands > 1 {
        raw.into_iter().step_by(bands).take(cells).collect()
    } else {
        raw
    };

    if let Some(nodata) = nodata {
        for v in data.iter_mut() {
            if *v == nodata {
                *v = f64::NAN;
            }
        }
    }

    log::debug!(
        "read {}x{} GeoTIFF ({} band(s)) from {:?}",
        ncol,
        nrow,
        bands,
        path
    );
    Ok(ElevationRaster::new(nrow, ncol, data, transform)?)
}

fn read_transform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform, GriddingError> {
    if let Some(value) = decoder.find_tag(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION_TAG))? {
        let m = value.into_f64_vec()?;
        if m.len() >= 8 {
            return Ok(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]]));
        }
    }

    let scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)?
        .map(|v| v.into_f64_vec())
        .transpose()?;
    let tiepoint = decoder
        .find_tag(Tag::ModelTiepointTag)?
        .map(|v| v.into_f64_vec())
        .transpose()?;

    match (scale, tiepoint) {
        (Some(s), Some(t)) if s.len() >= 2 && t.len() >= 6 => {
            let origin_x = t[3] - t[0] * s[0];
            let origin_y = t[4] + t[1] * s[1];
            Ok(GeoTransform::north_up(origin_x, origin_y, s[0], -s[1]))
        }
        _ => Err(GriddingError::MissingGeoreference),
    }
}

fn read_nodata<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<Option<f64>, GriddingError> {
    let Some(value) = decoder.find_tag(Tag::from_u16_exhaustive(GDAL_NODATA_TAG))? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    let text = text.trim_end_matches('\0').trim();
    Ok(text.parse::<f64>().ok().filter(|v| !v.is_nan()))
}
