use std::path::PathBuf;

use las::{Reader, Transform, Vlr};
use pcd_core::pointcloud::point::RawPointCloud;

use super::PointCloudReader;
use crate::error::ParseError;

const PROJECTION_USER_ID: &str = "LASF_Projection";
const WKT_RECORD_ID: u16 = 2112;

/// Reads a whole LAS/LAZ file into a [`RawPointCloud`].
///
/// The integer records are recovered from the header transforms, and the
/// native CRS comes from the OGC WKT record (VLR or EVLR). Files that only
/// carry GeoTIFF keys get an empty descriptor; callers supply an override.
pub struct LasPointReader {
    pub path: PathBuf,
}

impl LasPointReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PointCloudReader for LasPointReader {
    fn read_cloud(&mut self) -> Result<RawPointCloud, ParseError> {
        let start = std::time::Instant::now();
        let mut reader = Reader::from_path(&self.path)?;
        let header = reader.header().clone();
        let transforms = header.transforms().clone();

        let capacity = usize::try_from(header.number_of_points()).unwrap_or(0);
        let mut x = Vec::with_capacity(capacity);
        let mut y = Vec::with_capacity(capacity);
        let mut z = Vec::with_capacity(capacity);

        for (index, las_point) in reader.points().enumerate() {
            let las_point = las_point?;
            let overflow = || ParseError::RawOverflow { index };
            x.push(raw_coordinate(las_point.x, &transforms.x).ok_or_else(overflow)?);
            y.push(raw_coordinate(las_point.y, &transforms.y).ok_or_else(overflow)?);
            z.push(raw_coordinate(las_point.z, &transforms.z).ok_or_else(overflow)?);
        }

        let wkt = find_wkt(header.vlrs().iter().chain(header.evlrs())).unwrap_or_default();
        if wkt.is_empty() {
            log::warn!("{:?} carries no WKT coordinate system record", self.path);
        }

        let mut cloud = RawPointCloud::new(
            x,
            y,
            z,
            [transforms.x.scale, transforms.y.scale, transforms.z.scale],
            wkt,
        )
        .with_offset([transforms.x.offset, transforms.y.offset, transforms.z.offset]);
        cloud
            .metadata
            .other
            .insert("source".to_string(), self.path.display().to_string());

        log::info!(
            "read {} points from {:?} in {:?}",
            cloud.len(),
            self.path,
            start.elapsed()
        );
        Ok(cloud)
    }
}

/// Inverse of the header transform: `(value - offset) / scale`, rounded.
pub fn raw_coordinate(value: f64, transform: &Transform) -> Option<i32> {
    let raw = ((value - transform.offset) / transform.scale).round();
    if raw.is_finite() && raw >= i32::MIN as f64 && raw <= i32::MAX as f64 {
        Some(raw as i32)
    } else {
        None
    }
}

/// First OGC WKT coordinate system record, NUL padding removed.
pub fn find_wkt<'a>(vlrs: impl IntoIterator<Item = &'a Vlr>) -> Option<String> {
    vlrs.into_iter()
        .filter(|vlr| vlr.user_id == PROJECTION_USER_ID && vlr.record_id == WKT_RECORD_ID)
        .map(|vlr| {
            String::from_utf8_lossy(&vlr.data)
                .trim_end_matches('\0')
                .trim()
                .to_string()
        })
        .find(|wkt| !wkt.is_empty())
}
