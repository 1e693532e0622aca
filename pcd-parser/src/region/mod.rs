//! Region-of-interest polygon loading.
//!
//! Accepts a GeoJSON `Polygon` geometry, a `Feature` holding one, or a
//! `FeatureCollection` whose first feature holds one. A bare object with a
//! `coordinates` member is read as a polygon. Only the exterior ring is used.

use std::{fs, path::Path};

use pcd_core::{pointcloud::point::GeoPoint, region::Polygon};
use serde_json::Value;

use crate::error::ParseError;

pub fn load_polygon(path: &Path) -> Result<Polygon, ParseError> {
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_polygon(&text)
}

pub fn parse_polygon(text: &str) -> Result<Polygon, ParseError> {
    let doc: Value = serde_json::from_str(text)?;
    polygon_from_geojson(&doc)
}

pub fn polygon_from_geojson(doc: &Value) -> Result<Polygon, ParseError> {
    match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let first = doc
                .get("features")
                .and_then(Value::as_array)
                .and_then(|features| features.first())
                .ok_or_else(|| ParseError::Geometry("feature collection is empty".into()))?;
            polygon_from_geojson(first)
        }
        Some("Feature") => {
            let geometry = doc
                .get("geometry")
                .ok_or_else(|| ParseError::Geometry("feature has no geometry".into()))?;
            polygon_from_geojson(geometry)
        }
        Some("Polygon") | None => exterior_ring(doc),
        Some(other) => Err(ParseError::Geometry(format!(
            "expected a Polygon, found {other}"
        ))),
    }
}

fn exterior_ring(geometry: &Value) -> Result<Polygon, ParseError> {
    let ring = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .and_then(|rings| rings.first())
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::Geometry("polygon has no exterior ring".into()))?;

    let vertices = ring
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let pair = position.as_array().filter(|p| p.len() >= 2);
            match pair.map(|p| (p[0].as_f64(), p[1].as_f64())) {
                Some((Some(lon), Some(lat))) => Ok(GeoPoint::new(lon, lat)),
                _ => Err(ParseError::Geometry(format!(
                    "vertex {i} is not a [lon, lat] pair"
                ))),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(vertices)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "Polygon",
        "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]
    }"#;

    #[test]
    fn polygon_geometry() {
        let polygon = parse_polygon(SQUARE).unwrap();
        assert_eq!(polygon.vertices().len(), 4);
        assert!(polygon.contains(5.0, 5.0));
    }

    #[test]
    fn feature_and_collection_wrappers() {
        let feature = format!(r#"{{"type": "Feature", "properties": {{}}, "geometry": {SQUARE}}}"#);
        assert_eq!(parse_polygon(&feature).unwrap(), parse_polygon(SQUARE).unwrap());

        let collection = format!(r#"{{"type": "FeatureCollection", "features": [{feature}]}}"#);
        assert_eq!(parse_polygon(&collection).unwrap(), parse_polygon(SQUARE).unwrap());
    }

    #[test]
    fn bare_coordinates_document() {
        let doc = r#"{"coordinates": [[[-83.43, 39.37], [-83.42, 39.37], [-83.42, 39.38]]]}"#;
        let polygon = parse_polygon(doc).unwrap();
        assert_eq!(polygon.vertices()[0], GeoPoint::new(-83.43, 39.37));
    }

    #[test]
    fn invalid_documents() {
        assert!(matches!(
            parse_polygon(r#"{"type": "Point", "coordinates": [1, 2]}"#),
            Err(ParseError::Geometry(_))
        ));
        assert!(matches!(
            parse_polygon(r#"{"type": "Polygon", "coordinates": [[[0, 0], ["a", 1], [1, 1]]]}"#),
            Err(ParseError::Geometry(_))
        ));
        assert!(matches!(
            parse_polygon(r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 1]]]}"#),
            Err(ParseError::Region(_))
        ));
        assert!(matches!(parse_polygon("not json"), Err(ParseError::Json(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.json");
        std::fs::write(&path, SQUARE).unwrap();
        assert!(load_polygon(&path).unwrap().contains(0.0, 5.0));
        assert!(matches!(
            load_polygon(&dir.path().join("missing.json")),
            Err(ParseError::Io { .. })
        ));
    }
}
