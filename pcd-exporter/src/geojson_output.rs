use std::io::Write;

use mound_detector::Mound;
use serde_json::{json, Value};

use crate::ExportError;

pub fn to_feature_collection(mounds: &[Mound]) -> Value {
    let features: Vec<Value> = mounds
        .iter()
        .enumerate()
        .map(|(rank, m)| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.position.lon, m.position.lat],
                },
                "properties": {
                    "rank": rank,
                    "elevation": m.elevation,
                    "row": m.row,
                    "col": m.col,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub fn write_geojson<W: Write>(writer: W, mounds: &[Mound]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, &to_feature_collection(mounds))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample;

    #[test]
    fn features_are_points_in_rank_order() {
        let doc = to_feature_collection(&sample());
        assert_eq!(doc["type"], "FeatureCollection");
        let features = doc["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["type"], "Point");
        assert_eq!(
            features[0]["geometry"]["coordinates"],
            json!([-83.431234567, 39.372345678])
        );
        assert_eq!(features[0]["properties"]["elevation"], 649.25);
        assert_eq!(features[1]["properties"]["rank"], 1);
        assert_eq!(features[1]["properties"]["col"], 77);
    }

    #[test]
    fn written_document_parses_back() {
        let mut buf = Vec::new();
        write_geojson(&mut buf, &[]).unwrap();
        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["features"], json!([]));
    }
}
