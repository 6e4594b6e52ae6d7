//! String ↔ `GeoJSON` conversion at the store boundary.
//!
//! `PostGIS` hands geometries back as `ST_AsGeoJSON` text. They are parsed
//! exactly once, here, into JSON values; everything above this module
//! works with the parsed form.

use ::geojson::GeoJson;

/// Decodes a stored `GeoJSON` geometry string.
///
/// Returns `None` for a `NULL` column. Malformed text, or text that is
/// valid JSON but not a `GeoJSON` geometry, is logged and also decoded as
/// `None` so one bad row never fails a whole result set.
#[must_use]
pub fn decode_geometry(
    parcel_id: &str,
    column: &str,
    raw: Option<&str>,
) -> Option<serde_json::Value> {
    let raw = raw?;

    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Malformed GeoJSON in {column} for parcel {parcel_id}: {e}");
            return None;
        }
    };

    match GeoJson::from_json_value(value.clone()) {
        Ok(GeoJson::Geometry(_)) => Some(value),
        Ok(_) => {
            log::warn!("{column} for parcel {parcel_id} is GeoJSON but not a geometry");
            None
        }
        Err(e) => {
            log::warn!("Invalid GeoJSON geometry in {column} for parcel {parcel_id}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_point_geometry() {
        let value = decode_geometry(
            "P-1",
            "centroid",
            Some(r#"{"type":"Point","coordinates":[1,2]}"#),
        )
        .unwrap();

        assert_eq!(value["type"], "Point");
        assert_eq!(value["coordinates"], serde_json::json!([1, 2]));
    }

    #[test]
    fn null_column_decodes_to_none() {
        assert!(decode_geometry("P-1", "geom", None).is_none());
    }

    #[test]
    fn malformed_json_decodes_to_none() {
        assert!(decode_geometry("P-1", "geom", Some("{\"type\":\"Polygon\"")).is_none());
    }

    #[test]
    fn non_geometry_json_decodes_to_none() {
        assert!(decode_geometry("P-1", "geom", Some(r#"{"hello":"world"}"#)).is_none());
        assert!(decode_geometry("P-1", "geom", Some("42")).is_none());
    }

    #[test]
    fn decoded_geometry_reserializes_equivalently() {
        let raw = r#"{"type":"Polygon","coordinates":[[[-119.3,46.2],[-119.1,46.2],[-119.1,46.3],[-119.3,46.2]]]}"#;
        let decoded = decode_geometry("P-1", "geom", Some(raw)).unwrap();
        let reencoded = decoded.to_string();

        let original: serde_json::Value = serde_json::from_str(raw).unwrap();
        let roundtrip: serde_json::Value = serde_json::from_str(&reencoded).unwrap();
        assert_eq!(original, roundtrip);
    }
}
