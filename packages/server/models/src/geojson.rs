//! The `GeoJSON` GraphQL scalar.

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};

/// A `GeoJSON` geometry carried as parsed JSON.
///
/// On output it is emitted as a JSON object. On input it accepts either a
/// JSON object or a string containing `GeoJSON` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoJson(pub serde_json::Value);

impl GeoJson {
    fn from_text(raw: &str) -> InputValueResult<Self> {
        let json = serde_json::from_str::<serde_json::Value>(raw).map_err(|e| {
            log::warn!("Rejected malformed GeoJSON text: {e}");
            InputValueError::custom(format!("invalid GeoJSON: {e}"))
        })?;
        Self::validate(json)
    }

    fn validate(value: serde_json::Value) -> InputValueResult<Self> {
        match ::geojson::GeoJson::from_json_value(value.clone()) {
            Ok(_) => Ok(Self(value)),
            Err(e) => {
                log::warn!("Rejected GeoJSON input: {e}");
                Err(InputValueError::custom(format!("invalid GeoJSON: {e}")))
            }
        }
    }
}

impl From<serde_json::Value> for GeoJson {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A `GeoJSON` geometry, serialized as a JSON object.
#[Scalar(name = "GeoJSON")]
impl ScalarType for GeoJson {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::String(raw) => Self::from_text(&raw),
            Value::Object(_) => {
                let json = value.into_json().map_err(|e| {
                    InputValueError::custom(format!("invalid GeoJSON: {e}"))
                })?;
                Self::validate(json)
            }
            other => Err(InputValueError::expected_type(other)),
        }
    }

    fn is_valid(value: &Value) -> bool {
        matches!(value, Value::String(_) | Value::Object(_))
    }

    fn to_value(&self) -> Value {
        Value::from_json(self.0.clone()).unwrap_or_else(|e| {
            log::warn!("Failed to serialize GeoJSON value: {e}");
            Value::Null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINT: &str = r#"{"type":"Point","coordinates":[1,2]}"#;

    #[test]
    fn serializes_store_string_as_object() {
        let geojson = GeoJson::from(serde_json::from_str::<serde_json::Value>(POINT).unwrap());
        let value = geojson.to_value();

        let Value::Object(map) = &value else {
            panic!("expected object, got {value:?}");
        };
        assert_eq!(map.get("type"), Some(&Value::String("Point".to_string())));
        assert_eq!(
            value.into_json().unwrap(),
            serde_json::json!({ "type": "Point", "coordinates": [1, 2] })
        );
    }

    #[test]
    fn parse_of_serialized_value_is_json_equivalent() {
        let original: serde_json::Value = serde_json::from_str(POINT).unwrap();
        let parsed =
            <GeoJson as ScalarType>::parse(GeoJson::from(original.clone()).to_value()).unwrap();

        let reparsed: serde_json::Value = serde_json::from_str(&parsed.0.to_string()).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn parses_string_literal_input() {
        let parsed = <GeoJson as ScalarType>::parse(Value::String(POINT.to_string())).unwrap();
        assert_eq!(parsed.0["coordinates"], serde_json::json!([1, 2]));
    }

    #[test]
    fn string_input_gets_the_same_geojson_check_as_objects() {
        assert!(<GeoJson as ScalarType>::parse(Value::String("{\"type\":".to_string())).is_err());
        assert!(
            <GeoJson as ScalarType>::parse(Value::String(r#"{"hello":"world"}"#.to_string()))
                .is_err()
        );
    }

    #[test]
    fn malformed_input_is_rejected_not_panicking() {
        assert!(<GeoJson as ScalarType>::parse(Value::String("not json".to_string())).is_err());
        assert!(<GeoJson as ScalarType>::parse(Value::Number(3.into())).is_err());

        let not_geojson = Value::from_json(serde_json::json!({ "hello": "world" })).unwrap();
        assert!(<GeoJson as ScalarType>::parse(not_geojson).is_err());
    }
}
