//! Per-entity transform pair: structured sub-fields to/from stored text.
//!
//! `serialize_body` is the only place that knows structured fields are
//! persisted as JSON text; `deserialize_record` is its inverse. Entities with
//! no JSON columns pass through unchanged (identity transform).

use crate::model::{EntityDescriptor, FieldKind};
use serde_json::{Map, Value};

/// Encode a client body for storage: keep only declared columns, and turn
/// JSON-kind values into their serialized text form. Absent columns stay
/// absent so inserts and updates cover only defined fields.
pub fn serialize_body(entity: &EntityDescriptor, body: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for col in &entity.columns {
        let Some(v) = body.get(col.name) else { continue };
        if v.is_null() {
            out.insert(col.name.to_string(), Value::Null);
            continue;
        }
        let stored = match col.kind {
            FieldKind::Text => v.clone(),
            FieldKind::Json(_) => Value::String(v.to_string()),
        };
        out.insert(col.name.to_string(), stored);
    }
    out
}

/// Decode a stored record for the API: parse JSON-kind text columns back into
/// structured values, defaulting to an empty object/array when absent, null,
/// or unparseable.
pub fn deserialize_record(entity: &EntityDescriptor, record: &Map<String, Value>) -> Value {
    let mut out = record.clone();
    for (name, shape) in entity.json_columns() {
        let decoded = match record.get(name) {
            Some(Value::String(s)) => {
                serde_json::from_str(s).unwrap_or_else(|_| shape.default_value())
            }
            _ => shape.default_value(),
        };
        out.insert(name.to_string(), decoded);
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::registry;
    use crate::model::EntityRegistry;
    use serde_json::json;

    fn reg() -> EntityRegistry {
        registry()
    }

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn leader_social_round_trips() {
        let reg = reg();
        let leaders = reg.entity_by_path("leaders").unwrap();
        for social in [None, Some(json!({})), Some(json!({"twitter": "a"}))] {
            let mut b = body(json!({"name": "X", "state": "S"}));
            if let Some(ref s) = social {
                b.insert("social".into(), s.clone());
            }
            let stored = serialize_body(leaders, &b);
            let back = deserialize_record(leaders, &stored);
            let expected = social.unwrap_or_else(|| json!({}));
            assert_eq!(back["social"], expected);
            assert_eq!(back["name"], json!("X"));
        }
    }

    #[test]
    fn leader_arrays_default_empty() {
        let reg = reg();
        let leaders = reg.entity_by_path("leaders").unwrap();
        let stored = serialize_body(leaders, &body(json!({"name": "X"})));
        let back = deserialize_record(leaders, &stored);
        assert_eq!(back["protests"], json!([]));
        assert_eq!(back["achievements"], json!([]));
    }

    #[test]
    fn activity_stats_round_trip() {
        let reg = reg();
        let activities = reg.entity_by_path("activities").unwrap();
        let b = body(json!({"title": "Drive", "stats": [{"label": "trees", "value": 500}]}));
        let stored = serialize_body(activities, &b);
        // Persisted form is text, not a nested structure.
        assert!(stored["stats"].is_string());
        let back = deserialize_record(activities, &stored);
        assert_eq!(back["stats"], json!([{"label": "trees", "value": 500}]));
    }

    #[test]
    fn undeclared_fields_are_dropped() {
        let reg = reg();
        let news = reg.entity_by_path("news").unwrap();
        let stored = serialize_body(news, &body(json!({"title": "T", "bogus": 1})));
        assert!(stored.get("bogus").is_none());
        assert_eq!(stored["title"], json!("T"));
    }

    #[test]
    fn stored_null_json_column_defaults() {
        let reg = reg();
        let execs = reg.entity_by_path("executive_leaders").unwrap();
        let mut record = Map::new();
        record.insert("name".into(), json!("Y"));
        record.insert("social_media".into(), Value::Null);
        let back = deserialize_record(execs, &record);
        assert_eq!(back["social_media"], json!({}));
    }
}
