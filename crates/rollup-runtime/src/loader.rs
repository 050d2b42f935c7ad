use std::path::Path;

use chrono::{DateTime, Utc};
use orion_error::compat_prelude::*;
use orion_error::prelude::*;
use rollup_core::{Record, Timestamp, Value};
use serde_json::Value as Json;

use crate::error::{RuntimeReason, RuntimeResult};

/// Read records from a JSON file: either one top-level array of objects or
/// JSON lines (one object per line, blank lines skipped).
///
/// String values of `time_field` holding RFC 3339 timestamps become native
/// dates; everything else is carried as-is and validated by the rollup.
pub fn load_records(path: &Path, time_field: &str) -> RuntimeResult<Vec<Record>> {
    let text = std::fs::read_to_string(path)
        .owe_sys()
        .position(path.display().to_string())?;
    let records = parse_records(&text, time_field).position(path.display().to_string())?;
    rl_info!(data, path = %path.display(), records = records.len(), "records loaded");
    Ok(records)
}

/// Parse records from JSON text; see [`load_records`].
pub fn parse_records(text: &str, time_field: &str) -> RuntimeResult<Vec<Record>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        let doc: Json = serde_json::from_str(trimmed).owe(RuntimeReason::Load)?;
        let Json::Array(items) = doc else {
            return StructError::from(RuntimeReason::Load)
                .with_detail("top-level JSON value is not an array")
                .err();
        };
        return items
            .into_iter()
            .enumerate()
            .map(|(i, item)| object_to_record(item, time_field, i + 1))
            .collect();
    }

    let mut records = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item: Json = serde_json::from_str(line)
            .owe(RuntimeReason::Load)
            .position(format!("line {}", lineno + 1))?;
        records.push(object_to_record(item, time_field, lineno + 1)?);
    }
    Ok(records)
}

fn object_to_record(item: Json, time_field: &str, ordinal: usize) -> RuntimeResult<Record> {
    let Json::Object(map) = item else {
        return StructError::from(RuntimeReason::Load)
            .with_detail(format!("record {ordinal} is not a JSON object"))
            .err();
    };
    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let value = if k == time_field {
                time_value(v)
            } else {
                json_to_value(v)
            };
            (k, value)
        })
        .collect())
}

fn time_value(v: Json) -> Value {
    match v {
        Json::String(s) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Value::Time(Timestamp::Date(dt.with_timezone(&Utc))),
            Err(_) => Value::Str(s),
        },
        other => json_to_value(other),
    }
}

/// Convert a JSON value into a record [`Value`].
pub fn json_to_value(v: Json) -> Value {
    match v {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        Json::String(s) => Value::Str(s),
        Json::Array(items) => Value::Array(items.into_iter().map(json_to_value).collect()),
        Json::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_lines() {
        let text = r#"
{"timestamp": 1486058400000, "value": 10}

{"timestamp": 1486062900000, "value": 12, "s": "x"}
"#;
        let records = parse_records(text, "timestamp").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("value"), Some(&Value::Number(12.0)));
        assert_eq!(records[1].get("s"), Some(&Value::from("x")));
    }

    #[test]
    fn parses_array_and_keeps_field_order() {
        let text = r#"[{"z": 1, "timestamp": 0, "a": {"an": "object"}}]"#;
        let records = parse_records(text, "timestamp").unwrap();
        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["z", "timestamp", "a"]);
        assert_eq!(
            records[0].get("a"),
            Some(&Value::Object(Record::new().with("an", "object")))
        );
    }

    #[test]
    fn rfc3339_timestamps_become_dates() {
        let text = r#"{"ts": "2017-02-02T10:00:00-08:00", "note": "2017-02-02T10:00:00Z"}"#;
        let records = parse_records(text, "ts").unwrap();
        let ts = Timestamp::from_value(records[0].get("ts").unwrap()).unwrap();
        assert_eq!(ts.epoch_millis(), 1_486_058_400_000);
        // Only the timestamp field is converted.
        assert!(matches!(records[0].get("note"), Some(Value::Str(_))));
    }

    #[test]
    fn unparseable_time_string_is_left_for_validation() {
        let records = parse_records(r#"{"timestamp": "soon"}"#, "timestamp").unwrap();
        assert_eq!(records[0].get("timestamp"), Some(&Value::from("soon")));
    }

    #[test]
    fn rejects_non_objects_and_bad_json() {
        assert!(parse_records("[1, 2]", "timestamp").is_err());
        assert!(parse_records("{\"a\": 1}\n{oops", "timestamp").is_err());
        assert!(parse_records("42", "timestamp").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.jsonl");
        std::fs::write(&path, "{\"timestamp\": 0, \"value\": 1}\n").unwrap();
        let records = load_records(&path, "timestamp").unwrap();
        assert_eq!(records.len(), 1);
        assert!(load_records(&dir.path().join("missing.jsonl"), "timestamp").is_err());
    }
}
