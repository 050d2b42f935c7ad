use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use orion_error::prelude::*;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{CoreReason, CoreResult};

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// The accepted shapes of a record's point-in-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    /// A native UTC date.
    Date(DateTime<Utc>),
    /// A calendar-aware value already bound to a timezone.
    Zoned(DateTime<Tz>),
}

impl Timestamp {
    /// Read a timestamp out of a record field value.
    ///
    /// Finite numbers are epoch milliseconds (fractional parts truncated).
    pub fn from_value(value: &Value) -> CoreResult<Timestamp> {
        match value {
            Value::Time(ts) => Ok(*ts),
            Value::Number(n) if n.is_finite() => Ok(Timestamp::EpochMillis(n.trunc() as i64)),
            other => StructError::from(CoreReason::InvalidTimestamp)
                .with_detail(format!(
                    "cannot create a date from {} value {other}",
                    other.kind_name()
                ))
                .err(),
        }
    }

    pub fn epoch_millis(&self) -> i64 {
        match self {
            Timestamp::EpochMillis(ms) => *ms,
            Timestamp::Date(dt) => dt.timestamp_millis(),
            Timestamp::Zoned(dt) => dt.timestamp_millis(),
        }
    }

    /// Normalize into a calendar-aware value in `tz`.
    pub fn to_zoned(&self, tz: Tz) -> CoreResult<DateTime<Tz>> {
        match self {
            Timestamp::EpochMillis(ms) => tz.timestamp_millis_opt(*ms).single().ok_or_else(|| {
                StructError::from(CoreReason::InvalidTimestamp)
                    .with_detail(format!("epoch milliseconds {ms} out of range"))
            }),
            Timestamp::Date(dt) => Ok(dt.with_timezone(&tz)),
            Timestamp::Zoned(dt) => Ok(dt.with_timezone(&tz)),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Timestamp::EpochMillis(ms)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Date(dt)
    }
}

impl From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Timestamp::Zoned(dt)
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A field value carried inside a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Value>),
    Object(Record),
    Time(Timestamp),
}

impl Value {
    /// The numeric payload, if this value is a number. `NaN` counts as a
    /// number here; accumulators decide whether to absorb it.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Time(_) => "time",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Time(ts)
    }
}

impl From<DateTime<Tz>> for Value {
    fn from(dt: DateTime<Tz>) -> Self {
        Value::Time(Timestamp::Zoned(dt))
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(r)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(r) => {
                f.write_str("{")?;
                for (i, (k, v)) in r.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k:?}:{v}")?;
                }
                f.write_str("}")
            }
            Value::Time(ts) => f.write_str(&format_timestamp(ts)),
        }
    }
}

fn format_timestamp(ts: &Timestamp) -> String {
    match ts {
        Timestamp::EpochMillis(ms) => ms.to_string(),
        Timestamp::Date(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Timestamp::Zoned(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(_) => serializer.serialize_unit(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(r) => r.serialize(serializer),
            Value::Time(Timestamp::EpochMillis(ms)) => serializer.serialize_i64(*ms),
            Value::Time(ts) => serializer.serialize_str(&format_timestamp(ts)),
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An open, insertion-ordered mapping from field name to [`Value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Set `name` to `value`, replacing in place if present, appending otherwise.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Keep only the fields named in `names`, in their current order.
    pub fn retain_named(&mut self, names: &[String]) {
        self.fields.retain(|(k, _)| names.iter().any(|n| n == k));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
