//! JSON-safe normalization of error payloads.
//!
//! Error context is supplied by business code as [`ContextValue`]s and is
//! converted into plain JSON before it is attached to an error. Temporal values
//! and UUIDs become strings, containers are walked, and anything else is
//! rendered through its `Display` impl. Opaque objects are never traversed, so
//! shared or cyclic object graphs cannot make normalization loop.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Normalized key/value payload attached to errors and rendered as `data`
pub type Payload = Map<String, Value>;

/// A context value before normalization
#[derive(Clone)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Timestamp(DateTime<Utc>),
    LocalDateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Uuid(Uuid),
    Map(Vec<(String, ContextValue)>),
    Seq(Vec<ContextValue>),
    /// Already JSON, passed through untouched
    Json(Value),
    /// Anything else; only its `Display` output is kept
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
}

impl ContextValue {
    pub fn opaque<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        ContextValue::Opaque(Arc::new(value))
    }

    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        ContextValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Null => f.write_str("Null"),
            ContextValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            ContextValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            ContextValue::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            ContextValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            ContextValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            ContextValue::Timestamp(v) => f.debug_tuple("Timestamp").field(v).finish(),
            ContextValue::LocalDateTime(v) => f.debug_tuple("LocalDateTime").field(v).finish(),
            ContextValue::Date(v) => f.debug_tuple("Date").field(v).finish(),
            ContextValue::Time(v) => f.debug_tuple("Time").field(v).finish(),
            ContextValue::Uuid(v) => f.debug_tuple("Uuid").field(v).finish(),
            ContextValue::Map(v) => f.debug_tuple("Map").field(v).finish(),
            ContextValue::Seq(v) => f.debug_tuple("Seq").field(v).finish(),
            ContextValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
            ContextValue::Opaque(v) => write!(f, "Opaque({v})"),
        }
    }
}

/// Convert a context value into a JSON-safe value
pub fn normalize(value: ContextValue) -> Value {
    match value {
        ContextValue::Null => Value::Null,
        ContextValue::Bool(v) => Value::Bool(v),
        ContextValue::Int(v) => Value::from(v),
        ContextValue::UInt(v) => Value::from(v),
        ContextValue::Float(v) => Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(v.to_string())),
        ContextValue::Str(v) => Value::String(v),
        ContextValue::Timestamp(v) => Value::String(v.to_rfc3339()),
        ContextValue::LocalDateTime(v) => Value::String(v.to_string()),
        ContextValue::Date(v) => Value::String(v.to_string()),
        ContextValue::Time(v) => Value::String(v.to_string()),
        ContextValue::Uuid(v) => Value::String(v.to_string()),
        ContextValue::Map(entries) => Value::Object(normalize_map(entries)),
        ContextValue::Seq(items) => Value::Array(items.into_iter().map(normalize).collect()),
        ContextValue::Json(v) => v,
        ContextValue::Opaque(v) => Value::String(v.to_string()),
    }
}

/// Normalize a sequence of key/value pairs into a payload
pub fn normalize_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Payload
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), normalize(value.into())))
        .collect()
}

/// Text form of a JSON value for human-readable messages (strings unquoted)
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

macro_rules! context_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for ContextValue {
                fn from(value: $source) -> Self {
                    ContextValue::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

context_from!(Int as i64: i8, i16, i32, i64);
context_from!(UInt as u64: u8, u16, u32, u64);
context_from!(Float as f64: f32, f64);
context_from!(Str as String: String, &str, &String, char);

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        ContextValue::UInt(value as u64)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<()> for ContextValue {
    fn from(_: ()) -> Self {
        ContextValue::Null
    }
}

impl From<DateTime<Utc>> for ContextValue {
    fn from(value: DateTime<Utc>) -> Self {
        ContextValue::Timestamp(value)
    }
}

impl From<NaiveDateTime> for ContextValue {
    fn from(value: NaiveDateTime) -> Self {
        ContextValue::LocalDateTime(value)
    }
}

impl From<NaiveDate> for ContextValue {
    fn from(value: NaiveDate) -> Self {
        ContextValue::Date(value)
    }
}

impl From<NaiveTime> for ContextValue {
    fn from(value: NaiveTime) -> Self {
        ContextValue::Time(value)
    }
}

impl From<Uuid> for ContextValue {
    fn from(value: Uuid) -> Self {
        ContextValue::Uuid(value)
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        ContextValue::Json(value)
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ContextValue::Null, Into::into)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(value: Vec<T>) -> Self {
        ContextValue::Seq(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ContextValue>> From<HashSet<T>> for ContextValue {
    fn from(value: HashSet<T>) -> Self {
        ContextValue::Seq(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ContextValue>> From<BTreeSet<T>> for ContextValue {
    fn from(value: BTreeSet<T>) -> Self {
        ContextValue::Seq(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<ContextValue>> From<HashMap<K, V>> for ContextValue {
    fn from(value: HashMap<K, V>) -> Self {
        ContextValue::map(value)
    }
}

impl<K: Into<String>, V: Into<ContextValue>> From<BTreeMap<K, V>> for ContextValue {
    fn from(value: BTreeMap<K, V>) -> Self {
        ContextValue::map(value)
    }
}

impl From<Payload> for ContextValue {
    fn from(value: Payload) -> Self {
        ContextValue::Json(Value::Object(value))
    }
}
