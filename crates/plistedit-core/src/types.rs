//! The in-memory value tree shared by the codec and the editor.
//!
//! `PlistValue` is a closed tagged union. Data enters the model through
//! explicit constructors (the decoder, `From<serde_json::Value>`, profile
//! loading), so the rest of the crate matches on variants instead of probing
//! runtime shapes.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::date;

/// Insertion-ordered dictionary. Key order is what the editor displays and
/// what the encoder writes.
pub type Dict = IndexMap<String, PlistValue>;

/// A plist document value.
///
/// `Integer` and `Real` together form the number kind. They compare equal
/// when the real is integral and converts back to exactly the same integer
/// (`Integer(3) == Real(3.0)`), since the wire form of a number is decided by
/// its integrality, not by the variant it was built as. Dicts compare equal
/// only with the same keys in the same order.
#[derive(Debug, Clone, Default)]
pub enum PlistValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<PlistValue>),
    Dict(Dict),
}

/// Number flavour, decided by comparing a value with its own rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Integer,
    Real,
}

/// The seven kinds every value classifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Boolean,
    Number(NumberKind),
    String,
    Date,
    Array,
    Dict,
}

impl Kind {
    /// Short type name used to tag rendered cells.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number(_) => "number",
            Kind::String => "string",
            Kind::Date => "date",
            Kind::Array => "array",
            Kind::Dict => "dict",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, Kind::Array | Kind::Dict)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a value. Total and side-effect free; strings are never sniffed
/// for dates.
pub fn classify(value: &PlistValue) -> Kind {
    match value {
        PlistValue::Null => Kind::Null,
        PlistValue::Boolean(_) => Kind::Boolean,
        PlistValue::Integer(_) => Kind::Number(NumberKind::Integer),
        PlistValue::Real(f) => {
            if is_integral(*f) {
                Kind::Number(NumberKind::Integer)
            } else {
                Kind::Number(NumberKind::Real)
            }
        }
        PlistValue::String(_) => Kind::String,
        PlistValue::Date(_) => Kind::Date,
        PlistValue::Array(_) => Kind::Array,
        PlistValue::Dict(_) => Kind::Dict,
    }
}

/// True when `f` equals its own rounding and fits the integer range.
pub(crate) fn is_integral(f: f64) -> bool {
    f.is_finite() && f.round() == f && f.abs() < i64::MAX as f64
}

impl PlistValue {
    pub fn kind(&self) -> Kind {
        classify(self)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PlistValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlistValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PlistValue::Integer(i) => Some(*i as f64),
            PlistValue::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            PlistValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<PlistValue>> {
        match self {
            PlistValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<PlistValue>> {
        match self {
            PlistValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            PlistValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            PlistValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Convert to JSON for hosts that speak JSON. Dates become wire-format
    /// strings and non-finite reals become `null`, so this direction is lossy.
    pub fn to_json(&self) -> Value {
        match self {
            PlistValue::Null => Value::Null,
            PlistValue::Boolean(b) => Value::Bool(*b),
            PlistValue::Integer(i) => Value::Number((*i).into()),
            PlistValue::Real(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PlistValue::String(s) => Value::String(s.clone()),
            PlistValue::Date(d) => Value::String(date::format_date(d)),
            PlistValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            PlistValue::Dict(dict) => {
                let mut map = Map::with_capacity(dict.len());
                for (k, v) in dict {
                    map.insert(k.clone(), v.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl PartialEq for PlistValue {
    fn eq(&self, other: &Self) -> bool {
        use PlistValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Real(a), Real(b)) => a == b,
            (Integer(i), Real(f)) | (Real(f), Integer(i)) => {
                is_integral(*f) && *f as i64 == *i
            }
            (String(a), String(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Dict(a), Dict(b)) => a.len() == b.len() && a.iter().eq(b.iter()),
            _ => false,
        }
    }
}

impl From<Value> for PlistValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PlistValue::Null,
            Value::Bool(b) => PlistValue::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PlistValue::Integer(i)
                } else {
                    PlistValue::Real(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => PlistValue::String(s),
            Value::Array(items) => PlistValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                PlistValue::Dict(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<bool> for PlistValue {
    fn from(b: bool) -> Self {
        PlistValue::Boolean(b)
    }
}

impl From<i64> for PlistValue {
    fn from(i: i64) -> Self {
        PlistValue::Integer(i)
    }
}

impl From<i32> for PlistValue {
    fn from(i: i32) -> Self {
        PlistValue::Integer(i.into())
    }
}

impl From<f64> for PlistValue {
    fn from(f: f64) -> Self {
        PlistValue::Real(f)
    }
}

impl From<&str> for PlistValue {
    fn from(s: &str) -> Self {
        PlistValue::String(s.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(s: String) -> Self {
        PlistValue::String(s)
    }
}

impl From<DateTime<Utc>> for PlistValue {
    fn from(d: DateTime<Utc>) -> Self {
        PlistValue::Date(d)
    }
}

impl From<Vec<PlistValue>> for PlistValue {
    fn from(items: Vec<PlistValue>) -> Self {
        PlistValue::Array(items)
    }
}

impl From<Dict> for PlistValue {
    fn from(dict: Dict) -> Self {
        PlistValue::Dict(dict)
    }
}
