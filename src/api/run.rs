use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::{api::int_or_str, RunNumber};

/// A scalar run parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

pub type RunParams = BTreeMap<String, ParamValue>;
pub type ParamDescriptions = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
pub(crate) struct RunValue {
    #[serde(deserialize_with = "int_or_str::deserialize")]
    num: i64,
}

impl RunValue {
    pub(crate) fn number(&self) -> RunNumber {
        RunNumber::from(self.num)
    }
}

/// Deserializes `value` into a run, treating a missing or falsy value as "no run".
pub(crate) fn truthy_run<'de, D>(deserializer: D) -> Result<Option<RunValue>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    let truthy = match &value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    };
    if truthy {
        serde_json::from_value(value).map(Some).map_err(D::Error::custom)
    } else {
        Ok(None)
    }
}
