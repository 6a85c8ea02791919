//! Loosely typed action parameters
//!
//! The HTTP layer forwards whatever JSON the browser sent, so numbers may
//! arrive as strings and flags as `0`/`1`.

use serde_json::{Map, Value};

use crate::error::{Result, RosgateError};

/// Parameters of one action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Build from any JSON value; non-objects yield no parameters
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Trimmed string, empty when missing
    pub fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// String as sent, without trimming
    pub fn raw_text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Integer from a number or numeric string; anything else is 0
    pub fn int(&self, key: &str) -> i64 {
        match self.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(Value::Bool(b)) => i64::from(*b),
            _ => 0,
        }
    }

    /// Boolean flag; `None` when absent
    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        let value = match self.get(key) {
            Some(v) => v,
            None => return Ok(None),
        };

        let flag = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Some(true),
                "false" | "no" | "0" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        };

        flag.map(Some).ok_or_else(|| {
            RosgateError::Validation(format!("parameter {key:?} must be true or false"))
        })
    }
}
