use std::fmt;

use serde::{Deserialize, Serialize};

/// A field value as the editor stores it.
/// Editors usually hand everything over as text; files may use native TOML types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric reading of the value. Accepts numeric text, including
    /// `Infinity` / `-Infinity`. NaN is never a valid number here.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => parse_number(s)?,
            FieldValue::Bool(_) => return None,
        };
        if n.is_nan() { None } else { Some(n) }
    }

    /// Boolean reading. Checkbox fields store `TRUE` / `FALSE`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(s) => match s.trim() {
                "TRUE" | "true" => Some(true),
                "FALSE" | "false" => Some(false),
                _ => None,
            },
            FieldValue::Number(_) => None,
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    match s.trim() {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        trimmed => trimmed.parse::<f64>().ok(),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(true) => write!(f, "TRUE"),
            FieldValue::Bool(false) => write!(f, "FALSE"),
            FieldValue::Number(n) => {
                if n.is_infinite() {
                    let sign = if *n < 0.0 { "-" } else { "" };
                    write!(f, "{}Infinity", sign)
                } else if *n == n.floor() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}
