//! Raw values produced by internal and external variables

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single raw per-period value
///
/// Internal variables may produce text (the formatted period date);
/// everything else is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Resolved dependency values handed to a derived variable's compute function,
/// in the same order as its declared dependencies
#[derive(Debug, Clone, Copy)]
pub struct ResolvedArgs<'a> {
    values: &'a [Value],
}

impl<'a> ResolvedArgs<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn value(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    /// Numeric argument at `index`, failing on text values or missing positions
    pub fn number(&self, index: usize) -> anyhow::Result<f64> {
        match self.values.get(index) {
            Some(Value::Number(n)) => Ok(*n),
            Some(Value::Text(s)) => anyhow::bail!("argument {} is text ('{}'), expected a number", index, s),
            None => anyhow::bail!("argument {} out of range ({} resolved)", index, self.values.len()),
        }
    }
}
