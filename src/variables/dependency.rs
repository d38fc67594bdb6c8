//! Dependency references used by derived variables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which field of a derived variable's result entry a dependency reads
///
/// Raw (internal/external) histories ignore this and always yield the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Current,
    Sum,
    #[serde(alias = "avg")]
    Average,
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Projection::Current => "current",
            Projection::Sum => "sum",
            Projection::Average => "average",
        })
    }
}

impl FromStr for Projection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Projection::Current),
            "sum" => Ok(Projection::Sum),
            "avg" | "average" => Ok(Projection::Average),
            other => Err(format!("unknown projection '{}'", other)),
        }
    }
}

/// How a derived variable obtains one of its inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the source variable
    pub source: String,

    /// Periods to step back from the current period (0 = same period)
    #[serde(default)]
    pub look_behind: u32,

    #[serde(default)]
    pub projection: Projection,
}

impl Dependency {
    /// Same-period `current` read of `source`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            look_behind: 0,
            projection: Projection::Current,
        }
    }

    /// `current` read of `source`, `periods` back
    pub fn lagged(source: impl Into<String>, periods: u32) -> Self {
        Self::new(source).with_look_behind(periods)
    }

    pub fn with_look_behind(mut self, periods: u32) -> Self {
        self.look_behind = periods;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Index into the source history for period `period`, or `None` when the
    /// look-behind reaches before the first period
    pub fn period_index(&self, period: usize) -> Option<usize> {
        period.checked_sub(self.look_behind as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_index_before_start() {
        let dep = Dependency::lagged("capital", 1);
        assert_eq!(dep.period_index(0), None);
        assert_eq!(dep.period_index(1), Some(0));
        assert_eq!(dep.period_index(5), Some(4));
        assert_eq!(Dependency::new("rate").period_index(0), Some(0));
    }

    #[test]
    fn test_deserialize_with_defaults_and_avg_alias() {
        let dep: Dependency = serde_json::from_str(r#"{"source": "rent", "projection": "avg"}"#).unwrap();
        assert_eq!(dep.look_behind, 0);
        assert_eq!(dep.projection, Projection::Average);
        assert_eq!("sum".parse::<Projection>(), Ok(Projection::Sum));
        assert!("median".parse::<Projection>().is_err());
    }
}
