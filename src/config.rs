//! Projection configuration
//!
//! Construction-time settings: period count and the optional date sequence.
//! Can be built in code or loaded from a JSON file.

use crate::error::{ProjectionError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Long-form date without a locale, e.g. "March 1, 2018"
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Unit the date cursor advances by each period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateIncrement {
    Days,
    #[default]
    Months,
    Years,
}

/// Settings for the built-in `date` variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateConfig {
    /// First period's date; today's local date when absent
    #[serde(default, deserialize_with = "deserialize_start")]
    pub start: Option<NaiveDate>,

    #[serde(default)]
    pub increment: DateIncrement,

    /// chrono strftime pattern; the locale's long-form date when absent
    #[serde(default)]
    pub format: Option<String>,

    /// POSIX locale name such as `es_ES`, or a bare language code such as `es`
    #[serde(default)]
    pub locale: Option<String>,
}

fn deserialize_start<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_start_date(&s).map_err(serde::de::Error::custom))
        .transpose()
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            start: None,
            increment: DateIncrement::Months,
            format: None,
            locale: None,
        }
    }
}

impl DateConfig {
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            ..Default::default()
        }
    }

    pub fn with_increment(mut self, increment: DateIncrement) -> Self {
        self.increment = increment;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Number of periods to evaluate (must be positive)
    pub periods: u32,

    /// Date sequence settings; no `date` variable is registered when absent
    #[serde(default)]
    pub dates: Option<DateConfig>,
}

impl ProjectionConfig {
    pub fn with_periods(periods: u32) -> Self {
        Self { periods, dates: None }
    }

    pub fn with_dates(mut self, dates: DateConfig) -> Self {
        self.dates = Some(dates);
        self
    }

    /// Load a config from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProjectionError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| ProjectionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.periods == 0 {
            return Err(ProjectionError::InvalidPeriods(self.periods));
        }
        Ok(())
    }
}

/// Parse a start date given as `YYYY-MM-DD` or `D-Mon-YYYY` (e.g. `1-Mar-2018`)
pub fn parse_start_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d-%b-%Y"))
        .map_err(|_| ProjectionError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 3, 1).unwrap();
        assert_eq!(parse_start_date("2018-03-01").unwrap(), expected);
        assert_eq!(parse_start_date("1-Mar-2018").unwrap(), expected);
        assert!(matches!(parse_start_date("March"), Err(ProjectionError::InvalidDate(_))));
    }

    #[test]
    fn test_json_config_defaults() {
        let config = ProjectionConfig::from_json_str(
            r#"{"periods": 18, "dates": {"start": "1-Mar-2018", "locale": "es_ES", "format": "%B %Y"}}"#,
        )
        .unwrap();

        assert_eq!(config.periods, 18);
        let dates = config.dates.unwrap();
        assert_eq!(dates.start, NaiveDate::from_ymd_opt(2018, 3, 1));
        assert_eq!(dates.increment, DateIncrement::Months);
        assert_eq!(dates.format.as_deref(), Some("%B %Y"));
        assert_eq!(dates.locale.as_deref(), Some("es_ES"));
    }

    #[test]
    fn test_format_defaults_to_none() {
        let config = ProjectionConfig::from_json_str(r#"{"periods": 3, "dates": {"locale": "es"}}"#).unwrap();
        let dates = config.dates.unwrap();
        assert_eq!(dates.format, None);
        assert_eq!(dates.start, None);
    }

    #[test]
    fn test_zero_periods_rejected() {
        let err = ProjectionConfig::from_json_str(r#"{"periods": 0}"#).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidPeriods(0)));
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = ProjectionConfig::from_json_str(r#"{"periods": "twelve"}"#).unwrap_err();
        assert!(matches!(err, ProjectionError::Config(_)));
    }
}
