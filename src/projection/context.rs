//! Per-run evaluation state for the built-in internal variables

use crate::config::ProjectionConfig;
use crate::dates::DateSequence;
use crate::error::{ProjectionError, Result};
use crate::variables::{BuiltIn, Value};

/// Mutable state threaded through each period of a run
///
/// Owned by the engine and reset at the start of every run, so repeated runs
/// count from period 1 and restart the date sequence at its start date.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    /// Current period (1-indexed, 0 before the first period)
    pub period_number: u32,

    /// Configured period count
    pub total_periods: u32,

    /// Date cursor, when dates are configured
    dates: Option<DateSequence>,

    /// Formatted dates produced so far in this run
    produced_dates: Vec<String>,
}

impl EvaluationContext {
    pub fn from_config(config: &ProjectionConfig) -> Result<Self> {
        let dates = config
            .dates
            .as_ref()
            .map(DateSequence::from_config)
            .transpose()?;

        Ok(Self {
            period_number: 0,
            total_periods: config.periods,
            dates,
            produced_dates: Vec::new(),
        })
    }

    pub fn has_dates(&self) -> bool {
        self.dates.is_some()
    }

    /// Rewind counters and the date cursor
    pub fn reset(&mut self) {
        self.period_number = 0;
        self.produced_dates.clear();
        if let Some(dates) = &mut self.dates {
            dates.reset();
        }
    }

    /// Advance to the next period
    pub fn begin_period(&mut self) {
        self.period_number += 1;
    }

    /// Value of a built-in variable for the current period
    pub fn evaluate(&mut self, builtin: BuiltIn) -> Result<Value> {
        match builtin {
            BuiltIn::PeriodNumber => Ok(Value::Number(self.period_number as f64)),
            BuiltIn::TotalPeriods => Ok(Value::Number(self.total_periods as f64)),
            BuiltIn::Date => {
                let sequence = self
                    .dates
                    .as_mut()
                    .ok_or_else(|| ProjectionError::Config("date variable requires a date configuration".to_string()))?;
                let formatted = sequence.next_formatted()?;
                self.produced_dates.push(formatted.clone());
                Ok(Value::Text(formatted))
            }
        }
    }

    /// Take the dates produced during this run
    pub fn take_dates(&mut self) -> Vec<String> {
        std::mem::take(&mut self.produced_dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateConfig;
    use chrono::NaiveDate;

    fn dated_context() -> EvaluationContext {
        let config = ProjectionConfig::with_periods(3).with_dates(
            DateConfig::starting(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).with_format("%Y-%m-%d"),
        );
        EvaluationContext::from_config(&config).unwrap()
    }

    #[test]
    fn test_period_counter_and_dates() {
        let mut ctx = dated_context();
        for _ in 0..2 {
            ctx.begin_period();
            ctx.evaluate(BuiltIn::Date).unwrap();
        }
        assert_eq!(ctx.evaluate(BuiltIn::PeriodNumber).unwrap(), Value::Number(2.0));
        assert_eq!(ctx.evaluate(BuiltIn::TotalPeriods).unwrap(), Value::Number(3.0));
        assert_eq!(ctx.take_dates(), vec!["2024-01-15", "2024-02-15"]);
    }

    #[test]
    fn test_reset_restarts_counter_and_cursor() {
        let mut ctx = dated_context();
        ctx.begin_period();
        ctx.evaluate(BuiltIn::Date).unwrap();
        ctx.begin_period();
        ctx.evaluate(BuiltIn::Date).unwrap();

        ctx.reset();
        ctx.begin_period();
        assert_eq!(ctx.evaluate(BuiltIn::PeriodNumber).unwrap(), Value::Number(1.0));
        assert_eq!(ctx.evaluate(BuiltIn::Date).unwrap(), Value::Text("2024-01-15".to_string()));
    }

    #[test]
    fn test_date_without_config_fails() {
        let mut ctx = EvaluationContext::from_config(&ProjectionConfig::with_periods(1)).unwrap();
        assert!(!ctx.has_dates());
        assert!(ctx.evaluate(BuiltIn::Date).is_err());
    }
}
