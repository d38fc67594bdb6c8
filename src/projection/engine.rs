//! Engine facade: registration and the single run entry point

use crate::config::ProjectionConfig;
use crate::error::Result;
use crate::variables::{BuiltIn, DerivedVariable, ExternalVariable};
use super::context::EvaluationContext;
use super::evaluator::PeriodEvaluator;
use super::registry::Registry;
use super::results::ResultStore;
use log::info;
use std::time::Instant;

/// Cashflow projection engine
///
/// Variables are registered once and can be evaluated any number of times.
/// Every `run` starts from period 1 and from the configured start date;
/// state captured by caller-supplied closures is left alone.
#[derive(Debug)]
pub struct CashflowEngine {
    config: ProjectionConfig,
    registry: Registry,
    context: EvaluationContext,
}

impl CashflowEngine {
    /// Create an engine, rejecting a zero period count or an unusable date config
    pub fn new(config: ProjectionConfig) -> Result<Self> {
        config.validate()?;
        let context = EvaluationContext::from_config(&config)?;

        let mut registry = Registry::new();
        registry.add_builtin(BuiltIn::PeriodNumber)?;
        registry.add_builtin(BuiltIn::TotalPeriods)?;
        if context.has_dates() {
            registry.add_builtin(BuiltIn::Date)?;
        }

        Ok(Self { config, registry, context })
    }

    /// Engine with `periods` periods and no date sequence
    pub fn with_periods(periods: u32) -> Result<Self> {
        Self::new(ProjectionConfig::with_periods(periods))
    }

    pub fn add_external(&mut self, variable: ExternalVariable) -> Result<&mut Self> {
        self.registry.add_external(variable)?;
        Ok(self)
    }

    /// Register a derived variable; its dependencies are checked at resolution time
    pub fn add_derived(&mut self, variable: DerivedVariable) -> Result<&mut Self> {
        self.registry.add_derived(variable)?;
        Ok(self)
    }

    /// Evaluate all periods
    ///
    /// Fails on the first unresolved dependency or compute error; no partial
    /// results are returned.
    pub fn run(&mut self) -> Result<ResultStore> {
        let start = Instant::now();
        info!(
            "running {} periods over {} variables",
            self.config.periods,
            self.registry.len()
        );

        let store = PeriodEvaluator::new(&mut self.registry, &mut self.context).run(self.config.periods)?;

        info!("projection complete in {:?}", start.elapsed());
        Ok(store)
    }
}
