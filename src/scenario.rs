//! Built-in sample projections and a runner for them
//!
//! Each scenario registers its variables on a fresh engine, so the same
//! scenario can be run against different period counts or date settings.

use crate::config::{DateConfig, DateIncrement, ProjectionConfig};
use crate::error::Result;
use crate::projection::{CashflowEngine, ResultStore};
use crate::variables::{Dependency, DerivedVariable, ExternalVariable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rent indexed monthly on a cost per square meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentEscalation {
    pub square_meter_value: f64,
    pub total_meters: f64,
    /// Monthly escalation index (0.005 = 0.5% per period)
    pub monthly_index: f64,
}

impl Default for RentEscalation {
    fn default() -> Self {
        Self {
            square_meter_value: 1_600_000.0,
            total_meters: 6_000.0,
            monthly_index: 0.005,
        }
    }
}

/// Straight-line loan capital with interest charged on the prior period's capital
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amortization {
    pub loan_amount: f64,
    pub monthly_rate: f64,
}

impl Default for Amortization {
    fn default() -> Self {
        Self {
            loan_amount: 10_000.0,
            monthly_rate: 0.0087,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    RentEscalation(RentEscalation),
    Amortization(Amortization),
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::RentEscalation(_) => "rent_escalation",
            Scenario::Amortization(_) => "amortization",
        }
    }

    /// Config the scenario runs with when none is supplied
    pub fn default_config(&self) -> ProjectionConfig {
        match self {
            Scenario::RentEscalation(_) => ProjectionConfig::with_periods(18).with_dates(
                DateConfig {
                    start: NaiveDate::from_ymd_opt(2018, 3, 1),
                    increment: DateIncrement::Months,
                    format: Some("%B %Y".to_string()),
                    locale: Some("es_ES".to_string()),
                },
            ),
            Scenario::Amortization(_) => ProjectionConfig::with_periods(12),
        }
    }

    /// Register this scenario's variables on `engine`
    pub fn register(&self, engine: &mut CashflowEngine) -> Result<()> {
        match self {
            Scenario::RentEscalation(params) => {
                engine
                    .add_external(ExternalVariable::constant("squareMeterValue", params.square_meter_value))?
                    .add_external(ExternalVariable::constant("totalMeters", params.total_meters))?
                    .add_external(ExternalVariable::constant("monthlyIndex", params.monthly_index))?
                    .add_derived(
                        DerivedVariable::new("monthlyMeters", |args| Ok(args.number(0)? / args.number(1)?))
                            .depends_on(Dependency::new("totalMeters"))
                            .depends_on(Dependency::new("totalPeriods"))
                            .exclude_from_total(),
                    )?
                    .add_derived(
                        DerivedVariable::new("monthlyMeterCost", |args| Ok(args.number(0)? * args.number(1)?))
                            .depends_on(Dependency::new("monthlyMeters"))
                            .depends_on(Dependency::new("squareMeterValue"))
                            .hidden(),
                    )?
                    .add_derived(
                        DerivedVariable::new("monthlyMeterIndexedCost", |args| {
                            let cost = args.number(0)?;
                            Ok(cost + cost * args.number(2)? * args.number(1)?)
                        })
                        .depends_on(Dependency::new("monthlyMeterCost"))
                        .depends_on(Dependency::new("monthlyIndex"))
                        .depends_on(Dependency::new("periodNumber")),
                    )?;
            }
            Scenario::Amortization(params) => {
                let loan_amount = params.loan_amount;
                engine
                    .add_external(ExternalVariable::constant("rate", params.monthly_rate))?
                    .add_derived(
                        DerivedVariable::new("capital", move |args| Ok(loan_amount / args.number(0)?))
                            .depends_on(Dependency::new("totalPeriods")),
                    )?
                    .add_derived(
                        DerivedVariable::new("interest", |args| Ok(args.number(0)? * args.number(1)?))
                            .depends_on(Dependency::lagged("capital", 1))
                            .depends_on(Dependency::new("rate")),
                    )?;
            }
        }
        Ok(())
    }
}

/// Runs scenarios against an optional base config
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    base_config: Option<ProjectionConfig>,
}

impl ScenarioRunner {
    /// Runner that uses each scenario's own default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that applies `config` to every scenario
    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            base_config: Some(config),
        }
    }

    /// Build a ready-to-run engine for `scenario`
    pub fn engine(&self, scenario: &Scenario) -> Result<CashflowEngine> {
        let config = self
            .base_config
            .clone()
            .unwrap_or_else(|| scenario.default_config());
        let mut engine = CashflowEngine::new(config)?;
        scenario.register(&mut engine)?;
        Ok(engine)
    }

    pub fn run(&self, scenario: &Scenario) -> Result<ResultStore> {
        self.engine(scenario)?.run()
    }

    /// Run several scenarios, stopping at the first failure
    pub fn run_scenarios(&self, scenarios: &[Scenario]) -> Result<Vec<ResultStore>> {
        scenarios.iter().map(|s| self.run(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rent_escalation_defaults() {
        let store = ScenarioRunner::new()
            .run(&Scenario::RentEscalation(RentEscalation::default()))
            .unwrap();

        assert_eq!(store.periods(), 18);
        assert_eq!(store.dates().len(), 18);
        assert_eq!(store.dates()[0], "marzo 2018");

        let cost = 6_000.0 / 18.0 * 1_600_000.0;
        let indexed = store.aggregated("monthlyMeterIndexedCost").unwrap();
        assert_relative_eq!(indexed[0].current, cost * 1.005, max_relative = 1e-12);
        assert_relative_eq!(indexed[1].current, cost * 1.01, max_relative = 1e-12);

        // monthlyMeters is left out of the total; monthlyMeterCost is hidden but counted
        assert_relative_eq!(store.total()[0].current, cost + cost * 1.005, max_relative = 1e-12);
        assert!(store.visible().all(|s| s.name != "monthlyMeterCost"));
    }

    #[test]
    fn test_amortization_schedule() {
        let store = ScenarioRunner::new()
            .run(&Scenario::Amortization(Amortization::default()))
            .unwrap();

        let capital = store.aggregated("capital").unwrap();
        let interest = store.aggregated("interest").unwrap();
        assert_eq!(capital.len(), 12);
        assert_relative_eq!(capital[11].sum, 10_000.0, epsilon = 1e-6);
        assert_eq!(interest[0].current, 0.0);
        assert_relative_eq!(interest[1].current, 10_000.0 / 12.0 * 0.0087, epsilon = 1e-9);
        assert_relative_eq!(interest[11].sum, 11.0 * 10_000.0 / 12.0 * 0.0087, epsilon = 1e-9);
    }

    #[test]
    fn test_base_config_overrides_default() {
        let runner = ScenarioRunner::with_config(ProjectionConfig::with_periods(24));
        let results = runner
            .run_scenarios(&[
                Scenario::Amortization(Amortization::default()),
                Scenario::RentEscalation(RentEscalation::default()),
            ])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.periods() == 24));
        // No date config in the base, so no dates
        assert!(results[1].dates().is_empty());
        assert_relative_eq!(results[0].aggregated("capital").unwrap()[0].current, 10_000.0 / 24.0);
    }
}
