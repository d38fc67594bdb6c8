//! Variable descriptors for the three variable kinds

use super::dependency::Dependency;
use super::value::ResolvedArgs;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag carried by every registered variable
///
/// The ordering is the resolution priority: internal histories are searched
/// before external ones, external before derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Internal,
    External,
    Derived,
}

/// Engine-provided variables, evaluated against the per-run context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltIn {
    /// 1-based period counter
    PeriodNumber,
    /// Configured period count, constant over the run
    TotalPeriods,
    /// Formatted date for the period (only when dates are configured)
    Date,
}

impl BuiltIn {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltIn::PeriodNumber => "periodNumber",
            BuiltIn::TotalPeriods => "totalPeriods",
            BuiltIn::Date => "date",
        }
    }
}

impl fmt::Display for BuiltIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type ExternalFn = Box<dyn FnMut() -> anyhow::Result<f64>>;
pub type DerivedFn = Box<dyn for<'a> FnMut(ResolvedArgs<'a>) -> anyhow::Result<f64>>;

/// Caller-supplied variable computed once per period with no inputs
pub struct ExternalVariable {
    pub name: String,
    compute: ExternalFn,
}

impl ExternalVariable {
    pub fn new<F>(name: impl Into<String>, compute: F) -> Self
    where
        F: FnMut() -> anyhow::Result<f64> + 'static,
    {
        Self {
            name: name.into(),
            compute: Box::new(compute),
        }
    }

    /// External variable returning the same value every period
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, move || Ok(value))
    }

    pub(crate) fn compute(&mut self) -> anyhow::Result<f64> {
        (self.compute)()
    }
}

impl fmt::Debug for ExternalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalVariable").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Cashflow variable computed from resolved dependency values
pub struct DerivedVariable {
    pub name: String,
    pub dependencies: Vec<Dependency>,

    /// Leave this variable out of the period `total`
    pub exclude_from_total: bool,

    /// Keep this variable out of reports and exports (it is still stored and resolvable)
    pub hidden: bool,

    compute: DerivedFn,
}

impl DerivedVariable {
    pub fn new<F>(name: impl Into<String>, compute: F) -> Self
    where
        F: for<'a> FnMut(ResolvedArgs<'a>) -> anyhow::Result<f64> + 'static,
    {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            exclude_from_total: false,
            hidden: false,
            compute: Box::new(compute),
        }
    }

    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = Dependency>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    pub fn exclude_from_total(mut self) -> Self {
        self.exclude_from_total = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub(crate) fn compute(&mut self, args: ResolvedArgs<'_>) -> anyhow::Result<f64> {
        (self.compute)(args)
    }
}

impl fmt::Debug for DerivedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedVariable")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("exclude_from_total", &self.exclude_from_total)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{Projection, Value};

    #[test]
    fn test_kind_order_is_resolution_priority() {
        let mut kinds = vec![VariableKind::Derived, VariableKind::Internal, VariableKind::External];
        kinds.sort();
        assert_eq!(kinds, vec![VariableKind::Internal, VariableKind::External, VariableKind::Derived]);
    }

    #[test]
    fn test_derived_builder_and_compute() {
        let mut var = DerivedVariable::new("monthlyMeterCost", |args| Ok(args.number(0)? * args.number(1)?))
            .depends_on(Dependency::new("monthlyMeters"))
            .depends_on(Dependency::new("squareMeterValue").with_projection(Projection::Current))
            .hidden();

        assert_eq!(var.dependencies.len(), 2);
        assert!(var.hidden);
        assert!(!var.exclude_from_total);

        let values = vec![Value::Number(333.0), Value::Number(3.0)];
        assert_eq!(var.compute(ResolvedArgs::new(&values)).unwrap(), 999.0);
    }

    #[test]
    fn test_external_closure_keeps_state() {
        let mut calls = 0.0;
        let mut var = ExternalVariable::new("counter", move || {
            calls += 1.0;
            Ok(calls)
        });
        assert_eq!(var.compute().unwrap(), 1.0);
        assert_eq!(var.compute().unwrap(), 2.0);
    }
}
