//! Period evaluator: the per-period control loop
//!
//! For each period: built-ins, then external variables, then derived variables,
//! all in registration order. Derived inputs are resolved against the result
//! store built so far; the period total is appended last.

use crate::error::{ProjectionError, Result};
use crate::variables::{Dependency, DerivedVariable, ResolvedArgs, Value};
use super::context::EvaluationContext;
use super::registry::Registry;
use super::results::{ResultStore, TOTAL};
use log::{debug, trace, warn};

pub struct PeriodEvaluator<'a> {
    registry: &'a mut Registry,
    context: &'a mut EvaluationContext,
}

impl<'a> PeriodEvaluator<'a> {
    pub fn new(registry: &'a mut Registry, context: &'a mut EvaluationContext) -> Self {
        Self { registry, context }
    }

    /// Evaluate every period and return the completed store
    pub fn run(mut self, periods: u32) -> Result<ResultStore> {
        self.context.reset();
        let mut store = ResultStore::new(periods, self.registry.empty_series(periods as usize));

        for period in 0..periods as usize {
            self.context.begin_period();
            let period_total = self.evaluate_period(period, &mut store)?;
            let total = store.push_total(period_total);
            debug!(
                "period {}: total {:.2} (running sum {:.2})",
                period + 1,
                total.current,
                total.sum
            );
        }

        store.set_dates(self.context.take_dates());
        Ok(store)
    }

    /// Evaluate one period, returning its total across derived variables
    fn evaluate_period(&mut self, period: usize, store: &mut ResultStore) -> Result<f64> {
        let internal_count = self.registry.builtins.len();
        for (slot, builtin) in self.registry.builtins.iter().enumerate() {
            let value = self.context.evaluate(*builtin)?;
            store.series_mut(slot).push_raw(value);
        }

        for (slot, variable) in self.registry.externals.iter_mut().enumerate() {
            let value = variable.compute().map_err(|source| ProjectionError::Compute {
                variable: variable.name.clone(),
                source,
            })?;
            store.series_mut(internal_count + slot).push_raw(Value::Number(value));
        }

        let derived_offset = internal_count + self.registry.externals.len();
        let mut period_total = 0.0;
        let mut resolved = Vec::new();

        for slot in 0..self.registry.derived.len() {
            resolved.clear();
            for dependency in &self.registry.derived[slot].dependencies {
                let value = resolve(self.registry, store, &self.registry.derived[slot], dependency, period)?;
                resolved.push(value);
            }

            let variable: &mut DerivedVariable = &mut self.registry.derived[slot];
            let current = variable
                .compute(ResolvedArgs::new(&resolved))
                .map_err(|source| ProjectionError::Compute {
                    variable: variable.name.clone(),
                    source,
                })?;
            if !current.is_finite() {
                warn!("variable '{}' produced {} in period {}", variable.name, current, period + 1);
            }

            let entry = store.series_mut(derived_offset + slot).push_aggregate(current);
            debug_assert!(entry.is_some(), "derived variable '{}' has a raw history", variable.name);
            if !variable.exclude_from_total {
                period_total += current;
            }
        }

        Ok(period_total)
    }
}

/// Resolve one dependency for `period`
///
/// A look-behind reaching before the first period yields 0. After the
/// registered variables, the synthesized `total` series is searched; the
/// current period's total does not exist yet, so only look-behinds of at
/// least 1 can read it. A name missing everywhere aborts the run.
fn resolve(
    registry: &Registry,
    store: &ResultStore,
    variable: &DerivedVariable,
    dependency: &Dependency,
    period: usize,
) -> Result<Value> {
    let Some(index) = dependency.period_index(period) else {
        trace!(
            "{} <- {}[-{}]: before first period, using 0",
            variable.name, dependency.source, dependency.look_behind
        );
        return Ok(Value::Number(0.0));
    };

    let unresolved = || ProjectionError::UnresolvedDependency {
        variable: variable.name.clone(),
        dependency: dependency.source.clone(),
    };

    let Some(var_ref) = registry.lookup(&dependency.source) else {
        if dependency.source == TOTAL {
            let entry = store.total().get(index).ok_or_else(unresolved)?;
            let value = Value::Number(entry.get(dependency.projection));
            trace!(
                "{} <- {}[{}] ({}) = {}",
                variable.name, TOTAL, index, dependency.projection, value
            );
            return Ok(value);
        }
        return Err(unresolved());
    };
    let value = store
        .series_at(registry.position(var_ref))
        .history
        .read(index, dependency.projection)
        .ok_or_else(unresolved)?;

    trace!(
        "{} <- {}[{}] ({:?}, {}) = {}",
        variable.name, dependency.source, index, var_ref.kind, dependency.projection, value
    );
    Ok(value)
}
