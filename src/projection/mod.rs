//! Projection engine: registry, per-run context, period evaluator and result store

mod context;
mod engine;
mod evaluator;
mod registry;
mod results;

pub use context::EvaluationContext;
pub use engine::CashflowEngine;
pub use evaluator::PeriodEvaluator;
pub use registry::{Registry, VariableRef};
pub use results::{
    History, ProjectionSummary, ResultEntry, ResultReport, ResultStore, Series, VariableSummary, TOTAL,
};
