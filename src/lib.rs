//! Cashflow Projection - period-indexed projection engine
//!
//! This library provides:
//! - Per-period evaluation of internal, external and derived (cashflow) variables
//! - Look-behind dependency resolution with current/sum/average projections
//! - Running aggregates per variable and a synthesized period total
//! - An optional localized date sequence for period labels
//! - Built-in amortization and rent-escalation scenarios

pub mod config;
pub mod dates;
pub mod error;
pub mod projection;
pub mod scenario;
pub mod variables;

// Re-export commonly used types
pub use config::{DateConfig, DateIncrement, ProjectionConfig};
pub use error::ProjectionError;
pub use projection::{CashflowEngine, ResultEntry, ResultStore};
pub use scenario::{Scenario, ScenarioRunner};
pub use variables::{Dependency, DerivedVariable, ExternalVariable, Projection, ResolvedArgs, Value};
