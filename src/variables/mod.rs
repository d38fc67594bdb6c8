//! Variable descriptors, dependency references and values

mod value;
mod dependency;
mod descriptor;

pub use value::{Value, ResolvedArgs};
pub use dependency::{Dependency, Projection};
pub use descriptor::{VariableKind, BuiltIn, ExternalVariable, DerivedVariable, ExternalFn, DerivedFn};
