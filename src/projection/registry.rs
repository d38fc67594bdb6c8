//! Name registry for all variable kinds

use crate::error::{ProjectionError, Result};
use crate::variables::{BuiltIn, DerivedVariable, ExternalVariable, VariableKind};
use super::results::{Series, TOTAL};
use std::collections::HashMap;

/// Where a name lives: its kind and its slot within that kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableRef {
    pub kind: VariableKind,
    pub slot: usize,
}

/// Registered variables, one slot list per kind, plus a single name index
///
/// Names are unique across kinds, so a single index lookup resolves any
/// name; the kind tag on the entry says which slot list it points into.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) builtins: Vec<BuiltIn>,
    pub(crate) externals: Vec<ExternalVariable>,
    pub(crate) derived: Vec<DerivedVariable>,
    names: HashMap<String, VariableRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_builtin(&mut self, builtin: BuiltIn) -> Result<()> {
        let slot = self.builtins.len();
        self.claim(builtin.name(), VariableKind::Internal, slot)?;
        self.builtins.push(builtin);
        Ok(())
    }

    pub fn add_external(&mut self, variable: ExternalVariable) -> Result<()> {
        let slot = self.externals.len();
        self.claim(&variable.name, VariableKind::External, slot)?;
        self.externals.push(variable);
        Ok(())
    }

    pub fn add_derived(&mut self, variable: DerivedVariable) -> Result<()> {
        if let Some(dep) = variable.dependencies.iter().find(|d| d.source.is_empty()) {
            return Err(ProjectionError::Config(format!(
                "variable '{}' has a dependency with an empty source name (look-behind {})",
                variable.name, dep.look_behind
            )));
        }
        let slot = self.derived.len();
        self.claim(&variable.name, VariableKind::Derived, slot)?;
        self.derived.push(variable);
        Ok(())
    }

    fn claim(&mut self, name: &str, kind: VariableKind, slot: usize) -> Result<()> {
        if name.is_empty() {
            return Err(ProjectionError::EmptyName);
        }
        if name == TOTAL {
            return Err(ProjectionError::ReservedName(name.to_string()));
        }
        if self.lookup(name).is_some() {
            return Err(ProjectionError::DuplicateName(name.to_string()));
        }
        self.names.insert(name.to_string(), VariableRef { kind, slot });
        Ok(())
    }

    /// Kind and slot of `name`, if registered
    pub fn lookup(&self, name: &str) -> Option<VariableRef> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.builtins.len() + self.externals.len() + self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of a variable in the result store's series list
    pub(crate) fn position(&self, var: VariableRef) -> usize {
        match var.kind {
            VariableKind::Internal => var.slot,
            VariableKind::External => self.builtins.len() + var.slot,
            VariableKind::Derived => self.builtins.len() + self.externals.len() + var.slot,
        }
    }

    /// Empty histories for every registered variable, in store order
    pub(crate) fn empty_series(&self, periods: usize) -> Vec<Series> {
        let internal = self
            .builtins
            .iter()
            .map(|b| Series::raw(b.name(), VariableKind::Internal, periods));
        let external = self
            .externals
            .iter()
            .map(|v| Series::raw(&v.name, VariableKind::External, periods));
        let derived = self
            .derived
            .iter()
            .map(|v| Series::aggregated(&v.name, v.hidden, periods));
        internal.chain(external).chain(derived).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::Dependency;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.add_builtin(BuiltIn::PeriodNumber).unwrap();
        registry.add_builtin(BuiltIn::TotalPeriods).unwrap();
        registry.add_external(ExternalVariable::constant("rate", 0.0087)).unwrap();
        registry
            .add_derived(DerivedVariable::new("capital", |_| Ok(1.0)))
            .unwrap();
        registry
    }

    #[test]
    fn test_lookup_returns_kind_and_slot() {
        let registry = registry();
        assert_eq!(
            registry.lookup("totalPeriods"),
            Some(VariableRef { kind: VariableKind::Internal, slot: 1 })
        );
        assert_eq!(
            registry.lookup("capital"),
            Some(VariableRef { kind: VariableKind::Derived, slot: 0 })
        );
        assert_eq!(registry.lookup("interest"), None);
    }

    #[test]
    fn test_positions_follow_store_order() {
        let registry = registry();
        let capital = registry.lookup("capital").unwrap();
        assert_eq!(registry.position(capital), 3);
        let series = registry.empty_series(12);
        assert_eq!(series[registry.position(capital)].name, "capital");
    }

    #[test]
    fn test_duplicate_names_rejected_across_kinds() {
        let mut registry = registry();
        let err = registry.add_external(ExternalVariable::constant("capital", 1.0)).unwrap_err();
        assert!(matches!(err, ProjectionError::DuplicateName(ref n) if n == "capital"));

        let err = registry
            .add_derived(DerivedVariable::new("periodNumber", |_| Ok(0.0)))
            .unwrap_err();
        assert!(matches!(err, ProjectionError::DuplicateName(_)));
        assert_eq!(registry.len(), 4);

        // The index entry of the first registration is untouched
        assert_eq!(
            registry.lookup("capital"),
            Some(VariableRef { kind: VariableKind::Derived, slot: 0 })
        );
        assert_eq!(
            registry.lookup("rate"),
            Some(VariableRef { kind: VariableKind::External, slot: 0 })
        );
    }

    #[test]
    fn test_reserved_and_empty_names() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.add_derived(DerivedVariable::new("total", |_| Ok(0.0))),
            Err(ProjectionError::ReservedName(_))
        ));
        assert!(matches!(
            registry.add_external(ExternalVariable::constant("", 0.0)),
            Err(ProjectionError::EmptyName)
        ));
        assert!(matches!(
            registry.add_derived(DerivedVariable::new("x", |_| Ok(0.0)).depends_on(Dependency::new(""))),
            Err(ProjectionError::Config(_))
        ));
        assert!(registry.is_empty());
    }
}
