//! Error types for engine construction, registration and evaluation

use thiserror::Error;

/// Errors surfaced by the projection engine
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// A dependency names a variable that is not registered under any kind
    #[error("dependency '{dependency}' of variable '{variable}' not found")]
    UnresolvedDependency { variable: String, dependency: String },

    #[error("period count must be positive, got {0}")]
    InvalidPeriods(u32),

    #[error("variable name '{0}' is already registered")]
    DuplicateName(String),

    #[error("variable name '{0}' is reserved")]
    ReservedName(String),

    #[error("variable names must not be empty")]
    EmptyName,

    #[error("invalid start date '{0}' (expected YYYY-MM-DD or D-Mon-YYYY)")]
    InvalidDate(String),

    #[error("unknown date locale '{0}'")]
    UnknownLocale(String),

    #[error("date sequence left the representable range after {0}")]
    DateOutOfRange(String),

    /// A caller-supplied compute function failed; the original error is kept as the source
    #[error("compute function for '{variable}' failed")]
    Compute {
        variable: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl From<csv::Error> for ProjectionError {
    fn from(err: csv::Error) -> Self {
        ProjectionError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for ProjectionError {
    fn from(err: serde_json::Error) -> Self {
        ProjectionError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_dependency_names_the_missing_variable() {
        let err = ProjectionError::UnresolvedDependency {
            variable: "interest".to_string(),
            dependency: "capitl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("capitl"));
        assert!(msg.contains("interest"));
    }

    #[test]
    fn test_compute_error_keeps_source() {
        let err = ProjectionError::Compute {
            variable: "ratio".to_string(),
            source: anyhow::anyhow!("division by zero"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("division by zero"));
    }
}
