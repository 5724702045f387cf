//! Provisioner error types

use thiserror::Error;

/// Provisioner errors
#[derive(Error, Debug)]
pub enum ProvisionerError {
    /// Malformed or ambiguous caller input. Never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Programming-error class fault, e.g. leaving a terminal state
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProvisionerError {
    /// Build an `InvariantViolation`, logging it at error level
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("Invariant violated: {}", message);
        ProvisionerError::InvariantViolation(message)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProvisionerError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ProvisionerError::Validation(_))
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ProvisionerError::InvariantViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, ProvisionerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let not_found = ProvisionerError::NotFound("runtime-1".to_string());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_validation());

        let validation = ProvisionerError::Validation("no provider".to_string());
        assert!(validation.is_validation());
        assert!(!validation.is_invariant_violation());

        let io = ProvisionerError::from(std::io::Error::other("disk full"));
        assert!(!io.is_not_found());
        assert!(!io.is_validation());
        assert!(!io.is_invariant_violation());
    }

    #[test]
    fn test_display() {
        let err = ProvisionerError::InvariantViolation("operation op-1 is terminal".to_string());
        assert_eq!(
            err.to_string(),
            "Invariant violated: operation op-1 is terminal"
        );
    }

    #[test]
    fn test_invariant_violation_constructor() {
        let err = ProvisionerError::invariant_violation("operation op-1 is terminal");
        assert!(err.is_invariant_violation());
        assert_eq!(
            err.to_string(),
            "Invariant violated: operation op-1 is terminal"
        );
    }
}
