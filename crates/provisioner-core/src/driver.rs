//! Execution driver contract
//!
//! Drivers perform the actual infrastructure work behind an operation
//! (creating a GKE cluster, a Gardener shoot, ...). They live outside this
//! crate; the provisioner only hands them an operation and records the
//! outcome they report.

use crate::error::Result;
use crate::model::{Operation, OperationState};
use async_trait::async_trait;

/// Infrastructure driver executing operations
#[async_trait]
pub trait ExecutionDriver: Send + Sync {
    /// Returns the driver name (e.g., "gardener", "gcp")
    fn name(&self) -> &str;

    /// Carry out the operation and report how it ended
    async fn execute(&self, operation: &Operation) -> Result<ExecutionOutcome>;
}

/// Final result of an executed operation
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Succeeded {
        message: String,
        /// Credentials of a freshly provisioned cluster
        kubeconfig: Option<String>,
    },
    Failed {
        message: String,
    },
}

impl ExecutionOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::Succeeded {
            message: message.into(),
            kubeconfig: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn with_kubeconfig(self, kubeconfig: impl Into<String>) -> Self {
        match self {
            Self::Succeeded { message, .. } => Self::Succeeded {
                message,
                kubeconfig: Some(kubeconfig.into()),
            },
            failed => failed,
        }
    }

    pub fn state(&self) -> OperationState {
        match self {
            Self::Succeeded { .. } => OperationState::Succeeded,
            Self::Failed { .. } => OperationState::Failed,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Succeeded { message, .. } | Self::Failed { message } => message,
        }
    }
}
