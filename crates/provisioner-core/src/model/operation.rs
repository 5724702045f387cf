//! Operation state machine
//!
//! An [`Operation`] tracks one asynchronous infrastructure action against a
//! runtime. Its type never changes; its state only moves forward:
//!
//! ```text
//!              ┌──────────► Succeeded
//! InProgress ──┤
//!              └──────────► Failed
//! ```
//!
//! Updates are whole-record replacements: [`Operation::transition`] returns a
//! new value and leaves the original untouched, so a reader always observes a
//! consistent snapshot.

use crate::error::{ProvisionerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of infrastructure action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Provision,
    Deprovision,
    Upgrade,
}

impl OperationType {
    pub const ALL: [OperationType; 3] = [
        OperationType::Provision,
        OperationType::Deprovision,
        OperationType::Upgrade,
    ];
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Provision => write!(f, "provision"),
            OperationType::Deprovision => write!(f, "deprovision"),
            OperationType::Upgrade => write!(f, "upgrade"),
        }
    }
}

/// Lifecycle state of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
}

impl OperationState {
    pub const ALL: [OperationState; 3] = [
        OperationState::InProgress,
        OperationState::Succeeded,
        OperationState::Failed,
    ];

    /// Whether further polling of the operation is meaningless
    pub fn is_terminal(&self) -> bool {
        match self {
            OperationState::InProgress => false,
            OperationState::Succeeded | OperationState::Failed => true,
        }
    }

    /// Legal transition table
    pub fn can_transition_to(&self, next: OperationState) -> bool {
        matches!(
            (self, next),
            (OperationState::InProgress, OperationState::Succeeded)
                | (OperationState::InProgress, OperationState::Failed)
        )
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationState::InProgress => write!(f, "in_progress"),
            OperationState::Succeeded => write!(f, "succeeded"),
            OperationState::Failed => write!(f, "failed"),
        }
    }
}

/// Tracked asynchronous action against a runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier, immutable
    pub id: String,

    pub operation_type: OperationType,

    pub state: OperationState,

    /// Human-readable progress message, may be empty
    pub message: String,

    /// Runtime the operation acts on, immutable
    pub cluster_id: String,

    pub started_at: DateTime<Utc>,

    /// Set once the operation reaches a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

impl Operation {
    /// Create a new in-progress operation
    pub fn new(
        id: impl Into<String>,
        operation_type: OperationType,
        cluster_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            operation_type,
            state: OperationState::InProgress,
            message: message.into(),
            cluster_id: cluster_id.into(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Produce the record that replaces this one after moving to `next`
    pub fn transition(&self, next: OperationState, message: impl Into<String>) -> Result<Self> {
        if !self.state.can_transition_to(next) {
            return Err(ProvisionerError::invariant_violation(format!(
                "operation {} cannot move from {} to {}",
                self.id, self.state, next
            )));
        }

        let finished_at = if next.is_terminal() {
            Some(Utc::now())
        } else {
            None
        };

        Ok(Self {
            state: next,
            message: message.into(),
            finished_at,
            ..self.clone()
        })
    }
}
