//! In-memory image of everything the provisioner persists
//!
//! Both store implementations load, mutate and hand out clones of a
//! [`ProvisionerState`]; the record-level invariants live here so they hold
//! regardless of where the state is kept.

use crate::error::{ProvisionerError, Result};
use crate::model::{Operation, OperationState, RuntimeAgentConnectionStatus, RuntimeConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(crate) const STATE_VERSION: u32 = 1;

/// Persisted runtimes and the full operation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionerState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Runtimes indexed by runtime id
    pub runtimes: HashMap<String, RuntimeRecord>,

    /// Operation history in creation order. Never pruned.
    pub operations: Vec<Operation>,
}

/// Stored data of a single runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeRecord {
    pub config: RuntimeConfig,

    #[serde(default)]
    pub connection_status: Option<RuntimeAgentConnectionStatus>,
}

impl Default for ProvisionerState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            runtimes: HashMap::new(),
            operations: Vec::new(),
        }
    }
}

impl ProvisionerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runtime(&self, runtime_id: &str) -> Result<&RuntimeRecord> {
        self.runtimes
            .get(runtime_id)
            .ok_or_else(|| ProvisionerError::NotFound(format!("runtime {}", runtime_id)))
    }

    fn runtime_mut(&mut self, runtime_id: &str) -> Result<&mut RuntimeRecord> {
        self.runtimes
            .get_mut(runtime_id)
            .ok_or_else(|| ProvisionerError::NotFound(format!("runtime {}", runtime_id)))
    }

    pub fn operation(&self, operation_id: &str) -> Result<&Operation> {
        self.operations
            .iter()
            .find(|op| op.id == operation_id)
            .ok_or_else(|| ProvisionerError::NotFound(format!("operation {}", operation_id)))
    }

    /// The most recently created operation of a runtime
    pub fn last_operation(&self, runtime_id: &str) -> Result<&Operation> {
        self.operations
            .iter()
            .rev()
            .find(|op| op.cluster_id == runtime_id)
            .ok_or_else(|| {
                ProvisionerError::NotFound(format!("no operation for runtime {}", runtime_id))
            })
    }

    /// Register a new runtime together with the operation provisioning it
    pub fn insert_runtime(
        &mut self,
        runtime_id: &str,
        config: RuntimeConfig,
        operation: Operation,
    ) -> Result<()> {
        if self.runtimes.contains_key(runtime_id) {
            return Err(ProvisionerError::AlreadyExists(format!(
                "runtime {}",
                runtime_id
            )));
        }
        if config.cluster_config.cluster_id() != runtime_id
            || config.kyma_config.cluster_id != runtime_id
        {
            return Err(ProvisionerError::invariant_violation(format!(
                "configuration of runtime {} references another cluster",
                runtime_id
            )));
        }

        self.runtimes.insert(
            runtime_id.to_string(),
            RuntimeRecord {
                config,
                connection_status: None,
            },
        );
        if let Err(e) = self.insert_operation(operation) {
            self.runtimes.remove(runtime_id);
            return Err(e);
        }
        Ok(())
    }

    /// Append a freshly created operation to the history
    pub fn insert_operation(&mut self, operation: Operation) -> Result<()> {
        self.runtime(&operation.cluster_id)?;

        if self.operations.iter().any(|op| op.id == operation.id) {
            return Err(ProvisionerError::AlreadyExists(format!(
                "operation {}",
                operation.id
            )));
        }
        if operation.state != OperationState::InProgress {
            return Err(ProvisionerError::invariant_violation(format!(
                "operation {} must start in progress, got {}",
                operation.id, operation.state
            )));
        }

        self.operations.push(operation);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace a stored operation with a newer version of the same record
    pub fn update_operation(&mut self, operation: Operation) -> Result<()> {
        let stored = self
            .operations
            .iter_mut()
            .find(|op| op.id == operation.id)
            .ok_or_else(|| ProvisionerError::NotFound(format!("operation {}", operation.id)))?;

        if stored.cluster_id != operation.cluster_id
            || stored.operation_type != operation.operation_type
        {
            return Err(ProvisionerError::invariant_violation(format!(
                "operation {} changed its runtime or type",
                operation.id
            )));
        }
        if stored.is_terminal() {
            return Err(ProvisionerError::invariant_violation(format!(
                "operation {} is already {}",
                operation.id, stored.state
            )));
        }
        if stored.state != operation.state && !stored.state.can_transition_to(operation.state) {
            return Err(ProvisionerError::invariant_violation(format!(
                "operation {} cannot move from {} to {}",
                operation.id, stored.state, operation.state
            )));
        }

        *stored = operation;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store a finished operation together with the runtime changes it
    /// brings. Either everything is applied or nothing is.
    pub fn complete_operation(
        &mut self,
        operation: Operation,
        kubeconfig: Option<String>,
        connection_status: Option<RuntimeAgentConnectionStatus>,
    ) -> Result<()> {
        if !operation.is_terminal() {
            return Err(ProvisionerError::invariant_violation(format!(
                "operation {} completed in state {}",
                operation.id, operation.state
            )));
        }
        let runtime_id = operation.cluster_id.clone();
        self.runtime(&runtime_id)?;

        self.update_operation(operation)?;

        let runtime = self.runtime_mut(&runtime_id)?;
        if let Some(kubeconfig) = kubeconfig {
            runtime.config.kubeconfig = Some(kubeconfig);
        }
        if let Some(status) = connection_status {
            runtime.connection_status = Some(status);
        }
        Ok(())
    }

    pub fn set_kubeconfig(&mut self, runtime_id: &str, kubeconfig: String) -> Result<()> {
        self.runtime_mut(runtime_id)?.config.kubeconfig = Some(kubeconfig);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_connection_status(
        &mut self,
        runtime_id: &str,
        status: RuntimeAgentConnectionStatus,
    ) -> Result<()> {
        self.runtime_mut(runtime_id)?.connection_status = Some(status);
        self.updated_at = Utc::now();
        Ok(())
    }
}
