//! Provisioning service
//!
//! Entry point used by the API layer. Accepts provisioning intents, records
//! the operations tracking them and reports status in the external shape.

use crate::converters::{
    operation_status_to_external, runtime_config_from_input, runtime_status_to_external,
};
use crate::driver::{ExecutionDriver, ExecutionOutcome};
use crate::error::{ProvisionerError, Result};
use crate::id::IdGenerator;
use crate::model::{Operation, OperationState, OperationType, RuntimeAgentConnectionStatus};
use crate::persistence::WriteSession;
use crate::status::RuntimeStatusAggregator;
use provisioner_schema as schema;
use std::sync::Arc;

pub struct Provisioner<S> {
    session: Arc<S>,
    ids: Arc<dyn IdGenerator>,
}

impl<S: WriteSession> Provisioner<S> {
    pub fn new(session: Arc<S>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { session, ids }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Start provisioning a new runtime. Returns the operation id.
    pub async fn provision_runtime(
        &self,
        runtime_id: &str,
        input: &schema::ProvisionRuntimeInput,
    ) -> Result<String> {
        match self.session.get_runtime_config(runtime_id).await {
            Ok(_) => {
                return Err(ProvisionerError::AlreadyExists(format!(
                    "runtime {}",
                    runtime_id
                )));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let config = runtime_config_from_input(runtime_id, input, self.ids.as_ref())?;
        let operation = Operation::new(
            self.ids.new_id(),
            OperationType::Provision,
            runtime_id,
            format!(
                "Provisioning of {} cluster started",
                config.cluster_config.provider_name()
            ),
        );
        let operation_id = operation.id.clone();

        self.session
            .insert_runtime(runtime_id, config, operation)
            .await?;

        tracing::info!(
            "Started provisioning of runtime {} (operation {})",
            runtime_id,
            operation_id
        );
        Ok(operation_id)
    }

    /// Start deprovisioning an existing runtime. Returns the operation id.
    pub async fn deprovision_runtime(&self, runtime_id: &str) -> Result<String> {
        self.start_operation(runtime_id, OperationType::Deprovision, "Deprovisioning started")
            .await
    }

    /// Start upgrading an existing runtime. Returns the operation id.
    pub async fn upgrade_runtime(&self, runtime_id: &str) -> Result<String> {
        self.start_operation(runtime_id, OperationType::Upgrade, "Upgrade started")
            .await
    }

    async fn start_operation(
        &self,
        runtime_id: &str,
        operation_type: OperationType,
        message: &str,
    ) -> Result<String> {
        let last = self.session.get_last_operation(runtime_id).await?;
        if !last.is_terminal() {
            return Err(ProvisionerError::Validation(format!(
                "runtime {} has operation {} in progress",
                runtime_id, last.id
            )));
        }
        if last.operation_type == OperationType::Deprovision
            && last.state == OperationState::Succeeded
        {
            return Err(ProvisionerError::Validation(format!(
                "runtime {} is deprovisioned",
                runtime_id
            )));
        }

        let operation = Operation::new(self.ids.new_id(), operation_type, runtime_id, message);
        let operation_id = operation.id.clone();
        self.session.insert_operation(operation).await?;

        tracing::info!(
            "Started {} of runtime {} (operation {})",
            operation_type,
            runtime_id,
            operation_id
        );
        Ok(operation_id)
    }

    /// Aggregated status of a runtime
    pub async fn runtime_status(&self, runtime_id: &str) -> Result<schema::RuntimeStatus> {
        let status = RuntimeStatusAggregator::new(self.session.as_ref())
            .aggregate(runtime_id)
            .await?;
        Ok(runtime_status_to_external(&status))
    }

    pub async fn runtime_operation_status(
        &self,
        operation_id: &str,
    ) -> Result<schema::OperationStatus> {
        let operation = self.session.get_operation(operation_id).await?;
        Ok(operation_status_to_external(&operation))
    }

    /// Record the terminal state reported for an operation
    ///
    /// `kubeconfig` may only accompany a successful provision.
    pub async fn finish_operation(
        &self,
        operation_id: &str,
        state: OperationState,
        message: &str,
        kubeconfig: Option<String>,
    ) -> Result<schema::OperationStatus> {
        let outcome = match state {
            OperationState::Succeeded => ExecutionOutcome::Succeeded {
                message: message.to_string(),
                kubeconfig,
            },
            OperationState::Failed if kubeconfig.is_none() => ExecutionOutcome::failed(message),
            OperationState::Failed => {
                return Err(ProvisionerError::Validation(
                    "kubeconfig can only be attached to a successful operation".to_string(),
                ));
            }
            OperationState::InProgress => {
                return Err(ProvisionerError::Validation(format!(
                    "operation {} can only be finished with a terminal state",
                    operation_id
                )));
            }
        };

        let operation = self.session.get_operation(operation_id).await?;
        let finished = self.record_outcome(&operation, outcome).await?;
        Ok(operation_status_to_external(&finished))
    }

    /// Run `driver` for an in-progress operation and record the outcome
    ///
    /// A driver error marks the operation failed and is returned unchanged.
    pub async fn execute_operation(
        &self,
        operation_id: &str,
        driver: &dyn ExecutionDriver,
    ) -> Result<schema::OperationStatus> {
        let operation = self.session.get_operation(operation_id).await?;
        if operation.is_terminal() {
            tracing::debug!(
                "Operation {} is already {}, nothing to execute",
                operation.id,
                operation.state
            );
            return Ok(operation_status_to_external(&operation));
        }

        tracing::info!(
            "Executing {} operation {} with driver {}",
            operation.operation_type,
            operation.id,
            driver.name()
        );

        match driver.execute(&operation).await {
            Ok(outcome) => {
                let finished = self.record_outcome(&operation, outcome).await?;
                Ok(operation_status_to_external(&finished))
            }
            Err(e) => {
                tracing::warn!("Driver {} failed operation {}: {}", driver.name(), operation.id, e);
                let failed = operation.transition(OperationState::Failed, e.to_string())?;
                self.session.complete_operation(failed, None, None).await?;
                Err(e)
            }
        }
    }

    async fn record_outcome(
        &self,
        operation: &Operation,
        outcome: ExecutionOutcome,
    ) -> Result<Operation> {
        let finished = operation.transition(outcome.state(), outcome.message())?;

        let kubeconfig = match outcome {
            ExecutionOutcome::Succeeded {
                kubeconfig: Some(kubeconfig),
                ..
            } => {
                if operation.operation_type != OperationType::Provision {
                    return Err(ProvisionerError::Validation(format!(
                        "kubeconfig reported for {} operation {}",
                        operation.operation_type, operation.id
                    )));
                }
                Some(kubeconfig)
            }
            _ => None,
        };

        let connection_status = (finished.operation_type == OperationType::Deprovision
            && finished.state == OperationState::Succeeded)
            .then_some(RuntimeAgentConnectionStatus::Disconnected);

        self.session
            .complete_operation(finished.clone(), kubeconfig, connection_status)
            .await?;

        tracing::info!(
            "Operation {} of runtime {} finished: {}",
            finished.id,
            finished.cluster_id,
            finished.state
        );
        Ok(finished)
    }

    /// Record what the runtime agent reported about its connectivity
    pub async fn set_connection_status(
        &self,
        runtime_id: &str,
        status: RuntimeAgentConnectionStatus,
    ) -> Result<()> {
        self.session.set_connection_status(runtime_id, status).await
    }
}
