//! Process-local store

use super::state::ProvisionerState;
use super::{ReadSession, WriteSession};
use crate::error::Result;
use crate::model::{Operation, RuntimeAgentConnectionStatus, RuntimeConfig};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Store keeping the state behind an async read/write lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<ProvisionerState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadSession for MemoryStore {
    async fn get_last_operation(&self, runtime_id: &str) -> Result<Operation> {
        self.state.read().await.last_operation(runtime_id).cloned()
    }

    async fn get_operation(&self, operation_id: &str) -> Result<Operation> {
        self.state.read().await.operation(operation_id).cloned()
    }

    async fn get_runtime_config(&self, runtime_id: &str) -> Result<RuntimeConfig> {
        let state = self.state.read().await;
        Ok(state.runtime(runtime_id)?.config.clone())
    }

    async fn get_connection_status(
        &self,
        runtime_id: &str,
    ) -> Result<Option<RuntimeAgentConnectionStatus>> {
        let state = self.state.read().await;
        Ok(state.runtime(runtime_id)?.connection_status)
    }
}

#[async_trait]
impl WriteSession for MemoryStore {
    async fn insert_runtime(
        &self,
        runtime_id: &str,
        config: RuntimeConfig,
        operation: Operation,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .insert_runtime(runtime_id, config, operation)
    }

    async fn insert_operation(&self, operation: Operation) -> Result<()> {
        self.state.write().await.insert_operation(operation)
    }

    async fn update_operation(&self, operation: Operation) -> Result<()> {
        self.state.write().await.update_operation(operation)
    }

    async fn complete_operation(
        &self,
        operation: Operation,
        kubeconfig: Option<String>,
        connection_status: Option<RuntimeAgentConnectionStatus>,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .complete_operation(operation, kubeconfig, connection_status)
    }

    async fn set_kubeconfig(&self, runtime_id: &str, kubeconfig: String) -> Result<()> {
        self.state.write().await.set_kubeconfig(runtime_id, kubeconfig)
    }

    async fn set_connection_status(
        &self,
        runtime_id: &str,
        status: RuntimeAgentConnectionStatus,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .set_connection_status(runtime_id, status)
    }
}
