//! Persistence of runtimes and operations
//!
//! Storage is reached through two narrow session traits. Reads return owned
//! snapshots; writes replace whole records. Two stores are provided:
//!
//! - [`MemoryStore`]: process-local, used by tests and embedders
//! - [`FileStore`]: JSON state file with backup and lock file, used by the CLI

mod file;
mod memory;
mod state;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use state::{ProvisionerState, RuntimeRecord};

use crate::error::Result;
use crate::model::{Operation, RuntimeAgentConnectionStatus, RuntimeConfig};
use async_trait::async_trait;

/// Read access to persisted records
#[async_trait]
pub trait ReadSession: Send + Sync {
    /// Latest operation of a runtime, `NotFound` if there is none
    async fn get_last_operation(&self, runtime_id: &str) -> Result<Operation>;

    async fn get_operation(&self, operation_id: &str) -> Result<Operation>;

    async fn get_runtime_config(&self, runtime_id: &str) -> Result<RuntimeConfig>;

    async fn get_connection_status(
        &self,
        runtime_id: &str,
    ) -> Result<Option<RuntimeAgentConnectionStatus>>;
}

/// Write access to persisted records
#[async_trait]
pub trait WriteSession: ReadSession {
    async fn insert_runtime(
        &self,
        runtime_id: &str,
        config: RuntimeConfig,
        operation: Operation,
    ) -> Result<()>;

    async fn insert_operation(&self, operation: Operation) -> Result<()>;

    /// Replace an operation record. Illegal state transitions and changes to
    /// immutable fields fail with `InvariantViolation`.
    async fn update_operation(&self, operation: Operation) -> Result<()>;

    /// Replace a now terminal operation and apply its effects on the runtime
    /// in one write. Nothing is stored if any part is rejected.
    async fn complete_operation(
        &self,
        operation: Operation,
        kubeconfig: Option<String>,
        connection_status: Option<RuntimeAgentConnectionStatus>,
    ) -> Result<()>;

    async fn set_kubeconfig(&self, runtime_id: &str, kubeconfig: String) -> Result<()>;

    async fn set_connection_status(
        &self,
        runtime_id: &str,
        status: RuntimeAgentConnectionStatus,
    ) -> Result<()>;
}
