//! Runtime provisioner core
//!
//! Translation and state tracking for Kubernetes runtimes provisioned on
//! GCP or through Gardener.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │          API layer (provisioner-schema)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ProvisionRuntimeInput / RuntimeStatus
//! ┌─────────────────▼───────────────────────────────┐
//! │               provisioner-core                   │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │  converters  │  │  Operation state machine │ │
//! │  └──────────────┘  └──────────────────────────┘ │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │ IdGenerator  │  │  RuntimeStatusAggregator │ │
//! │  └──────────────┘  └──────────────────────────┘ │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼─────────┐
//! │  persistence  │ │ ExecutionDriver │
//! │ (file/memory) │ │  (gcp/gardener) │
//! └───────────────┘ └─────────────────┘
//! ```

pub mod config;
pub mod converters;
pub mod driver;
pub mod error;
pub mod id;
pub mod model;
pub mod persistence;
pub mod service;
pub mod status;

#[cfg(test)]
mod test_support;

// Re-exports
pub use config::ProvisionerConfig;
pub use driver::{ExecutionDriver, ExecutionOutcome};
pub use error::{ProvisionerError, Result};
pub use id::{IdGenerator, UuidGenerator};
pub use model::{
    ClusterConfig, GardenerConfig, GcpConfig, KymaConfig, KymaConfigModule, KymaModule,
    Operation, OperationState, OperationType, RuntimeAgentConnectionStatus, RuntimeConfig,
    RuntimeStatus,
};
pub use persistence::{FileStore, MemoryStore, ReadSession, WriteSession};
pub use service::Provisioner;
pub use status::{RuntimeStatusAggregator, requires_polling};
