//! Runtime provisioner API schema
//!
//! Caller-facing types exchanged with the provisioner. Inputs and outputs
//! follow the GraphQL conventions of the public API:
//!
//! - field names are `camelCase`
//! - enum values are `SCREAMING_SNAKE_CASE` strings
//! - every output field is optional; `None` means "unknown", never "empty"
//!
//! The internal, persisted model lives in `provisioner-core`, which also
//! owns the translation between the two shapes.

pub mod enums;
pub mod input;
pub mod status;

// Re-exports
pub use enums::{KymaModule, OperationState, OperationType, RuntimeAgentConnectionStatus};
pub use input::{
    ClusterConfigInput, CredentialsInput, GardenerConfigInput, GcpConfigInput, KymaConfigInput,
    ProvisionRuntimeInput,
};
pub use status::{
    ClusterConfig, GardenerConfig, GcpConfig, KymaConfig, OperationStatus, RuntimeConfig,
    RuntimeConnectionStatus, RuntimeStatus,
};
