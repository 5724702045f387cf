//! String-valued enums of the external API

use serde::{Deserialize, Serialize};

/// Kind of asynchronous action reported in an operation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Provision,
    Upgrade,
    Deprovision,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Provision => "PROVISION",
            OperationType::Upgrade => "UPGRADE",
            OperationType::Deprovision => "DEPROVISION",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of an operation as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::InProgress => "IN_PROGRESS",
            OperationState::Succeeded => "SUCCEEDED",
            OperationState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectivity of the agent running inside a provisioned cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeAgentConnectionStatus {
    Connected,
    Disconnected,
}

impl std::fmt::Display for RuntimeAgentConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeAgentConnectionStatus::Connected => write!(f, "CONNECTED"),
            RuntimeAgentConnectionStatus::Disconnected => write!(f, "DISCONNECTED"),
        }
    }
}

/// Selectable Kyma add-on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KymaModule {
    Backup,
    BackupInit,
    Jaeger,
    Logging,
    Monitoring,
    PrometheusOperator,
    Kiali,
    KnativeBuild,
}
