//! Runtime configuration model
//!
//! Concrete, non-optional shape persisted for every runtime. Absent inputs
//! are stored as zero values; the translator decides how they are reported.

use super::operation::Operation;
use serde::{Deserialize, Serialize};

/// Full configuration of a provisioned runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub cluster_config: ClusterConfig,

    /// Cluster credentials, attached once provisioning succeeds
    pub kubeconfig: Option<String>,

    pub kyma_config: KymaConfig,

    /// Name of the secret holding the provider credentials
    pub credentials_secret_name: String,
}

/// Provider-specific cluster configuration. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ClusterConfig {
    Gcp(GcpConfig),
    Gardener(GardenerConfig),
}

impl ClusterConfig {
    pub fn id(&self) -> &str {
        match self {
            ClusterConfig::Gcp(config) => &config.id,
            ClusterConfig::Gardener(config) => &config.id,
        }
    }

    pub fn cluster_id(&self) -> &str {
        match self {
            ClusterConfig::Gcp(config) => &config.cluster_id,
            ClusterConfig::Gardener(config) => &config.cluster_id,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            ClusterConfig::Gcp(_) => "gcp",
            ClusterConfig::Gardener(_) => "gardener",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GcpConfig {
    pub id: String,
    pub name: String,
    pub project_name: String,
    pub number_of_nodes: i32,
    pub boot_disk_size: String,
    pub machine_type: String,
    pub region: String,
    /// Empty when no zone was requested
    pub zone: String,
    pub kubernetes_version: String,
    pub cluster_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenerConfig {
    pub id: String,
    pub name: String,
    pub project_name: String,
    pub kubernetes_version: String,
    pub node_count: i32,
    pub volume_size: String,
    pub machine_type: String,
    pub region: String,
    pub target_provider: String,
    pub target_secret: String,
    pub disk_type: String,
    pub zone: String,
    pub cidr: String,
    pub auto_scaler_min: i32,
    pub auto_scaler_max: i32,
    pub max_surge: i32,
    pub max_unavailable: i32,
    pub cluster_id: String,
}

/// Kyma add-on configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KymaConfig {
    pub id: String,
    pub version: String,
    /// Ordered; duplicates are kept as given
    pub modules: Vec<KymaConfigModule>,
    pub cluster_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KymaConfigModule {
    pub id: String,
    pub module: KymaModule,
    pub kyma_config_id: String,
}

/// Selectable Kyma add-on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

impl KymaModule {
    pub const ALL: [KymaModule; 8] = [
        KymaModule::Backup,
        KymaModule::BackupInit,
        KymaModule::Jaeger,
        KymaModule::Logging,
        KymaModule::Monitoring,
        KymaModule::PrometheusOperator,
        KymaModule::Kiali,
        KymaModule::KnativeBuild,
    ];
}

/// Connectivity of the agent running inside the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeAgentConnectionStatus {
    Connected,
    Disconnected,
}

impl std::fmt::Display for RuntimeAgentConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeAgentConnectionStatus::Connected => write!(f, "connected"),
            RuntimeAgentConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Read-time composite of everything known about a runtime. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeStatus {
    pub last_operation_status: Operation,
    /// `None` until the runtime agent has reported in
    pub runtime_connection_status: Option<RuntimeAgentConnectionStatus>,
    pub runtime_configuration: RuntimeConfig,
}
