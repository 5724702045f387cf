//! Provisioning intent submitted by callers

use crate::enums::KymaModule;
use serde::{Deserialize, Serialize};

/// Request to provision a new runtime
///
/// All three sections are required by the API; they are optional here so
/// that a malformed request can be reported as a validation error instead of
/// failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRuntimeInput {
    pub cluster_config: Option<ClusterConfigInput>,
    pub credentials: Option<CredentialsInput>,
    pub kyma_config: Option<KymaConfigInput>,
}

/// Provider selection. Exactly one of the fields must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigInput {
    pub gardener_config: Option<GardenerConfigInput>,
    pub gcp_config: Option<GcpConfigInput>,
}

impl ClusterConfigInput {
    pub fn gcp(config: GcpConfigInput) -> Self {
        Self {
            gcp_config: Some(config),
            ..Default::default()
        }
    }

    pub fn gardener(config: GardenerConfigInput) -> Self {
        Self {
            gardener_config: Some(config),
            ..Default::default()
        }
    }
}

/// Cluster shape on the native GCP provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpConfigInput {
    pub name: String,
    pub project_name: String,
    pub kubernetes_version: String,
    pub number_of_nodes: i32,
    pub boot_disk_size: String,
    pub machine_type: String,
    pub region: String,
    pub zone: Option<String>,
}

/// Cluster shape on Gardener, which fronts several cloud backends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenerConfigInput {
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
}

/// Reference to the stored cloud credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsInput {
    pub secret_name: String,
}

/// Kyma version and the ordered add-on selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KymaConfigInput {
    pub version: String,
    #[serde(default)]
    pub modules: Vec<KymaModule>,
}
