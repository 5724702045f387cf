//! Status snapshots reported back to callers

use crate::enums::{KymaModule, OperationState, OperationType, RuntimeAgentConnectionStatus};
use serde::{Deserialize, Serialize};

/// Status of a single provision, upgrade or deprovision operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub id: Option<String>,
    pub operation: OperationType,
    pub state: OperationState,
    pub message: Option<String>,
    pub runtime_id: Option<String>,
}

/// Aggregated view of a runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    pub last_operation_status: Option<OperationStatus>,
    pub runtime_connection_status: Option<RuntimeConnectionStatus>,
    pub runtime_configuration: Option<RuntimeConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConnectionStatus {
    pub status: RuntimeAgentConnectionStatus,
}

/// Configuration a runtime was provisioned with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub cluster_config: Option<ClusterConfig>,
    pub kyma_config: Option<KymaConfig>,
    pub kubeconfig: Option<String>,
}

/// Provider-specific cluster shape
///
/// Serialized as a GraphQL union: the `__typename` field names the variant
/// and only that variant's fields are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum ClusterConfig {
    #[serde(rename = "GCPConfig")]
    Gcp(GcpConfig),
    #[serde(rename = "GardenerConfig")]
    Gardener(GardenerConfig),
}

impl ClusterConfig {
    pub fn as_gcp(&self) -> Option<&GcpConfig> {
        match self {
            ClusterConfig::Gcp(config) => Some(config),
            ClusterConfig::Gardener(_) => None,
        }
    }

    pub fn as_gardener(&self) -> Option<&GardenerConfig> {
        match self {
            ClusterConfig::Gardener(config) => Some(config),
            ClusterConfig::Gcp(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpConfig {
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub kubernetes_version: Option<String>,
    pub number_of_nodes: Option<i32>,
    pub boot_disk_size: Option<String>,
    pub machine_type: Option<String>,
    pub region: Option<String>,
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenerConfig {
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub kubernetes_version: Option<String>,
    pub node_count: Option<i32>,
    pub volume_size: Option<String>,
    pub machine_type: Option<String>,
    pub region: Option<String>,
    pub target_provider: Option<String>,
    pub target_secret: Option<String>,
    pub disk_type: Option<String>,
    pub zone: Option<String>,
    pub cidr: Option<String>,
    pub auto_scaler_min: Option<i32>,
    pub auto_scaler_max: Option<i32>,
    pub max_surge: Option<i32>,
    pub max_unavailable: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KymaConfig {
    pub version: Option<String>,
    pub modules: Vec<KymaModule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_config_union_typename() {
        let config = ClusterConfig::Gardener(GardenerConfig {
            name: Some("tenant-b".to_string()),
            node_count: Some(2),
            ..Default::default()
        });

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["__typename"], "GardenerConfig");
        assert_eq!(value["nodeCount"], 2);
        assert!(value.get("numberOfNodes").is_none());

        let parsed: ClusterConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_cluster_config_accessors() {
        let config = ClusterConfig::Gcp(GcpConfig::default());
        assert!(config.as_gcp().is_some());
        assert!(config.as_gardener().is_none());
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let status = RuntimeStatus {
            last_operation_status: None,
            runtime_connection_status: None,
            runtime_configuration: None,
        };

        let value = serde_json::to_value(&status).unwrap();
        assert!(value["lastOperationStatus"].is_null());
        assert!(value["runtimeConnectionStatus"].is_null());
        assert!(value["runtimeConfiguration"].is_null());
    }
}
