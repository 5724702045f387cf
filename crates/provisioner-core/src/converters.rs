//! Translation between the external API shapes and the internal model
//!
//! All functions here are pure: they touch nothing but their arguments and
//! the identifier generator they are handed, and are safe to call
//! concurrently.
//!
//! Enum mappings are written as exhaustive `match` expressions so a new
//! internal variant without an external counterpart fails to compile.

use crate::error::{ProvisionerError, Result};
use crate::id::IdGenerator;
use crate::model::{
    ClusterConfig, GardenerConfig, GcpConfig, KymaConfig, KymaConfigModule, KymaModule,
    Operation, OperationState, OperationType, RuntimeAgentConnectionStatus, RuntimeConfig,
    RuntimeStatus,
};
use provisioner_schema as schema;

/// Build the internal configuration of a new runtime from a provisioning
/// intent.
///
/// The input is validated completely before the first identifier is drawn.
/// Identifiers are then generated in a fixed order: cluster config, Kyma
/// config, one per module in input order.
pub fn runtime_config_from_input(
    runtime_id: &str,
    input: &schema::ProvisionRuntimeInput,
    ids: &dyn IdGenerator,
) -> Result<RuntimeConfig> {
    if runtime_id.is_empty() {
        return Err(ProvisionerError::Validation(
            "runtime id must not be empty".to_string(),
        ));
    }

    let cluster_input = input.cluster_config.as_ref().ok_or_else(|| {
        ProvisionerError::Validation("cluster config is required".to_string())
    })?;
    let provider = ProviderInput::select(cluster_input)?;

    let credentials = input.credentials.as_ref().ok_or_else(|| {
        ProvisionerError::Validation("credentials are required".to_string())
    })?;
    let kyma_input = input.kyma_config.as_ref().ok_or_else(|| {
        ProvisionerError::Validation("kyma config is required".to_string())
    })?;

    let cluster_config = match provider {
        ProviderInput::Gcp(gcp) => ClusterConfig::Gcp(gcp_config_from_input(runtime_id, gcp, ids)),
        ProviderInput::Gardener(gardener) => {
            ClusterConfig::Gardener(gardener_config_from_input(runtime_id, gardener, ids))
        }
    };

    Ok(RuntimeConfig {
        cluster_config,
        kubeconfig: None,
        kyma_config: kyma_config_from_input(runtime_id, kyma_input, ids),
        credentials_secret_name: credentials.secret_name.clone(),
    })
}

/// Provider variant picked out of a `ClusterConfigInput`
enum ProviderInput<'a> {
    Gcp(&'a schema::GcpConfigInput),
    Gardener(&'a schema::GardenerConfigInput),
}

impl<'a> ProviderInput<'a> {
    fn select(input: &'a schema::ClusterConfigInput) -> Result<Self> {
        match (&input.gcp_config, &input.gardener_config) {
            (Some(gcp), None) => Ok(ProviderInput::Gcp(gcp)),
            (None, Some(gardener)) => Ok(ProviderInput::Gardener(gardener)),
            (Some(_), Some(_)) => Err(ProvisionerError::Validation(
                "cluster config is ambiguous: both gcpConfig and gardenerConfig are set"
                    .to_string(),
            )),
            (None, None) => Err(ProvisionerError::Validation(
                "cluster config must set one of gcpConfig or gardenerConfig".to_string(),
            )),
        }
    }
}

fn gcp_config_from_input(
    runtime_id: &str,
    input: &schema::GcpConfigInput,
    ids: &dyn IdGenerator,
) -> GcpConfig {
    GcpConfig {
        id: ids.new_id(),
        name: input.name.clone(),
        project_name: input.project_name.clone(),
        number_of_nodes: input.number_of_nodes,
        boot_disk_size: input.boot_disk_size.clone(),
        machine_type: input.machine_type.clone(),
        region: input.region.clone(),
        zone: input.zone.clone().unwrap_or_default(),
        kubernetes_version: input.kubernetes_version.clone(),
        cluster_id: runtime_id.to_string(),
    }
}

fn gardener_config_from_input(
    runtime_id: &str,
    input: &schema::GardenerConfigInput,
    ids: &dyn IdGenerator,
) -> GardenerConfig {
    GardenerConfig {
        id: ids.new_id(),
        name: input.name.clone(),
        project_name: input.project_name.clone(),
        kubernetes_version: input.kubernetes_version.clone(),
        node_count: input.node_count,
        volume_size: input.volume_size.clone(),
        machine_type: input.machine_type.clone(),
        region: input.region.clone(),
        target_provider: input.target_provider.clone(),
        target_secret: input.target_secret.clone(),
        disk_type: input.disk_type.clone(),
        zone: input.zone.clone(),
        cidr: input.cidr.clone(),
        auto_scaler_min: input.auto_scaler_min,
        auto_scaler_max: input.auto_scaler_max,
        max_surge: input.max_surge,
        max_unavailable: input.max_unavailable,
        cluster_id: runtime_id.to_string(),
    }
}

fn kyma_config_from_input(
    runtime_id: &str,
    input: &schema::KymaConfigInput,
    ids: &dyn IdGenerator,
) -> KymaConfig {
    let kyma_config_id = ids.new_id();

    let modules = input
        .modules
        .iter()
        .map(|module| KymaConfigModule {
            id: ids.new_id(),
            module: kyma_module_from_input(*module),
            kyma_config_id: kyma_config_id.clone(),
        })
        .collect();

    KymaConfig {
        id: kyma_config_id,
        version: input.version.clone(),
        modules,
        cluster_id: runtime_id.to_string(),
    }
}

fn kyma_module_from_input(module: schema::KymaModule) -> KymaModule {
    match module {
        schema::KymaModule::Backup => KymaModule::Backup,
        schema::KymaModule::BackupInit => KymaModule::BackupInit,
        schema::KymaModule::Jaeger => KymaModule::Jaeger,
        schema::KymaModule::Logging => KymaModule::Logging,
        schema::KymaModule::Monitoring => KymaModule::Monitoring,
        schema::KymaModule::PrometheusOperator => KymaModule::PrometheusOperator,
        schema::KymaModule::Kiali => KymaModule::Kiali,
        schema::KymaModule::KnativeBuild => KymaModule::KnativeBuild,
    }
}

fn kyma_module_to_external(module: KymaModule) -> schema::KymaModule {
    match module {
        KymaModule::Backup => schema::KymaModule::Backup,
        KymaModule::BackupInit => schema::KymaModule::BackupInit,
        KymaModule::Jaeger => schema::KymaModule::Jaeger,
        KymaModule::Logging => schema::KymaModule::Logging,
        KymaModule::Monitoring => schema::KymaModule::Monitoring,
        KymaModule::PrometheusOperator => schema::KymaModule::PrometheusOperator,
        KymaModule::Kiali => schema::KymaModule::Kiali,
        KymaModule::KnativeBuild => schema::KymaModule::KnativeBuild,
    }
}

/// Map an operation onto its external status, field by field
pub fn operation_status_to_external(operation: &Operation) -> schema::OperationStatus {
    schema::OperationStatus {
        id: Some(operation.id.clone()),
        operation: operation_type_to_external(operation.operation_type),
        state: operation_state_to_external(operation.state),
        message: Some(operation.message.clone()),
        runtime_id: Some(operation.cluster_id.clone()),
    }
}

pub fn operation_type_to_external(operation_type: OperationType) -> schema::OperationType {
    match operation_type {
        OperationType::Provision => schema::OperationType::Provision,
        OperationType::Deprovision => schema::OperationType::Deprovision,
        OperationType::Upgrade => schema::OperationType::Upgrade,
    }
}

pub fn operation_state_to_external(state: OperationState) -> schema::OperationState {
    match state {
        OperationState::InProgress => schema::OperationState::InProgress,
        OperationState::Succeeded => schema::OperationState::Succeeded,
        OperationState::Failed => schema::OperationState::Failed,
    }
}

fn connection_status_to_external(
    status: RuntimeAgentConnectionStatus,
) -> schema::RuntimeAgentConnectionStatus {
    match status {
        RuntimeAgentConnectionStatus::Connected => schema::RuntimeAgentConnectionStatus::Connected,
        RuntimeAgentConnectionStatus::Disconnected => {
            schema::RuntimeAgentConnectionStatus::Disconnected
        }
    }
}

/// Map an aggregated runtime status onto its external representation
pub fn runtime_status_to_external(status: &RuntimeStatus) -> schema::RuntimeStatus {
    schema::RuntimeStatus {
        last_operation_status: Some(operation_status_to_external(&status.last_operation_status)),
        runtime_connection_status: status.runtime_connection_status.map(|status| {
            schema::RuntimeConnectionStatus {
                status: connection_status_to_external(status),
            }
        }),
        runtime_configuration: Some(runtime_config_to_external(&status.runtime_configuration)),
    }
}

pub fn runtime_config_to_external(config: &RuntimeConfig) -> schema::RuntimeConfig {
    schema::RuntimeConfig {
        cluster_config: Some(cluster_config_to_external(&config.cluster_config)),
        kyma_config: Some(kyma_config_to_external(&config.kyma_config)),
        kubeconfig: config.kubeconfig.clone(),
    }
}

fn cluster_config_to_external(config: &ClusterConfig) -> schema::ClusterConfig {
    match config {
        ClusterConfig::Gcp(gcp) => schema::ClusterConfig::Gcp(schema::GcpConfig {
            name: Some(gcp.name.clone()),
            project_name: Some(gcp.project_name.clone()),
            kubernetes_version: Some(gcp.kubernetes_version.clone()),
            number_of_nodes: Some(gcp.number_of_nodes),
            boot_disk_size: Some(gcp.boot_disk_size.clone()),
            machine_type: Some(gcp.machine_type.clone()),
            region: Some(gcp.region.clone()),
            // zone is the one optional GCP input; an unset zone stays unset
            zone: Some(gcp.zone.clone()).filter(|zone| !zone.is_empty()),
        }),
        ClusterConfig::Gardener(gardener) => {
            schema::ClusterConfig::Gardener(schema::GardenerConfig {
                name: Some(gardener.name.clone()),
                project_name: Some(gardener.project_name.clone()),
                kubernetes_version: Some(gardener.kubernetes_version.clone()),
                node_count: Some(gardener.node_count),
                volume_size: Some(gardener.volume_size.clone()),
                machine_type: Some(gardener.machine_type.clone()),
                region: Some(gardener.region.clone()),
                target_provider: Some(gardener.target_provider.clone()),
                target_secret: Some(gardener.target_secret.clone()),
                disk_type: Some(gardener.disk_type.clone()),
                zone: Some(gardener.zone.clone()),
                cidr: Some(gardener.cidr.clone()),
                auto_scaler_min: Some(gardener.auto_scaler_min),
                auto_scaler_max: Some(gardener.auto_scaler_max),
                max_surge: Some(gardener.max_surge),
                max_unavailable: Some(gardener.max_unavailable),
            })
        }
    }
}

fn kyma_config_to_external(config: &KymaConfig) -> schema::KymaConfig {
    schema::KymaConfig {
        version: Some(config.version.clone()),
        modules: config
            .modules
            .iter()
            .map(|module| kyma_module_to_external(module.module))
            .collect(),
    }
}
