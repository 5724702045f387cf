use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use provisioner_core::{
    FileStore, OperationState, Provisioner, ProvisionerConfig, RuntimeAgentConnectionStatus,
    UuidGenerator,
};
use provisioner_schema::ProvisionRuntimeInput;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "provisioner")]
#[command(about = "Provision and track Kubernetes runtimes on GCP and Gardener", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the provisioner state (overrides the config file)
    #[arg(long, global = true, env = "PROVISIONER_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start provisioning a runtime
    Provision {
        /// Runtime ID
        runtime_id: String,
        /// Provisioning input (JSON, or YAML with a .yaml/.yml extension)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Start deprovisioning a runtime
    Deprovision {
        /// Runtime ID
        runtime_id: String,
    },
    /// Start upgrading a runtime
    Upgrade {
        /// Runtime ID
        runtime_id: String,
    },
    /// Show the aggregated status of a runtime
    Status {
        /// Runtime ID
        runtime_id: String,
    },
    /// Show the status of an operation
    Operation {
        /// Operation ID
        operation_id: String,
    },
    /// Record the final state of an operation
    Finish {
        /// Operation ID
        operation_id: String,
        /// Final state
        #[arg(long, value_enum)]
        state: FinalState,
        /// Message reported to callers
        #[arg(short, long, default_value = "")]
        message: String,
        /// Kubeconfig of the provisioned cluster
        #[arg(long)]
        kubeconfig: Option<PathBuf>,
    },
    /// Record the runtime agent connection status
    Connection {
        /// Runtime ID
        runtime_id: String,
        #[arg(long, value_enum)]
        status: ConnectionStatus,
    },
    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum FinalState {
    Succeeded,
    Failed,
}

impl From<FinalState> for OperationState {
    fn from(state: FinalState) -> Self {
        match state {
            FinalState::Succeeded => OperationState::Succeeded,
            FinalState::Failed => OperationState::Failed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl From<ConnectionStatus> for RuntimeAgentConnectionStatus {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Connected => RuntimeAgentConnectionStatus::Connected,
            ConnectionStatus::Disconnected => RuntimeAgentConnectionStatus::Disconnected,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Version) {
        println!("provisioner {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ProvisionerConfig::load().context("Failed to load configuration")?;

    // stdout carries JSON, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.clone().unwrap_or_else(|| "warn".to_string()))
    });
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let state_dir = cli.state_dir.unwrap_or(config.state_dir);
    tracing::debug!("Using state directory {}", state_dir.display());

    let provisioner = Provisioner::new(
        Arc::new(FileStore::new(&state_dir)),
        Arc::new(UuidGenerator::new()),
    );

    match cli.command {
        Commands::Provision { runtime_id, input } => {
            let input = read_input(&input)?;
            let operation_id = provisioner.provision_runtime(&runtime_id, &input).await?;
            eprintln!(
                "{} provisioning of {} started",
                "✓".green(),
                runtime_id.cyan()
            );
            print_json(&provisioner.runtime_operation_status(&operation_id).await?)?;
        }
        Commands::Deprovision { runtime_id } => {
            let operation_id = provisioner.deprovision_runtime(&runtime_id).await?;
            eprintln!(
                "{} deprovisioning of {} started",
                "✓".green(),
                runtime_id.cyan()
            );
            print_json(&provisioner.runtime_operation_status(&operation_id).await?)?;
        }
        Commands::Upgrade { runtime_id } => {
            let operation_id = provisioner.upgrade_runtime(&runtime_id).await?;
            eprintln!("{} upgrade of {} started", "✓".green(), runtime_id.cyan());
            print_json(&provisioner.runtime_operation_status(&operation_id).await?)?;
        }
        Commands::Status { runtime_id } => {
            print_json(&provisioner.runtime_status(&runtime_id).await?)?;
        }
        Commands::Operation { operation_id } => {
            print_json(&provisioner.runtime_operation_status(&operation_id).await?)?;
        }
        Commands::Finish {
            operation_id,
            state,
            message,
            kubeconfig,
        } => {
            let kubeconfig = match kubeconfig {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };
            let status = provisioner
                .finish_operation(&operation_id, state.into(), &message, kubeconfig)
                .await?;
            print_json(&status)?;
        }
        Commands::Connection { runtime_id, status } => {
            let status: RuntimeAgentConnectionStatus = status.into();
            provisioner
                .set_connection_status(&runtime_id, status)
                .await?;
            eprintln!("{} {} is {}", "✓".green(), runtime_id.cyan(), status);
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<ProvisionRuntimeInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let input = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid provisioning input in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid provisioning input in {}", path.display()))?
    };
    Ok(input)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
