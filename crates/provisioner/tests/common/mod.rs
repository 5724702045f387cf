#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.path().join("state")
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// `provisioner` command isolated to this environment's state directory
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("provisioner").unwrap();
        cmd.current_dir(self.path())
            .env_remove("PROVISIONER_CONFIG_PATH")
            .env_remove("RUST_LOG")
            .arg("--state-dir")
            .arg(self.state_dir());
        cmd
    }

    /// Run a command expected to succeed and parse its JSON output
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).assert().success().get_output().clone();
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

pub const GCP_INPUT: &str = r#"{
    "clusterConfig": {
        "gcpConfig": {
            "name": "tenant-a",
            "projectName": "sap-project",
            "kubernetesVersion": "1.15",
            "numberOfNodes": 3,
            "bootDiskSize": "30",
            "machineType": "n1-standard-4",
            "region": "europe-west1",
            "zone": "europe-west1-b"
        }
    },
    "credentials": { "secretName": "gcp-secret" },
    "kymaConfig": { "version": "1.6", "modules": ["BACKUP", "BACKUP_INIT"] }
}"#;

pub const GARDENER_INPUT_YAML: &str = r#"
clusterConfig:
  gardenerConfig:
    name: tenant-b
    projectName: frog
    kubernetesVersion: 1.15.4
    nodeCount: 2
    volumeSize: 35Gi
    machineType: n1-standard-4
    region: europe-west4
    targetProvider: gcp
    targetSecret: gardener-secret
    diskType: pd-standard
    zone: europe-west4-a
    cidr: 10.250.0.0/19
    autoScalerMin: 2
    autoScalerMax: 4
    maxSurge: 4
    maxUnavailable: 1
credentials:
  secretName: gardener-credentials
kymaConfig:
  version: "1.6"
  modules:
    - MONITORING
"#;
