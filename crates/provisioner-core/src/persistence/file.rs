//! File-backed store
//!
//! Keeps the whole [`ProvisionerState`] in `<state_dir>/state.json`. Every
//! write takes the lock file, reloads, applies the change and saves, keeping
//! the previous file as `state.json.backup`. Saving renames a fully written
//! temporary file over the state file, so reads never need the lock.

use super::state::{ProvisionerState, STATE_VERSION};
use super::{ReadSession, WriteSession};
use crate::error::{ProvisionerError, Result};
use crate::model::{Operation, RuntimeAgentConnectionStatus, RuntimeConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

const STATE_FILE: &str = "state.json";
const STATE_TEMP: &str = "state.json.tmp";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";
const STALE_LOCK_HOURS: i64 = 1;
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Store reading and writing a JSON state file
#[derive(Debug, Clone)]
pub struct FileStore {
    state_dir: PathBuf,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// How long a writer waits for the lock held by another writer
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        self.state_dir.join(STATE_TEMP)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir.join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        if !self.state_dir.exists() {
            fs::create_dir_all(&self.state_dir).await?;
            tracing::debug!("Created state directory: {}", self.state_dir.display());
        }
        Ok(())
    }

    /// Load the current state, empty if no state file exists yet
    pub async fn load(&self) -> Result<ProvisionerState> {
        let content = match fs::read_to_string(self.state_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("State file not found, returning empty state");
                return Ok(ProvisionerState::new());
            }
            Err(e) => return Err(e.into()),
        };
        let state: ProvisionerState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(ProvisionerError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!(
            "Loaded state with {} runtimes and {} operations",
            state.runtimes.len(),
            state.operations.len()
        );
        Ok(state)
    }

    /// Save the state, copying the previous file to the backup location
    ///
    /// Callers must hold the lock.
    pub async fn save(&self, state: &ProvisionerState) -> Result<()> {
        self.ensure_state_dir().await?;

        let temp = self.temp_path();
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&temp, content).await?;

        match fs::copy(self.state_path(), self.backup_path()).await {
            Ok(_) => tracing::debug!("Created state backup"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        fs::rename(&temp, self.state_path()).await?;

        tracing::debug!("Saved state with {} runtimes", state.runtimes.len());
        Ok(())
    }

    /// Acquire the lock file for exclusive write access
    ///
    /// Waits up to the lock timeout for another holder to release it. A lock
    /// older than an hour is considered abandoned and taken over.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        let deadline = Instant::now() + self.lock_timeout;

        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
                .await
            {
                Ok(mut file) => {
                    let lock = StateLock {
                        lock_path: lock_path.clone(),
                        released: false,
                    };
                    let content = serde_json::to_string_pretty(&LockInfo::current())?;
                    file.write_all(content.as_bytes()).await?;
                    file.flush().await?;

                    tracing::debug!("Acquired state lock");
                    return Ok(lock);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }

            let holder = match fs::read_to_string(&lock_path).await {
                Ok(content) => serde_json::from_str::<LockInfo>(&content).ok(),
                // released in the meantime
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            // unparsable content means the holder is still writing it
            if let Some(info) = &holder {
                if info.is_stale() {
                    tracing::warn!("Removing stale lock from {}", info.holder);
                    remove_lock_file(&lock_path).await?;
                    continue;
                }
            }

            if Instant::now() >= deadline {
                return Err(ProvisionerError::LockError(match holder {
                    Some(info) => format!(
                        "State is locked by {} since {}",
                        info.holder, info.acquired_at
                    ),
                    None => "State is locked by another writer".to_string(),
                }));
            }
            tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
        }
    }

    /// Apply `change` under the lock; the state is saved only if it succeeds
    async fn modify<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut ProvisionerState) -> Result<T> + Send,
        T: Send,
    {
        let lock = self.acquire_lock().await?;

        let result = match self.load().await {
            Ok(mut state) => match change(&mut state) {
                Ok(value) => self.save(&state).await.map(|_| value),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        lock.release().await?;
        result
    }
}

#[async_trait]
impl ReadSession for FileStore {
    async fn get_last_operation(&self, runtime_id: &str) -> Result<Operation> {
        self.load().await?.last_operation(runtime_id).cloned()
    }

    async fn get_operation(&self, operation_id: &str) -> Result<Operation> {
        self.load().await?.operation(operation_id).cloned()
    }

    async fn get_runtime_config(&self, runtime_id: &str) -> Result<RuntimeConfig> {
        let state = self.load().await?;
        Ok(state.runtime(runtime_id)?.config.clone())
    }

    async fn get_connection_status(
        &self,
        runtime_id: &str,
    ) -> Result<Option<RuntimeAgentConnectionStatus>> {
        let state = self.load().await?;
        Ok(state.runtime(runtime_id)?.connection_status)
    }
}

#[async_trait]
impl WriteSession for FileStore {
    async fn insert_runtime(
        &self,
        runtime_id: &str,
        config: RuntimeConfig,
        operation: Operation,
    ) -> Result<()> {
        self.modify(|state| state.insert_runtime(runtime_id, config, operation))
            .await
    }

    async fn insert_operation(&self, operation: Operation) -> Result<()> {
        self.modify(|state| state.insert_operation(operation)).await
    }

    async fn update_operation(&self, operation: Operation) -> Result<()> {
        self.modify(|state| state.update_operation(operation)).await
    }

    async fn complete_operation(
        &self,
        operation: Operation,
        kubeconfig: Option<String>,
        connection_status: Option<RuntimeAgentConnectionStatus>,
    ) -> Result<()> {
        self.modify(|state| state.complete_operation(operation, kubeconfig, connection_status))
            .await
    }

    async fn set_kubeconfig(&self, runtime_id: &str, kubeconfig: String) -> Result<()> {
        self.modify(|state| state.set_kubeconfig(runtime_id, kubeconfig))
            .await
    }

    async fn set_connection_status(
        &self,
        runtime_id: &str,
        status: RuntimeAgentConnectionStatus,
    ) -> Result<()> {
        self.modify(|state| state.set_connection_status(runtime_id, status))
            .await
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            holder: format!("{}:{}", host, std::process::id()),
            acquired_at: Utc::now(),
        }
    }

    fn is_stale(&self) -> bool {
        Utc::now()
            .signed_duration_since(self.acquired_at)
            .num_hours()
            >= STALE_LOCK_HOURS
    }
}

/// Remove the lock file; a file already gone counts as removed
async fn remove_lock_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// RAII guard for the state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        remove_lock_file(&self.lock_path).await?;
        tracing::debug!("Released state lock");
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClusterConfig, GardenerConfig, KymaConfig, OperationState, OperationType};
    use tempfile::tempdir;

    fn runtime_config(runtime_id: &str) -> RuntimeConfig {
        RuntimeConfig {
            cluster_config: ClusterConfig::Gardener(GardenerConfig {
                id: "gardener-id".to_string(),
                node_count: 3,
                cluster_id: runtime_id.to_string(),
                ..Default::default()
            }),
            kubeconfig: None,
            kyma_config: KymaConfig {
                id: "kyma-id".to_string(),
                version: "1.6".to_string(),
                modules: Vec::new(),
                cluster_id: runtime_id.to_string(),
            },
            credentials_secret_name: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        let state = store.load().await.unwrap();
        assert!(state.runtimes.is_empty());
        assert!(state.operations.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().join("state"));

        store
            .insert_runtime(
                "runtime-1",
                runtime_config("runtime-1"),
                Operation::new("op-1", OperationType::Provision, "runtime-1", "started"),
            )
            .await
            .unwrap();

        let reopened = FileStore::new(temp_dir.path().join("state"));
        let op = reopened.get_last_operation("runtime-1").await.unwrap();
        assert_eq!(op.id, "op-1");
        assert_eq!(
            reopened.get_runtime_config("runtime-1").await.unwrap(),
            runtime_config("runtime-1")
        );
        assert_eq!(
            reopened.get_connection_status("runtime-1").await.unwrap(),
            None
        );
        assert!(!temp_dir.path().join("state").join(LOCK_FILE).exists());
    }

    #[tokio::test]
    async fn test_save_creates_backup() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        store
            .insert_runtime(
                "runtime-1",
                runtime_config("runtime-1"),
                Operation::new("op-1", OperationType::Provision, "runtime-1", ""),
            )
            .await
            .unwrap();
        store
            .set_kubeconfig("runtime-1", "kubeconfig".to_string())
            .await
            .unwrap();

        assert!(temp_dir.path().join(STATE_BACKUP).exists());
        let config = store.get_runtime_config("runtime-1").await.unwrap();
        assert_eq!(config.kubeconfig.as_deref(), Some("kubeconfig"));
    }

    #[tokio::test]
    async fn test_failed_change_is_not_saved() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store
            .insert_runtime(
                "runtime-1",
                runtime_config("runtime-1"),
                Operation::new("op-1", OperationType::Provision, "runtime-1", ""),
            )
            .await
            .unwrap();

        let op = store.get_operation("op-1").await.unwrap();
        let failed = op.transition(OperationState::Failed, "quota").unwrap();
        store.update_operation(failed.clone()).await.unwrap();

        let mut revived = failed;
        revived.state = OperationState::Succeeded;
        let err = store.update_operation(revived).await.unwrap_err();
        assert!(err.is_invariant_violation());

        let stored = store.get_operation("op-1").await.unwrap();
        assert_eq!(stored.state, OperationState::Failed);
        assert!(!temp_dir.path().join(LOCK_FILE).exists());
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path()).with_lock_timeout(Duration::ZERO);

        let lock = store.acquire_lock().await.unwrap();
        let err = store.acquire_lock().await.err().unwrap();
        assert!(matches!(err, ProvisionerError::LockError(_)));

        lock.release().await.unwrap();
        assert!(store.acquire_lock().await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_waits_for_release() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path()).with_lock_timeout(Duration::from_secs(5));

        let lock = store.acquire_lock().await.unwrap();
        let waiting = tokio::spawn({
            let store = store.clone();
            async move { store.acquire_lock().await.map(|_| ()) }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        lock.release().await.unwrap();

        assert!(waiting.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_release_of_removed_lock_file() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        let lock = store.acquire_lock().await.unwrap();
        std::fs::remove_file(temp_dir.path().join(LOCK_FILE)).unwrap();

        assert!(lock.release().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_state_readable() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store
            .insert_runtime(
                "runtime-1",
                runtime_config("runtime-1"),
                Operation::new("op-1", OperationType::Provision, "runtime-1", ""),
            )
            .await
            .unwrap();

        // a directory in place of the temporary file makes the write fail
        std::fs::create_dir(temp_dir.path().join(STATE_TEMP)).unwrap();
        assert!(
            store
                .set_kubeconfig("runtime-1", "kubeconfig".to_string())
                .await
                .is_err()
        );

        let config = store.get_runtime_config("runtime-1").await.unwrap();
        assert!(config.kubeconfig.is_none());
        assert!(!temp_dir.path().join(LOCK_FILE).exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_during_writes_see_stored_runtime() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store
            .insert_runtime(
                "runtime-1",
                runtime_config("runtime-1"),
                Operation::new("op-1", OperationType::Provision, "runtime-1", ""),
            )
            .await
            .unwrap();

        let writer = tokio::spawn({
            let store = store.clone();
            async move {
                for i in 0..100 {
                    let status = if i % 2 == 0 {
                        RuntimeAgentConnectionStatus::Connected
                    } else {
                        RuntimeAgentConnectionStatus::Disconnected
                    };
                    store.set_connection_status("runtime-1", status).await?;
                }
                Ok::<_, ProvisionerError>(())
            }
        });

        let reader = tokio::spawn({
            let store = store.clone();
            async move {
                for _ in 0..300 {
                    store.get_last_operation("runtime-1").await?;
                    store.get_runtime_config("runtime-1").await?;
                    store.get_connection_status("runtime-1").await?;
                }
                Ok::<_, ProvisionerError>(())
            }
        });

        writer.await.unwrap().unwrap();
        reader.await.unwrap().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_do_not_lose_updates() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let runtime_id = format!("runtime-{}", i);
                    store
                        .insert_runtime(
                            &runtime_id,
                            runtime_config(&runtime_id),
                            Operation::new(
                                format!("op-{}", i),
                                OperationType::Provision,
                                runtime_id.as_str(),
                                "",
                            ),
                        )
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let state = store.load().await.unwrap();
        assert_eq!(state.runtimes.len(), 8);
        assert_eq!(state.operations.len(), 8);
        assert!(!temp_dir.path().join(LOCK_FILE).exists());
        assert!(!temp_dir.path().join(STATE_TEMP).exists());
    }

    #[tokio::test]
    async fn test_complete_operation_is_single_write() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store
            .insert_runtime(
                "runtime-1",
                runtime_config("runtime-1"),
                Operation::new("op-1", OperationType::Provision, "runtime-1", ""),
            )
            .await
            .unwrap();
        let op = store.get_operation("op-1").await.unwrap();

        // completion without a terminal state is rejected as a whole
        let err = store
            .complete_operation(op.clone(), Some("kubeconfig".to_string()), None)
            .await
            .unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(
            store
                .get_runtime_config("runtime-1")
                .await
                .unwrap()
                .kubeconfig
                .is_none()
        );

        let done = op.transition(OperationState::Succeeded, "ready").unwrap();
        store
            .complete_operation(done, Some("kubeconfig".to_string()), None)
            .await
            .unwrap();
        assert_eq!(
            store.get_operation("op-1").await.unwrap().state,
            OperationState::Succeeded
        );
        assert_eq!(
            store
                .get_runtime_config("runtime-1")
                .await
                .unwrap()
                .kubeconfig
                .as_deref(),
            Some("kubeconfig")
        );
    }

    #[tokio::test]
    async fn test_stale_lock_is_replaced() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let stale = LockInfo {
            holder: "old-host".to_string(),
            acquired_at: Utc::now() - chrono::Duration::hours(2),
        };
        std::fs::write(
            temp_dir.path().join(LOCK_FILE),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        assert!(store.acquire_lock().await.is_ok());
    }

    #[tokio::test]
    async fn test_newer_state_version_rejected() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let mut state = ProvisionerState::new();
        state.version = STATE_VERSION + 1;
        store.save(&state).await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, ProvisionerError::StateError(_)));
    }
}
