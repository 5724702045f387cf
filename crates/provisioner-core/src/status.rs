//! Runtime status aggregation
//!
//! Composes the latest operation, the agent connection status and the stored
//! configuration of a runtime into one [`RuntimeStatus`] at read time.
//! Nothing is cached.

use crate::error::Result;
use crate::model::RuntimeStatus;
use crate::persistence::ReadSession;

pub struct RuntimeStatusAggregator<'a> {
    session: &'a dyn ReadSession,
}

impl<'a> RuntimeStatusAggregator<'a> {
    pub fn new(session: &'a dyn ReadSession) -> Self {
        Self { session }
    }

    /// Assemble the status of `runtime_id`
    ///
    /// Fails with `NotFound` when the runtime has no operation yet.
    pub async fn aggregate(&self, runtime_id: &str) -> Result<RuntimeStatus> {
        let last_operation_status = self.session.get_last_operation(runtime_id).await?;
        let runtime_configuration = self.session.get_runtime_config(runtime_id).await?;
        let runtime_connection_status = self.session.get_connection_status(runtime_id).await?;

        tracing::debug!(
            "Aggregated status of runtime {}: last operation {} is {}",
            runtime_id,
            last_operation_status.id,
            last_operation_status.state
        );

        Ok(RuntimeStatus {
            last_operation_status,
            runtime_connection_status,
            runtime_configuration,
        })
    }
}

/// Whether polling the runtime for progress can still yield changes
pub fn requires_polling(status: &RuntimeStatus) -> bool {
    !status.last_operation_status.is_terminal()
}
