//! Submits `*_Task` methods and waits for them to finish.

use crate::core::{
    domain::{
        error::{OperationError, VsphereError, VsphereResult},
        model::{ManagedObjectReference, TaskHandle, TaskInfo, TaskOutcome, TaskState},
    },
    infrastructure::vim_api::{VimApi, call, property},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct TaskOrchestrator {
    api: Arc<dyn VimApi>,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for TaskOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskOrchestrator")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TaskOrchestrator {
    pub fn new(api: Arc<dyn VimApi>, poll_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            api,
            poll_interval,
            timeout,
        }
    }

    /// Starts `method` on `object` and returns the task it spawned.
    pub async fn submit(
        &self,
        object: &ManagedObjectReference,
        method: &str,
        body: Value,
    ) -> VsphereResult<TaskHandle> {
        let task: ManagedObjectReference = call(self.api.as_ref(), object, method, body).await?;
        info!(task = %task.value, %method, %object, "submitted task");
        Ok(TaskHandle::new(task))
    }

    /// Polls the task until it succeeds or fails.
    ///
    /// Without a configured timeout this waits as long as the task runs.
    /// With one, an expired deadline yields [`VsphereError::TaskTimeout`];
    /// the task itself keeps running on the server.
    pub async fn wait(&self, handle: &TaskHandle) -> VsphereResult<TaskOutcome> {
        match self.timeout {
            None => self.poll(handle).await,
            Some(timeout) => tokio::time::timeout(timeout, self.poll(handle))
                .await
                .map_err(|_| {
                    warn!(task = handle.id(), ?timeout, "gave up waiting for task");
                    VsphereError::TaskTimeout {
                        task: handle.id().to_string(),
                        timeout,
                    }
                })?,
        }
    }

    async fn poll(&self, handle: &TaskHandle) -> VsphereResult<TaskOutcome> {
        loop {
            let info: TaskInfo = property(self.api.as_ref(), handle.reference(), "info").await?;
            debug!(task = handle.id(), state = ?info.state, progress = ?info.progress, "task state");
            match info.state {
                TaskState::Success => return Ok(TaskOutcome::Success(info.result_reference())),
                TaskState::Error => return Ok(TaskOutcome::Error(info.error_message())),
                TaskState::Queued | TaskState::Running => {
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Submits, waits, and turns a failed task into the error built by
    /// `on_error` from the server's message.
    pub async fn run<F>(
        &self,
        object: &ManagedObjectReference,
        method: &str,
        body: Value,
        on_error: F,
    ) -> VsphereResult<Option<ManagedObjectReference>>
    where
        F: FnOnce(String) -> OperationError,
    {
        let handle = self.submit(object, method, body).await?;
        match self.wait(&handle).await? {
            TaskOutcome::Success(result) => Ok(result),
            TaskOutcome::Error(message) => {
                warn!(task = handle.id(), %method, %message, "task failed");
                Err(on_error(message).into())
            }
        }
    }
}
