//! Server-side tasks.

use crate::core::domain::model::managed_object::ManagedObjectReference;
use serde::Deserialize;
use serde_json::Value;

/// Handle of a task returned by a mutating `*_Task` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle(ManagedObjectReference);

impl TaskHandle {
    #[must_use]
    pub fn new(reference: ManagedObjectReference) -> Self {
        Self(reference)
    }

    #[must_use]
    pub fn reference(&self) -> &ManagedObjectReference {
        &self.0
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Success,
    Error,
}

/// `Task.info` on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub state: TaskState,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<LocalizedMethodFault>,
    #[serde(default)]
    pub progress: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedMethodFault {
    #[serde(default)]
    pub localized_message: Option<String>,
    #[serde(default)]
    pub fault: Option<Value>,
}

impl TaskInfo {
    /// The message a failed task reports, falling back to the fault type.
    #[must_use]
    pub fn error_message(&self) -> String {
        let Some(error) = &self.error else {
            return "Task failed without a fault".to_string();
        };
        if let Some(message) = error.localized_message.as_deref().filter(|m| !m.is_empty()) {
            return message.to_string();
        }
        error
            .fault
            .as_ref()
            .and_then(|fault| fault.get("_typeName"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown fault")
            .to_string()
    }

    /// The task result when it is a managed-object reference.
    #[must_use]
    pub fn result_reference(&self) -> Option<ManagedObjectReference> {
        self.result
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Terminal state of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Carries the created or affected object, when the task returns one.
    Success(Option<ManagedObjectReference>),
    Error(String),
}
