use serde::{Deserialize, Serialize};

/// Input for a browser-agent task run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRequest {
    /// Natural-language instructions; the target URL is embedded in the text.
    pub task: String,
    /// JSON Schema the agent's final output must conform to, serialized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output_json: Option<String>,
    /// Step budget bounding agent execution (navigation actions, not wall clock).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_agent_steps: Option<u32>,
}

impl TaskRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            structured_output_json: None,
            max_agent_steps: None,
        }
    }

    pub fn with_output_schema(mut self, schema: &serde_json::Value) -> Self {
        self.structured_output_json = Some(schema.to_string());
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_agent_steps = Some(max_steps);
        self
    }
}

/// Response from starting a task.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
}

/// Task state as reported by the polling endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskData {
    pub id: String,
    pub status: TaskStatus,
    /// Final output: the structured JSON string once the task finishes.
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Created,
    Running,
    Paused,
    Finished,
    Stopped,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Finished | TaskStatus::Stopped | TaskStatus::Failed
        )
    }
}
