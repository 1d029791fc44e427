pub mod error;
pub mod types;

pub use error::{BrowserUseError, Result};
pub use types::{RunData, TaskData, TaskRequest, TaskStatus};

use std::time::Duration;

use tracing::{debug, info};

const BASE_URL: &str = "https://api.browser-use.com/api/v1";

/// Interval between task status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct BrowserUseClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BrowserUseClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Start an agent task. Returns immediately with the task id.
    pub async fn run_task(&self, request: &TaskRequest) -> Result<RunData> {
        let url = format!("{}/run-task", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserUseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Poll a task until it reaches a terminal status.
    pub async fn wait_for_task(&self, task_id: &str) -> Result<TaskData> {
        loop {
            let url = format!("{}/task/{}", self.base_url, task_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(BrowserUseError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let task: TaskData = resp.json().await?;
            if task.status.is_terminal() {
                return Ok(task);
            }

            debug!(task_id, status = ?task.status, "Task still in progress");
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Run a task end-to-end: start, poll to completion, return the output
    /// JSON string. Non-`finished` terminal statuses and missing output are
    /// errors; the caller owns deserialization against its expected schema.
    pub async fn run_to_completion(&self, request: &TaskRequest) -> Result<String> {
        let run = self.run_task(request).await?;
        info!(task_id = %run.id, "Agent task started, polling for completion");

        let task = self.wait_for_task(&run.id).await?;
        match task.status {
            TaskStatus::Finished => task.output.filter(|o| !o.trim().is_empty()).ok_or_else(|| {
                BrowserUseError::Parse(format!("Task {} finished without output", task.id))
            }),
            other => Err(BrowserUseError::TaskFailed(format!("{other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(TaskStatus::Finished.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Stopped.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Created.is_terminal());
        assert!(!TaskStatus::Paused.is_terminal());
    }

    #[test]
    fn task_request_serializes_schema_as_string() {
        let schema = serde_json::json!({"type": "object"});
        let request = TaskRequest::new("go to https://example.com")
            .with_output_schema(&schema)
            .with_max_steps(100);

        let rendered = serde_json::to_value(&request).unwrap();
        assert_eq!(rendered["max_agent_steps"], 100);
        assert_eq!(
            rendered["structured_output_json"],
            "{\"type\":\"object\"}"
        );
    }

    #[test]
    fn omitted_fields_are_not_serialized() {
        let request = TaskRequest::new("task");
        let rendered = serde_json::to_value(&request).unwrap();
        assert!(rendered.get("structured_output_json").is_none());
        assert!(rendered.get("max_agent_steps").is_none());
    }
}
