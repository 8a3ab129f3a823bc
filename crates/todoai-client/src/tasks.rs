use async_trait::async_trait;

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::types::Task;
use crate::types::TaskDraft;
use crate::TaskApi;

pub struct TasksClient {
    api: ApiClient,
}

impl TasksClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TaskApi for TasksClient {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.api.get("/api/tasks/").await
    }

    async fn get_task(&self, id: i64) -> Result<Task> {
        self.api.get(&format!("/api/tasks/{id}")).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        self.api.post("/api/tasks/", draft).await
    }

    async fn update_task(&self, id: i64, draft: &TaskDraft) -> Result<Task> {
        self.api.put(&format!("/api/tasks/{id}"), draft).await
    }

    async fn toggle_task(&self, id: i64) -> Result<Task> {
        self.api.post_empty(&format!("/api/tasks/{id}/toggle")).await
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("/api/tasks/{id}")).await
    }
}
