use std::sync::Arc;

use todoai_client::ApiError;
use todoai_client::Task;
use todoai_client::TaskApi;
use todoai_client::TaskDraft;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::validation::validate_description;
use super::validation::validate_title;
use super::validation::ValidationError;
use crate::domain::models::Event;
use crate::domain::models::TaskRefresh;

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;

pub const LOAD_FAILED: &str = "Failed to load tasks";
pub const CREATE_FAILED: &str = "Failed to create task";
pub const TOGGLE_FAILED: &str = "Failed to toggle task";
pub const DELETE_FAILED: &str = "Failed to delete task";
pub const UPDATE_FAILED: &str = "Failed to update task";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardStatus {
    #[default]
    Ready,
    /// The backend rejected the token. The caller should send the user to
    /// log in again.
    LoginRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub task_id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub tasks: Vec<Task>,
    pub loading: bool,
    /// Banner shown above the task list.
    pub error: Option<String>,
    pub status: DashboardStatus,
    pub new_title: String,
    pub new_description: String,
    pub editing: Option<EditState>,
}

/// The task list and its forms. Every failure lands in the `error` banner;
/// nothing here returns an error to the caller.
#[derive(Clone)]
pub struct Dashboard {
    task_api: Arc<dyn TaskApi>,
    state: Arc<RwLock<DashboardState>>,
}

impl Dashboard {
    pub fn new(task_api: Arc<dyn TaskApi>) -> Dashboard {
        Dashboard {
            task_api,
            state: Arc::new(RwLock::new(DashboardState {
                loading: true,
                ..Default::default()
            })),
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn status(&self) -> DashboardStatus {
        self.state.read().await.status
    }

    pub async fn fetch_tasks(&self) -> bool {
        self.state.write().await.loading = true;
        let result = self.task_api.list_tasks().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "tasks loaded");
                state.tasks = tasks;
                state.error = None;
                state.status = DashboardStatus::Ready;
                true
            }
            Err(err) if err.is_unauthorized() => {
                tracing::info!("task fetch unauthorized, login required");
                state.status = DashboardStatus::LoginRequired;
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load tasks");
                state.error = Some(LOAD_FAILED.to_string());
                false
            }
        }
    }

    pub async fn set_new_task(&self, title: &str, description: &str) {
        let mut state = self.state.write().await;
        state.new_title = title.to_string();
        state.new_description = description.to_string();
    }

    /// Creates a task from the new-task form.
    pub async fn create_task(&self) -> bool {
        let draft = {
            let mut state = self.state.write().await;
            if let Err(err) = validate_draft(&state.new_title, &state.new_description) {
                state.error = Some(err.to_string());
                return false;
            }
            TaskDraft::new(&state.new_title, &state.new_description)
        };

        match self.task_api.create_task(&draft).await {
            Ok(task) => {
                tracing::debug!(id = task.id, "task created");
                {
                    let mut state = self.state.write().await;
                    state.new_title.clear();
                    state.new_description.clear();
                }
                self.fetch_tasks().await;
                true
            }
            Err(err) => {
                self.fail(banner_text(&err, CREATE_FAILED)).await;
                false
            }
        }
    }

    pub async fn toggle_task(&self, id: i64) -> bool {
        match self.task_api.toggle_task(id).await {
            Ok(task) => {
                tracing::debug!(id, status = %task.status, "task toggled");
                self.fetch_tasks().await;
                true
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to toggle task");
                self.fail(TOGGLE_FAILED.to_string()).await;
                false
            }
        }
    }

    pub async fn delete_task(&self, id: i64) -> bool {
        match self.task_api.delete_task(id).await {
            Ok(()) => {
                tracing::debug!(id, "task deleted");
                self.fetch_tasks().await;
                true
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to delete task");
                self.fail(DELETE_FAILED.to_string()).await;
                false
            }
        }
    }

    pub async fn start_edit(&self, task: &Task) {
        self.state.write().await.editing = Some(EditState {
            task_id: task.id,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
        });
    }

    /// Updates the drafts of the task being edited. No-op when not editing.
    pub async fn set_edit(&self, title: &str, description: &str) {
        if let Some(editing) = self.state.write().await.editing.as_mut() {
            editing.title = title.to_string();
            editing.description = description.to_string();
        }
    }

    pub async fn cancel_edit(&self) {
        self.state.write().await.editing = None;
    }

    pub async fn save_edit(&self) -> bool {
        let (id, draft) = {
            let mut state = self.state.write().await;
            let Some(editing) = state.editing.clone() else {
                return false;
            };
            if let Err(err) = validate_draft(&editing.title, &editing.description) {
                state.error = Some(err.to_string());
                return false;
            }
            (
                editing.task_id,
                TaskDraft::new(&editing.title, &editing.description),
            )
        };

        match self.task_api.update_task(id, &draft).await {
            Ok(_) => {
                tracing::debug!(id, "task updated");
                self.state.write().await.editing = None;
                self.fetch_tasks().await;
                true
            }
            Err(err) => {
                self.fail(banner_text(&err, UPDATE_FAILED)).await;
                false
            }
        }
    }

    /// Re-fetches on every refresh signal until `cancel` fires or the signal
    /// is dropped. Each fresh list is forwarded to `events` when given.
    pub fn watch(
        &self,
        mut refresh_rx: broadcast::Receiver<TaskRefresh>,
        cancel: CancellationToken,
        events: Option<mpsc::UnboundedSender<Event>>,
    ) -> JoinHandle<()> {
        let dashboard = self.clone();
        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = refresh_rx.recv() => received,
                };

                match received {
                    Ok(refresh) => {
                        tracing::debug!(intent = %refresh.intent, "refreshing tasks");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "refresh signals collapsed");
                    }
                    Err(RecvError::Closed) => break,
                }

                dashboard.fetch_tasks().await;
                if let Some(events) = &events {
                    let tasks = dashboard.tasks().await;
                    if events.send(Event::TasksRefreshed(tasks)).is_err() {
                        break;
                    }
                }
            }
            tracing::debug!("task refresh watcher stopped");
        })
    }

    async fn fail(&self, message: String) {
        self.state.write().await.error = Some(message);
    }
}

fn validate_draft(title: &str, description: &str) -> Result<(), ValidationError> {
    validate_title(title)?;
    validate_description(description)
}

fn banner_text(err: &ApiError, fallback: &str) -> String {
    tracing::warn!(error = %err, "{}", fallback);
    err.detail().unwrap_or(fallback).to_string()
}
