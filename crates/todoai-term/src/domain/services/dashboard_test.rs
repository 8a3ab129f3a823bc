use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use todoai_client::ApiError;
use todoai_client::Intent;
use todoai_client::Task;
use todoai_client::TaskApi;
use todoai_client::TaskDraft;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::domain::models::Event;
use crate::domain::models::TaskRefresh;
use crate::domain::services::RefreshSignal;

fn task(id: i64, title: &str) -> Task {
    Task {
        id,
        user_id: Some(1),
        title: title.to_string(),
        description: None,
        status: "Incomplete".to_string(),
        created_at: "2024-01-01T00:00:00".to_string(),
        updated_at: None,
    }
}

#[derive(Default)]
struct MockTaskApi {
    tasks: Mutex<Vec<Task>>,
    list_error: Mutex<Option<ApiError>>,
    write_error: Mutex<Option<ApiError>>,
    calls: Mutex<Vec<String>>,
}

impl MockTaskApi {
    fn with_tasks(tasks: Vec<Task>) -> MockTaskApi {
        MockTaskApi {
            tasks: Mutex::new(tasks),
            ..Default::default()
        }
    }

    fn fail_list(&self, err: ApiError) {
        *self.list_error.lock().unwrap() = Some(err);
    }

    fn fail_writes(&self, err: ApiError) {
        *self.write_error.lock().unwrap() = Some(err);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> todoai_client::Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.write_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskApi for MockTaskApi {
    async fn list_tasks(&self) -> todoai_client::Result<Vec<Task>> {
        self.calls.lock().unwrap().push("list".to_string());
        if let Some(err) = self.list_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn get_task(&self, id: i64) -> todoai_client::Result<Task> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ApiError::http(404, Some("Task not found".to_string())))
    }

    async fn create_task(&self, draft: &TaskDraft) -> todoai_client::Result<Task> {
        self.record(format!("create {}", draft.title))?;
        let mut tasks = self.tasks.lock().unwrap();
        let mut created = task(tasks.len() as i64 + 1, &draft.title);
        created.description = draft.description.clone();
        tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: i64, draft: &TaskDraft) -> todoai_client::Result<Task> {
        self.record(format!("update {id} {}", draft.title))?;
        let mut tasks = self.tasks.lock().unwrap();
        let existing = tasks.iter_mut().find(|t| t.id == id).unwrap();
        existing.title = draft.title.clone();
        existing.description = draft.description.clone();
        Ok(existing.clone())
    }

    async fn toggle_task(&self, id: i64) -> todoai_client::Result<Task> {
        self.record(format!("toggle {id}"))?;
        let mut tasks = self.tasks.lock().unwrap();
        let existing = tasks.iter_mut().find(|t| t.id == id).unwrap();
        existing.status = "Complete".to_string();
        Ok(existing.clone())
    }

    async fn delete_task(&self, id: i64) -> todoai_client::Result<()> {
        self.record(format!("delete {id}"))?;
        self.tasks.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }
}

#[tokio::test]
async fn it_loads_tasks_and_clears_the_banner() {
    let api = Arc::new(MockTaskApi::with_tasks(vec![task(1, "Buy milk")]));
    let dashboard = Dashboard::new(api);
    assert!(dashboard.snapshot().await.loading);

    assert!(dashboard.fetch_tasks().await);

    let state = dashboard.snapshot().await;
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert_eq!(state.status, DashboardStatus::Ready);
}

#[tokio::test]
async fn unauthorized_fetch_requires_login() {
    let api = Arc::new(MockTaskApi::default());
    api.fail_list(ApiError::http(401, Some("Could not validate credentials".to_string())));
    let dashboard = Dashboard::new(api);

    assert!(!dashboard.fetch_tasks().await);

    let state = dashboard.snapshot().await;
    assert_eq!(state.status, DashboardStatus::LoginRequired);
    assert_eq!(state.error, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn other_fetch_failures_show_the_banner() {
    let api = Arc::new(MockTaskApi::default());
    api.fail_list(ApiError::http(500, None));
    let dashboard = Dashboard::new(api);

    dashboard.fetch_tasks().await;

    assert_eq!(dashboard.error().await.as_deref(), Some(LOAD_FAILED));
    assert!(!dashboard.snapshot().await.loading);
}

#[tokio::test]
async fn create_validates_before_calling_the_backend() {
    let api = Arc::new(MockTaskApi::default());
    let dashboard = Dashboard::new(api.clone());

    dashboard.set_new_task("   ", "").await;
    assert!(!dashboard.create_task().await);
    assert_eq!(
        dashboard.error().await.as_deref(),
        Some("Title cannot be empty")
    );

    dashboard.set_new_task("ok", &"d".repeat(1001)).await;
    assert!(!dashboard.create_task().await);
    assert_eq!(
        dashboard.error().await.as_deref(),
        Some("Description exceeds 1000 characters")
    );

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn create_clears_the_form_and_refetches() {
    let api = Arc::new(MockTaskApi::default());
    let dashboard = Dashboard::new(api.clone());

    dashboard.set_new_task("Buy milk", "").await;
    assert!(dashboard.create_task().await);

    let state = dashboard.snapshot().await;
    assert!(state.new_title.is_empty());
    assert!(state.new_description.is_empty());
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].description, None);
    assert_eq!(api.calls(), vec!["create Buy milk", "list"]);
}

#[tokio::test]
async fn create_failure_prefers_backend_detail() {
    let api = Arc::new(MockTaskApi::default());
    let dashboard = Dashboard::new(api.clone());
    dashboard.set_new_task("Buy milk", "").await;

    api.fail_writes(ApiError::http(400, Some("Duplicate task".to_string())));
    dashboard.create_task().await;
    assert_eq!(dashboard.error().await.as_deref(), Some("Duplicate task"));

    api.fail_writes(ApiError::http(500, None));
    dashboard.create_task().await;
    assert_eq!(dashboard.error().await.as_deref(), Some(CREATE_FAILED));
    assert_eq!(dashboard.snapshot().await.new_title, "Buy milk");
}

#[tokio::test]
async fn toggle_and_delete_use_fixed_banners() {
    let api = Arc::new(MockTaskApi::with_tasks(vec![task(1, "Buy milk")]));
    let dashboard = Dashboard::new(api.clone());

    api.fail_writes(ApiError::http(404, Some("Task not found".to_string())));
    assert!(!dashboard.toggle_task(1).await);
    assert_eq!(dashboard.error().await.as_deref(), Some(TOGGLE_FAILED));

    api.fail_writes(ApiError::http(404, Some("Task not found".to_string())));
    assert!(!dashboard.delete_task(1).await);
    assert_eq!(dashboard.error().await.as_deref(), Some(DELETE_FAILED));

    assert!(dashboard.toggle_task(1).await);
    assert!(dashboard.tasks().await[0].is_complete());
    assert_eq!(dashboard.error().await, None);

    assert!(dashboard.delete_task(1).await);
    assert!(dashboard.tasks().await.is_empty());
}

#[tokio::test]
async fn editing_round_trip() {
    let mut existing = task(1, "Buy milk");
    existing.description = Some("2 liters".to_string());
    let api = Arc::new(MockTaskApi::with_tasks(vec![existing.clone()]));
    let dashboard = Dashboard::new(api.clone());

    dashboard.start_edit(&existing).await;
    assert_eq!(
        dashboard.snapshot().await.editing,
        Some(EditState {
            task_id: 1,
            title: "Buy milk".to_string(),
            description: "2 liters".to_string(),
        })
    );

    dashboard.set_edit("", "").await;
    assert!(!dashboard.save_edit().await);
    assert_eq!(
        dashboard.error().await.as_deref(),
        Some("Title cannot be empty")
    );
    assert!(dashboard.snapshot().await.editing.is_some());

    dashboard.set_edit("Buy oat milk", "").await;
    assert!(dashboard.save_edit().await);

    let state = dashboard.snapshot().await;
    assert_eq!(state.editing, None);
    assert_eq!(state.tasks[0].title, "Buy oat milk");
    assert_eq!(state.tasks[0].description, None);
    assert_eq!(api.calls(), vec!["update 1 Buy oat milk", "list"]);
}

#[tokio::test]
async fn cancel_edit_discards_drafts() {
    let existing = task(1, "Buy milk");
    let api = Arc::new(MockTaskApi::with_tasks(vec![existing.clone()]));
    let dashboard = Dashboard::new(api.clone());

    dashboard.start_edit(&existing).await;
    dashboard.set_edit("changed", "").await;
    dashboard.cancel_edit().await;

    assert_eq!(dashboard.snapshot().await.editing, None);
    assert!(!dashboard.save_edit().await);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn update_failure_falls_back_to_generic_banner() {
    let existing = task(1, "Buy milk");
    let api = Arc::new(MockTaskApi::with_tasks(vec![existing.clone()]));
    let dashboard = Dashboard::new(api.clone());

    dashboard.start_edit(&existing).await;
    api.fail_writes(ApiError::http(500, None));

    assert!(!dashboard.save_edit().await);
    assert_eq!(dashboard.error().await.as_deref(), Some(UPDATE_FAILED));
    assert!(dashboard.snapshot().await.editing.is_some());
}

#[tokio::test]
async fn watch_refetches_on_refresh_signals() {
    let api = Arc::new(MockTaskApi::with_tasks(vec![task(1, "Buy milk")]));
    let dashboard = Dashboard::new(api.clone());
    let signal = RefreshSignal::new();
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = dashboard.watch(signal.subscribe(), cancel.clone(), Some(tx));
    signal.emit(TaskRefresh {
        intent: Intent::CreateTask,
    });

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    match event {
        Event::TasksRefreshed(tasks) => assert_eq!(tasks.len(), 1),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(api.calls(), vec!["list"]);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn watch_stops_when_the_signal_is_dropped() {
    let api = Arc::new(MockTaskApi::default());
    let dashboard = Dashboard::new(api.clone());
    let signal = RefreshSignal::new();

    let handle = dashboard.watch(signal.subscribe(), CancellationToken::new(), None);
    drop(signal);

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(api.calls().is_empty());
}
