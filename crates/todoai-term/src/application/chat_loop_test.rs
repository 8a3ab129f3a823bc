use std::io::Cursor;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use todoai_client::ApiError;
use todoai_client::ChatApi;
use todoai_client::ChatMessage;
use todoai_client::ChatReply;
use todoai_client::Task;
use todoai_client::TaskApi;
use todoai_client::TaskDraft;
use tokio::sync::Notify;
use tokio::sync::Semaphore;

use super::*;
use crate::domain::models::SpeechRecognizer;
use crate::domain::services::ChatWidgetProps;

#[derive(Default)]
struct MockChatApi {
    sent: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
    entered: Notify,
}

impl MockChatApi {
    /// Holds every send until a permit is added to the gate.
    fn gated() -> MockChatApi {
        MockChatApi {
            gate: Some(Semaphore::new(0)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn send_message(&self, text: &str) -> todoai_client::Result<ChatReply> {
        self.sent.lock().unwrap().push(text.to_string());
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if text.starts_with("Add task") {
            return Ok(ChatReply {
                response: "Added!".to_string(),
                action: Some("create_task".to_string()),
            });
        }
        Ok(ChatReply {
            response: "Hi there".to_string(),
            action: Some("general".to_string()),
        })
    }

    async fn get_history(&self, _: usize) -> todoai_client::Result<Vec<ChatMessage>> {
        Ok(vec![])
    }
}

struct MockTaskApi {
    authorized: bool,
}

#[async_trait]
impl TaskApi for MockTaskApi {
    async fn list_tasks(&self) -> todoai_client::Result<Vec<Task>> {
        if !self.authorized {
            return Err(ApiError::http(401, Some("Not authenticated".to_string())));
        }
        Ok(vec![])
    }

    async fn get_task(&self, _: i64) -> todoai_client::Result<Task> {
        Err(ApiError::http(404, None))
    }

    async fn create_task(&self, _: &TaskDraft) -> todoai_client::Result<Task> {
        Err(ApiError::http(500, None))
    }

    async fn update_task(&self, _: i64, _: &TaskDraft) -> todoai_client::Result<Task> {
        Err(ApiError::http(500, None))
    }

    async fn toggle_task(&self, _: i64) -> todoai_client::Result<Task> {
        Err(ApiError::http(500, None))
    }

    async fn delete_task(&self, _: i64) -> todoai_client::Result<()> {
        Err(ApiError::http(500, None))
    }
}

/// Listens until the capture is cancelled.
struct SilentRecognizer;

#[async_trait]
impl SpeechRecognizer for SilentRecognizer {
    fn name(&self) -> String {
        "silent".to_string()
    }

    async fn recognize(&self, _: &str, cancel: CancellationToken) -> Result<String, VoiceError> {
        cancel.cancelled().await;
        Err(VoiceError::Cancelled)
    }
}

async fn run(script: &str, authorized: bool) -> (String, Arc<MockChatApi>) {
    let chat_api = Arc::new(MockChatApi::default());
    let out = run_with(script, authorized, chat_api.clone(), None).await;
    (out, chat_api)
}

async fn run_with(
    script: &str,
    authorized: bool,
    chat_api: Arc<MockChatApi>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
) -> String {
    let refresh = RefreshSignal::new();
    let mut widget_props = ChatWidgetProps::new(chat_api, refresh.clone());
    widget_props.recognizer = recognizer;
    let props = ChatLoopProps {
        widget: ChatWidget::new(widget_props),
        dashboard: Dashboard::new(Arc::new(MockTaskApi { authorized })),
        refresh,
    };

    let mut out: Vec<u8> = vec![];
    start_loop(props, Cursor::new(script.as_bytes().to_vec()), &mut out)
        .await
        .unwrap();

    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn it_waits_for_replies_before_quitting() {
    let (out, chat_api) = run("Add task buy milk\n/quit\n", true).await;

    assert!(out.contains("Chat opened"));
    assert!(out.contains("You: Add task buy milk"));
    assert!(out.contains("Assistant: Added!"));
    assert_eq!(*chat_api.sent.lock().unwrap(), vec!["Add task buy milk"]);
}

#[tokio::test]
async fn it_stops_when_login_is_required() {
    let (out, chat_api) = run("hello\n", false).await;

    assert_eq!(out.trim(), LOGIN_REQUIRED_NOTICE);
    assert!(chat_api.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn closed_chat_does_not_send() {
    let (out, chat_api) = run("/close\nhello\n/voice\n", true).await;

    assert!(out.contains("Chat closed."));
    assert!(out.contains("Chat is closed. Use /open first."));
    assert!(chat_api.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn quick_actions_fill_the_input_until_sent() {
    let (out, chat_api) = run("/quick 1\n/send\n", true).await;

    assert!(out.contains("/quick 1 - Show tasks"));
    assert!(out.contains("Input: Show my tasks"));
    assert!(out.contains("Assistant: Hi there"));
    assert_eq!(*chat_api.sent.lock().unwrap(), vec!["Show my tasks"]);
}

#[tokio::test]
async fn voice_without_a_recognizer_explains_itself() {
    let (out, _) = run("/voice\n/quit\n", true).await;

    assert!(out.contains("Voice recognition is not available"));
}

#[tokio::test]
async fn quitting_while_listening_still_prints_the_pending_reply() {
    let chat_api = Arc::new(MockChatApi::gated());

    let backend = chat_api.clone();
    let releaser = tokio::spawn(async move {
        backend.entered.notified().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        if let Some(gate) = &backend.gate {
            gate.add_permits(1);
        }
    });

    let out = run_with(
        "Add task buy milk\n/voice\n/quit\n",
        true,
        chat_api.clone(),
        Some(Arc::new(SilentRecognizer)),
    )
    .await;
    releaser.await.unwrap();

    assert!(out.contains("Listening..."));
    assert!(out.contains("Assistant: Added!"));
    assert_eq!(*chat_api.sent.lock().unwrap(), vec!["Add task buy milk"]);
}

#[tokio::test]
async fn help_and_tasks_render() {
    let (out, _) = run("/help\n/tasks\n/bogus\n", true).await;

    assert!(out.contains("COMMANDS:"));
    assert!(out.contains("Tasks (0/0 done)"));
    assert!(out.contains("Unknown command /bogus"));
}
