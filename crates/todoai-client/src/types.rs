use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Timestamp in the same shape a browser's `toISOString` produces.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One entry of a chat conversation, as exchanged with `/api/chat/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    #[serde(rename = "isUser")]
    pub is_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl ChatMessage {
    pub fn user(text: &str) -> ChatMessage {
        ChatMessage {
            message: text.to_string(),
            is_user: true,
            intent: None,
            created_at: now_timestamp(),
        }
    }

    pub fn assistant(text: &str, intent: Option<String>) -> ChatMessage {
        ChatMessage {
            message: text.to_string(),
            is_user: false,
            intent,
            created_at: now_timestamp(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply to `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub action: Option<String>,
}

impl ChatReply {
    pub fn intent(&self) -> Option<Intent> {
        self.action
            .as_deref()
            .filter(|action| !action.is_empty())
            .map(Intent::parse)
    }

    /// Whether the backend reports that the task list may have changed.
    pub fn mutates_tasks(&self) -> bool {
        self.intent().is_some_and(|intent| intent.mutates_tasks())
    }
}

/// Backend-classified label for what a chat message asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateTask,
    ListTasks,
    UpdateTask,
    DeleteTask,
    MarkComplete,
    MarkIncomplete,
    General,
    Other(String),
}

impl Intent {
    pub fn parse(s: &str) -> Intent {
        match s {
            "create_task" => Intent::CreateTask,
            "list_tasks" => Intent::ListTasks,
            "update_task" => Intent::UpdateTask,
            "delete_task" => Intent::DeleteTask,
            "mark_complete" => Intent::MarkComplete,
            "mark_incomplete" => Intent::MarkIncomplete,
            "general" => Intent::General,
            other => Intent::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Intent::CreateTask => "create_task",
            Intent::ListTasks => "list_tasks",
            Intent::UpdateTask => "update_task",
            Intent::DeleteTask => "delete_task",
            Intent::MarkComplete => "mark_complete",
            Intent::MarkIncomplete => "mark_incomplete",
            Intent::General => "general",
            Intent::Other(other) => other,
        }
    }

    /// `general` is the only label that guarantees nothing changed.
    pub fn mutates_tasks(&self) -> bool {
        *self != Intent::General
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const TASK_STATUS_COMPLETE: &str = "Complete";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    pub fn is_complete(&self) -> bool {
        self.status == TASK_STATUS_COMPLETE
    }
}

/// Body of task create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
}

impl TaskDraft {
    /// An empty description is sent as `null`.
    pub fn new(title: &str, description: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
