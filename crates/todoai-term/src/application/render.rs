use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;
use todoai_client::ChatMessage;
use todoai_client::Task;

use crate::domain::models::QuickAction;
use crate::domain::services::DashboardState;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /open (/o) - Opens the chat.
- /close - Closes the chat. Messages are kept until the next open.
- /voice (/v) - Captures one spoken message into the input. Use /send to submit it.
- /send (/s) - Submits the current input.
- /quick [NUMBER] - Fills the input with a quick action.
- /tasks (/t) - Shows your task list.
- /help (/h) - Provides this help menu.
- /quit /exit (/q) - Exit.

Anything else is sent to the assistant. Ask it to add, list, update, complete or delete tasks.
        "#;

    text.trim().to_string()
}

/// Local `HH:MM` for a backend timestamp. Naive timestamps are taken as UTC.
pub fn format_time(timestamp: &str) -> Option<String> {
    let utc = match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(_) => {
            let naive = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
            Utc.from_utc_datetime(&naive)
        }
    };

    Some(utc.with_timezone(&Local).format("%H:%M").to_string())
}

pub fn format_message(message: &ChatMessage) -> String {
    let author = if message.is_user { "You" } else { "Assistant" };
    match format_time(&message.created_at) {
        Some(time) => format!("[{time}] {author}: {}", message.message),
        None => format!("{author}: {}", message.message),
    }
}

pub fn format_quick_actions() -> String {
    QuickAction::all()
        .iter()
        .enumerate()
        .map(|(i, action)| format!("  /quick {} - {}", i + 1, action.label))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn format_task(task: &Task) -> String {
    let check = if task.is_complete() { "x" } else { " " };
    let mut line = format!("[{check}] #{} {}", task.id, task.title);
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        line = format!("{line} - {description}");
    }
    line
}

pub fn format_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks yet.".to_string();
    }

    tasks
        .iter()
        .map(|task| format!("  {}", format_task(task)))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn format_dashboard(state: &DashboardState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        out.push_str(&format!("! {error}\n"));
    }

    let done = state.tasks.iter().filter(|t| t.is_complete()).count();
    out.push_str(&format!("Tasks ({done}/{} done)\n", state.tasks.len()));
    out.push_str(&format_task_list(&state.tasks));
    out
}
