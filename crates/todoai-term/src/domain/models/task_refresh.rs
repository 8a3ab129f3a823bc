use todoai_client::Intent;

/// Broadcast after the chat backend reports an intent that may have changed
/// the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRefresh {
    pub intent: Intent,
}
