use todoai_client::Task;

use super::VoiceError;
use crate::domain::services::SendOutcome;

#[derive(Debug)]
pub enum Event {
    Input(String),
    EndOfInput,
    SendFinished(SendOutcome),
    TasksRefreshed(Vec<Task>),
    VoiceFinished(Result<String, VoiceError>),
}
