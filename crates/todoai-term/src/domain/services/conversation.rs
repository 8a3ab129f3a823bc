use todoai_client::ApiError;
use todoai_client::ChatMessage;
use todoai_client::ChatReply;
use todoai_client::Intent;

use crate::domain::models::QuickAction;
use crate::domain::models::VoiceError;

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

pub const SEND_FAILED_FALLBACK: &str = "Failed to send message";

/// What a call to send ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input or a send already in flight. Nothing changed.
    Ignored,
    /// The backend answered. `refresh` is true when the intent may have
    /// changed the task list.
    Replied {
        intent: Option<Intent>,
        refresh: bool,
    },
    /// The request failed and a synthetic error message was appended.
    Failed(String),
    /// The widget was torn down before the request resolved.
    Detached,
}

/// State of one chat widget. Every transition is synchronous; the widget
/// service performs the I/O in between.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
    pub pending_input: String,
    pub is_sending: bool,
    pub is_listening: bool,
    pub is_open: bool,
}

impl Conversation {
    /// Returns true only on a closed to open transition.
    pub fn open(&mut self) -> bool {
        if self.is_open {
            return false;
        }
        self.is_open = true;
        true
    }

    pub fn close(&mut self) -> bool {
        if !self.is_open {
            return false;
        }
        self.is_open = false;
        true
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// History goes before anything appended while it was being fetched.
    pub fn restore_history(&mut self, history: Vec<ChatMessage>) {
        let appended = std::mem::replace(&mut self.messages, history);
        self.messages.extend(appended);
    }

    pub fn set_input(&mut self, text: &str) {
        self.pending_input = text.to_string();
    }

    pub fn apply_quick_action(&mut self, action: &QuickAction) {
        self.pending_input = action.text.to_string();
    }

    pub fn quick_actions_visible(&self) -> bool {
        self.messages.is_empty() && !self.is_sending
    }

    /// Guards and starts a send. Returns the text to send, or `None` when the
    /// call must be dropped.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || self.is_sending {
            return None;
        }

        self.messages.push(ChatMessage::user(text));
        self.pending_input.clear();
        self.is_sending = true;

        Some(text.to_string())
    }

    pub fn complete_send(&mut self, result: &Result<ChatReply, ApiError>) -> SendOutcome {
        let outcome = match result {
            Ok(reply) => {
                self.messages
                    .push(ChatMessage::assistant(&reply.response, reply.action.clone()));
                SendOutcome::Replied {
                    intent: reply.intent(),
                    refresh: reply.mutates_tasks(),
                }
            }
            Err(err) => return self.fail_send(&error_message(err)),
        };

        self.is_sending = false;
        outcome
    }

    /// Ends the send in flight with a synthetic assistant error.
    pub fn fail_send(&mut self, text: &str) -> SendOutcome {
        self.messages.push(ChatMessage::assistant(text, None));
        self.is_sending = false;
        SendOutcome::Failed(text.to_string())
    }

    pub fn begin_listening(&mut self) -> Result<(), VoiceError> {
        if self.is_listening {
            return Err(VoiceError::AlreadyListening);
        }
        self.is_listening = true;
        Ok(())
    }

    /// Always clears the listening flag. A transcript replaces the pending
    /// input but is never sent.
    pub fn finish_listening(&mut self, result: &Result<String, VoiceError>) {
        self.is_listening = false;
        if let Ok(transcript) = result {
            self.pending_input = transcript.clone();
        }
    }
}

pub fn error_message(err: &ApiError) -> String {
    let detail = err.to_string();
    if detail.trim().is_empty() {
        return format!("Error: {SEND_FAILED_FALLBACK}");
    }
    format!("Error: {detail}")
}
