use std::sync::Arc;

use todoai_client::ChatApi;
use todoai_client::ChatMessage;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::Conversation;
use super::RefreshSignal;
use super::SendOutcome;
use super::SEND_FAILED_FALLBACK;
use crate::domain::models::HistoryPolicy;
use crate::domain::models::QuickAction;
use crate::domain::models::SpeechRecognizer;
use crate::domain::models::TaskRefresh;
use crate::domain::models::VoiceError;
use crate::domain::models::DEFAULT_VOICE_LOCALE;

#[cfg(test)]
#[path = "chat_widget_test.rs"]
mod tests;

pub struct ChatWidgetProps {
    pub chat_api: Arc<dyn ChatApi>,
    pub refresh: RefreshSignal,
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub history_policy: HistoryPolicy,
    pub voice_locale: String,
}

impl ChatWidgetProps {
    pub fn new(chat_api: Arc<dyn ChatApi>, refresh: RefreshSignal) -> ChatWidgetProps {
        ChatWidgetProps {
            chat_api,
            refresh,
            recognizer: None,
            history_policy: HistoryPolicy::default(),
            voice_locale: DEFAULT_VOICE_LOCALE.to_string(),
        }
    }
}

/// The chat assistant. Sends free text to the backend, keeps the
/// conversation, and tells the rest of the app when the backend's intent may
/// have changed the task list.
///
/// Clones share the same conversation. Requests run on spawned tasks, so
/// dropping a caller's future never leaves the widget stuck sending or
/// listening.
#[derive(Clone)]
pub struct ChatWidget {
    state: Arc<RwLock<Conversation>>,
    chat_api: Arc<dyn ChatApi>,
    refresh: RefreshSignal,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    history_policy: HistoryPolicy,
    voice_locale: String,
    mounted: CancellationToken,
}

impl ChatWidget {
    pub fn new(props: ChatWidgetProps) -> ChatWidget {
        ChatWidget {
            state: Arc::new(RwLock::new(Conversation::default())),
            chat_api: props.chat_api,
            refresh: props.refresh,
            recognizer: props.recognizer,
            history_policy: props.history_policy,
            voice_locale: props.voice_locale,
            mounted: CancellationToken::new(),
        }
    }

    pub async fn snapshot(&self) -> Conversation {
        self.state.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.read().await.messages.clone()
    }

    pub async fn pending_input(&self) -> String {
        self.state.read().await.pending_input.clone()
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.is_open
    }

    pub async fn is_sending(&self) -> bool {
        self.state.read().await.is_sending
    }

    pub async fn is_listening(&self) -> bool {
        self.state.read().await.is_listening
    }

    pub async fn quick_actions_visible(&self) -> bool {
        self.state.read().await.quick_actions_visible()
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        self.history_policy
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    /// Opens the widget and runs the history policy once. Returns false when
    /// the widget was already open, in which case nothing runs.
    ///
    /// Both policies start from an empty session. Reload then puts the
    /// fetched history in front of anything sent while it loads.
    pub async fn open(&self) -> bool {
        {
            let mut state = self.state.write().await;
            if !self.is_mounted() || !state.open() {
                return false;
            }
            state.reset();

            if self.history_policy == HistoryPolicy::Reset {
                tracing::debug!("chat opened with a fresh session");
                return true;
            }
        }

        if let HistoryPolicy::Reload { limit } = self.history_policy {
            match self.chat_api.get_history(limit).await {
                Ok(history) => {
                    tracing::debug!(count = history.len(), "chat history loaded");
                    if self.is_mounted() {
                        self.state.write().await.restore_history(history);
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load chat history");
                }
            }
        }

        true
    }

    pub async fn close(&self) -> bool {
        self.state.write().await.close()
    }

    pub async fn set_input(&self, text: &str) {
        self.state.write().await.set_input(text);
    }

    pub async fn apply_quick_action(&self, action: &QuickAction) {
        self.state.write().await.apply_quick_action(action);
    }

    /// Sends whatever is in the input box.
    pub async fn submit(&self) -> SendOutcome {
        let text = self.pending_input().await;
        self.send(&text).await
    }

    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = {
            let mut state = self.state.write().await;
            if !self.is_mounted() {
                return SendOutcome::Ignored;
            }
            match state.begin_send(text) {
                Some(text) => text,
                None => return SendOutcome::Ignored,
            }
        };

        let state = self.state.clone();
        let chat_api = self.chat_api.clone();
        let refresh = self.refresh.clone();
        let mounted = self.mounted.clone();

        let worker = tokio::spawn(async move {
            tracing::debug!(chars = text.chars().count(), "sending chat message");
            let result = chat_api.send_message(&text).await;

            if mounted.is_cancelled() {
                tracing::debug!("chat widget torn down, dropping reply");
                state.write().await.is_sending = false;
                return SendOutcome::Detached;
            }

            let outcome = state.write().await.complete_send(&result);
            match &outcome {
                SendOutcome::Replied {
                    intent: Some(intent),
                    refresh: true,
                } => {
                    refresh.emit(TaskRefresh {
                        intent: intent.clone(),
                    });
                }
                SendOutcome::Failed(message) => {
                    tracing::warn!(message = %message, "chat message failed");
                }
                _ => {}
            }

            outcome
        });

        match worker.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "chat send worker failed");
                let mut state = self.state.write().await;
                if !self.is_mounted() {
                    state.is_sending = false;
                    return SendOutcome::Detached;
                }
                state.fail_send(&format!("Error: {SEND_FAILED_FALLBACK}"))
            }
        }
    }

    /// Captures one utterance into the input box. The transcript is returned
    /// but not sent.
    pub async fn start_voice_capture(&self) -> Result<String, VoiceError> {
        self.capture_voice(CancellationToken::new()).await
    }

    /// Like [`ChatWidget::start_voice_capture`], but `stop` ends the capture
    /// without unmounting the widget, so in-flight sends still land.
    pub async fn capture_voice(&self, stop: CancellationToken) -> Result<String, VoiceError> {
        let Some(recognizer) = self.recognizer.clone() else {
            tracing::info!("voice capture requested without a recognizer");
            return Err(VoiceError::Unsupported);
        };

        {
            let mut state = self.state.write().await;
            if !self.is_mounted() || stop.is_cancelled() {
                return Err(VoiceError::Cancelled);
            }
            state.begin_listening()?;
        }

        let state = self.state.clone();
        let locale = self.voice_locale.clone();
        let cancel = self.mounted.child_token();

        let worker = tokio::spawn(async move {
            tracing::debug!(recognizer = %recognizer.name(), locale = %locale, "listening");
            let result = tokio::select! {
                result = recognizer.recognize(&locale, cancel.clone()) => result,
                _ = stop.cancelled() => {
                    cancel.cancel();
                    Err(VoiceError::Cancelled)
                }
            };
            state.write().await.finish_listening(&result);
            result
        });

        match worker.await {
            Ok(result) => result,
            Err(err) => {
                self.state.write().await.is_listening = false;
                Err(VoiceError::Recognition(err.to_string()))
            }
        }
    }

    /// Unmounts the widget. Running voice captures are cancelled and
    /// in-flight sends no longer touch the conversation when they resolve.
    pub fn teardown(&self) {
        self.mounted.cancel();
    }
}
