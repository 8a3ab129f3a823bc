use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_VOICE_LOCALE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("Voice recognition is not available. Set `voice-command` in config.toml to enable it.")]
    Unsupported,
    #[error("Already listening for voice input")]
    AlreadyListening,
    #[error("Voice recognition error: {0}")]
    Recognition(String),
    #[error("Voice capture cancelled")]
    Cancelled,
}

/// Captures a single utterance and returns its transcript.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn name(&self) -> String;

    async fn recognize(
        &self,
        locale: &str,
        cancel: CancellationToken,
    ) -> Result<String, VoiceError>;
}
