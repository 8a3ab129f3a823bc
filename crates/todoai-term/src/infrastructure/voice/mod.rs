pub mod command;

use std::sync::Arc;

use crate::domain::models::SpeechRecognizer;

pub struct VoiceManager {}

impl VoiceManager {
    /// An empty command means voice capture is not available.
    pub fn get(command: &str) -> Option<Arc<dyn SpeechRecognizer>> {
        if command.trim().is_empty() {
            return None;
        }

        Some(Arc::new(command::CommandRecognizer::new(command)))
    }
}
