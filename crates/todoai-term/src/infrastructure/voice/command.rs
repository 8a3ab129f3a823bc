use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::domain::models::SpeechRecognizer;
use crate::domain::models::VoiceError;

pub const LOCALE_ENV: &str = "TODOAI_VOICE_LOCALE";

/// Runs an external speech-to-text command and reads one transcript from its
/// stdout.
pub struct CommandRecognizer {
    command: String,
}

impl CommandRecognizer {
    pub fn new(command: &str) -> CommandRecognizer {
        CommandRecognizer {
            command: command.to_string(),
        }
    }

    fn shell(&self) -> Command {
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }

        #[cfg(not(target_os = "windows"))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    fn name(&self) -> String {
        self.command.clone()
    }

    async fn recognize(
        &self,
        locale: &str,
        cancel: CancellationToken,
    ) -> Result<String, VoiceError> {
        let child = self
            .shell()
            .env(LOCALE_ENV, locale)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| VoiceError::Recognition(err.to_string()))?;

        // Dropping the wait future on cancel kills the child.
        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(VoiceError::Cancelled),
            output = child.wait_with_output() => {
                output.map_err(|err| VoiceError::Recognition(err.to_string()))?
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(status = %output.status, stderr = %stderr, "voice command failed");
            if stderr.is_empty() {
                return Err(VoiceError::Recognition(output.status.to_string()));
            }
            return Err(VoiceError::Recognition(stderr));
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(String::from)
            .ok_or_else(|| VoiceError::Recognition("no-speech".to_string()))
    }
}
