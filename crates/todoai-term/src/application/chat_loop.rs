use anyhow::Result;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::render;
use crate::domain::models::Event;
use crate::domain::models::QuickAction;
use crate::domain::models::SlashCommand;
use crate::domain::models::VoiceError;
use crate::domain::services::ChatWidget;
use crate::domain::services::Dashboard;
use crate::domain::services::DashboardStatus;
use crate::domain::services::EventsService;
use crate::domain::services::RefreshSignal;
use crate::domain::services::SendOutcome;

#[cfg(test)]
#[path = "chat_loop_test.rs"]
mod tests;

pub const LOGIN_REQUIRED_NOTICE: &str = "You are not logged in. Run `todoai login` first.";

pub struct ChatLoopProps {
    pub widget: ChatWidget,
    pub dashboard: Dashboard,
    pub refresh: RefreshSignal,
}

struct ChatLoop<'a, W> {
    widget: ChatWidget,
    dashboard: Dashboard,
    event_tx: mpsc::UnboundedSender<Event>,
    out: &'a mut W,
    /// Messages already written to `out`.
    printed: usize,
    /// Spawned sends and voice captures that have not reported back.
    pending: usize,
    quitting: bool,
    /// Stops voice captures on quit. Sends are left to finish.
    voice_stop: CancellationToken,
}

impl<'a, W: AsyncWrite + Unpin> ChatLoop<'a, W> {
    async fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn print_new_messages(&mut self) -> Result<()> {
        let messages = self.widget.messages().await;
        if self.printed > messages.len() {
            self.printed = 0;
        }

        let lines = messages[self.printed..]
            .iter()
            .map(render::format_message)
            .collect::<Vec<String>>();
        self.printed = messages.len();

        for line in lines {
            self.write(&line).await?;
        }
        Ok(())
    }

    async fn print_quick_actions(&mut self) -> Result<()> {
        if self.widget.quick_actions_visible().await {
            self.write(&format!("Quick actions:\n{}", render::format_quick_actions()))
                .await?;
        }
        Ok(())
    }

    async fn open(&mut self) -> Result<()> {
        if !self.widget.open().await {
            return self.write("Chat is already open.").await;
        }

        self.printed = 0;
        self.write("Chat opened. Type /help for commands.").await?;
        self.print_new_messages().await?;
        self.print_quick_actions().await
    }

    fn quit(&mut self) {
        self.quitting = true;
        self.voice_stop.cancel();
    }

    fn spawn_send(&mut self, text: Option<String>) {
        let widget = self.widget.clone();
        let event_tx = self.event_tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            let outcome = match text {
                Some(text) => widget.send(&text).await,
                None => widget.submit().await,
            };
            let _ = event_tx.send(Event::SendFinished(outcome));
        });
    }

    fn spawn_voice(&mut self) {
        let widget = self.widget.clone();
        let event_tx = self.event_tx.clone();
        let stop = self.voice_stop.clone();
        self.pending += 1;
        tokio::spawn(async move {
            let result = widget.capture_voice(stop).await;
            let _ = event_tx.send(Event::VoiceFinished(result));
        });
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> Result<()> {
        if cmd.is_quit() {
            self.quit();
            return Ok(());
        }

        if cmd.is_help() {
            return self.write(&render::help_text()).await;
        }

        if cmd.is_open() {
            return self.open().await;
        }

        if cmd.is_close() {
            if self.widget.close().await {
                return self.write("Chat closed. Use /open to start again.").await;
            }
            return self.write("Chat is already closed.").await;
        }

        if cmd.is_tasks() {
            let state = self.dashboard.snapshot().await;
            return self.write(&render::format_dashboard(&state)).await;
        }

        if !self.widget.is_open().await {
            return self.write("Chat is closed. Use /open first.").await;
        }

        if cmd.is_voice() {
            self.write("Listening...").await?;
            self.spawn_voice();
            return Ok(());
        }

        if cmd.is_send() {
            self.spawn_send(None);
            return Ok(());
        }

        if cmd.is_quick() {
            let Some(action) = cmd.first_number().and_then(QuickAction::nth) else {
                return self
                    .write(&format!("Usage: /quick [NUMBER]\n{}", render::format_quick_actions()))
                    .await;
            };
            self.widget.apply_quick_action(&action).await;
            return self
                .write(&format!("Input: {}\nUse /send to submit it, or type your own message.", action.text))
                .await;
        }

        self.write(&format!("Unknown command {}. Type /help for commands.", cmd.command))
            .await
    }

    async fn handle_input(&mut self, line: String) -> Result<()> {
        if self.quitting || line.trim().is_empty() {
            return Ok(());
        }

        if let Some(cmd) = SlashCommand::parse(&line) {
            return self.handle_command(cmd).await;
        }

        if !self.widget.is_open().await {
            return self.write("Chat is closed. Use /open first.").await;
        }

        self.spawn_send(Some(line));
        Ok(())
    }

    async fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Input(line) => self.handle_input(line).await?,
            Event::EndOfInput => self.quit(),
            Event::SendFinished(outcome) => {
                self.pending = self.pending.saturating_sub(1);
                if outcome == SendOutcome::Ignored {
                    if self.widget.is_sending().await {
                        self.write("Still waiting for the previous reply.").await?;
                    }
                    return Ok(());
                }
                self.print_new_messages().await?;
            }
            Event::VoiceFinished(result) => {
                self.pending = self.pending.saturating_sub(1);
                match result {
                    Ok(transcript) => {
                        self.write(&format!("Heard: {transcript}\nUse /send to submit it."))
                            .await?
                    }
                    Err(VoiceError::Cancelled) => {}
                    Err(err) => self.write(&err.to_string()).await?,
                }
            }
            Event::TasksRefreshed(tasks) => {
                self.write(&format!("Tasks updated:\n{}", render::format_task_list(&tasks)))
                    .await?;
            }
        }

        Ok(())
    }
}

/// Runs the interactive chat until `/quit` or end of input. In-flight sends
/// are allowed to finish before returning.
pub async fn start_loop<R, W>(props: ChatLoopProps, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let mut events = EventsService::new(input, event_rx);

    let mut chat = ChatLoop {
        widget: props.widget,
        dashboard: props.dashboard,
        event_tx: event_tx.clone(),
        out,
        printed: 0,
        pending: 0,
        quitting: false,
        voice_stop: CancellationToken::new(),
    };

    chat.dashboard.fetch_tasks().await;
    if chat.dashboard.status().await == DashboardStatus::LoginRequired {
        chat.write(LOGIN_REQUIRED_NOTICE).await?;
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let watcher = chat
        .dashboard
        .watch(props.refresh.subscribe(), cancel.clone(), Some(event_tx));

    chat.open().await?;

    let mut result = Ok(());
    while !(chat.quitting && chat.pending == 0) {
        let event = match events.next().await {
            Ok(event) => event,
            Err(_) => break,
        };

        if let Err(err) = chat.handle_event(event).await {
            result = Err(err);
            break;
        }
    }

    tracing::debug!(pending = chat.pending, "chat loop finished");
    chat.widget.teardown();
    cancel.cancel();
    if let Err(err) = watcher.await {
        tracing::error!(error = %err, "task watcher failed");
    }

    result
}
