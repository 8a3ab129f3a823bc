use anyhow::bail;
use anyhow::Result;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::Lines;
use tokio::sync::mpsc;

use crate::domain::models::Event;

/// Merges typed lines with events posted by background work (finished sends,
/// voice results, task refreshes).
pub struct EventsService<R> {
    lines: Option<Lines<R>>,
    events: mpsc::UnboundedReceiver<Event>,
}

impl<R: AsyncBufRead + Unpin> EventsService<R> {
    pub fn new(input: R, events: mpsc::UnboundedReceiver<Event>) -> EventsService<R> {
        EventsService {
            lines: Some(input.lines()),
            events,
        }
    }

    /// Waits for the next event. End of input is reported once; after that
    /// only background events are returned.
    pub async fn next(&mut self) -> Result<Event> {
        let Some(lines) = self.lines.as_mut() else {
            return match self.events.recv().await {
                Some(event) => Ok(event),
                None => bail!("no more events"),
            };
        };

        let line = tokio::select! {
            event = self.events.recv() => match event {
                Some(event) => return Ok(event),
                // Every sender is gone; keep reading input.
                None => lines.next_line().await?,
            },
            line = lines.next_line() => line?,
        };

        Ok(self.line_event(line))
    }

    fn line_event(&mut self, line: Option<String>) -> Event {
        match line {
            Some(line) => Event::Input(line),
            None => {
                self.lines = None;
                Event::EndOfInput
            }
        }
    }
}
