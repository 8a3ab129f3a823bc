#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommand {
    pub command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let mut parts = text.split_whitespace();
        let command = parts.next()?.to_lowercase();
        if command.len() < 2 {
            return None;
        }

        Some(SlashCommand {
            command,
            args: parts.map(str::to_string).collect(),
        })
    }

    fn is(&self, names: &[&str]) -> bool {
        names.contains(&self.command.as_str())
    }

    pub fn is_quit(&self) -> bool {
        self.is(&["/quit", "/exit", "/q"])
    }

    pub fn is_help(&self) -> bool {
        self.is(&["/help", "/h"])
    }

    pub fn is_open(&self) -> bool {
        self.is(&["/open", "/o"])
    }

    pub fn is_close(&self) -> bool {
        self.is(&["/close"])
    }

    pub fn is_voice(&self) -> bool {
        self.is(&["/voice", "/v"])
    }

    pub fn is_tasks(&self) -> bool {
        self.is(&["/tasks", "/t"])
    }

    pub fn is_send(&self) -> bool {
        self.is(&["/send", "/s"])
    }

    pub fn is_quick(&self) -> bool {
        self.is(&["/quick"])
    }

    pub fn first_number(&self) -> Option<usize> {
        self.args.first().and_then(|arg| arg.parse().ok())
    }
}
