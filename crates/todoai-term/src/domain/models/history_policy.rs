use anyhow::bail;
use anyhow::Result;
use strum::Display;
use strum::EnumString;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum HistoryPolicyKind {
    Reset,
    Reload,
}

/// What the chat widget does with its conversation each time it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Start every session empty.
    #[default]
    Reset,
    /// Fetch the most recent `limit` messages from the backend.
    Reload { limit: usize },
}

impl HistoryPolicy {
    pub fn parse(kind: &str, limit: usize) -> Result<HistoryPolicy> {
        let Ok(kind) = kind.parse::<HistoryPolicyKind>() else {
            bail!("Unknown history policy '{kind}'. Possible values are: reset, reload");
        };

        match kind {
            HistoryPolicyKind::Reset => Ok(HistoryPolicy::Reset),
            HistoryPolicyKind::Reload => {
                if limit == 0 {
                    bail!("history-limit must be greater than 0 when reloading history");
                }
                Ok(HistoryPolicy::Reload { limit })
            }
        }
    }

    pub fn kind(&self) -> HistoryPolicyKind {
        match self {
            HistoryPolicy::Reset => HistoryPolicyKind::Reset,
            HistoryPolicy::Reload { .. } => HistoryPolicyKind::Reload,
        }
    }
}
