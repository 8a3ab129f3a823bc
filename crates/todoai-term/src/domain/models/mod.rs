mod event;
mod history_policy;
mod quick_action;
mod slash_command;
mod task_refresh;
mod voice;

pub use event::*;
pub use history_policy::*;
pub use quick_action::*;
pub use slash_command::*;
pub use task_refresh::*;
pub use voice::*;
