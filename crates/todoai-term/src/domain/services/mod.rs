mod auth_session;
mod chat_widget;
mod conversation;
mod dashboard;
mod events;
mod refresh;
pub mod validation;

pub use auth_session::*;
pub use chat_widget::*;
pub use conversation::*;
pub use dashboard::*;
pub use events::*;
pub use refresh::*;
