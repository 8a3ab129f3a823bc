//! Front-end core for the Todo AI task assistant.
//!
//! This crate holds everything between the HTTP client and the terminal: the
//! chat widget that turns free text into task operations, the dashboard that
//! keeps the task list fresh, the auth session, input validation and the
//! interactive chat loop.

pub mod application;
pub mod configuration;
pub mod domain;
pub mod infrastructure;
pub use application::chat_loop::{start_loop, ChatLoopProps};
pub use configuration::{Config, ConfigKey};
pub use domain::models::{Event, HistoryPolicy, QuickAction, SlashCommand, TaskRefresh};
pub use domain::services::{
    AuthSession, ChatWidget, ChatWidgetProps, Conversation, Dashboard, DashboardStatus,
    RefreshSignal, SendOutcome,
};
pub use infrastructure::clients::{ClientManager, Clients};
pub use infrastructure::voice::VoiceManager;
