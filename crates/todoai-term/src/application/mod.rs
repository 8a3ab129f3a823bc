//! Application layer driving the interactive terminal session.

pub mod chat_loop;
pub mod render;
