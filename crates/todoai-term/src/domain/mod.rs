//! Core domain logic for the terminal front-end.
//!
//! This module contains the state machines and data models that drive the chat
//! widget and the dashboard, independent of the terminal and of HTTP.

pub mod models;
pub mod services;
