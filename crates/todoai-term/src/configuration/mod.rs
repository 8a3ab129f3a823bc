//! Configuration management for the terminal front-end.
//!
//! Values are layered from defaults, `config.toml` and command-line flags.

mod config;

pub use config::*;
