//! Infrastructure layer providing external integrations.
//!
//! This module wires the HTTP clients from configuration and provides the
//! speech recognizers available on this platform.

pub mod clients;
pub mod voice;
