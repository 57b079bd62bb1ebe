//! Chat-completions client for Querydesk.
//!
//! Implements [`triage_core::ToolChat`] against an OpenAI-compatible
//! chat-completions endpoint with function-calling tools enabled.

pub mod api_types;
mod client;
mod config;

pub use client::ChatClient;
pub use config::ChatApiConfig;
