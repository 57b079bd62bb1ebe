//! Ticket resolution for Querydesk.
//!
//! This crate owns the core of the system:
//!
//! - [`ResolutionEngine`] - one bounded tool-calling conversation per
//!   ticket, terminal-outcome effects against the store and notifier
//! - [`BatchRunner`] - selects eligible tickets and resolves them
//!   sequentially
//! - [`balance`] - workload balancing for reopened and unassigned tickets

pub mod balance;
mod batch;
mod engine;
mod outcome;
mod prompts;
mod schema;

pub use batch::BatchRunner;
pub use engine::{EngineConfig, ResolutionEngine};
pub use outcome::Resolution;
pub use schema::tool_definitions;
