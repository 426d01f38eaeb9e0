//! ragchat - client core for a retrieval-augmented chat backend
//!
//! Identity, a per-user session directory, per-session conversation logs
//! and the request/response exchange, driven by a pure state machine.

pub mod backend;
pub mod config;
pub mod runtime;
pub mod state_machine;
pub mod view;
