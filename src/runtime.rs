//! Runtime for driving the client state machine
//!
//! The executor applies transitions and performs their effects against a
//! [`Backend`](crate::backend::Backend), feeding outcomes back as events.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{ChatClient, ClientError};
