//! Client conversation state machine
//!
//! Elm-style: a pure `transition` over `AppState`, with every backend call
//! expressed as an `Effect` whose outcome comes back as an `Event`.

mod effect;
pub mod event;
pub mod state;
pub mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{AppState, Identity, Message, Role, Session, SessionDirectory, Source, User};
pub use transition::{
    transition, TransitionError, TransitionResult, EXCHANGE_FAILURE_TEXT, IDENTITY_FAILURE_TEXT,
};
