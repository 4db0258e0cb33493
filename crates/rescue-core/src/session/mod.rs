//! Per-screen workflows: the intake form and the edit dialog.
//!
//! Each session serializes its own remote calls through a [`FlightGate`].
//! Methods take `&self`, so a session can be shared across tasks.

mod edit;
mod gate;
mod intake;

pub use edit::EditSession;
pub use gate::{FlightGate, FlightGuard};
pub use intake::{IntakeSession, SubmitOutcome};

/// Outcome of a gated operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// The operation ran to completion.
    Ran(T),
    /// Another operation was in flight; nothing was done.
    AlreadyRunning,
}

impl<T> Attempt<T> {
    pub fn ran(self) -> Option<T> {
        match self {
            Attempt::Ran(value) => Some(value),
            Attempt::AlreadyRunning => None,
        }
    }

    pub fn is_already_running(&self) -> bool {
        matches!(self, Attempt::AlreadyRunning)
    }
}
