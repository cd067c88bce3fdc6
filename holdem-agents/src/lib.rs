//! Decision sources: the things that answer "what does seat X do?".
//!
//! The engine never knows or cares what is behind a decision: a human at a
//! terminal, a weighted coin, or an LLM on the far side of a network call.
//! Each is just a [`DecisionSource`] value owned by whoever drives the table,
//! asked one question at a time. Whatever comes back is validated by the
//! engine against the offered actions, so a broken source can only ever play
//! badly, never corrupt a hand.

use holdem_core::view::{Decision, TableView};

pub mod random;
pub mod scripted;
pub mod stdin;
pub mod timeout;

pub use random::RandomSource;
pub use scripted::ScriptedSource;
pub use stdin::StdinSource;
pub use timeout::TimeoutSource;

/// One capability: given what this seat may know, pick an action.
///
/// Called synchronously with the acting seat's [`TableView`]; the engine
/// blocks on the answer, which makes a slow source a suspension point. Wrap
/// anything I/O-bound in [`TimeoutSource`] so a stall degrades to a safe
/// default instead of freezing the table.
pub trait DecisionSource {
    fn decide(&mut self, view: &TableView) -> Decision;
}

impl<T: DecisionSource + ?Sized> DecisionSource for Box<T> {
    fn decide(&mut self, view: &TableView) -> Decision {
        (**self).decide(view)
    }
}

/// The default action when a source cannot or will not answer: take the free
/// option if there is one, otherwise get out of the way.
pub fn default_decision(view: &TableView) -> Decision {
    if view
        .actions
        .iter()
        .any(|a| matches!(a, holdem_core::view::LegalAction::Check))
    {
        Decision::Check
    } else {
        Decision::Fold
    }
}
