use crate::DecisionSource;
use holdem_core::view::{Decision, TableView};
use std::collections::VecDeque;

/// Plays a fixed sequence of decisions, then folds forever. The workhorse for
/// deterministic engine tests and hand replays.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    queue: VecDeque<Decision>,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = Decision>>(decisions: I) -> Self {
        Self {
            queue: decisions.into_iter().collect(),
        }
    }

    pub fn push(&mut self, d: Decision) {
        self.queue.push_back(d);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DecisionSource for ScriptedSource {
    fn decide(&mut self, _view: &TableView) -> Decision {
        self.queue.pop_front().unwrap_or(Decision::Fold)
    }
}
