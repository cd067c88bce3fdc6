use crate::bet::BetStatus;
use crate::player::Player;
use crate::state::State;
use crate::{Currency, PlayerId, SeatIdx};
use serde::{Deserialize, Serialize};

/// An action a seat is allowed to take, with the numbers a decision source
/// needs to pick an amount. The Display strings are the stable grammar
/// external agents are briefed with: `"call (20)"` is the amount owed,
/// `"raise (min 40)"` the smallest total raise, `"all-in (970)"` the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalAction {
    Fold,
    Check,
    Call(Currency),
    Raise { min: Currency, max: Currency },
    AllIn(Currency),
}

impl std::fmt::Display for LegalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegalAction::Fold => write!(f, "fold"),
            LegalAction::Check => write!(f, "check"),
            LegalAction::Call(v) => write!(f, "call ({})", v),
            LegalAction::Raise { min, .. } => write!(f, "raise (min {})", min),
            LegalAction::AllIn(v) => write!(f, "all-in ({})", v),
        }
    }
}

/// What a decision source answers with. `Raise` carries the total street bet
/// to raise to. Anything that is not in the offered legal actions is treated
/// as a bad decision and degraded by the engine; sources cannot break a hand,
/// only play it badly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Fold,
    Check,
    Call,
    Raise(Currency),
    AllIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Active,
    Folded,
    AllIn,
}

impl From<BetStatus> for SeatStatus {
    fn from(bs: BetStatus) -> Self {
        match bs {
            BetStatus::Folded => SeatStatus::Folded,
            BetStatus::AllIn(_) => SeatStatus::AllIn,
            BetStatus::In(_) | BetStatus::Waiting => SeatStatus::Active,
        }
    }
}

/// Public figures for one seat: everything every player may know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub seat: SeatIdx,
    pub id: PlayerId,
    pub stack: Currency,
    pub street_bet: Currency,
    pub status: SeatStatus,
}

impl SeatInfo {
    pub(crate) fn new(seat: SeatIdx, p: &Player) -> Self {
        Self {
            seat,
            id: p.id,
            stack: p.stack,
            street_bet: p.street_total(),
            status: p.bet_status.into(),
        }
    }
}

/// A read-only snapshot of the table as one seat is allowed to see it. This is
/// what gets serialized to brief an external agent: the seat's own cards, all
/// public chip figures, the offered actions, and a bounded tail of the action
/// history. Other seats' cards are never present.
///
/// Numeric invariants a consumer can rely on before settlement:
/// `pot` equals the sum of every seat's hand contributions, and per seat
/// `stack + hand contributions` equals the stack at hand start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub your_id: PlayerId,
    pub phase: State,
    pub your_cards: Vec<String>,
    pub community: Vec<String>,
    pub your_stack: Currency,
    pub your_street_bet: Currency,
    pub your_hand_total: Currency,
    pub pot: Currency,
    pub to_call: Currency,
    pub dealer_seat: SeatIdx,
    pub acting_seat: Option<SeatIdx>,
    pub players: Vec<SeatInfo>,
    pub actions: Vec<LegalAction>,
    pub history: Vec<String>,
}

impl TableView {
    /// The offered actions in the textual grammar agents are prompted with.
    pub fn action_strings(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.to_string()).collect()
    }
}

/// The durable bits a host needs to persist a table between hands: stacks,
/// hand counter, button position, blinds. Storage format is the host's
/// business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub hand_number: u64,
    pub dealer_seat: SeatIdx,
    pub small_blind: Currency,
    pub big_blind: Currency,
    pub stacks: Vec<(SeatIdx, PlayerId, Currency)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_strings_grammar() {
        let actions = vec![
            LegalAction::Fold,
            LegalAction::Call(20),
            LegalAction::Raise { min: 40, max: 970 },
            LegalAction::AllIn(970),
        ];
        let strings: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
        assert_eq!(strings, vec!["fold", "call (20)", "raise (min 40)", "all-in (970)"]);
    }
}
