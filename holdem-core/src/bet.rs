use crate::Currency;
use serde::{Deserialize, Serialize};

/// A bet as accepted by the engine. `Call`, `Raise`, and `AllIn` carry the
/// seat's TOTAL street bet, not the increment: Call(10) then Raise(30) from the
/// same seat means 30 in this street, not 40. Raising doubles as the opening
/// bet of a street.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetAction {
    Check,
    Fold,
    Call(Currency),
    Raise(Currency),
    AllIn(Currency),
}

impl BetAction {
    pub const fn is_allin(&self) -> bool {
        matches!(self, &BetAction::AllIn(_))
    }
}

impl std::fmt::Display for BetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BetAction::Check => write!(f, "Check"),
            BetAction::Fold => write!(f, "Fold"),
            BetAction::Call(v) => write!(f, "Call({})", v),
            BetAction::Raise(v) => write!(f, "Raise({})", v),
            BetAction::AllIn(v) => write!(f, "AllIn({})", v),
        }
    }
}

#[derive(Debug, derive_more::Display, PartialEq, Eq)]
pub enum BetError {
    AllInWithoutBeingAllIn,
    HasNoMoney,
    BetTooLow,
    BetTooHigh,
    PlayerIsNotBetting,
    PlayerNotFound,
    CantRaiseSelf,
    OutOfTurn,
    NoBetExpected,
}

impl std::error::Error for BetError {}

/// Where a seat stands in the current street. The `In`/`AllIn` payload is the
/// seat's total bet this street; it resets with the street, unlike the hand
/// total the pot ledger tracks.
#[derive(Debug, derive_more::Display, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum BetStatus {
    Folded,
    Waiting,
    In(Currency),
    AllIn(Currency),
}

impl Default for BetStatus {
    fn default() -> Self {
        BetStatus::Waiting
    }
}

impl From<BetAction> for BetStatus {
    fn from(ba: BetAction) -> Self {
        match ba {
            BetAction::AllIn(x) => BetStatus::AllIn(x),
            BetAction::Fold => BetStatus::Folded,
            BetAction::Call(x) | BetAction::Raise(x) => BetStatus::In(x),
            BetAction::Check => BetStatus::In(0),
        }
    }
}

impl BetStatus {
    /// The seat's total street bet so far, regardless of status.
    pub fn street_total(&self) -> Currency {
        match self {
            BetStatus::In(x) | BetStatus::AllIn(x) => *x,
            BetStatus::Folded | BetStatus::Waiting => 0,
        }
    }
}
