pub mod bet;
pub mod cards;
pub mod log;
pub mod player;
pub mod pot;
pub mod state;
pub mod view;

pub use cards::{card, deck, hand};

/// Seats at a single table. Nine-handed is the largest ring game we deal.
pub const MAX_PLAYERS: usize = 9;
pub type PlayerId = i32;
pub type Currency = i32;
pub type SeqNum = usize;
pub type SeatIdx = usize;

#[derive(Debug, derive_more::Display)]
pub enum GameError {
    DeckError(deck::DeckError),
    BetError(bet::BetError),
    HandError(hand::HandError),
    NotEnoughPlayers,
    TableFull,
    PlayerAlreadySeated,
    PlayerNotFound,
    BettingPlayerCantStand,
    #[display(fmt = "Chips not conserved: expected {} but table holds {}", expected, actual)]
    ChipsNotConserved { expected: Currency, actual: Currency },
}

impl std::error::Error for GameError {}

impl From<deck::DeckError> for GameError {
    fn from(e: deck::DeckError) -> Self {
        GameError::DeckError(e)
    }
}

impl From<bet::BetError> for GameError {
    fn from(e: bet::BetError) -> Self {
        GameError::BetError(e)
    }
}

impl From<hand::HandError> for GameError {
    fn from(e: hand::HandError) -> Self {
        GameError::HandError(e)
    }
}
