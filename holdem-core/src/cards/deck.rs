use super::card::{Card, ALL_RANKS, ALL_SUITS};
use base64ct::{Base64, Encoding};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

const DECK_LEN: usize = ALL_RANKS.len() * ALL_SUITS.len();
const SEED_LEN: usize = 32;
const ENCODED_SEED_LEN: usize = 4 * ((SEED_LEN + 3 - 1) / 3); // 4 * ceil(SEED_LEN / 3)

#[derive(PartialEq, Debug)]
pub enum DeckError {
    Exhausted,
    TooManyPockets,
    NoPockets,
    SeedDecode(base64ct::Error),
}

impl Error for DeckError {}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Exhausted => write!(f, "No more cards in deck"),
            DeckError::TooManyPockets => write!(f, "Too many pockets to deal"),
            DeckError::NoPockets => write!(f, "Need at least one pocket to deal"),
            DeckError::SeedDecode(e) => write!(f, "{}", e),
        }
    }
}

impl From<base64ct::Error> for DeckError {
    fn from(e: base64ct::Error) -> Self {
        Self::SeedDecode(e)
    }
}

/// A seed that fully determines the order of a shuffled deck. Keep it around and
/// a hand can be replayed or audited after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSeed([u8; SEED_LEN]);

impl DeckSeed {
    pub fn new(b: [u8; SEED_LEN]) -> Self {
        Self(b)
    }
}

impl Default for DeckSeed {
    fn default() -> Self {
        let mut b = [0u8; SEED_LEN];
        thread_rng().fill_bytes(&mut b);
        Self(b)
    }
}

impl fmt::Display for DeckSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b = [0u8; ENCODED_SEED_LEN];
        let s = Base64::encode(&self.0, &mut b).unwrap_or("");
        write!(f, "{}", s)
    }
}

impl FromStr for DeckSeed {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; SEED_LEN];
        Base64::decode(s, &mut b)?;
        Ok(DeckSeed(b))
    }
}

#[derive(Debug, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(&DeckSeed::default())
    }
}

impl Deck {
    /// A single 52-card deck, shuffled per the given seed.
    pub fn new(seed: &DeckSeed) -> Self {
        let mut cards = Vec::with_capacity(DECK_LEN);
        for suit in ALL_SUITS.iter() {
            for rank in ALL_RANKS.iter() {
                cards.push(Card::new(*rank, *suit));
            }
        }
        let mut d = Self { cards, next: 0 };
        d.seeded_shuffle(seed);
        d
    }

    pub fn shuffle(&mut self) {
        self.seeded_shuffle(&DeckSeed::default());
    }

    pub fn seeded_shuffle(&mut self, seed: &DeckSeed) {
        let mut rng = ChaChaRng::from_seed(seed.0);
        // For determinism given the same seed, the cards need to be in a known
        // order before shuffling.
        self.cards.sort_unstable();
        self.cards.shuffle(&mut rng);
        self.next = 0;
    }

    /// Draw the topmost card, or error if there are no more cards.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        if self.next == self.cards.len() {
            Err(DeckError::Exhausted)
        } else {
            let c = self.cards[self.next];
            self.next += 1;
            Ok(c)
        }
    }

    /// Discard the topmost card before dealing a street.
    pub fn burn(&mut self) {
        let _ = self.draw();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }

    /// Deal two cards to each of `n` pockets the way a dealer would: one card
    /// around the table, then the second.
    pub fn deal_pockets(&mut self, n: u8) -> Result<Vec<[Card; 2]>, DeckError> {
        if n as usize > crate::MAX_PLAYERS {
            return Err(DeckError::TooManyPockets);
        } else if n == 0 {
            return Err(DeckError::NoPockets);
        }
        let mut firsts = Vec::with_capacity(n as usize);
        for _ in 0..n {
            firsts.push(self.draw()?);
        }
        let mut pockets = Vec::with_capacity(n as usize);
        for c1 in firsts {
            pockets.push([c1, self.draw()?]);
        }
        Ok(pockets)
    }
}
