use enum_map::Enum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SPADE: char = 's';
pub const HEART: char = 'h';
pub const DIAMOND: char = 'd';
pub const CLUB: char = 'c';

pub const ALL_RANKS: [Rank; 13] = [
    Rank::R2,
    Rank::R3,
    Rank::R4,
    Rank::R5,
    Rank::R6,
    Rank::R7,
    Rank::R8,
    Rank::R9,
    Rank::RT,
    Rank::RJ,
    Rank::RQ,
    Rank::RK,
    Rank::RA,
];
pub const ALL_SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

#[derive(Hash, Enum, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Club => write!(f, "{}", CLUB),
            Self::Diamond => write!(f, "{}", DIAMOND),
            Self::Heart => write!(f, "{}", HEART),
            Self::Spade => write!(f, "{}", SPADE),
        }
    }
}

#[cfg(test)]
impl From<char> for Suit {
    fn from(c: char) -> Self {
        match c {
            CLUB => Self::Club,
            DIAMOND => Self::Diamond,
            HEART => Self::Heart,
            SPADE => Self::Spade,
            _ => unreachable!(),
        }
    }
}

#[derive(Hash, Enum, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Rank {
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    RT,
    RJ,
    RQ,
    RK,
    RA,
}

impl Rank {
    /// Numeric value used for straights and kicker comparisons. Ace is high (14);
    /// the evaluator handles the wheel itself.
    pub fn value(self) -> u8 {
        match self {
            Self::R2 => 2,
            Self::R3 => 3,
            Self::R4 => 4,
            Self::R5 => 5,
            Self::R6 => 6,
            Self::R7 => 7,
            Self::R8 => 8,
            Self::R9 => 9,
            Self::RT => 10,
            Self::RJ => 11,
            Self::RQ => 12,
            Self::RK => 13,
            Self::RA => 14,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R2 => write!(f, "2"),
            Self::R3 => write!(f, "3"),
            Self::R4 => write!(f, "4"),
            Self::R5 => write!(f, "5"),
            Self::R6 => write!(f, "6"),
            Self::R7 => write!(f, "7"),
            Self::R8 => write!(f, "8"),
            Self::R9 => write!(f, "9"),
            Self::RT => write!(f, "T"),
            Self::RJ => write!(f, "J"),
            Self::RQ => write!(f, "Q"),
            Self::RK => write!(f, "K"),
            Self::RA => write!(f, "A"),
        }
    }
}

#[cfg(test)]
impl From<char> for Rank {
    fn from(c: char) -> Self {
        match c {
            '2' => Rank::R2,
            '3' => Rank::R3,
            '4' => Rank::R4,
            '5' => Rank::R5,
            '6' => Rank::R6,
            '7' => Rank::R7,
            '8' => Rank::R8,
            '9' => Rank::R9,
            'T' => Rank::RT,
            'J' => Rank::RJ,
            'Q' => Rank::RQ,
            'K' => Rank::RK,
            'A' => Rank::RA,
            _ => unreachable!(),
        }
    }
}

#[derive(Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
impl From<[char; 2]> for Card {
    fn from(cs: [char; 2]) -> Self {
        Self {
            rank: cs[0].into(),
            suit: cs[1].into(),
        }
    }
}

/// Parse "AhKs..." strings into cards. Test helper, not a public parser.
#[cfg(test)]
pub fn cards_from_str(s: &'static str) -> Vec<Card> {
    let mut v = vec![];
    let mut s_chars = s.chars();
    while let Some(r) = s_chars.next() {
        let s = s_chars.next().expect("Need even number of chars");
        v.push([r, s].into())
    }
    v
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn rank(self) -> Rank {
        self.rank
    }

    pub fn suit(self) -> Suit {
        self.suit
    }
}
