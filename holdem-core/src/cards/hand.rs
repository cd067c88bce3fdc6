use super::card::{Card, Rank};
use enum_map::EnumMap;
use itertools::Itertools;
use std::error::Error;
use std::fmt;

/// Hand categories, weakest first so the derived ordering ranks them correctly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum HandClass {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for HandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighCard => write!(f, "High Card"),
            Self::Pair => write!(f, "Pair"),
            Self::TwoPair => write!(f, "Two Pair"),
            Self::ThreeOfAKind => write!(f, "Three of a Kind"),
            Self::Straight => write!(f, "Straight"),
            Self::Flush => write!(f, "Flush"),
            Self::FullHouse => write!(f, "Full House"),
            Self::FourOfAKind => write!(f, "Four of a Kind"),
            Self::StraightFlush => write!(f, "Straight Flush"),
            Self::RoyalFlush => write!(f, "Royal Flush"),
        }
    }
}

/// A fully-ordered hand strength: class first, then tie-break ranks.
///
/// The ranks array is laid out grouped-rank-first (groups in descending size,
/// then rank, then kickers descending), zero-padded. Straights store only the
/// high card, with the wheel reporting 5. Two scores compare equal exactly when
/// the hands chop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct HandScore {
    pub class: HandClass,
    ranks: [u8; 5],
}

impl HandScore {
    fn new(class: HandClass, ranks: [u8; 5]) -> Self {
        Self { class, ranks }
    }
}

impl fmt::Display for HandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)
    }
}

#[derive(PartialEq, Debug)]
pub enum HandError {
    WrongCardCount(usize),
}

impl Error for HandError {}

impl fmt::Display for HandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongCardCount(n) => write!(f, "Need 5 to 7 cards to evaluate, got {}", n),
        }
    }
}

/// Best score over all 5-card hands drawable from 5 to 7 cards.
///
/// Enumerates the 5-card subsets (1, 21, or 35 of them) and keeps the maximum
/// under [`HandScore`]'s total order. Pure: the same card set always produces
/// the same score regardless of input order.
pub fn evaluate(cards: &[Card]) -> Result<HandScore, HandError> {
    match cards.len() {
        5 => {
            let five: [Card; 5] = cards.try_into().expect("len checked");
            Ok(score_five(&five))
        }
        6 | 7 => Ok(cards
            .iter()
            .copied()
            .combinations(5)
            .map(|c| {
                let five: [Card; 5] = c.try_into().expect("combinations of 5");
                score_five(&five)
            })
            .max()
            .expect("at least one combination")),
        n => Err(HandError::WrongCardCount(n)),
    }
}

/// Score exactly five cards.
pub fn score_five(cards: &[Card; 5]) -> HandScore {
    let mut counts: EnumMap<Rank, usize> = EnumMap::default();
    for c in cards.iter() {
        counts[c.rank()] += 1;
    }
    // (count, rank value) groups, biggest group first, then highest rank.
    let groups: Vec<(usize, u8)> = counts
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(r, n)| (n, r.value()))
        .sorted()
        .rev()
        .collect();

    let is_flush = cards.iter().map(|c| c.suit()).all_equal();
    let straight_high = straight_high(cards);

    use HandClass::*;
    if is_flush {
        if let Some(high) = straight_high {
            return if high == Rank::RA.value() {
                HandScore::new(RoyalFlush, [high, 0, 0, 0, 0])
            } else {
                HandScore::new(StraightFlush, [high, 0, 0, 0, 0])
            };
        }
    }
    if groups[0].0 == 4 {
        return HandScore::new(FourOfAKind, [groups[0].1, groups[1].1, 0, 0, 0]);
    }
    if groups[0].0 == 3 && groups[1].0 == 2 {
        return HandScore::new(FullHouse, [groups[0].1, groups[1].1, 0, 0, 0]);
    }
    if is_flush {
        return HandScore::new(Flush, ranks_desc(cards));
    }
    if let Some(high) = straight_high {
        return HandScore::new(Straight, [high, 0, 0, 0, 0]);
    }
    if groups[0].0 == 3 {
        return HandScore::new(ThreeOfAKind, [groups[0].1, groups[1].1, groups[2].1, 0, 0]);
    }
    if groups[0].0 == 2 && groups[1].0 == 2 {
        return HandScore::new(TwoPair, [groups[0].1, groups[1].1, groups[2].1, 0, 0]);
    }
    if groups[0].0 == 2 {
        return HandScore::new(
            Pair,
            [groups[0].1, groups[1].1, groups[2].1, groups[3].1, 0],
        );
    }
    HandScore::new(HighCard, ranks_desc(cards))
}

fn ranks_desc(cards: &[Card; 5]) -> [u8; 5] {
    let mut r: [u8; 5] = [0; 5];
    for (i, c) in cards.iter().map(|c| c.rank().value()).sorted().rev().enumerate() {
        r[i] = c;
    }
    r
}

/// High card of a straight if the five cards form one. The wheel (A-2-3-4-5)
/// counts, ranked by its 5.
fn straight_high(cards: &[Card; 5]) -> Option<u8> {
    let distinct: Vec<u8> = cards
        .iter()
        .map(|c| c.rank().value())
        .sorted()
        .rev()
        .dedup()
        .collect();
    if distinct.len() != 5 {
        return None;
    }
    if distinct[0] - distinct[4] == 4 {
        return Some(distinct[0]);
    }
    if distinct == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}
