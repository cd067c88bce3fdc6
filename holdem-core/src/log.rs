use crate::bet::BetAction;
use crate::cards::card::Card;
use crate::pot;
use crate::state::State;
use crate::{Currency, PlayerId, SeatIdx, SeqNum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogItem {
    Pot(pot::LogItem),
    HandStarted(u64),
    TokensSet(SeatIdx, SeatIdx, SeatIdx), // btn/sb/bb seat indexes
    NextToAct(SeatIdx),
    StateChange(State, State),
    CurrentBetSet(Currency, Currency, Currency, Currency),
    SmallBlindPosted(PlayerId, Currency),
    BigBlindPosted(PlayerId, Currency),
    PlayerActed(PlayerId, BetAction),
    Flop(Card, Card, Card),
    Turn(Card),
    River(Card),
    HandReveal(PlayerId, [Card; 2]),
}

impl From<pot::LogItem> for LogItem {
    fn from(i: pot::LogItem) -> Self {
        Self::Pot(i)
    }
}

impl std::fmt::Display for LogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogItem::Pot(pli) => write!(f, "{pli}"),
            LogItem::HandStarted(n) => write!(f, "Hand #{n} started"),
            LogItem::TokensSet(btn, sb, bb) => write!(f, "BTN/SB/BB set to seats {btn}/{sb}/{bb}"),
            LogItem::NextToAct(idx) => write!(f, "Next to act is seat {idx}"),
            LogItem::StateChange(old, new) => write!(f, "State changed from {old} to {new}"),
            LogItem::CurrentBetSet(old_cb, new_cb, old_mr, new_mr) => {
                write!(f, "Current bet changed from {old_cb} to {new_cb}; min raise changed from {old_mr} to {new_mr}")
            }
            LogItem::SmallBlindPosted(p, amount) => write!(f, "p{p} posted small blind {amount}"),
            LogItem::BigBlindPosted(p, amount) => write!(f, "p{p} posted big blind {amount}"),
            LogItem::PlayerActed(p, ba) => write!(f, "p{p}: {ba}"),
            LogItem::Flop(c1, c2, c3) => write!(f, "Flop: {c1} {c2} {c3}"),
            LogItem::Turn(c) => write!(f, "Turn: {c}"),
            LogItem::River(c) => write!(f, "River: {c}"),
            LogItem::HandReveal(p, cards) => {
                write!(f, "p{p} shows {}{}", cards[0], cards[1])
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Log {
    active: Vec<(SeqNum, LogItem)>,
    archive: Vec<(SeqNum, LogItem)>,
    last_seq_num: SeqNum,
}

impl Log {
    pub(crate) fn push(&mut self, item: LogItem) {
        let seq = self.last_seq_num + 1;
        self.active.push((seq, item));
        self.last_seq_num = seq;
    }

    pub(crate) fn extend<I: IntoIterator<Item = LogItem>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }

    /// Move the current hand's items into the archive; called at hand
    /// boundaries.
    pub(crate) fn rotate(&mut self) {
        self.archive.append(&mut self.active);
    }

    pub(crate) fn items_since(
        &self,
        oldest_seq: SeqNum,
    ) -> impl Iterator<Item = (SeqNum, LogItem)> + '_ {
        let iter1 = self
            .archive
            .iter()
            .skip_while(move |(seq, _)| *seq <= oldest_seq)
            .cloned();
        let iter2 = self
            .active
            .iter()
            .skip_while(move |(seq, _)| *seq <= oldest_seq)
            .cloned();
        iter1.chain(iter2)
    }

    /// The last `n` items rendered as text, oldest first. This is the bounded
    /// history the table view carries.
    pub(crate) fn recent_lines(&self, n: usize) -> Vec<String> {
        let total = self.archive.len() + self.active.len();
        self.archive
            .iter()
            .chain(self.active.iter())
            .skip(total.saturating_sub(n))
            .map(|(_, item)| item.to_string())
            .collect()
    }
}
