use crate::cards::hand::HandScore;
use crate::{Currency, PlayerId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogItem {
    Bet(PlayerId, Currency, Currency),
    TierAward(Currency, Vec<PlayerId>),
    TierRefund(Currency, Vec<PlayerId>),
    Payout(PlayerId, Currency),
}

impl std::fmt::Display for LogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogItem::Bet(p, add, total) => {
                write!(f, "p{} puts {} in the pot ({} this hand)", p, add, total)
            }
            LogItem::TierAward(amount, winners) => write!(
                f,
                "Pot of {} goes to [{}]",
                amount,
                winners.iter().map(|p| format!("p{}", p)).join(", ")
            ),
            LogItem::TierRefund(amount, contributors) => write!(
                f,
                "Unclaimed pot of {} returned to [{}]",
                amount,
                contributors.iter().map(|p| format!("p{}", p)).join(", ")
            ),
            LogItem::Payout(p, amount) => write!(f, "p{} collects {}", p, amount),
        }
    }
}

/// The money. Tracks each seat's cumulative contribution for the hand; side
/// pots only come into existence at settlement, as eligibility bands over the
/// contribution levels. The parent validates bets and turn order; the pot
/// itself cannot fail.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pot {
    contributions: HashMap<PlayerId, Currency>,
}

impl Pot {
    /// Record `additional` chips from `player`. The caller has already taken
    /// them from the stack.
    pub fn bet(&mut self, player: PlayerId, additional: Currency) -> LogItem {
        let total = self.contributions.entry(player).or_insert(0);
        *total += additional;
        LogItem::Bet(player, additional, *total)
    }

    pub fn total_value(&self) -> Currency {
        self.contributions.values().sum()
    }

    pub fn contribution(&self, player: PlayerId) -> Currency {
        self.contributions.get(&player).copied().unwrap_or_default()
    }

    /// Settle the hand. `scores` holds every seat still eligible at showdown
    /// (not folded); `payout_order` is the seat order used to hand out
    /// non-divisible remainder chips, conventionally clockwise starting left of
    /// the button.
    ///
    /// Distinct contribution levels are walked bottom-up. Each level forms a
    /// tier funded by everyone who contributed at least that much, but only
    /// non-folded seats can win it; a short all-in is thus eligible for exactly
    /// the tiers it funded. A tier nobody eligible funded (folds above an
    /// uncalled bet) is returned to its contributors.
    ///
    /// # Panics
    ///
    /// Panics if the payouts do not sum to the pot. That indicates a settlement
    /// bug and must not be papered over with somebody's chips.
    pub fn payout(
        self,
        scores: &HashMap<PlayerId, HandScore>,
        payout_order: &[PlayerId],
    ) -> (HashMap<PlayerId, Currency>, Vec<LogItem>) {
        let mut winnings: HashMap<PlayerId, Currency> = HashMap::new();
        let mut logs = vec![];
        let order_of = |p: PlayerId| {
            payout_order
                .iter()
                .position(|o| *o == p)
                .unwrap_or(usize::MAX)
        };
        let levels: Vec<Currency> = self
            .contributions
            .values()
            .copied()
            .filter(|c| *c > 0)
            .sorted()
            .dedup()
            .collect();
        let mut prev = 0;
        for level in levels {
            let width = level - prev;
            prev = level;
            let contributors: Vec<PlayerId> = self
                .contributions
                .iter()
                .filter(|(_, c)| **c >= level)
                .map(|(p, _)| *p)
                .sorted_by_key(|p| order_of(*p))
                .collect();
            let amount = width * contributors.len() as Currency;
            let eligible: Vec<PlayerId> = contributors
                .iter()
                .copied()
                .filter(|p| scores.contains_key(p))
                .collect();
            if eligible.is_empty() {
                // Everyone who funded this tier folded. Each put in exactly
                // `width`, so each takes it back.
                for p in contributors.iter() {
                    *winnings.entry(*p).or_insert(0) += width;
                }
                logs.push(LogItem::TierRefund(amount, contributors));
                continue;
            }
            let best = eligible.iter().map(|p| scores[p]).max().expect("non-empty");
            let winners: Vec<PlayerId> = eligible
                .into_iter()
                .filter(|p| scores[p] == best)
                .collect();
            let share = amount / winners.len() as Currency;
            let remainder = amount % winners.len() as Currency;
            for (i, p) in winners.iter().enumerate() {
                let extra = if (i as Currency) < remainder { 1 } else { 0 };
                *winnings.entry(*p).or_insert(0) += share + extra;
            }
            logs.push(LogItem::TierAward(amount, winners));
        }
        assert_eq!(
            winnings.values().sum::<Currency>(),
            self.total_value(),
            "settlement must pay out exactly the pot"
        );
        for (p, amount) in winnings.iter().sorted_by_key(|(p, _)| order_of(**p)) {
            logs.push(LogItem::Payout(*p, *amount));
        }
        (winnings, logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::cards_from_str;
    use crate::cards::hand::evaluate;

    fn score(s: &'static str) -> HandScore {
        evaluate(&cards_from_str(s)).unwrap()
    }

    // Quads beat the boat beats the flush; handy fixed strengths for payouts.
    fn strong() -> HandScore {
        score("AcAdAhAsKc")
    }
    fn middle() -> HandScore {
        score("KcKdKhQsQc")
    }
    fn weak() -> HandScore {
        score("AcKcQcJc9c")
    }

    #[test]
    fn single_winner_takes_all() {
        let mut p = Pot::default();
        p.bet(1, 5);
        p.bet(2, 5);
        p.bet(3, 5);
        let scores = HashMap::from([(1, strong()), (2, middle()), (3, weak())]);
        let (winnings, _) = p.payout(&scores, &[1, 2, 3]);
        assert_eq!(winnings[&1], 15);
        assert_eq!(winnings.len(), 1);
    }

    #[test]
    fn folded_seats_fund_but_cannot_win() {
        let mut p = Pot::default();
        p.bet(1, 10);
        p.bet(2, 10);
        p.bet(3, 10);
        // Seat 1 folded somewhere along the way: no score for them.
        let scores = HashMap::from([(2, weak()), (3, middle())]);
        let (winnings, _) = p.payout(&scores, &[1, 2, 3]);
        assert_eq!(winnings[&3], 30);
        assert!(!winnings.contains_key(&1));
    }

    #[test]
    fn short_all_in_wins_only_its_tier() {
        // The side-pot shape: 100 vs 300 vs 300, short stack has the best hand.
        let mut p = Pot::default();
        p.bet(1, 100);
        p.bet(2, 300);
        p.bet(3, 300);
        let scores = HashMap::from([(1, strong()), (2, middle()), (3, weak())]);
        let (winnings, _) = p.payout(&scores, &[1, 2, 3]);
        assert_eq!(winnings[&1], 300); // 100 x 3, nothing from the side tier
        assert_eq!(winnings[&2], 400); // 200 x 2
        assert!(!winnings.contains_key(&3));
    }

    #[test]
    fn even_chop() {
        let mut p = Pot::default();
        p.bet(1, 10);
        p.bet(2, 10);
        let scores = HashMap::from([(1, weak()), (2, weak())]);
        let (winnings, _) = p.payout(&scores, &[1, 2]);
        assert_eq!(winnings[&1], 10);
        assert_eq!(winnings[&2], 10);
    }

    #[test]
    fn remainder_follows_payout_order() {
        // Three-way tie over a pot that doesn't divide by three: seats 1, 2, 3
        // put in 6 each, a folded seat 4 adds 2. Tiers: level 2 is 8 wide
        // (8 % 3 = 2 odd chips), level 6 is 12 wide (splits clean).
        let mut p = Pot::default();
        for seat in [1, 2, 3] {
            p.bet(seat, 6);
        }
        p.bet(4, 2);
        let tied = HashMap::from([(1, weak()), (2, weak()), (3, weak())]);
        let (winnings, _) = p.clone().payout(&tied, &[3, 1, 2]);
        assert_eq!(winnings[&3], 7); // first in order takes an odd chip
        assert_eq!(winnings[&1], 7); // so does the second
        assert_eq!(winnings[&2], 6);
        // A different convention moves the same chips to different pockets.
        let (winnings, _) = p.payout(&tied, &[1, 2, 3]);
        assert_eq!(winnings[&1], 7);
        assert_eq!(winnings[&2], 7);
        assert_eq!(winnings[&3], 6);
    }

    #[test]
    fn uncalled_overbet_returned() {
        // Seat 2 raised to 300, seat 1 could only call 100 all-in. The 200
        // nobody matched comes back to seat 2 even if seat 2 loses.
        let mut p = Pot::default();
        p.bet(1, 100);
        p.bet(2, 300);
        let scores = HashMap::from([(1, strong()), (2, weak())]);
        let (winnings, _) = p.payout(&scores, &[1, 2]);
        assert_eq!(winnings[&1], 200);
        assert_eq!(winnings[&2], 200);
    }

    #[test]
    fn multi_street_accumulation() {
        let mut p = Pot::default();
        // preflop: 5 each
        p.bet(1, 5);
        p.bet(2, 5);
        p.bet(3, 5);
        // flop: 1 and 2 keep betting, 3 is done
        p.bet(1, 10);
        p.bet(2, 10);
        assert_eq!(p.total_value(), 35);
        assert_eq!(p.contribution(1), 15);
        let scores = HashMap::from([(1, middle()), (2, weak()), (3, weak())]);
        let (winnings, _) = p.payout(&scores, &[1, 2, 3]);
        assert_eq!(winnings[&1], 35);
    }

    #[test]
    fn tier_without_eligible_seats_is_refunded() {
        // Nobody still in the hand covers the top level; those chips go back
        // to whoever put them in rather than vanishing.
        let mut p = Pot::default();
        p.bet(1, 100);
        p.bet(2, 100);
        p.bet(3, 150);
        let scores = HashMap::from([(1, strong()), (2, weak())]);
        let (winnings, logs) = p.payout(&scores, &[1, 2, 3]);
        assert_eq!(winnings[&1], 300);
        assert_eq!(winnings[&3], 50);
        assert!(logs.contains(&LogItem::TierRefund(50, vec![3])));
    }

    #[test]
    fn payout_logs_tiers() {
        let mut p = Pot::default();
        p.bet(1, 100);
        p.bet(2, 300);
        p.bet(3, 300);
        let scores = HashMap::from([(1, strong()), (2, middle()), (3, weak())]);
        let (_, logs) = p.payout(&scores, &[1, 2, 3]);
        assert!(logs.contains(&LogItem::TierAward(300, vec![1])));
        assert!(logs.contains(&LogItem::TierAward(400, vec![2])));
        assert!(logs.contains(&LogItem::Payout(1, 300)));
        assert!(logs.contains(&LogItem::Payout(2, 400)));
    }
}
