use crate::bet::{BetAction, BetError, BetStatus};
use crate::cards::card::Card;
use crate::GameError;
use crate::{Currency, PlayerId, SeatIdx, MAX_PLAYERS};
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const POCKET_SIZE: usize = 2;

/// The seats around the table, the dealer/blind tokens, and the list of seats
/// the current street still needs a bet from.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Players {
    pub(crate) seats: [Option<Player>; MAX_PLAYERS],
    /// Seat index holding the dealer button
    pub token_dealer: SeatIdx,
    /// Seat index owing the small blind
    pub token_sb: SeatIdx,
    /// Seat index owing the big blind
    pub token_bb: SeatIdx,
    /// Seats (as indexes) we need bets from next, in reverse order: the next
    /// expected actor is the last element. Rebuilt whenever a bet reopens the
    /// action.
    pub(crate) need_bets_from: Vec<SeatIdx>,
}

impl Default for Players {
    fn default() -> Self {
        Self {
            seats: [None; MAX_PLAYERS],
            token_dealer: 0,
            token_sb: 0,
            token_bb: 0,
            need_bets_from: Vec::with_capacity(MAX_PLAYERS),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub stack: Currency,
    pub pocket: Option<[Card; POCKET_SIZE]>,
    pub bet_status: BetStatus,
    /// Cumulative chips this seat has put into the pot this hand. Monotonic
    /// within a hand; `stack + hand_total` never changes between blinds being
    /// posted and the payout.
    pub hand_total: Currency,
    /// Whether this seat is dealt in. Forced on when the stack hits zero.
    pub sitting_out: bool,
}

impl Players {
    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players_iter().find(|x| x.id == id)
    }

    pub(crate) fn player_with_index_by_id(&self, id: PlayerId) -> Option<(SeatIdx, &Player)> {
        self.players_iter_with_index().find(|(_, x)| x.id == id)
    }

    pub(crate) fn player_by_id_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players_iter_mut().find(|x| x.id == id)
    }

    pub(crate) fn seat_player(&mut self, player: Player) -> Result<SeatIdx, GameError> {
        if let Some(seat_idx) = self.next_empty_seat() {
            self.seats[seat_idx] = Some(player);
            Ok(seat_idx)
        } else {
            Err(GameError::TableFull)
        }
    }

    pub(crate) fn unseat_player(&mut self, id: PlayerId) -> Option<Currency> {
        let (idx, p) = self.player_with_index_by_id(id)?;
        let stack = p.stack;
        self.seats[idx] = None;
        Some(stack)
    }

    fn next_empty_seat(&self) -> Option<SeatIdx> {
        self.seats
            .iter()
            .enumerate()
            .find(|(_, p)| p.is_none())
            .map(|(i, _)| i)
    }

    pub fn players_iter(&self) -> impl Iterator<Item = &Player> {
        self.seats.iter().filter_map(|x| x.as_ref())
    }

    fn players_iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.seats.iter_mut().filter_map(|x| x.as_mut())
    }

    pub fn players_iter_with_index(&self) -> impl Iterator<Item = (SeatIdx, &Player)> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(i, x)| x.as_ref().map(|p| (i, p)))
    }

    fn players_iter_mut_with_index(&mut self) -> impl Iterator<Item = (SeatIdx, &mut Player)> {
        self.seats
            .iter_mut()
            .enumerate()
            .filter_map(|(i, x)| x.as_mut().map(|p| (i, p)))
    }

    /// Seats that can still make betting decisions this street: not folded, not
    /// all-in, dealt in.
    pub(crate) fn betting_players_iter(&self) -> impl Iterator<Item = (SeatIdx, &Player)> {
        self.players_iter_with_index()
            .filter(|(_, x)| x.is_betting())
    }

    pub(crate) fn betting_players_count(&self) -> usize {
        self.betting_players_iter().count()
    }

    fn betting_players_iter_mut(&mut self) -> impl Iterator<Item = (SeatIdx, &mut Player)> {
        self.players_iter_mut_with_index()
            .filter(|(_, x)| x.is_betting())
    }

    /// Betting seats strictly after seat `i`, wrapping around the table. The
    /// iterator covers the table up to twice; take only what you need.
    pub(crate) fn betting_players_iter_after(
        &self,
        i: SeatIdx,
    ) -> impl Iterator<Item = (SeatIdx, &Player)> {
        // Returning early when nobody is betting means two iterator types, so
        // collect into a Vec and iterate that instead.
        let last_betting_seat = match self.betting_players_iter().last() {
            None => return Vec::new().into_iter(),
            Some((i, _)) => i,
        };
        let si = if i >= last_betting_seat { 0 } else { i + 1 };
        self.betting_players_iter()
            .chain(self.betting_players_iter())
            .skip_while(move |(i, _)| *i < si)
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Seats still eligible to win some or all of the pot, i.e. not folded.
    pub(crate) fn eligible_players_iter(&self) -> impl Iterator<Item = &Player> {
        self.players_iter()
            .filter(|x| !x.is_folded() && !x.sitting_out)
    }

    /// Seats that are dealt into the hand: everything but folds and sit-outs.
    /// Unlike the betting iterator this keeps all-in seats, who still get
    /// cards (a blind can be all-in before the deal).
    fn dealt_players_iter_mut(&mut self) -> impl Iterator<Item = (SeatIdx, &mut Player)> {
        self.players_iter_mut_with_index()
            .filter(|(_, x)| !x.is_folded() && !x.sitting_out)
    }

    pub(crate) fn dealt_players_count(&self) -> usize {
        self.players_iter()
            .filter(|x| !x.is_folded() && !x.sitting_out)
            .count()
    }

    fn seated_players_iter(&self) -> impl Iterator<Item = &Player> {
        self.players_iter().filter(|x| !x.sitting_out)
    }

    fn auto_sitout(&mut self) {
        for p in self.players_iter_mut() {
            if p.stack < 1 {
                p.sitting_out = true;
            }
        }
    }

    pub(crate) fn start_hand(&mut self) -> Result<(), GameError> {
        self.auto_sitout();
        if self.seated_players_iter().count() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        for p in self.players_iter_mut() {
            p.pocket = None;
            p.hand_total = 0;
            p.bet_status = if p.sitting_out {
                BetStatus::Folded
            } else {
                BetStatus::Waiting
            };
        }
        self.rotate_tokens()?;
        // Prepare need_bets_from for the blind bets; the real preflop order is
        // rebuilt once the blinds are in.
        self.need_bets_from = self
            .betting_players_iter_after(self.token_dealer)
            .map(|(i, _)| i)
            .take(self.betting_players_count())
            .collect();
        self.need_bets_from.reverse();
        Ok(())
    }

    pub(crate) fn end_hand(
        &mut self,
        winnings: &HashMap<PlayerId, Currency>,
    ) -> Result<(), GameError> {
        for (player_id, amount) in winnings.iter() {
            match self.player_by_id_mut(*player_id) {
                Some(player) => player.stack += *amount,
                None => return Err(GameError::PlayerNotFound),
            }
        }
        Ok(())
    }

    /// Reinit per-street state for the next street. Errors if the current
    /// street still expects bets. When fewer than two seats can act there is
    /// nobody left to bet against, so the street plays out with no action.
    pub(crate) fn next_street(&mut self) -> Result<(), GameError> {
        if !self.need_bets_from.is_empty() {
            return Err(GameError::BetError(BetError::NoBetExpected));
        }
        for (_, p) in self.betting_players_iter_mut() {
            p.bet_status = BetStatus::Waiting;
        }
        if self.betting_players_count() < 2 {
            self.need_bets_from.clear();
            return Ok(());
        }
        self.need_bets_from = self
            .betting_players_iter_after(self.token_dealer)
            .map(|(i, _)| i)
            .take(self.betting_players_count())
            .collect();
        self.need_bets_from.reverse();
        Ok(())
    }

    pub(crate) fn rotate_tokens(&mut self) -> Result<(), GameError> {
        if self.betting_players_count() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        let mut s: [SeatIdx; 3] = [0, 0, 0];
        // The iterator borrows self, so pull the three seats out in a block.
        // Unwraps can't panic: at least 2 betting seats, and the iter_after
        // covers the table twice.
        {
            let mut iter = self
                .betting_players_iter_after(self.token_dealer)
                .map(|(i, _)| i);
            s[0] = iter.next().unwrap();
            s[1] = iter.next().unwrap();
            s[2] = iter.next().unwrap();
        }
        self.token_dealer = s[0];
        if self.betting_players_count() == 2 {
            // Heads up: the button posts the small blind and acts first preflop.
            self.token_sb = s[0];
            self.token_bb = s[1];
        } else {
            self.token_sb = s[1];
            self.token_bb = s[2];
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if given a different number of pockets than there are seats being
    /// dealt to.
    pub(crate) fn deal_pockets(&mut self, mut pockets: Vec<[Card; 2]>) {
        assert_eq!(pockets.len(), self.dealt_players_count());
        let dealer = self.token_dealer;
        // Deal clockwise starting left of the button. A mutable after-iterator
        // can't chain, so sweep the table in two passes.
        for (_, player) in self
            .dealt_players_iter_mut()
            .skip_while(|(i, _)| *i <= dealer)
        {
            player.pocket = Some(pockets.pop().unwrap());
        }
        for (_, player) in self
            .dealt_players_iter_mut()
            .take_while(|(i, _)| *i <= dealer)
        {
            player.pocket = Some(pockets.pop().unwrap());
        }
    }
}

impl Player {
    pub(crate) fn new(id: PlayerId, stack: Currency) -> Self {
        Self {
            id,
            stack,
            pocket: None,
            bet_status: BetStatus::Waiting,
            hand_total: 0,
            sitting_out: stack < 1,
        }
    }

    /// True if this seat can still make betting decisions. All-in seats are in
    /// the hand but no longer betting.
    pub(crate) const fn is_betting(&self) -> bool {
        matches!(self.bet_status, BetStatus::In(_) | BetStatus::Waiting)
    }

    pub(crate) const fn is_folded(&self) -> bool {
        matches!(self.bet_status, BetStatus::Folded)
    }

    /// The seat's total bet this street.
    pub(crate) fn street_total(&self) -> Currency {
        self.bet_status.street_total()
    }

    /// Validate the bet against this seat's stack, coerce call/raise into
    /// all-in when the stack comes up short, and move the chips. Returns the
    /// accepted action (which is what the pot must be fed from).
    pub(crate) fn bet(&mut self, bet: BetAction) -> Result<BetAction, BetError> {
        let existing_in = match self.bet_status {
            BetStatus::In(x) => x,
            BetStatus::Waiting => 0,
            BetStatus::Folded | BetStatus::AllIn(_) => return Err(BetError::PlayerIsNotBetting),
        };
        let accepted = match bet {
            BetAction::Fold => bet,
            BetAction::Check => {
                // Checking behind an existing street bet (the big blind's
                // option) keeps that bet in place.
                self.bet_status = BetStatus::In(existing_in);
                return Ok(BetAction::Check);
            }
            BetAction::Call(x) | BetAction::Raise(x) => {
                if x < existing_in {
                    // Bet values are street totals; betting down is nonsense.
                    return Err(BetError::BetTooLow);
                }
                let additional = x - existing_in;
                match self.stack.cmp(&additional) {
                    Ordering::Less | Ordering::Equal => {
                        // Short (or exact) stack: the whole stack goes in.
                        let all = BetAction::AllIn(self.stack + existing_in);
                        self.hand_total += self.stack;
                        self.stack = 0;
                        all
                    }
                    Ordering::Greater => {
                        self.stack -= additional;
                        self.hand_total += additional;
                        bet
                    }
                }
            }
            BetAction::AllIn(x) => {
                if x < existing_in {
                    return Err(BetError::BetTooLow);
                }
                let additional = x - existing_in;
                if additional != self.stack {
                    return Err(BetError::AllInWithoutBeingAllIn);
                }
                self.hand_total += additional;
                self.stack = 0;
                bet
            }
        };
        self.bet_status = BetStatus::from(accepted);
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seated(seat_ids: &[(SeatIdx, PlayerId, Currency)]) -> Players {
        let mut players = Players::default();
        for (seat, id, stack) in seat_ids.iter() {
            players.seats[*seat] = Some(Player::new(*id, *stack));
        }
        players
    }

    #[test]
    fn token_rotation_full_ring() {
        let mut players = seated(&[(0, 1, 10), (3, 2, 10), (5, 3, 10), (7, 4, 10), (8, 5, 10)]);
        players.rotate_tokens().unwrap();
        assert_eq!(players.token_dealer, 3);
        assert_eq!(players.token_sb, 5);
        assert_eq!(players.token_bb, 7);
        players.rotate_tokens().unwrap();
        assert_eq!(players.token_dealer, 5);
        assert_eq!(players.token_sb, 7);
        assert_eq!(players.token_bb, 8);
        players.rotate_tokens().unwrap();
        assert_eq!(players.token_dealer, 7);
        assert_eq!(players.token_sb, 8);
        assert_eq!(players.token_bb, 0);
        players.rotate_tokens().unwrap();
        assert_eq!(players.token_dealer, 8);
        assert_eq!(players.token_sb, 0);
        assert_eq!(players.token_bb, 3);
    }

    #[test]
    fn token_rotation_heads_up() {
        let mut players = seated(&[(0, 1, 10), (8, 2, 10)]);
        players.rotate_tokens().unwrap();
        assert_eq!(players.token_dealer, 8);
        assert_eq!(players.token_sb, 8);
        assert_eq!(players.token_bb, 0);
        players.rotate_tokens().unwrap();
        assert_eq!(players.token_dealer, 0);
        assert_eq!(players.token_sb, 0);
        assert_eq!(players.token_bb, 8);
    }

    #[test]
    fn empty_stacks_skipped() {
        let mut players = seated(&[(0, 1, 10), (1, 2, 0), (2, 3, 10)]);
        players.start_hand().unwrap();
        assert!(players.player_by_id(2).unwrap().sitting_out);
        assert_eq!(players.betting_players_count(), 2);
    }

    #[test]
    fn betting_players_iter_after_wraps() {
        let players = seated(&[(0, 0, 100), (1, 1, 100), (2, 2, 100), (3, 3, 100)]);
        for given in 0..=3 {
            let v: Vec<_> = players
                .betting_players_iter_after(given)
                .map(|(_, p)| p.id)
                .take(4)
                .collect();
            match given {
                0 => assert_eq!(v, vec![1, 2, 3, 0]),
                1 => assert_eq!(v, vec![2, 3, 0, 1]),
                2 => assert_eq!(v, vec![3, 0, 1, 2]),
                3 => assert_eq!(v, vec![0, 1, 2, 3]),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn bet_totals_are_street_totals() {
        let mut p = Player::new(1, 100);
        assert_eq!(p.bet(BetAction::Call(10)).unwrap(), BetAction::Call(10));
        assert_eq!(p.stack, 90);
        assert_eq!(p.hand_total, 10);
        // Raising to 30 moves 20 more, not 30.
        assert_eq!(p.bet(BetAction::Raise(30)).unwrap(), BetAction::Raise(30));
        assert_eq!(p.stack, 70);
        assert_eq!(p.hand_total, 30);
        assert_eq!(p.bet(BetAction::Raise(20)).unwrap_err(), BetError::BetTooLow);
    }

    #[test]
    fn short_call_becomes_all_in() {
        let mut p = Player::new(1, 5);
        assert_eq!(p.bet(BetAction::Call(10)).unwrap(), BetAction::AllIn(5));
        assert_eq!(p.stack, 0);
        assert_eq!(p.hand_total, 5);
        assert_eq!(p.bet_status, BetStatus::AllIn(5));
    }

    #[test]
    fn check_keeps_blind_in_place() {
        let mut p = Player::new(1, 100);
        p.bet(BetAction::Call(20)).unwrap();
        p.bet(BetAction::Check).unwrap();
        assert_eq!(p.bet_status, BetStatus::In(20));
        assert_eq!(p.hand_total, 20);
    }

    #[test]
    fn all_in_must_match_stack() {
        let mut p = Player::new(1, 100);
        assert_eq!(
            p.bet(BetAction::AllIn(50)).unwrap_err(),
            BetError::AllInWithoutBeingAllIn
        );
        assert_eq!(p.bet(BetAction::AllIn(100)).unwrap(), BetAction::AllIn(100));
        assert_eq!(p.stack, 0);
    }

    #[test]
    fn deal_pockets_starts_left_of_button() {
        let mut players = seated(&[(0, 1, 10), (1, 2, 10), (2, 3, 10)]);
        players.token_dealer = 0;
        let pockets = crate::cards::deck::Deck::default().deal_pockets(3).unwrap();
        players.deal_pockets(pockets.clone());
        // pockets are popped from the back: last pocket to the button's left.
        assert_eq!(players.seats[1].unwrap().pocket.unwrap(), pockets[2]);
        assert_eq!(players.seats[2].unwrap().pocket.unwrap(), pockets[1]);
        assert_eq!(players.seats[0].unwrap().pocket.unwrap(), pockets[0]);
    }
}
