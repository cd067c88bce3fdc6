use crate::bet::{BetAction, BetError};
use crate::cards::card::Card;
use crate::cards::deck::{Deck, DeckSeed};
use crate::cards::hand::{self, HandScore};
use crate::log::{Log, LogItem};
use crate::player::{Player, Players};
use crate::pot::{self, Pot};
use crate::view::{Decision, LegalAction, SeatInfo, TableSummary, TableView};
use crate::{Currency, GameError, PlayerId, SeatIdx, MAX_PLAYERS};
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const COMMUNITY_SIZE: usize = 5;
const DEF_SB: Currency = 10;
const DEF_BB: Currency = 20;
/// How many log lines the table view carries as recent history.
pub const HISTORY_LEN: usize = 20;

/// States a hand can be in: not yet dealt, one of the four streets, the
/// showdown, or settled.
#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum State {
    NotStarted,
    Street(Street),
    Showdown,
    EndOfHand,
}

impl Default for State {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

/// All the state constituting one table with a hand possibly in progress.
///
/// An owned value: nothing global, so any number of tables can run side by
/// side. Exactly one locus of control drives it, one accepted action at a
/// time.
#[derive(Debug)]
pub struct GameState {
    /// Only ever changed through `change_state` so the transition gets logged.
    state: State,
    pub players: Players,
    pub community: [Option<Card>; COMMUNITY_SIZE],
    pot: Pot,
    deck: Deck,
    small_blind: Currency,
    big_blind: Currency,
    /// What each seat must match to see the end of the street. Only ever
    /// changed through `set_current_bet`.
    current_bet: Currency,
    /// The total a raise must reach. current_bet plus the last full raise
    /// increment (never less than the big blind).
    min_raise: Currency,
    /// The last seat to take aggressive action this street. Needed for the
    /// full bet rule: you cannot raise again after your own raise unless
    /// someone reopened the action in between, and a short all-in does not
    /// reopen it.
    last_raiser: Option<PlayerId>,
    hand_num: u64,
    /// Sum of all stacks when the hand started. Chips move between stacks and
    /// the pot but this total never changes mid-hand; any drift is a fatal
    /// accounting bug.
    hand_start_total: Currency,
    logs: Log,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEF_SB, DEF_BB)
    }
}

const fn bet_value(ba: &BetAction) -> Currency {
    match ba {
        BetAction::Check | BetAction::Fold => 0,
        BetAction::Call(x) | BetAction::Raise(x) | BetAction::AllIn(x) => *x,
    }
}

impl GameState {
    pub fn new(small_blind: Currency, big_blind: Currency) -> Self {
        Self {
            state: State::default(),
            players: Players::default(),
            community: [None; COMMUNITY_SIZE],
            pot: Pot::default(),
            deck: Deck::default(),
            small_blind,
            big_blind,
            current_bet: big_blind,
            min_raise: 2 * big_blind,
            last_raiser: None,
            hand_num: 0,
            hand_start_total: 0,
            logs: Log::default(),
        }
    }

    pub const fn state(&self) -> State {
        self.state
    }

    pub const fn current_bet(&self) -> Currency {
        self.current_bet
    }

    pub const fn min_raise(&self) -> Currency {
        self.min_raise
    }

    pub const fn small_blind(&self) -> Currency {
        self.small_blind
    }

    pub const fn big_blind(&self) -> Currency {
        self.big_blind
    }

    pub const fn hand_number(&self) -> u64 {
        self.hand_num
    }

    pub fn dealer_seat(&self) -> SeatIdx {
        self.players.token_dealer
    }

    pub fn pot_total_value(&self) -> Currency {
        self.pot.total_value()
    }

    /// The seat expected to act next, if the hand is waiting on anybody.
    pub fn nta(&self) -> Option<(SeatIdx, Player)> {
        let idx = *self.players.need_bets_from.last()?;
        let p = self.players.seats[idx]?;
        Some((idx, p))
    }

    fn change_state(&mut self, new: State) {
        self.logs.push(LogItem::StateChange(self.state, new));
        self.state = new;
    }

    fn set_current_bet(&mut self, new_cb: Currency, new_mr: Currency) {
        self.logs
            .push(LogItem::CurrentBetSet(self.current_bet, new_cb, self.min_raise, new_mr));
        self.current_bet = new_cb;
        self.min_raise = new_mr;
    }

    /// Every chip is either in a stack or in the pot; the sum is pinned for
    /// the whole hand. Called after every chip-moving operation.
    fn check_conservation(&self) -> Result<(), GameError> {
        let actual =
            self.players.players_iter().map(|p| p.stack).sum::<Currency>() + self.pot.total_value();
        if actual != self.hand_start_total {
            return Err(GameError::ChipsNotConserved {
                expected: self.hand_start_total,
                actual,
            });
        }
        Ok(())
    }

    pub fn try_sit(&mut self, player_id: PlayerId, stack: Currency) -> Result<(), GameError> {
        if self.players.player_by_id(player_id).is_some() {
            return Err(GameError::PlayerAlreadySeated);
        }
        let mut p = Player::new(player_id, stack);
        if !matches!(self.state(), State::NotStarted | State::EndOfHand) {
            // Joining mid-hand means watching this one from the rail.
            p.bet_status = crate::bet::BetStatus::Folded;
        }
        self.players.seat_player(p)?;
        Ok(())
    }

    /// Leave the table with whatever is left of the stack. Only between hands;
    /// a seat with chips in the pot cannot walk away from them.
    pub fn stand_up(&mut self, player_id: PlayerId) -> Result<Currency, GameError> {
        if !matches!(self.state(), State::NotStarted | State::EndOfHand) {
            return Err(GameError::BettingPlayerCantStand);
        }
        self.players
            .unseat_player(player_id)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Move the table forward if it can move itself: start the first hand, or
    /// the next one after a settlement.
    pub fn tick(&mut self) -> Result<(), GameError> {
        match self.state() {
            State::NotStarted | State::EndOfHand => {
                if self.players.players_iter().filter(|p| p.stack > 0).count() < 2 {
                    return Err(GameError::NotEnoughPlayers);
                }
                self.start_hand()
            }
            _ => Ok(()),
        }
    }

    pub fn start_hand(&mut self) -> Result<(), GameError> {
        self.start_hand_with_seed(DeckSeed::default())
    }

    pub fn start_hand_with_seed(&mut self, seed: DeckSeed) -> Result<(), GameError> {
        self.clean_state(seed);
        self.players.start_hand()?;
        self.hand_num += 1;
        self.hand_start_total = self.players.players_iter().map(|p| p.stack).sum();
        self.logs.push(LogItem::HandStarted(self.hand_num));
        self.logs.push(LogItem::TokensSet(
            self.players.token_dealer,
            self.players.token_sb,
            self.players.token_bb,
        ));
        self.change_state(State::Street(Street::PreFlop));
        self.blinds_bet()?;
        // The big blind is the price of the street but nobody has taken
        // aggressive action yet; clearing last_raiser is what gives the big
        // blind its option to raise when the action limps around.
        self.last_raiser = None;
        self.set_current_bet(self.big_blind, self.big_blind * 2);

        let n = self.players.dealt_players_count() as u8;
        let pockets = self.deck.deal_pockets(n)?;
        self.players.deal_pockets(pockets);

        // Preflop action starts left of the big blind and the blinds get to
        // act again if somebody raises.
        self.players.need_bets_from = self
            .players
            .betting_players_iter_after(self.players.token_bb)
            .map(|(i, _)| i)
            .take(self.players.betting_players_count())
            .collect();
        self.players.need_bets_from.reverse();
        // Blinds can leave every seat all-in before anyone acts; the hand
        // must still play itself out.
        self.run_forward()?;
        if let Some((idx, _)) = self.nta() {
            self.logs.push(LogItem::NextToAct(idx));
        }
        self.check_conservation()?;
        Ok(())
    }

    fn clean_state(&mut self, seed: DeckSeed) {
        self.logs.rotate();
        self.community = [None; COMMUNITY_SIZE];
        self.pot = Pot::default();
        self.deck = Deck::new(&seed);
        self.last_raiser = None;
    }

    /// Post the blinds. Short stacks post what they have and are all-in for
    /// less.
    fn blinds_bet(&mut self) -> Result<(), GameError> {
        let sb_id = self.players.seats[self.players.token_sb]
            .ok_or(GameError::PlayerNotFound)?
            .id;
        let bb_id = self.players.seats[self.players.token_bb]
            .ok_or(GameError::PlayerNotFound)?
            .id;
        for (id, amount, big) in [(sb_id, self.small_blind, false), (bb_id, self.big_blind, true)] {
            let p = self
                .players
                .player_by_id_mut(id)
                .ok_or(GameError::PlayerNotFound)?;
            let posted = p.bet(BetAction::Call(amount))?;
            let value = bet_value(&posted);
            self.logs.push(if big {
                LogItem::BigBlindPosted(id, value)
            } else {
                LogItem::SmallBlindPosted(id, value)
            });
            let pot_log = self.pot.bet(id, value);
            self.logs.push(pot_log.into());
        }
        Ok(())
    }

    pub fn player_folds(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Fold)
    }

    pub fn player_checks(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Check)
    }

    pub fn player_calls(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Call(self.current_bet()))
    }

    pub fn player_raises(&mut self, player_id: PlayerId, to: Currency) -> Result<(), GameError> {
        self.player_action(player_id, BetAction::Raise(to))
    }

    pub fn player_goes_all_in(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        let p = self
            .players
            .player_by_id(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let total = p.street_total() + p.stack;
        self.player_action(player_id, BetAction::AllIn(total))
    }

    /// Process one accepted action and everything that follows from it:
    /// street advancement, betting-free runouts, and settlement.
    pub fn player_action(
        &mut self,
        player_id: PlayerId,
        bet_action: BetAction,
    ) -> Result<(), GameError> {
        let (bet, additional) = self.bet(player_id, bet_action)?;
        self.logs.push(LogItem::PlayerActed(player_id, bet));
        if additional > 0 {
            let pot_log = self.pot.bet(player_id, additional);
            self.logs.push(pot_log.into());
        }
        // A bet above the current bet sets the new price of the street. A full
        // raise also resets the increment the next raise must add; a short
        // all-in does not.
        let value = bet_value(&bet);
        if value > self.current_bet() {
            let increment = if value >= self.min_raise() {
                value - self.current_bet()
            } else {
                self.min_raise() - self.current_bet()
            };
            self.set_current_bet(value, value + increment);
        }

        self.run_forward()?;
        if let Some((idx, _)) = self.nta() {
            self.logs.push(LogItem::NextToAct(idx));
        }
        self.check_conservation()?;
        Ok(())
    }

    /// Push the hand as far as it can go without another decision: settle it
    /// if only one seat is left, and deal through any streets with nobody
    /// able to bet.
    fn run_forward(&mut self) -> Result<(), GameError> {
        if self.players.eligible_players_iter().count() == 1 {
            // Everyone else folded. No more cards, no showdown.
            return self.finalize_hand();
        }
        if self.players.need_bets_from.is_empty() {
            while self.players.need_bets_from.is_empty()
                && !matches!(self.state(), State::Showdown)
            {
                let next = self.advance_street()?;
                self.change_state(next);
            }
            if matches!(self.state(), State::Showdown) {
                self.finalize_hand()?;
            }
        }
        Ok(())
    }

    /// Validate a bet against the table, take the chips from the seat, and
    /// keep the action bookkeeping straight. Returns the accepted action and
    /// the chips actually added to the pot. A rejected bet leaves all state
    /// untouched.
    fn bet(
        &mut self,
        player_id: PlayerId,
        bet: BetAction,
    ) -> Result<(BetAction, Currency), GameError> {
        if !matches!(self.state(), State::Street(_)) {
            return Err(BetError::NoBetExpected.into());
        }
        let seat = {
            let (seat, p) = self
                .players
                .player_with_index_by_id(player_id)
                .ok_or(GameError::PlayerNotFound)?;
            if !self.players.need_bets_from.is_empty()
                && *self.players.need_bets_from.last().unwrap() != seat
            {
                return Err(BetError::OutOfTurn.into());
            }
            if self.players.need_bets_from.is_empty() {
                return Err(BetError::NoBetExpected.into());
            }
            match &bet {
                BetAction::Fold | BetAction::AllIn(_) => {}
                BetAction::Check => {
                    if p.street_total() != self.current_bet() {
                        return Err(BetError::BetTooLow.into());
                    }
                }
                BetAction::Call(x) => match x.cmp(&self.current_bet()) {
                    Ordering::Less => return Err(BetError::BetTooLow.into()),
                    Ordering::Greater => return Err(BetError::BetTooHigh.into()),
                    Ordering::Equal => {}
                },
                BetAction::Raise(x) => {
                    if *x < self.min_raise() {
                        return Err(BetError::BetTooLow.into());
                    }
                    if self.last_raiser == Some(player_id) {
                        return Err(BetError::CantRaiseSelf.into());
                    }
                }
            }
            seat
        };

        let before = self
            .players
            .player_by_id(player_id)
            .expect("looked up above")
            .street_total();
        let bet = self
            .players
            .player_by_id_mut(player_id)
            .expect("looked up above")
            .bet(bet)?;
        let additional = bet_value(&bet).max(before) - before;

        // Whose bets do we still need? A bet at or below the current price
        // consumes this seat's turn; a bet above it reopens the action for
        // everyone else still betting.
        match bet {
            BetAction::Check | BetAction::Fold => {
                self.players.need_bets_from.pop();
            }
            BetAction::Call(x) | BetAction::Raise(x) | BetAction::AllIn(x) => {
                match x.cmp(&self.current_bet()) {
                    Ordering::Less => {
                        // Only a short all-in may come up under the price.
                        if bet.is_allin() {
                            self.players.need_bets_from.pop();
                        } else {
                            return Err(BetError::BetTooLow.into());
                        }
                    }
                    Ordering::Equal => {
                        self.players.need_bets_from.pop();
                    }
                    Ordering::Greater => {
                        let betting = self.players.betting_players_count();
                        // An all-in aggressor is done acting; a raiser is not,
                        // but does not owe another action unless re-raised.
                        let n = if bet.is_allin() { betting } else { betting - 1 };
                        self.players.need_bets_from = self
                            .players
                            .betting_players_iter_after(seat)
                            .map(|(i, _)| i)
                            .take(n)
                            .collect();
                        self.players.need_bets_from.reverse();
                    }
                }
            }
        }
        if bet_value(&bet) >= self.min_raise() {
            self.last_raiser = Some(player_id);
        }
        Ok((bet, additional))
    }

    /// Move to the next street, dealing its cards. When nobody can bet any
    /// more the fresh street comes back with an empty action list and the
    /// caller keeps advancing: the board always runs out to five cards before
    /// a showdown.
    fn advance_street(&mut self) -> Result<State, GameError> {
        let next = match self.state() {
            State::Street(street) => match street {
                Street::PreFlop => State::Street(Street::Flop),
                Street::Flop => State::Street(Street::Turn),
                Street::Turn => State::Street(Street::River),
                Street::River => State::Showdown,
            },
            _ => unreachable!("streets only advance mid-hand"),
        };
        self.players.next_street()?;
        self.set_current_bet(0, self.big_blind);
        self.last_raiser = None;
        if let State::Street(street) = next {
            match street {
                Street::PreFlop => unreachable!("preflop is never advanced into"),
                Street::Flop => {
                    self.deck.burn();
                    let c1 = self.deck.draw()?;
                    let c2 = self.deck.draw()?;
                    let c3 = self.deck.draw()?;
                    self.community[0] = Some(c1);
                    self.community[1] = Some(c2);
                    self.community[2] = Some(c3);
                    self.logs.push(LogItem::Flop(c1, c2, c3));
                }
                Street::Turn => {
                    self.deck.burn();
                    let c = self.deck.draw()?;
                    self.community[3] = Some(c);
                    self.logs.push(LogItem::Turn(c));
                }
                Street::River => {
                    self.deck.burn();
                    let c = self.deck.draw()?;
                    self.community[4] = Some(c);
                    self.logs.push(LogItem::River(c));
                }
            }
        }
        Ok(next)
    }

    /// Settle the hand: score the showdown (or award an uncontested pot),
    /// move the chips, and log reveals for seats that won a contested pot.
    fn finalize_hand(&mut self) -> Result<(), GameError> {
        // A hand can end while seats were still due to act (everyone else
        // folded); nobody acts after settlement.
        self.players.need_bets_from.clear();
        let pot = std::mem::take(&mut self.pot);
        let survivors: Vec<(PlayerId, [Card; 2])> = self
            .players
            .eligible_players_iter()
            .map(|p| (p.id, p.pocket.expect("seat in the hand must hold cards")))
            .collect();
        let (winnings, pot_logs) = if survivors.len() == 1 {
            // Last seat standing wins without showing anything.
            let (id, _) = survivors[0];
            let total = pot.total_value();
            (
                HashMap::from([(id, total)]),
                vec![pot::LogItem::Payout(id, total)],
            )
        } else {
            assert!(
                self.community[COMMUNITY_SIZE - 1].is_some(),
                "showdown requires a full board"
            );
            let board: Vec<Card> = self.community.iter().flatten().copied().collect();
            let mut scores: HashMap<PlayerId, HandScore> = HashMap::new();
            for (id, pocket) in survivors.iter() {
                let mut cards = board.clone();
                cards.extend_from_slice(pocket);
                scores.insert(*id, hand::evaluate(&cards)?);
            }
            let order = self.payout_order();
            let (winnings, pot_logs) = pot.payout(&scores, &order);
            // Winning at a contested showdown means showing the hand. Folded
            // seats stay hidden even when a tier refund sends chips their way.
            for (id, pocket) in survivors.iter() {
                if winnings.contains_key(id) {
                    self.logs.push(LogItem::HandReveal(*id, *pocket));
                }
            }
            (winnings, pot_logs)
        };
        self.players.end_hand(&winnings)?;
        self.logs.extend(pot_logs.into_iter().map(|l| l.into()));
        self.change_state(State::EndOfHand);
        self.check_conservation()?;
        Ok(())
    }

    /// Seat order used for odd-chip distribution: clockwise starting at the
    /// seat after the dealer button. Settlement itself is order-agnostic, so a
    /// different convention only means passing a different order.
    fn payout_order(&self) -> Vec<PlayerId> {
        let btn = self.players.token_dealer;
        self.players
            .players_iter_with_index()
            .map(|(i, p)| ((i + MAX_PLAYERS - btn - 1) % MAX_PLAYERS, p.id))
            .collect::<std::collections::BTreeMap<_, _>>()
            .into_values()
            .collect()
    }

    /// The actions the seat may legally take right now. Empty when the seat
    /// cannot act.
    pub fn legal_actions(&self, player_id: PlayerId) -> Vec<LegalAction> {
        let p = match self.players.player_by_id(player_id) {
            Some(p) => p,
            None => return vec![],
        };
        if !matches!(self.state(), State::Street(_)) || p.stack <= 0 {
            return vec![];
        }
        match self.nta() {
            Some((_, actor)) if actor.id == player_id => {}
            _ => return vec![],
        }
        let street = p.street_total();
        let to_call = self.current_bet() - street;
        let mut v = vec![LegalAction::Fold];
        if to_call == 0 {
            v.push(LegalAction::Check);
        } else {
            v.push(LegalAction::Call(to_call.min(p.stack)));
        }
        let max_to = street + p.stack;
        if p.stack > to_call && max_to >= self.min_raise() && self.last_raiser != Some(player_id) {
            v.push(LegalAction::Raise {
                min: self.min_raise(),
                max: max_to,
            });
        }
        v.push(LegalAction::AllIn(p.stack));
        v
    }

    /// Apply a decision from an external source. Anything outside the offered
    /// legal actions degrades to the safe default (check when free, otherwise
    /// fold); a misbehaving source can lose its own chips but can never wedge
    /// the hand.
    pub fn apply_decision(
        &mut self,
        player_id: PlayerId,
        decision: Decision,
    ) -> Result<BetAction, GameError> {
        let legal = self.legal_actions(player_id);
        if legal.is_empty() {
            return Err(BetError::NoBetExpected.into());
        }
        let can_check = legal.contains(&LegalAction::Check);
        let fallback = if can_check {
            BetAction::Check
        } else {
            BetAction::Fold
        };
        let street = self
            .players
            .player_by_id(player_id)
            .expect("legal_actions was non-empty")
            .street_total();
        let stack = self
            .players
            .player_by_id(player_id)
            .expect("legal_actions was non-empty")
            .stack;
        let wanted = match decision {
            Decision::Fold => Some(BetAction::Fold),
            Decision::Check if can_check => Some(BetAction::Check),
            Decision::Call
                if legal
                    .iter()
                    .any(|a| matches!(a, LegalAction::Call(_))) =>
            {
                Some(BetAction::Call(self.current_bet()))
            }
            Decision::Raise(to)
                if legal
                    .iter()
                    .any(|a| matches!(a, LegalAction::Raise { min, max } if to >= *min && to <= *max)) =>
            {
                Some(BetAction::Raise(to))
            }
            Decision::AllIn => Some(BetAction::AllIn(street + stack)),
            _ => None,
        };
        let bet = wanted.unwrap_or(fallback);
        match self.player_action(player_id, bet) {
            Ok(()) => Ok(bet),
            // Conservation failures are the engine's own fault and fatal;
            // everything else is the source's fault and costs them the hand.
            Err(e @ GameError::ChipsNotConserved { .. }) => Err(e),
            Err(_) if bet != fallback => {
                self.player_action(player_id, fallback)?;
                Ok(fallback)
            }
            Err(e) => Err(e),
        }
    }

    /// The snapshot handed to a decision source or UI acting for `player_id`:
    /// only that seat's own cards, plus everything public.
    pub fn view_for(&self, player_id: PlayerId) -> Result<TableView, GameError> {
        let p = self
            .players
            .player_by_id(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let acting = self.nta();
        let actions = match &acting {
            Some((_, actor)) if actor.id == player_id => self.legal_actions(player_id),
            _ => vec![],
        };
        Ok(TableView {
            your_id: player_id,
            phase: self.state(),
            your_cards: p
                .pocket
                .map(|cs| cs.iter().map(|c| c.to_string()).collect())
                .unwrap_or_default(),
            community: self.community.iter().flatten().map(|c| c.to_string()).collect(),
            your_stack: p.stack,
            your_street_bet: p.street_total(),
            your_hand_total: p.hand_total,
            pot: self.pot.total_value(),
            to_call: (self.current_bet() - p.street_total()).max(0),
            dealer_seat: self.players.token_dealer,
            acting_seat: acting.map(|(i, _)| i),
            players: self
                .players
                .players_iter_with_index()
                .map(|(i, p)| SeatInfo::new(i, p))
                .collect(),
            actions,
            history: self.logs.recent_lines(HISTORY_LEN),
        })
    }

    /// What an external store needs to carry a table across a restart: who is
    /// sitting where with what, plus the hand counter and button.
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            hand_number: self.hand_num,
            dealer_seat: self.players.token_dealer,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            stacks: self
                .players
                .players_iter_with_index()
                .map(|(i, p)| (i, p.id, p.stack))
                .collect(),
        }
    }

    /// Incremental log feed for an external consumer, with other seats'
    /// pockets never present in the first place.
    pub fn changes_since(
        &self,
        seq: crate::SeqNum,
    ) -> impl Iterator<Item = (crate::SeqNum, LogItem)> + '_ {
        self.logs.items_since(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::BetStatus;

    fn sit_n(gs: &mut GameState, n: usize, stack: Currency) {
        for id in 0..n {
            gs.try_sit(id as PlayerId, stack).unwrap();
        }
    }

    #[test]
    fn player_cant_sit_twice() {
        let mut gs = GameState::default();
        gs.try_sit(1, 100).unwrap();
        assert!(gs.try_sit(1, 500).is_err());
    }

    #[test]
    fn blinds_posted_on_start() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 3, 1000);
        gs.start_hand().unwrap();
        let sb = gs.players.seats[gs.players.token_sb].unwrap();
        let bb = gs.players.seats[gs.players.token_bb].unwrap();
        assert_eq!(sb.stack, 990);
        assert_eq!(bb.stack, 980);
        assert_eq!(gs.pot_total_value(), 30);
        assert_eq!(gs.current_bet(), 20);
        assert_eq!(gs.min_raise(), 40);
    }

    #[test]
    fn all_in_on_blind() {
        let mut gs = GameState::default();
        gs.try_sit(1, 5).unwrap();
        gs.try_sit(2, 1000).unwrap();
        gs.start_hand().unwrap();
        // First rotation puts the button (and small blind) on seat 1, so the
        // 5-chip stack in seat 0 posts its big blind all-in for less.
        assert_eq!(gs.players.token_bb, 0);
        let short = gs.players.player_by_id(1).unwrap();
        assert_eq!(short.bet_status, BetStatus::AllIn(5));
        let total: Currency = gs.players.players_iter().map(|p| p.stack).sum();
        assert_eq!(total + gs.pot_total_value(), 1005);
    }

    #[test]
    fn min_raise_enforced() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 3, 1000);
        gs.start_hand().unwrap();
        let (_, actor) = gs.nta().unwrap();
        // Current bet is the 20 big blind; a raise to 39 is below the minimum
        // of 40 and must be rejected without touching any state.
        let stack_before = gs.players.player_by_id(actor.id).unwrap().stack;
        let err = gs.player_raises(actor.id, 39).unwrap_err();
        assert!(matches!(err, GameError::BetError(BetError::BetTooLow)));
        assert_eq!(gs.players.player_by_id(actor.id).unwrap().stack, stack_before);
        assert_eq!(gs.current_bet(), 20);
        // The exact minimum is fine.
        gs.player_raises(actor.id, 40).unwrap();
        assert_eq!(gs.current_bet(), 40);
        assert_eq!(gs.min_raise(), 60);
    }

    #[test]
    fn out_of_turn_rejected() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 4, 1000);
        gs.start_hand().unwrap();
        let (acting_seat, _) = gs.nta().unwrap();
        let other = gs
            .players
            .players_iter_with_index()
            .find(|(i, _)| *i != acting_seat)
            .map(|(_, p)| p.id)
            .unwrap();
        let err = gs.player_calls(other).unwrap_err();
        assert!(matches!(err, GameError::BetError(BetError::OutOfTurn)));
    }

    #[test]
    fn check_facing_bet_rejected() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 3, 1000);
        gs.start_hand().unwrap();
        let (_, actor) = gs.nta().unwrap();
        let err = gs.player_checks(actor.id).unwrap_err();
        assert!(matches!(err, GameError::BetError(BetError::BetTooLow)));
    }

    #[test]
    fn folds_short_circuit_without_showdown() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 3, 1000);
        gs.start_hand().unwrap();
        // Everyone folds to the big blind.
        let (_, first) = gs.nta().unwrap();
        gs.player_folds(first.id).unwrap();
        let (_, second) = gs.nta().unwrap();
        gs.player_folds(second.id).unwrap();
        assert!(matches!(gs.state(), State::EndOfHand));
        // No board was dealt and nobody showed a hand.
        assert!(gs.community.iter().all(|c| c.is_none()));
        assert!(!gs
            .changes_since(0)
            .any(|(_, item)| matches!(item, LogItem::HandReveal(_, _))));
        // Blinds went to the winner: big blind keeps their 20 and adds the
        // small blind's 10.
        let total: Currency = gs.players.players_iter().map(|p| p.stack).sum();
        assert_eq!(total, 3000);
        let bb = gs.players.seats[gs.players.token_bb].unwrap();
        assert_eq!(bb.stack, 1010);
    }

    #[test]
    fn bigblind_can_raise_after_limps() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 2, 1000);
        gs.start_hand().unwrap();
        let sb_id = gs.players.seats[gs.players.token_sb].unwrap().id;
        let bb_id = gs.players.seats[gs.players.token_bb].unwrap().id;
        // Heads up the small blind acts first preflop and completes.
        assert_eq!(gs.nta().unwrap().1.id, sb_id);
        gs.player_calls(sb_id).unwrap();
        // The big blind has the option and may raise.
        assert_eq!(gs.nta().unwrap().1.id, bb_id);
        gs.player_raises(bb_id, 60).unwrap();
        assert_eq!(gs.current_bet(), 60);
        // Action is back on the small blind.
        assert_eq!(gs.nta().unwrap().1.id, sb_id);
    }

    #[test]
    fn checked_around_streets_advance() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 3, 1000);
        gs.start_hand().unwrap();
        // Call the blind around, then check every street down to the river.
        while matches!(gs.state(), State::Street(Street::PreFlop)) {
            let (_, actor) = gs.nta().unwrap();
            gs.player_calls(actor.id).unwrap();
        }
        assert!(matches!(gs.state(), State::Street(Street::Flop)));
        assert_eq!(gs.community.iter().flatten().count(), 3);
        assert_eq!(gs.current_bet(), 0);
        for expected in [State::Street(Street::Turn), State::Street(Street::River)] {
            while gs.state() != expected {
                let (_, actor) = gs.nta().unwrap();
                gs.player_checks(actor.id).unwrap();
            }
        }
        while gs.nta().is_some() {
            let (_, actor) = gs.nta().unwrap();
            gs.player_checks(actor.id).unwrap();
        }
        assert!(matches!(gs.state(), State::EndOfHand));
        assert_eq!(gs.community.iter().flatten().count(), 5);
        let total: Currency = gs.players.players_iter().map(|p| p.stack).sum();
        assert_eq!(total, 3000);
    }

    #[test]
    fn all_in_runout_deals_full_board() {
        let mut gs = GameState::default();
        gs.try_sit(1, 100).unwrap();
        gs.try_sit(2, 300).unwrap();
        gs.try_sit(3, 300).unwrap();
        gs.start_hand().unwrap();
        // Everyone shoves or calls all-in preflop.
        while gs.nta().is_some() {
            let (_, actor) = gs.nta().unwrap();
            gs.player_goes_all_in(actor.id).unwrap();
        }
        // With nobody able to bet, the board ran out and the hand settled.
        assert!(matches!(gs.state(), State::EndOfHand));
        assert_eq!(gs.community.iter().flatten().count(), 5);
        let total: Currency = gs.players.players_iter().map(|p| p.stack).sum();
        assert_eq!(total, 700);
    }

    #[test]
    fn raise_reopens_action() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 3, 1000);
        gs.start_hand().unwrap();
        let (_, utg) = gs.nta().unwrap();
        gs.player_calls(utg.id).unwrap();
        let (_, sb) = gs.nta().unwrap();
        gs.player_raises(sb.id, 80).unwrap();
        // The caller owes another action and may not be skipped.
        let mut acted = vec![];
        while gs.nta().is_some() {
            let (_, actor) = gs.nta().unwrap();
            acted.push(actor.id);
            gs.player_calls(actor.id).unwrap();
        }
        assert!(acted.contains(&utg.id));
        assert!(matches!(gs.state(), State::Street(Street::Flop)));
        assert_eq!(gs.pot_total_value(), 240);
    }

    #[test]
    fn short_all_in_does_not_reopen_raising() {
        // The full bet rule: after your own raise, a shorter all-in shove does
        // not entitle you to raise again when the action limps back.
        let mut gs = GameState::default();
        gs.try_sit(0, 1000).unwrap(); // big blind this hand
        gs.try_sit(1, 1000).unwrap(); // dealer, first to act
        gs.try_sit(2, 80).unwrap(); // small blind, the short stack
        gs.start_hand().unwrap();
        assert_eq!(gs.players.token_dealer, 1);
        assert_eq!(gs.players.token_sb, 2);
        assert_eq!(gs.players.token_bb, 0);

        gs.player_raises(1, 60).unwrap();
        // Small blind shoves 80 total: above the bet, below the min raise.
        gs.player_goes_all_in(2).unwrap();
        assert_eq!(gs.current_bet(), 80);
        // The increment is still the original raise's, not the shove's.
        assert_eq!(gs.min_raise(), 120);
        gs.player_calls(0).unwrap();
        // Back on the original raiser, who may call but not raise again.
        let err = gs.player_raises(1, 140).unwrap_err();
        assert!(matches!(err, GameError::BetError(BetError::CantRaiseSelf)));
        gs.player_calls(1).unwrap();
        assert!(matches!(gs.state(), State::Street(Street::Flop)));
    }

    #[test]
    fn stand_up_mid_hand_rejected() {
        let mut gs = GameState::default();
        sit_n(&mut gs, 3, 1000);
        gs.start_hand().unwrap();
        let err = gs.stand_up(0).unwrap_err();
        assert!(matches!(err, GameError::BettingPlayerCantStand));
    }

    #[test]
    fn busted_seat_not_dealt_next_hand() {
        let mut gs = GameState::default();
        gs.try_sit(1, 30).unwrap();
        gs.try_sit(2, 1000).unwrap();
        gs.try_sit(3, 1000).unwrap();
        gs.start_hand_with_seed(DeckSeed::new([7; 32])).unwrap();
        while gs.nta().is_some() {
            let (_, actor) = gs.nta().unwrap();
            gs.player_goes_all_in(actor.id).unwrap();
        }
        assert!(matches!(gs.state(), State::EndOfHand));
        let busted: Vec<PlayerId> = gs
            .players
            .players_iter()
            .filter(|p| p.stack == 0)
            .map(|p| p.id)
            .collect();
        if busted.is_empty() {
            return; // a chopped pot can leave everyone with chips
        }
        match gs.tick() {
            // one seat may have won everything, ending the game
            Err(GameError::NotEnoughPlayers) => return,
            other => other.unwrap(),
        }
        for id in busted {
            assert!(gs.players.player_by_id(id).unwrap().sitting_out);
            assert!(gs.players.player_by_id(id).unwrap().pocket.is_none());
        }
    }
}
