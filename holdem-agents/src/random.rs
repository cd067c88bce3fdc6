use crate::{default_decision, DecisionSource};
use holdem_core::view::{Decision, LegalAction, TableView};
use holdem_core::Currency;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Picks among the offered actions with fixed weights: mostly passive, folds a
/// fair amount, raises now and then, rarely shoves. Raise sizes are 1-3x the
/// minimum. Useful as a baseline opponent and for soak-testing the engine.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
    fold_weight: u32,
    check_call_weight: u32,
    raise_weight: u32,
    all_in_weight: u32,
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(thread_rng().gen())
    }
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            fold_weight: 30,
            check_call_weight: 50,
            raise_weight: 15,
            all_in_weight: 5,
        }
    }

    fn weight_for(&self, action: &LegalAction) -> u32 {
        match action {
            LegalAction::Fold => self.fold_weight,
            LegalAction::Check | LegalAction::Call(_) => self.check_call_weight,
            LegalAction::Raise { .. } => self.raise_weight,
            LegalAction::AllIn(_) => self.all_in_weight,
        }
    }
}

impl DecisionSource for RandomSource {
    fn decide(&mut self, view: &TableView) -> Decision {
        if view.actions.is_empty() {
            return default_decision(view);
        }
        let weights: Vec<u32> = view.actions.iter().map(|a| self.weight_for(a)).collect();
        let dist = match WeightedIndex::new(&weights) {
            Ok(d) => d,
            Err(_) => return default_decision(view),
        };
        match view.actions[dist.sample(&mut self.rng)] {
            LegalAction::Fold => Decision::Fold,
            LegalAction::Check => Decision::Check,
            LegalAction::Call(_) => Decision::Call,
            LegalAction::Raise { min, max } => {
                let to = (min * self.rng.gen_range(1..=3) as Currency).min(max);
                Decision::Raise(to)
            }
            LegalAction::AllIn(_) => Decision::AllIn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with(actions: Vec<LegalAction>) -> TableView {
        TableView {
            your_id: 1,
            phase: holdem_core::state::State::NotStarted,
            your_cards: vec![],
            community: vec![],
            your_stack: 1000,
            your_street_bet: 0,
            your_hand_total: 0,
            pot: 30,
            to_call: 20,
            dealer_seat: 0,
            acting_seat: Some(1),
            players: vec![],
            actions,
            history: vec![],
        }
    }

    #[test]
    fn same_seed_same_choices() {
        let view = view_with(vec![
            LegalAction::Fold,
            LegalAction::Call(20),
            LegalAction::Raise { min: 40, max: 1000 },
            LegalAction::AllIn(1000),
        ]);
        let picks1: Vec<Decision> = {
            let mut s = RandomSource::new(1234);
            (0..50).map(|_| s.decide(&view)).collect()
        };
        let picks2: Vec<Decision> = {
            let mut s = RandomSource::new(1234);
            (0..50).map(|_| s.decide(&view)).collect()
        };
        assert_eq!(picks1, picks2);
    }

    #[test]
    fn only_offered_actions_are_chosen() {
        let view = view_with(vec![LegalAction::Fold, LegalAction::Call(20)]);
        let mut s = RandomSource::new(99);
        for _ in 0..100 {
            match s.decide(&view) {
                Decision::Fold | Decision::Call => {}
                other => panic!("chose unoffered action {:?}", other),
            }
        }
    }

    #[test]
    fn raises_stay_in_bounds() {
        let view = view_with(vec![
            LegalAction::Fold,
            LegalAction::Raise { min: 40, max: 100 },
        ]);
        let mut s = RandomSource::new(7);
        for _ in 0..200 {
            if let Decision::Raise(to) = s.decide(&view) {
                assert!((40..=100).contains(&to));
            }
        }
    }

    #[test]
    fn empty_offer_defaults_to_fold() {
        let view = view_with(vec![]);
        let mut s = RandomSource::new(5);
        assert_eq!(s.decide(&view), Decision::Fold);
    }
}
