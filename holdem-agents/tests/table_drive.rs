use holdem_agents::{DecisionSource, RandomSource, ScriptedSource};
use holdem_core::state::{GameState, State};
use holdem_core::view::Decision;
use holdem_core::{Currency, GameError, PlayerId};
use std::collections::HashMap;

#[test]
fn random_sources_play_whole_games_without_leaking_chips() {
    let n = 6;
    const STACK: Currency = 500;
    let mut gs = GameState::default();
    let mut sources: HashMap<PlayerId, RandomSource> = HashMap::new();
    for id in 0..n {
        gs.try_sit(id, STACK).unwrap();
        sources.insert(id, RandomSource::new(id as u64 * 7 + 1));
    }
    for _ in 0..50 {
        match gs.tick() {
            Ok(()) => {}
            Err(GameError::NotEnoughPlayers) => break,
            Err(e) => panic!("{}", e),
        }
        while let Some((_, actor)) = gs.nta() {
            let view = gs.view_for(actor.id).unwrap();
            let d = sources.get_mut(&actor.id).unwrap().decide(&view);
            gs.apply_decision(actor.id, d).unwrap();
        }
        assert!(matches!(gs.state(), State::EndOfHand));
        let total: Currency = gs.players.players_iter().map(|p| p.stack).sum();
        assert_eq!(total, STACK * n as Currency);
    }
}

#[test]
fn scripted_sources_replay_a_known_hand() {
    let mut gs = GameState::default();
    gs.try_sit(0, 1000).unwrap(); // big blind this hand
    gs.try_sit(1, 1000).unwrap(); // dealer / first to act
    gs.try_sit(2, 1000).unwrap(); // small blind
    gs.start_hand().unwrap();
    assert_eq!(gs.players.token_bb, 0);

    let mut sources: HashMap<PlayerId, ScriptedSource> = HashMap::new();
    // Dealer raises, small blind folds, big blind calls, then everyone checks
    // it down.
    sources.insert(1, ScriptedSource::new([Decision::Raise(60), Decision::Check, Decision::Check, Decision::Check]));
    sources.insert(2, ScriptedSource::new([Decision::Fold]));
    sources.insert(0, ScriptedSource::new([Decision::Call, Decision::Check, Decision::Check, Decision::Check]));

    while let Some((_, actor)) = gs.nta() {
        let view = gs.view_for(actor.id).unwrap();
        let d = sources.get_mut(&actor.id).unwrap().decide(&view);
        gs.apply_decision(actor.id, d).unwrap();
    }
    assert!(matches!(gs.state(), State::EndOfHand));
    // The small blind is out 10; the other two contested a 130 pot.
    assert_eq!(gs.players.player_by_id(2).unwrap().stack, 990);
    let p0 = gs.players.player_by_id(0).unwrap().stack;
    let p1 = gs.players.player_by_id(1).unwrap().stack;
    assert_eq!(p0 + p1, 2010);
    // Both live seats put in 60, so nobody can end up below 940.
    assert!(p0 >= 940 && p1 >= 940);
}
