use std::error::Error;
use std::io::{stdin, stdout};

use holdem_agents::{DecisionSource, RandomSource, StdinSource};
use holdem_core::cards::deck::DeckSeed;
use holdem_core::state::GameState;
use holdem_core::view::TableSummary;
use holdem_core::{Currency, GameError, PlayerId, SeqNum};
use itertools::Itertools;
use structopt::StructOpt;

fn parse_currency(src: &str) -> Result<Currency, std::num::ParseIntError> {
    src.parse::<Currency>()
}

#[derive(StructOpt)]
#[structopt(about = "Deal hands of no-limit hold'em between bot seats")]
struct Opt {
    /// Number of seats to fill (2-9)
    #[structopt(short, default_value = "6")]
    n_players: u8,
    #[structopt(long, default_value = "1000", parse(try_from_str = parse_currency))]
    start_stack: Currency,
    #[structopt(long, default_value = "10", parse(try_from_str = parse_currency))]
    small_blind: Currency,
    #[structopt(long, default_value = "20", parse(try_from_str = parse_currency))]
    big_blind: Currency,
    /// Stop after this many hands (sooner if one seat wins everything)
    #[structopt(long, default_value = "20")]
    hands: u64,
    /// Seed the first hand's deck for a reproducible deal
    #[structopt(long)]
    deck_seed: Option<DeckSeed>,
    /// Seed the bot seats for reproducible play
    #[structopt(long, default_value = "0")]
    rng_seed: u64,
    /// Take seat 0 yourself instead of a bot
    #[structopt(long)]
    human: bool,
    /// Silence the per-action log lines
    #[structopt(long)]
    quiet: bool,
}

fn print_summary(summary: &TableSummary) {
    println!("--- hand {} complete ---", summary.hand_number);
    for (seat, id, stack) in summary.stacks.iter() {
        let btn = if *seat == summary.dealer_seat { " (btn)" } else { "" };
        println!("  seat {} p{}: {}{}", seat, id, stack, btn);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();
    if !(2..=9).contains(&opt.n_players) {
        return Err("n_players must be between 2 and 9".into());
    }

    let mut gs = GameState::new(opt.small_blind, opt.big_blind);
    let mut sources: Vec<Box<dyn DecisionSource>> = Vec::new();
    for id in 0..opt.n_players as PlayerId {
        gs.try_sit(id, opt.start_stack)?;
        if opt.human && id == 0 {
            sources.push(Box::new(StdinSource::new(stdin().lock(), stdout())));
        } else {
            sources.push(Box::new(RandomSource::new(
                opt.rng_seed.wrapping_add(id as u64),
            )));
        }
    }

    let mut last_seq: SeqNum = 0;
    let mut played = 0;
    while played < opt.hands {
        let started = match (played, opt.deck_seed) {
            (0, Some(seed)) => gs.start_hand_with_seed(seed),
            _ => gs.tick(),
        };
        match started {
            Ok(()) => {}
            Err(GameError::NotEnoughPlayers) => break,
            Err(e) => return Err(e.into()),
        }
        while let Some((_, actor)) = gs.nta() {
            let view = gs.view_for(actor.id)?;
            let d = sources[actor.id as usize].decide(&view);
            gs.apply_decision(actor.id, d)?;
            if !opt.quiet {
                for (seq, item) in gs.changes_since(last_seq) {
                    println!("{}", item);
                    last_seq = seq;
                }
            }
        }
        played += 1;
        print_summary(&gs.summary());
    }

    let total: Currency = gs.players.players_iter().map(|p| p.stack).sum();
    println!(
        "{} hands played; {} chips on the table; stacks: {}",
        played,
        total,
        gs.players
            .players_iter()
            .map(|p| format!("p{}={}", p.id, p.stack))
            .join(", ")
    );
    Ok(())
}
