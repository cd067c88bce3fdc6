use crate::DecisionSource;
use holdem_core::view::{Decision, TableView};
use holdem_core::Currency;
use std::io::{BufRead, Write};

/// A human at a terminal. Prompts with the offered actions, reads one line,
/// and re-prompts on anything it cannot parse. End of input plays as a fold.
pub struct StdinSource<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StdinSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

fn try_parse_decision(buf: &str) -> Result<Decision, String> {
    let words: Vec<&str> = buf.split_whitespace().collect();
    match words.as_slice() {
        [] => Err("Empty input".to_string()),
        ["fold"] | ["f"] => Ok(Decision::Fold),
        ["check"] | ["ch"] => Ok(Decision::Check),
        ["call"] | ["c"] => Ok(Decision::Call),
        ["allin"] | ["all"] | ["a"] => Ok(Decision::AllIn),
        ["raise", amount] | ["r", amount] => amount
            .parse::<Currency>()
            .map(Decision::Raise)
            .map_err(|e| format!("Bad raise amount: {}", e)),
        _ => Err(format!("Unknown command: {}", buf.trim())),
    }
}

impl<R: BufRead, W: Write> DecisionSource for StdinSource<R, W> {
    fn decide(&mut self, view: &TableView) -> Decision {
        loop {
            let _ = writeln!(
                self.output,
                "Your cards: {} | Board: {} | Pot: {} | Stack: {}",
                view.your_cards.join(" "),
                view.community.join(" "),
                view.pot,
                view.your_stack,
            );
            let _ = writeln!(self.output, "Actions: {}", view.action_strings().join(", "));
            let _ = write!(self.output, "> ");
            let _ = self.output.flush();
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Decision::Fold,
                Ok(_) => {}
            }
            match try_parse_decision(&line) {
                Ok(d) => return d,
                Err(e) => {
                    let _ = writeln!(self.output, "{}", e);
                }
            }
        }
    }
}
