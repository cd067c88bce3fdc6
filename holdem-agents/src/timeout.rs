use crate::{default_decision, DecisionSource};
use holdem_core::view::{Decision, TableView};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Wraps an I/O-bound source (a human, an agent over the network) so a stalled
/// answer degrades to the safe default instead of freezing the table.
///
/// The inner source lives on its own worker thread and is asked over a
/// channel; this type waits at most `timeout` for the answer. The engine stays
/// single-threaded and untouched while a decision is pending: nothing else can
/// act, and a late answer to an already-defaulted question is discarded when
/// it finally shows up.
pub struct TimeoutSource {
    tx: mpsc::Sender<(u64, TableView)>,
    rx: mpsc::Receiver<(u64, Decision)>,
    seq: u64,
    timeout: Duration,
}

impl TimeoutSource {
    pub fn new<S: DecisionSource + Send + 'static>(mut inner: S, timeout: Duration) -> Self {
        let (tx_req, rx_req) = mpsc::channel::<(u64, TableView)>();
        let (tx_resp, rx_resp) = mpsc::channel();
        thread::spawn(move || {
            while let Ok((seq, view)) = rx_req.recv() {
                let d = inner.decide(&view);
                if tx_resp.send((seq, d)).is_err() {
                    break;
                }
            }
        });
        Self {
            tx: tx_req,
            rx: rx_resp,
            seq: 0,
            timeout,
        }
    }
}

impl DecisionSource for TimeoutSource {
    fn decide(&mut self, view: &TableView) -> Decision {
        self.seq += 1;
        let seq = self.seq;
        if self.tx.send((seq, view.clone())).is_err() {
            // The worker died (inner source panicked); play safe from here on.
            return default_decision(view);
        }
        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                // Answers to questions that already timed out get dropped.
                Ok((s, d)) if s == seq => return d,
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return default_decision(view)
                }
            }
        }
    }
}
