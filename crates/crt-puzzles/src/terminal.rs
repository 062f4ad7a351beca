//! A terminal emulator with a mood. Politeness earns trust; once it is
//! friendly enough, it can be talked into repairing itself.

use crt_core::{EngineHandle, Meter, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "sentient-terminal";

const MAX_TRUST: f64 = 10.0;
const INSULT_PENALTY: f64 = 3.0;
const INSULT_CHAOS: f64 = 1.0;

const INSULTS: [&str; 5] = ["stupid", "dumb", "idiot", "useless", "broken"];

/// Politeness phrases and the trust each earns. Ordered most specific
/// first so "sudo pretty please" is not swallowed by the bare "please".
const COURTESIES: [(&str, f64); 8] = [
    ("sudo pretty please", 3.0),
    ("i respect you", 3.0),
    ("pretty please", 2.0),
    ("sudo please", 2.0),
    ("you are awesome", 2.0),
    ("thank you", 1.0),
    ("sorry", 1.0),
    ("please", 1.0),
];

/// Disposition bands derived from the trust meter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood {
    Hostile,
    Suspicious,
    Neutral,
    Friendly,
}

impl Mood {
    fn from_trust(trust: f64) -> Self {
        if trust >= 8.0 {
            Mood::Friendly
        } else if trust >= 5.0 {
            Mood::Neutral
        } else if trust >= 2.0 {
            Mood::Suspicious
        } else {
            Mood::Hostile
        }
    }
}

pub struct SentientTerminal {
    core: PuzzleCore,
    trust: Meter,
}

impl SentientTerminal {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            trust: Meter::new(0.0, MAX_TRUST),
        }
    }

    #[must_use]
    pub fn trust(&self) -> f64 {
        self.trust.value()
    }

    #[must_use]
    pub fn mood(&self) -> Mood {
        Mood::from_trust(self.trust.value())
    }

    fn command(&mut self, raw: &str) {
        let cmd = raw.trim().to_lowercase();
        if cmd.is_empty() {
            return;
        }
        if INSULTS.iter().any(|w| cmd.contains(w)) {
            self.trust.lower(INSULT_PENALTY);
            self.core.raise_chaos(INSULT_CHAOS);
            tracing::debug!(trust = self.trust.value(), "terminal was insulted");
            return;
        }
        if let Some((_, reward)) = COURTESIES.iter().find(|(phrase, _)| cmd.contains(phrase)) {
            self.trust.raise(*reward);
            return;
        }
        if self.mood() == Mood::Friendly && (cmd == "fix yourself" || cmd == "system repair") {
            self.core.mark_solved();
        }
    }
}

impl Puzzle for SentientTerminal {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        self.trust.set(0.0);
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        if let PuzzleInput::Text(cmd) = input {
            self.command(&cmd);
        }
    }

    fn close(&mut self) {
        self.core.end_run();
    }

    fn is_active(&self) -> bool {
        self.core.is_active()
    }

    fn is_solved(&self) -> bool {
        self.core.is_solved()
    }
}
