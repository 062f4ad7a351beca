//! A 404 page having an identity crisis. Reassurance lowers the crisis,
//! questioning deepens it, and one decisive affirmation ends it.

use crt_core::{EngineHandle, Meter, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "existential-error";

const MAX_CRISIS: f64 = 100.0;
const INITIAL_CRISIS: f64 = 50.0;

/// At or below this level the page finds peace.
const RESOLUTION_LEVEL: f64 = 20.0;

/// Phrases that deliver the decisive breakthrough.
const BREAKTHROUGHS: [&str; 3] = ["you have purpose", "you are not an error", "you matter"];

/// Affirming the page's identity calms it substantially.
const AFFIRMATION: &str = "you are 404";
const AFFIRMATION_RELIEF: f64 = 20.0;

/// Gentler reassurances chip away at the crisis.
const REASSURANCES: [&str; 3] = ["help", "i need you", "you guide people"];
const REASSURANCE_RELIEF: f64 = 5.0;

/// Questioning its nature makes everything worse.
const DOUBTS: [&str; 3] = ["who are you", "what are you", "why"];
const DOUBT_PENALTY: f64 = 10.0;

pub struct ExistentialError {
    core: PuzzleCore,
    crisis: Meter,
}

impl ExistentialError {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            crisis: Meter::new(INITIAL_CRISIS, MAX_CRISIS),
        }
    }

    #[must_use]
    pub fn crisis_level(&self) -> f64 {
        self.crisis.value()
    }

    fn respond(&mut self, raw: &str) {
        let message = raw.trim().to_lowercase();
        if message.is_empty() {
            return;
        }
        if BREAKTHROUGHS.iter().any(|p| message.contains(p)) {
            self.crisis.set(0.0);
            self.core.mark_solved();
            return;
        }
        if message.contains(AFFIRMATION) {
            self.crisis.lower(AFFIRMATION_RELIEF);
        } else if REASSURANCES.iter().any(|p| message.contains(p)) {
            self.crisis.lower(REASSURANCE_RELIEF);
        } else if DOUBTS.iter().any(|p| message.contains(p)) {
            self.crisis.raise(DOUBT_PENALTY);
        }
        tracing::debug!(crisis = self.crisis.value(), "crisis level shifted");
        if self.crisis.value() <= RESOLUTION_LEVEL {
            self.core.mark_solved();
        }
    }
}

impl Puzzle for ExistentialError {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        self.crisis.set(INITIAL_CRISIS);
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        if let PuzzleInput::Text(message) = input {
            self.respond(&message);
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
