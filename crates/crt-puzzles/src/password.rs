//! A login form that does not want to be logged into. Every failed attempt
//! makes it more suspicious and, past a point, grows the requirement list.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crt_core::{EngineHandle, Meter, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "paranoid-password";

const SECRET: &str = "trustno1";
const MAX_SUSPICION: f64 = 10.0;
const WRONG_ATTEMPT_SUSPICION: f64 = 1.0;
const WRONG_ATTEMPT_CHAOS: f64 = 0.2;
const WAIT_RELIEF: f64 = 0.5;

/// Attempts tolerated before the form starts inventing extra requirements.
const ESCALATION_AFTER: u32 = 3;

const REQUIREMENT_TEXTS: [&str; 6] = [
    "At least 8 characters",
    "One uppercase letter",
    "One lowercase letter",
    "One number",
    "One special character",
    "No dictionary words",
];

/// How many requirements are shown before any escalation.
const INITIAL_REQUIREMENTS: usize = 3;

pub struct ParanoidPassword {
    core: PuzzleCore,
    suspicion: Meter,
    attempts: u32,
    active_requirements: usize,
    requirement_order: Vec<usize>,
    rng: SmallRng,
}

impl ParanoidPassword {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self::with_seed(engine, rand::random())
    }

    /// Deterministic variant for tests.
    #[must_use]
    pub fn with_seed(engine: EngineHandle, seed: u64) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            suspicion: Meter::new(MAX_SUSPICION, MAX_SUSPICION),
            attempts: 0,
            active_requirements: INITIAL_REQUIREMENTS,
            requirement_order: (0..REQUIREMENT_TEXTS.len()).collect(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn suspicion(&self) -> f64 {
        self.suspicion.value()
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The requirements currently demanded, in display order.
    #[must_use]
    pub fn requirements(&self) -> Vec<&'static str> {
        self.requirement_order[..self.active_requirements]
            .iter()
            .map(|&i| REQUIREMENT_TEXTS[i])
            .collect()
    }

    fn attempt(&mut self, password: &str) {
        if password == SECRET {
            self.core.mark_solved();
            return;
        }
        self.attempts += 1;
        self.suspicion.raise(WRONG_ATTEMPT_SUSPICION);
        self.core.raise_chaos(WRONG_ATTEMPT_CHAOS);
        tracing::debug!(
            attempts = self.attempts,
            suspicion = self.suspicion.value(),
            "login attempt rejected"
        );
        if self.attempts > ESCALATION_AFTER && self.active_requirements < REQUIREMENT_TEXTS.len() {
            // The inactive tail is shuffled so escalation order varies.
            self.requirement_order[self.active_requirements..].shuffle(&mut self.rng);
            self.active_requirements += 1;
        }
    }
}

impl Puzzle for ParanoidPassword {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        self.suspicion.set(MAX_SUSPICION);
        self.attempts = 0;
        self.active_requirements = INITIAL_REQUIREMENTS;
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        match input {
            PuzzleInput::Text(password) => self.attempt(password.trim()),
            PuzzleInput::Tick => {
                self.suspicion.lower(WAIT_RELIEF);
            }
            PuzzleInput::Select(_) => {}
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
