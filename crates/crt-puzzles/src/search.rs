//! A search engine that sees connections everywhere. Every query drags the
//! user deeper down the rabbit hole; searching for the truth breaks the
//! spell.

use crt_core::{EngineHandle, Meter, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "conspiracy-search";

const TRUTH_KEYWORDS: [&str; 4] = ["the truth", "truth", "reality", "wake up"];

const MAX_DEPTH: f64 = 10.0;
const DEPTH_PER_SEARCH: f64 = 1.0;
const HISTORY_LIMIT: usize = 5;

/// Past this depth, results come back partially redacted.
const REDACTION_DEPTH: f64 = 6.0;

pub struct ConspiracySearch {
    core: PuzzleCore,
    depth: Meter,
    history: Vec<String>,
}

impl ConspiracySearch {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            depth: Meter::new(0.0, MAX_DEPTH),
            history: Vec::new(),
        }
    }

    /// How far down the rabbit hole the session has gone.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.depth.value()
    }

    /// Recent queries, newest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    #[must_use]
    pub fn is_redacting(&self) -> bool {
        self.depth.value() > REDACTION_DEPTH
    }

    fn search(&mut self, raw: &str) {
        let query = raw.trim();
        if query.is_empty() {
            return;
        }
        let lowered = query.to_lowercase();
        if TRUTH_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            self.core.mark_solved();
            return;
        }
        self.depth.raise(DEPTH_PER_SEARCH);
        self.history.insert(0, query.to_string());
        self.history.truncate(HISTORY_LIMIT);
        tracing::debug!(depth = self.depth.value(), "descended further");
    }
}

impl Puzzle for ConspiracySearch {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        self.depth.set(0.0);
        self.history.clear();
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        if let PuzzleInput::Text(query) = input {
            self.search(&query);
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
