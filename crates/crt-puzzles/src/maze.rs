//! Nested realities, five layers deep. Each portal dive destabilizes the
//! session; only one path through leads to the escape hatch at the bottom.

use crt_core::{EngineHandle, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "iframe-maze";

pub const MAX_DEPTH: usize = 5;

pub const PORTALS: [&str; 5] = ["alpha", "beta", "gamma", "delta", "omega"];

/// The only descent that ends at the escape hatch.
const CORRECT_PATH: [&str; 5] = ["alpha", "gamma", "beta", "delta", "omega"];

/// Each level of recursion destabilizes the session a little.
const DESCENT_CHAOS: f64 = 0.3;

pub struct IframeMaze {
    core: PuzzleCore,
    path: Vec<String>,
}

impl IframeMaze {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            path: Vec::new(),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The breadcrumb trail from the root, oldest first.
    #[must_use]
    pub fn breadcrumbs(&self) -> &[String] {
        &self.path
    }

    /// Whether the escape hatch is reachable from here.
    #[must_use]
    pub fn escape_available(&self) -> bool {
        self.path.len() == MAX_DEPTH
            && self
                .path
                .iter()
                .zip(&CORRECT_PATH)
                .all(|(got, want)| got == want)
    }

    fn enter(&mut self, portal: &str) {
        if !PORTALS.contains(&portal) {
            return;
        }
        if self.path.len() >= MAX_DEPTH {
            // Reality overflow; the maze refuses to recurse further.
            return;
        }
        self.path.push(portal.to_string());
        self.core.raise_chaos(DESCENT_CHAOS);
        tracing::debug!(depth = self.path.len(), portal, "descended a level");
    }

    fn back(&mut self) {
        self.path.pop();
    }

    fn reset(&mut self) {
        self.path.clear();
    }

    fn attempt_escape(&mut self) {
        if self.escape_available() {
            self.core.mark_solved();
        }
    }
}

impl Puzzle for IframeMaze {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        self.path.clear();
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        if let PuzzleInput::Select(choice) = input {
            match choice.as_str() {
                "back" => self.back(),
                "reset" => self.reset(),
                "escape" => self.attempt_escape(),
                portal => self.enter(portal),
            }
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
