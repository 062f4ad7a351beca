//! A modal that refuses to use words. It only understands gestures, and
//! only the right four-gesture sequence convinces it to open the door.

use crt_core::{EngineHandle, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "mime-modal";

/// Wave, door, unlock, celebrate.
pub const ESCAPE_SEQUENCE: [&str; 4] = ["👋", "🚪", "🔓", "🎉"];

/// Gestures the player can offer.
pub const GESTURES: [&str; 10] = ["👋", "👍", "👎", "🤝", "🚪", "🔓", "❓", "🎉", "🤐", "🎭"];

/// Only the most recent gestures count; older ones are forgotten.
const MEMORY_WINDOW: usize = 6;

pub struct MimeModal {
    core: PuzzleCore,
    gestures: Vec<String>,
}

impl MimeModal {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            gestures: Vec::new(),
        }
    }

    /// The gestures still in the mime's memory, oldest first.
    #[must_use]
    pub fn recent_gestures(&self) -> &[String] {
        &self.gestures
    }

    /// How much of the escape sequence the latest gestures already form.
    #[must_use]
    pub fn progress(&self) -> usize {
        (1..=ESCAPE_SEQUENCE.len().min(self.gestures.len()))
            .rev()
            .find(|&n| {
                self.gestures[self.gestures.len() - n..]
                    .iter()
                    .zip(&ESCAPE_SEQUENCE[..n])
                    .all(|(got, want)| got == want)
            })
            .unwrap_or(0)
    }

    fn gesture(&mut self, emoji: &str) {
        if !GESTURES.contains(&emoji) {
            return;
        }
        self.gestures.push(emoji.to_string());
        if self.gestures.len() > MEMORY_WINDOW {
            self.gestures.remove(0);
        }
        let n = ESCAPE_SEQUENCE.len();
        let done = self.gestures.len() >= n
            && self.gestures[self.gestures.len() - n..]
                .iter()
                .zip(&ESCAPE_SEQUENCE)
                .all(|(got, want)| got == want);
        if done {
            self.core.mark_solved();
        }
    }
}

impl Puzzle for MimeModal {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        self.gestures.clear();
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        if let PuzzleInput::Select(emoji) = input {
            self.gesture(&emoji);
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
