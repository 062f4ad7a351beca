//! A navigation menu that is drunk. Only the sobriety test sobers it up;
//! everything else (including hovering near it) makes things worse.

use crt_core::{EngineHandle, Meter, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "drunk-nav";

pub const MENU_ITEMS: [&str; 5] = ["home", "about", "contact", "blog", "sobriety-test"];

const MAX_DRUNKENNESS: f64 = 10.0;
const SOBRIETY_STEP: f64 = 1.0;
const WOBBLE: f64 = 0.5;

pub struct DrunkNav {
    core: PuzzleCore,
    drunkenness: Meter,
    click_attempts: u32,
}

impl DrunkNav {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            drunkenness: Meter::new(MAX_DRUNKENNESS, MAX_DRUNKENNESS),
            click_attempts: 0,
        }
    }

    #[must_use]
    pub fn drunkenness(&self) -> f64 {
        self.drunkenness.value()
    }

    /// Blood-alcohol reading shown in the menu header.
    #[must_use]
    pub fn bac(&self) -> f64 {
        0.08 * self.drunkenness.fraction()
    }

    #[must_use]
    pub fn click_attempts(&self) -> u32 {
        self.click_attempts
    }

    fn click(&mut self, item: &str) {
        self.click_attempts += 1;
        if item == "sobriety-test" {
            self.drunkenness.lower(SOBRIETY_STEP);
            tracing::debug!(level = self.drunkenness.value(), "sobriety test step passed");
            if self.drunkenness.is_empty() {
                self.core.mark_solved();
            }
        } else {
            // Wrong item; the menu celebrates with another drink.
            self.drunkenness.raise(WOBBLE);
        }
    }
}

impl Puzzle for DrunkNav {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        self.drunkenness.set(MAX_DRUNKENNESS);
        self.click_attempts = 0;
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        match input {
            PuzzleInput::Select(item) => self.click(&item),
            // Hovering over the swaying menu jostles it.
            PuzzleInput::Tick => {
                self.drunkenness.raise(WOBBLE);
            }
            PuzzleInput::Text(_) => {}
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

#[cfg(test)]
mod tests {
    use super::*;
    use crt_core::{PuzzleReport, ReportKind};
    use std::sync::mpsc;

    fn harness() -> (DrunkNav, mpsc::Receiver<PuzzleReport>) {
        let (handle, rx) = EngineHandle::channel();
        let mut puzzle = DrunkNav::new(handle);
        puzzle.activate();
        (puzzle, rx)
    }

    #[test]
    fn sobriety_steps_drain_the_meter_to_a_solve() {
        let (mut puzzle, rx) = harness();
        for _ in 0..10 {
            puzzle.handle(PuzzleInput::Select("sobriety-test".into()));
        }
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.drunkenness(), 0.0);
        assert_eq!(rx.try_recv().unwrap().kind, ReportKind::Solved);
    }

    #[test]
    fn wrong_clicks_and_hovering_set_progress_back() {
        let (mut puzzle, _rx) = harness();
        puzzle.handle(PuzzleInput::Select("sobriety-test".into()));
        puzzle.handle(PuzzleInput::Select("sobriety-test".into()));
        assert_eq!(puzzle.drunkenness(), 8.0);

        puzzle.handle(PuzzleInput::Select("home".into()));
        puzzle.handle(PuzzleInput::Tick);
        assert_eq!(puzzle.drunkenness(), 9.0);
    }

    #[test]
    fn drunkenness_is_capped() {
        let (mut puzzle, _rx) = harness();
        for _ in 0..5 {
            puzzle.handle(PuzzleInput::Tick);
        }
        assert_eq!(puzzle.drunkenness(), MAX_DRUNKENNESS);
        assert!((puzzle.bac() - 0.08).abs() < 1e-9);
    }

    #[test]
    fn solved_menu_stops_reacting() {
        let (mut puzzle, rx) = harness();
        for _ in 0..10 {
            puzzle.handle(PuzzleInput::Select("sobriety-test".into()));
        }
        puzzle.handle(PuzzleInput::Tick);
        assert_eq!(puzzle.drunkenness(), 0.0);

        let solved = rx
            .try_iter()
            .filter(|r| r.kind == ReportKind::Solved)
            .count();
        assert_eq!(solved, 1);
    }

    #[test]
    fn reactivation_pours_another_round() {
        let (mut puzzle, _rx) = harness();
        for _ in 0..4 {
            puzzle.handle(PuzzleInput::Select("sobriety-test".into()));
        }
        puzzle.activate();
        assert_eq!(puzzle.drunkenness(), MAX_DRUNKENNESS);
        assert_eq!(puzzle.click_attempts(), 0);
    }
}
