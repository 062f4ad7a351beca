//! Load-order-independent puzzle discovery.
//!
//! Puzzle modules construct themselves independently and may finish loading
//! before or after the engine exists. Instead of polling a global for
//! readiness, modules deposit a named constructor into a [`PuzzleBay`];
//! once the engine is constructed, [`register_all`] drains the bay and
//! registers everything, injecting an [`EngineHandle`] into each puzzle.
//!
//! A bounded [`Watchdog`] covers the stragglers: a module that deposits
//! late is picked up on one of at most [`WATCHDOG_MAX_CHECKS`] periodic
//! re-checks. Discovery therefore tolerates any load order without an
//! unbounded retry loop.
//!
//! A constructor that panics is isolated: the failure is logged and every
//! other puzzle still registers.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::engine::ChaosEngine;
use crate::puzzle::{EngineHandle, Puzzle};

/// Upper bound on watchdog re-checks. After this many, missing puzzles stay
/// missing until a reload.
pub const WATCHDOG_MAX_CHECKS: u32 = 10;

/// Interval between watchdog checks.
pub const WATCHDOG_INTERVAL: Duration = Duration::from_millis(500);

/// A deferred puzzle constructor, run once the engine exists.
pub type PuzzleCtor = Box<dyn FnOnce(EngineHandle) -> Box<dyn Puzzle>>;

// ─────────────────────────────────────────────────────────────────────────────
// Bay
// ─────────────────────────────────────────────────────────────────────────────

/// Deposit point for puzzle constructors, independent of load order.
#[derive(Default)]
pub struct PuzzleBay {
    ctors: Vec<(String, PuzzleCtor)>,
}

impl PuzzleBay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a constructor under a stable id.
    ///
    /// Depositing the same id twice is tolerated; the engine de-duplicates
    /// at registration.
    pub fn deposit(
        &mut self,
        id: impl Into<String>,
        ctor: impl FnOnce(EngineHandle) -> Box<dyn Puzzle> + 'static,
    ) {
        let id = id.into();
        tracing::debug!(puzzle = %id, "puzzle deposited for registration");
        self.ctors.push((id, Box::new(ctor)));
    }

    /// Number of constructors waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ctors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ctors.is_empty()
    }
}

impl std::fmt::Debug for PuzzleBay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleBay")
            .field("pending", &self.ctors.len())
            .finish()
    }
}

/// Drain the bay, constructing and registering every deposited puzzle.
///
/// Each constructor runs isolated: one panicking module is logged and
/// skipped without aborting the rest or the engine's own initialization.
/// Returns the number of puzzles successfully registered by this call.
pub fn register_all(bay: &mut PuzzleBay, engine: &mut ChaosEngine) -> usize {
    let mut registered = 0;
    for (id, ctor) in bay.ctors.drain(..) {
        if engine.is_registered(&id) {
            continue;
        }
        let handle = engine.handle();
        match panic::catch_unwind(AssertUnwindSafe(move || ctor(handle))) {
            Ok(puzzle) => {
                engine.register_puzzle(&id, puzzle);
                registered += 1;
            }
            Err(_) => {
                tracing::error!(puzzle = %id, "puzzle bootstrap panicked, skipping");
            }
        }
    }
    registered
}

// ─────────────────────────────────────────────────────────────────────────────
// Watchdog
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of one watchdog poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchdogVerdict {
    /// Not due yet, or already finished.
    Idle,
    /// Re-checked; some puzzles are still missing.
    Missing(usize),
    /// Every expected puzzle is registered; the watchdog disarmed itself.
    Complete,
    /// No checks remaining and puzzles still missing. Disarmed.
    Exhausted,
}

/// Bounded registration watchdog, deliberately independent of the engine's
/// own timer set: it must keep checking even if engine scheduling is torn
/// down mid-bootstrap.
#[derive(Debug)]
pub struct Watchdog {
    expected: usize,
    checks_left: u32,
    next_check: Instant,
    done: bool,
}

impl Watchdog {
    /// Watchdog expecting `expected` registered puzzles.
    #[must_use]
    pub fn new(expected: usize, now: Instant) -> Self {
        Self {
            expected,
            checks_left: WATCHDOG_MAX_CHECKS,
            next_check: now + WATCHDOG_INTERVAL,
            done: expected == 0,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// If a check is due, compare the registry against the expected count
    /// and force another registration pass for anything missing.
    pub fn poll(
        &mut self,
        bay: &mut PuzzleBay,
        engine: &mut ChaosEngine,
        now: Instant,
    ) -> WatchdogVerdict {
        if self.done || now < self.next_check {
            return WatchdogVerdict::Idle;
        }
        self.next_check = now + WATCHDOG_INTERVAL;
        self.checks_left -= 1;

        if engine.registry_len() < self.expected {
            register_all(bay, engine);
        }
        let missing = self.expected.saturating_sub(engine.registry_len());
        if missing == 0 {
            self.done = true;
            tracing::debug!("all puzzles registered, watchdog disarmed");
            return WatchdogVerdict::Complete;
        }
        if self.checks_left == 0 {
            self.done = true;
            tracing::warn!(missing, "watchdog exhausted with puzzles missing");
            return WatchdogVerdict::Exhausted;
        }
        tracing::debug!(missing, checks_left = self.checks_left, "puzzles still missing");
        WatchdogVerdict::Missing(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::progress::MemoryProgress;
    use crate::puzzle::{PuzzleCore, PuzzleInput};

    struct BayPuzzle {
        core: PuzzleCore,
    }

    impl BayPuzzle {
        fn build(id: &'static str, handle: EngineHandle) -> Box<dyn Puzzle> {
            Box::new(Self {
                core: PuzzleCore::new(id, handle),
            })
        }
    }

    impl Puzzle for BayPuzzle {
        fn id(&self) -> &str {
            self.core.id()
        }
        fn activate(&mut self) {
            self.core.begin_run();
        }
        fn handle(&mut self, _input: PuzzleInput) {}
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

    fn fresh_engine(now: Instant) -> ChaosEngine {
        ChaosEngine::with_seed(
            Box::new(MemoryProgress::new()),
            Box::new(NullSink),
            7,
            now,
        )
    }

    #[test]
    fn register_all_drains_the_bay() {
        let now = Instant::now();
        let mut engine = fresh_engine(now);
        let mut bay = PuzzleBay::new();
        bay.deposit("drunk-nav", |h| BayPuzzle::build("drunk-nav", h));
        bay.deposit("mime-modal", |h| BayPuzzle::build("mime-modal", h));

        assert_eq!(register_all(&mut bay, &mut engine), 2);
        assert!(bay.is_empty());
        assert_eq!(engine.registry_len(), 2);
        assert!(engine.is_registered("drunk-nav"));
    }

    #[test]
    fn panicking_constructor_does_not_poison_the_rest() {
        let now = Instant::now();
        let mut engine = fresh_engine(now);
        let mut bay = PuzzleBay::new();
        bay.deposit("broken", |_h| -> Box<dyn Puzzle> {
            panic!("constructor bug");
        });
        bay.deposit("survivor", |h| BayPuzzle::build("survivor", h));

        assert_eq!(register_all(&mut bay, &mut engine), 1);
        assert!(!engine.is_registered("broken"));
        assert!(engine.is_registered("survivor"));
    }

    #[test]
    fn duplicate_deposit_registers_once() {
        let now = Instant::now();
        let mut engine = fresh_engine(now);
        let mut bay = PuzzleBay::new();
        bay.deposit("twin", |h| BayPuzzle::build("twin", h));
        bay.deposit("twin", |h| BayPuzzle::build("twin", h));

        register_all(&mut bay, &mut engine);
        assert_eq!(engine.registry_len(), 1);
    }

    #[test]
    fn watchdog_picks_up_late_deposit() {
        let now = Instant::now();
        let mut engine = fresh_engine(now);
        let mut bay = PuzzleBay::new();
        bay.deposit("early", |h| BayPuzzle::build("early", h));
        register_all(&mut bay, &mut engine);

        let mut watchdog = Watchdog::new(2, now);
        assert_eq!(watchdog.poll(&mut bay, &mut engine, now), WatchdogVerdict::Idle);

        let t1 = now + WATCHDOG_INTERVAL;
        assert_eq!(
            watchdog.poll(&mut bay, &mut engine, t1),
            WatchdogVerdict::Missing(1)
        );

        // The slow module finally deposits.
        bay.deposit("late", |h| BayPuzzle::build("late", h));
        let t2 = t1 + WATCHDOG_INTERVAL;
        assert_eq!(
            watchdog.poll(&mut bay, &mut engine, t2),
            WatchdogVerdict::Complete
        );
        assert!(watchdog.is_done());
        assert!(engine.is_registered("late"));
    }

    #[test]
    fn watchdog_is_bounded() {
        let now = Instant::now();
        let mut engine = fresh_engine(now);
        let mut bay = PuzzleBay::new();
        let mut watchdog = Watchdog::new(1, now);

        let mut t = now;
        let mut verdicts = Vec::new();
        for _ in 0..WATCHDOG_MAX_CHECKS + 5 {
            t += WATCHDOG_INTERVAL;
            verdicts.push(watchdog.poll(&mut bay, &mut engine, t));
        }

        let exhausted = verdicts
            .iter()
            .filter(|v| **v == WatchdogVerdict::Exhausted)
            .count();
        assert_eq!(exhausted, 1, "exactly one exhaustion, then idle");
        assert!(watchdog.is_done());
        assert_eq!(*verdicts.last().unwrap(), WatchdogVerdict::Idle);
    }

    #[test]
    fn watchdog_with_nothing_expected_is_done() {
        let now = Instant::now();
        let mut engine = fresh_engine(now);
        let mut bay = PuzzleBay::new();
        let mut watchdog = Watchdog::new(0, now);
        assert!(watchdog.is_done());
        assert_eq!(
            watchdog.poll(&mut bay, &mut engine, now + WATCHDOG_INTERVAL),
            WatchdogVerdict::Idle
        );
    }
}
