//! The puzzle contract and the shared lifecycle plumbing every puzzle
//! parameterizes.
//!
//! A puzzle is an independent interactive widget with its own internal
//! progress state and exactly one outward coupling point: the one-way
//! "I am solved" report through an [`EngineHandle`]. The engine never reads
//! or mutates puzzle internals.
//!
//! # Lifecycle
//!
//! - `activate()` — (re)open the puzzle. Must be safe to call repeatedly:
//!   re-opening resets the run state instead of double-arming anything.
//! - `handle(input)` — drive the internal state machine.
//! - `close()` — tear down, clearing all of the puzzle's own pending work
//!   before its surface is hidden. Leaked timers are a defect prevented by
//!   construction here, not something the engine can recover from.

use std::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────────────
// Reports: puzzle -> engine
// ─────────────────────────────────────────────────────────────────────────────

/// What a puzzle can tell the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportKind {
    /// The puzzle reached its terminal state.
    Solved,
    /// The user did something destabilizing; raise chaos by this much.
    ChaosDelta(f64),
}

/// A one-way signal from a puzzle, drained by the engine on its next tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PuzzleReport {
    pub id: String,
    pub kind: ReportKind,
}

/// Clonable reporting handle given to each puzzle at registration time.
///
/// This replaces ambient global access: the engine is constructed
/// explicitly and injects the handle, preserving single-instance-per-session
/// semantics without shared mutable globals.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    tx: mpsc::Sender<PuzzleReport>,
}

impl EngineHandle {
    pub(crate) fn new(tx: mpsc::Sender<PuzzleReport>) -> Self {
        Self { tx }
    }

    /// A handle whose reports go nowhere. For tests of puzzle internals.
    #[must_use]
    pub fn detached() -> Self {
        let (tx, _rx) = mpsc::channel();
        Self { tx }
    }

    /// A handle paired with the receiving end of its reports, for asserting
    /// on what a puzzle sends without standing up a full engine.
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<PuzzleReport>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Report a terminal solve for `id`.
    pub fn report_solved(&self, id: &str) {
        self.send(PuzzleReport {
            id: id.to_string(),
            kind: ReportKind::Solved,
        });
    }

    /// Ask the engine to raise chaos by `amount`.
    pub fn raise_chaos(&self, id: &str, amount: f64) {
        self.send(PuzzleReport {
            id: id.to_string(),
            kind: ReportKind::ChaosDelta(amount),
        });
    }

    fn send(&self, report: PuzzleReport) {
        // A dropped engine just means the session is over; nothing to do.
        if self.tx.send(report).is_err() {
            tracing::debug!("engine gone, puzzle report dropped");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Contract
// ─────────────────────────────────────────────────────────────────────────────

/// Input a puzzle can receive from its surface.
#[derive(Clone, Debug, PartialEq)]
pub enum PuzzleInput {
    /// Free text (terminal command, search query, password attempt).
    Text(String),
    /// A named choice (menu item, gesture, clock face, maze door).
    Select(String),
    /// Time passing while the puzzle is open.
    Tick,
}

/// The capability set every puzzle module implements.
pub trait Puzzle {
    /// Stable unique key, used for persistence and completion lookup.
    fn id(&self) -> &str;

    /// Open the puzzle, resetting its run state. Idempotent-safe.
    fn activate(&mut self);

    /// Drive the internal state machine.
    fn handle(&mut self, input: PuzzleInput);

    /// Tear down: clear all pending scheduled work owned by this puzzle.
    fn close(&mut self);

    fn is_active(&self) -> bool;

    fn is_solved(&self) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared plumbing
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state common to every puzzle: identity, activation, the solved
/// terminal flag, and the reporting handle.
///
/// Guards against double-reporting on the puzzle side; the engine
/// de-duplicates as well (defense in depth).
#[derive(Debug)]
pub struct PuzzleCore {
    id: &'static str,
    active: bool,
    solved: bool,
    engine: EngineHandle,
}

impl PuzzleCore {
    #[must_use]
    pub fn new(id: &'static str, engine: EngineHandle) -> Self {
        Self {
            id,
            active: false,
            solved: false,
            engine,
        }
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Mark the start of a (re)activation.
    pub fn begin_run(&mut self) {
        self.active = true;
    }

    /// Mark the puzzle closed.
    pub fn end_run(&mut self) {
        self.active = false;
    }

    /// Reach the terminal state and report it, exactly once per session.
    ///
    /// Returns `true` the first time, `false` on every later call.
    pub fn mark_solved(&mut self) -> bool {
        if self.solved {
            return false;
        }
        self.solved = true;
        tracing::debug!(puzzle = self.id, "puzzle solved");
        self.engine.report_solved(self.id);
        true
    }

    /// Forward a destabilization to the engine.
    pub fn raise_chaos(&self, amount: f64) {
        self.engine.raise_chaos(self.id, amount);
    }
}

/// A bounded scalar progress metric (trust, suspicion, drunkenness, ...).
///
/// Each puzzle parameterizes one of these instead of reinventing the
/// clamp-and-compare plumbing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Meter {
    value: f64,
    max: f64,
}

impl Meter {
    /// A meter in `[0, max]` starting at `value` (clamped).
    #[must_use]
    pub fn new(value: f64, max: f64) -> Self {
        debug_assert!(max > 0.0);
        Self {
            value: value.clamp(0.0, max),
            max,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Fraction of the range filled, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.value / self.max
    }

    pub fn raise(&mut self, amount: f64) -> f64 {
        self.value = (self.value + amount).min(self.max);
        self.value
    }

    pub fn lower(&mut self, amount: f64) -> f64 {
        self.value = (self.value - amount).max(0.0);
        self.value
    }

    /// Reset to an arbitrary point in range.
    pub fn set(&mut self, value: f64) {
        self.value = value.clamp(0.0, self.max);
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }
}
