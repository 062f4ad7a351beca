//! Core chaos engine: level tracking, glitch scheduling, puzzle lifecycle,
//! and progress persistence for a deliberately unstable terminal experience.
//!
//! The engine is the single owner of session-wide state. Everything else is
//! decoupled behind narrow seams:
//!
//! - Puzzles implement [`Puzzle`] and talk back only through an
//!   [`EngineHandle`] (one-way solved/chaos reports, drained on tick).
//! - Presentation consumes [`ChaosEvent`] intents through an [`EventSink`];
//!   the engine never touches a screen.
//! - Persistence goes through [`ProgressStore`]; a corrupt or missing save
//!   degrades to a fresh session, never to an error the user sees.
//!
//! All timing is poll-driven from a single thread: callers pass `now` into
//! [`ChaosEngine::tick`] and the engine fires whatever is due. There are no
//! background threads and no blocking waits, which also makes every
//! scheduling path testable with synthetic clocks.
//!
//! # Design Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Chaos level stays in `[1.0, 10.0]` | clamps in [`state`] |
//! | Solving is idempotent | engine + [`PuzzleCore`] dedupe |
//! | Victory declared at most once per session | `is_stable` latch |
//! | Teardown cancels exhaustively | [`TimerSet::cancel_class`]/`cancel_all` |
//! | Corrupt saves never propagate errors | [`ProgressStore::load`] contract |

#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod effects;
pub mod engine;
pub mod events;
pub mod progress;
pub mod puzzle;
pub mod state;
pub mod timers;

pub use bootstrap::{PuzzleBay, Watchdog, WatchdogVerdict, register_all};
pub use effects::{GlitchEffect, GlitchPicker};
pub use engine::ChaosEngine;
pub use events::{
    ChaosEvent, CollectingSink, EventSink, NotificationKind, NullSink, SoundCue, StaggeredEffect,
};
pub use progress::{
    FileProgress, MemoryProgress, ProgressStore, SavedProgress, StorageError, StorageResult,
};
pub use puzzle::{EngineHandle, Meter, Puzzle, PuzzleCore, PuzzleInput, PuzzleReport, ReportKind};
pub use state::{ChaosState, Theme};
pub use timers::{Firing, TimerClass, TimerHandle, TimerSet};
