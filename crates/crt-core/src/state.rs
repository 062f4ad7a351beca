//! Engine-owned chaos state and the visual theme set.
//!
//! [`ChaosState`] is the only mutable shared state in the system. It is owned
//! exclusively by the [`ChaosEngine`]; puzzles read it only through the
//! engine's public methods and write it only by reporting through an
//! [`EngineHandle`].
//!
//! # State machine
//!
//! ```text
//! Active(level, theme) ──solve/chaos-change──▶ Active(level', theme')
//! Active ──all registered puzzles solved──▶ Stable   (one-way)
//! Stable ──emergency reset──▶ Active(baseline)       (the only way back)
//! ```
//!
//! # Invariants
//!
//! 1. `chaos_level` stays within `[0, MAX_CHAOS]` at all times.
//! 2. After any solve, the level never drops below `SOLVED_FLOOR` until
//!    victory, at which point it is forced to exactly 0.
//! 3. `is_stable` transitions `false -> true` at most once per session.
//! 4. A fresh session always starts at a non-zero baseline.
//!
//! [`ChaosEngine`]: crate::engine::ChaosEngine
//! [`EngineHandle`]: crate::puzzle::EngineHandle

use std::collections::BTreeSet;
use std::fmt;

use crate::progress::SavedProgress;

// ─────────────────────────────────────────────────────────────────────────────
// Tuning constants
// ─────────────────────────────────────────────────────────────────────────────

/// Chaos level on a fresh session. The page opens already chaotic.
pub const BASELINE_CHAOS: f64 = 3.0;

/// Upper bound for the chaos level.
pub const MAX_CHAOS: f64 = 10.0;

/// How much one puzzle solve reduces the chaos level.
pub const SOLVE_DECREMENT: f64 = 1.0;

/// The floor a solve can reach while any registered puzzle remains unsolved.
pub const SOLVED_FLOOR: f64 = 1.0;

/// How much `calm_down` reduces the chaos level.
pub const CALM_DECREMENT: f64 = 1.5;

/// The floor for `calm_down`. Total calm is impossible short of victory.
pub const CALM_FLOOR: f64 = 2.0;

/// Default amount for chaos increases that do not specify one.
pub const DEFAULT_CHAOS_INCREASE: f64 = 0.5;

/// Above this level the screen-flicker scheduler becomes eligible.
pub const FLICKER_THRESHOLD: f64 = 5.0;

/// Above this level the theme-switch scheduler becomes eligible.
pub const THEME_SWITCH_THRESHOLD: f64 = 7.0;

// ─────────────────────────────────────────────────────────────────────────────
// Themes
// ─────────────────────────────────────────────────────────────────────────────

/// The fixed set of visual themes. Exactly one is active at a time.
///
/// The engine emits *which* theme is active; how a theme looks is owned by
/// the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Normal,
    Inverted,
    Monochrome,
    Glitch,
    Matrix,
}

impl Theme {
    /// All themes, in a fixed order.
    pub const ALL: [Theme; 5] = [
        Theme::Normal,
        Theme::Inverted,
        Theme::Monochrome,
        Theme::Glitch,
        Theme::Matrix,
    ];

    /// Stable lowercase name, used for display and logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Theme::Normal => "normal",
            Theme::Inverted => "inverted",
            Theme::Monochrome => "monochrome",
            Theme::Glitch => "glitch",
            Theme::Matrix => "matrix",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ChaosState
// ─────────────────────────────────────────────────────────────────────────────

/// Global instability state, owned exclusively by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ChaosState {
    /// Scalar instability metric in `[0, MAX_CHAOS]`.
    pub chaos_level: f64,
    /// Identifiers of solved puzzles. Membership is idempotent; insertion
    /// order is irrelevant.
    pub solved: BTreeSet<String>,
    /// The currently active visual theme.
    pub theme: Theme,
    /// Terminal victory flag. One-way within a session.
    pub is_stable: bool,
}

impl ChaosState {
    /// Fresh-session state: baseline chaos, nothing solved, default theme.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            chaos_level: BASELINE_CHAOS,
            solved: BTreeSet::new(),
            theme: Theme::default(),
            is_stable: false,
        }
    }

    /// Rebuild state from persisted progress.
    ///
    /// The stored level is clamped into `[BASELINE_CHAOS, MAX_CHAOS]`: a
    /// reopened session always starts with at least baseline chaos, and a
    /// stored value outside the valid range (hand-edited or stale) is pulled
    /// back in rather than rejected.
    #[must_use]
    pub fn from_saved(saved: &SavedProgress) -> Self {
        let level = if saved.chaos_level.is_finite() {
            saved.chaos_level.clamp(BASELINE_CHAOS, MAX_CHAOS)
        } else {
            BASELINE_CHAOS
        };
        Self {
            chaos_level: level,
            solved: saved.solved_puzzles.iter().cloned().collect(),
            theme: Theme::default(),
            is_stable: false,
        }
    }

    /// Raise the chaos level by `amount`, clamped to `MAX_CHAOS`.
    ///
    /// Returns the resulting level.
    pub fn raise(&mut self, amount: f64) -> f64 {
        self.chaos_level = (self.chaos_level + amount).min(MAX_CHAOS);
        self.chaos_level
    }

    /// Lower the chaos level by `amount`, clamped to `floor`.
    ///
    /// Returns the resulting level.
    pub fn lower(&mut self, amount: f64, floor: f64) -> f64 {
        self.chaos_level = (self.chaos_level - amount).max(floor);
        self.chaos_level
    }

    /// Record a solved puzzle id. Returns `false` if it was already solved.
    pub fn record_solved(&mut self, id: &str) -> bool {
        self.solved.insert(id.to_string())
    }

    /// Enter the terminal Stable state: level forced to 0, flag latched.
    pub fn stabilize(&mut self) {
        self.is_stable = true;
        self.chaos_level = 0.0;
    }
}

impl Default for ChaosState {
    fn default() -> Self {
        Self::baseline()
    }
}
