//! The chaos engine: global instability, the puzzle registry, and the
//! glitch/theme schedulers.
//!
//! The engine is constructed explicitly and passed by reference — there is
//! no ambient global. It owns [`ChaosState`] exclusively, drains one-way
//! puzzle reports on each [`tick`](ChaosEngine::tick), and emits structured
//! [`ChaosEvent`] intents for a presentation layer to render.
//!
//! # Scheduling
//!
//! The glitch scheduler re-arms itself recursively: each firing schedules
//! the next after a delay inversely proportional to the chaos level, inside
//! a jitter band. Crossing level 5 arms the flicker scheduler, crossing 7
//! arms theme switching — a one-way ratchet within a session: a later
//! decrease does not cancel them; only `calm_down`, `stop_all_glitches`,
//! victory, or a full reset do.
//!
//! # Atomicity
//!
//! `report_solved` runs its idempotency check, set insertion, persistence
//! write, and victory check as one logical unit; the single-threaded,
//! poll-driven design means nothing can observe the state in between.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::effects::GlitchPicker;
use crate::events::{ChaosEvent, EventSink, NotificationKind, SoundCue};
use crate::progress::{ProgressStore, SavedProgress};
use crate::puzzle::{EngineHandle, Puzzle, PuzzleReport, ReportKind};
use crate::state::{
    ChaosState, Theme, CALM_DECREMENT, CALM_FLOOR, FLICKER_THRESHOLD, SOLVED_FLOOR,
    SOLVE_DECREMENT, THEME_SWITCH_THRESHOLD,
};
use crate::timers::{TimerClass, TimerSet};

// ─────────────────────────────────────────────────────────────────────────────
// Scheduler pacing
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed lead before any glitch fires, below the jitter band.
const GLITCH_DELAY_BASE: Duration = Duration::from_secs(1);

/// Numerator of the inverse-proportional jitter cap: at level 1 the band is
/// ten seconds wide, at level 10 one second.
const GLITCH_DELAY_SPREAD_MS: f64 = 10_000.0;

/// Minimum delay between theme corruptions.
const THEME_DELAY_BASE: Duration = Duration::from_secs(10);

/// Jitter band on top of [`THEME_DELAY_BASE`].
const THEME_DELAY_SPREAD: Duration = Duration::from_secs(20);

/// Cadence of flicker rolls.
const FLICKER_INTERVAL: Duration = Duration::from_millis(160);

/// Chance that one flicker roll actually flickers.
const FLICKER_CHANCE: f64 = 0.05;

/// How long the system pretends to be calm after `calm_down`.
const CALM_REARM_DELAY: Duration = Duration::from_secs(3);

/// Pause before glitches resume after `stop_all_glitches`.
const STOP_REARM_DELAY: Duration = Duration::from_secs(5);

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Coordinates chaos state, the puzzle registry, and glitch scheduling for
/// one interactive session.
pub struct ChaosEngine {
    state: ChaosState,
    registry: BTreeMap<String, Box<dyn Puzzle>>,
    timers: TimerSet,
    store: Box<dyn ProgressStore>,
    sink: Box<dyn EventSink>,
    picker: GlitchPicker,
    reports_tx: mpsc::Sender<PuzzleReport>,
    reports_rx: mpsc::Receiver<PuzzleReport>,
}

impl ChaosEngine {
    /// Construct an engine, loading persisted progress.
    ///
    /// Corrupt or missing progress silently falls back to the baseline
    /// state; construction never fails. Schedulers appropriate to the
    /// loaded chaos level are armed immediately.
    #[must_use]
    pub fn new(store: Box<dyn ProgressStore>, sink: Box<dyn EventSink>, now: Instant) -> Self {
        Self::with_picker(store, sink, GlitchPicker::new(), now)
    }

    /// Like [`new`](Self::new) but with a seeded picker for deterministic
    /// effect selection.
    #[must_use]
    pub fn with_seed(
        store: Box<dyn ProgressStore>,
        sink: Box<dyn EventSink>,
        seed: u64,
        now: Instant,
    ) -> Self {
        Self::with_picker(store, sink, GlitchPicker::with_seed(seed), now)
    }

    fn with_picker(
        store: Box<dyn ProgressStore>,
        sink: Box<dyn EventSink>,
        picker: GlitchPicker,
        now: Instant,
    ) -> Self {
        let state = match store.load() {
            Ok(Some(saved)) => {
                tracing::debug!(
                    solved = saved.solved_puzzles.len(),
                    level = saved.chaos_level,
                    "restored chaos progress"
                );
                ChaosState::from_saved(&saved)
            }
            Ok(None) => ChaosState::baseline(),
            Err(e) => {
                tracing::warn!(error = %e, "progress load failed, starting at baseline");
                ChaosState::baseline()
            }
        };

        let (reports_tx, reports_rx) = mpsc::channel();
        let mut engine = Self {
            state,
            registry: BTreeMap::new(),
            timers: TimerSet::new(),
            store,
            sink,
            picker,
            reports_tx,
            reports_rx,
        };

        engine.sink.emit(ChaosEvent::ChaosMeter(engine.state.chaos_level));
        engine.arm_glitch(now);
        if engine.state.chaos_level > FLICKER_THRESHOLD {
            engine.arm_flicker(now);
        }
        if engine.state.chaos_level > THEME_SWITCH_THRESHOLD {
            engine.arm_theme(now);
        }
        tracing::debug!(level = engine.state.chaos_level, "chaos engine initialized");
        engine
    }

    // ── Introspection ───────────────────────────────────────────────────────

    #[must_use]
    pub fn chaos_level(&self) -> f64 {
        self.state.chaos_level
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.state.is_stable
    }

    #[must_use]
    pub fn registry_len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.contains_key(id)
    }

    #[must_use]
    pub fn is_solved(&self, id: &str) -> bool {
        self.state.solved.contains(id)
    }

    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.state.solved.len()
    }

    /// Registered puzzle ids not yet solved, in registry order.
    #[must_use]
    pub fn unsolved_ids(&self) -> Vec<String> {
        self.registry
            .keys()
            .filter(|id| !self.state.solved.contains(*id))
            .cloned()
            .collect()
    }

    /// Earliest outstanding timer deadline, for loop pacing.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// A reporting handle to inject into a puzzle at registration time.
    #[must_use]
    pub fn handle(&self) -> EngineHandle {
        EngineHandle::new(self.reports_tx.clone())
    }

    // ── Registry ────────────────────────────────────────────────────────────

    /// Insert a puzzle under `id`. Duplicate registration is a tolerated
    /// no-op — retry-based discovery may attempt the same id more than once.
    pub fn register_puzzle(&mut self, id: &str, puzzle: Box<dyn Puzzle>) {
        if self.registry.contains_key(id) {
            tracing::debug!(puzzle = id, "duplicate registration ignored");
            return;
        }
        tracing::debug!(puzzle = id, "puzzle registered");
        self.registry.insert(id.to_string(), puzzle);
    }

    /// Open a registered puzzle. Returns `false` for an unknown id.
    pub fn activate_puzzle(&mut self, id: &str) -> bool {
        match self.registry.get_mut(id) {
            Some(puzzle) => {
                puzzle.activate();
                true
            }
            None => false,
        }
    }

    /// Close a registered puzzle, tearing down its pending work.
    pub fn close_puzzle(&mut self, id: &str) -> bool {
        match self.registry.get_mut(id) {
            Some(puzzle) => {
                puzzle.close();
                true
            }
            None => false,
        }
    }

    /// Mutable access to a registered puzzle, for routing its input.
    pub fn puzzle_mut(&mut self, id: &str) -> Option<&mut dyn Puzzle> {
        match self.registry.get_mut(id) {
            Some(p) => Some(&mut **p),
            None => None,
        }
    }

    // ── Completion ──────────────────────────────────────────────────────────

    /// Record a puzzle completion.
    ///
    /// Idempotent: a second report for the same id changes nothing. An id
    /// that was never registered is still recorded, but victory detection
    /// compares against the registry, so it can never trigger victory.
    pub fn report_solved(&mut self, id: &str) {
        if self.state.is_stable || self.state.solved.contains(id) {
            return;
        }
        if !self.registry.contains_key(id) {
            tracing::warn!(puzzle = id, "solve reported for unregistered puzzle");
        }

        // One logical unit: insert, adjust, persist, check victory.
        self.state.record_solved(id);
        let level = self.state.lower(SOLVE_DECREMENT, SOLVED_FLOOR);
        self.persist();

        self.sink.emit(ChaosEvent::Sound(SoundCue::Success));
        self.notify(format!("SYSTEM STABILIZED: {id}"), NotificationKind::Success);
        self.sink.emit(ChaosEvent::ChaosMeter(level));
        tracing::debug!(puzzle = id, level, "puzzle completion recorded");

        let all_solved = !self.registry.is_empty()
            && self.registry.keys().all(|k| self.state.solved.contains(k));
        if all_solved {
            self.victory();
        }
    }

    /// Raise the chaos level, arming escalation schedulers past their
    /// thresholds. No-op once stable.
    pub fn increase_chaos(&mut self, amount: f64, now: Instant) {
        if self.state.is_stable {
            return;
        }
        let level = self.state.raise(amount);
        self.sink.emit(ChaosEvent::ChaosMeter(level));
        tracing::debug!(level, amount, "chaos increased");

        if level > FLICKER_THRESHOLD {
            self.arm_flicker(now);
        }
        if level > THEME_SWITCH_THRESHOLD {
            self.arm_theme(now);
        }
    }

    // ── Recovery controls ───────────────────────────────────────────────────

    /// Reduce chaos toward the calm floor and pause glitches — briefly.
    ///
    /// The floor is deliberately above zero: total calm is impossible short
    /// of solving everything. Scheduling resumes on its own after a short
    /// delay; the system resists being calmed.
    pub fn calm_down(&mut self, now: Instant) {
        if self.state.is_stable {
            return;
        }
        let level = self.state.lower(CALM_DECREMENT, CALM_FLOOR);
        self.cancel_glitch_family();
        self.sink.emit(ChaosEvent::ClearGlitches);
        self.notify(
            "Taking deep breaths... chaos reduced slightly",
            NotificationKind::Success,
        );
        self.notify("But the chaos never truly stops...", NotificationKind::Warning);
        self.sink.emit(ChaosEvent::ChaosMeter(level));
        self.timers.schedule(TimerClass::Rearm, now + CALM_REARM_DELAY);
        tracing::debug!(level, "calm down");
    }

    /// Cancel all pending glitch-family timers and clear transient glitch
    /// state. If chaos remains above zero, scheduling re-arms after a delay.
    pub fn stop_all_glitches(&mut self, now: Instant) {
        self.cancel_glitch_family();
        self.sink.emit(ChaosEvent::ClearGlitches);
        self.notify("All glitches stopped", NotificationKind::Success);
        if !self.state.is_stable && self.state.chaos_level > 0.0 {
            self.timers.schedule(TimerClass::Rearm, now + STOP_REARM_DELAY);
        }
    }

    /// Full reset: the system's only "get unstuck" guarantee.
    ///
    /// Destructive — callers must obtain explicit confirmation before
    /// invoking. Clears persisted and in-memory progress, returns the level
    /// to baseline (never zero), resets the theme, and re-enters `Active`
    /// even from the Stable state.
    pub fn emergency_reset(&mut self, now: Instant) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted progress");
        }
        self.state = ChaosState::baseline();
        self.timers.cancel_all();

        self.sink.emit(ChaosEvent::ClearGlitches);
        self.sink.emit(ChaosEvent::ThemeChanged(self.state.theme));
        self.sink.emit(ChaosEvent::ChaosMeter(self.state.chaos_level));
        self.notify(
            "EMERGENCY RESET COMPLETE — chaos restored to baseline",
            NotificationKind::System,
        );
        self.arm_glitch(now);
        tracing::info!("emergency reset");
    }

    // ── Tick ────────────────────────────────────────────────────────────────

    /// Drain puzzle reports, then fire every due timer.
    ///
    /// Call regularly from the event loop with the current instant; tests
    /// pass synthetic instants to step time deterministically.
    pub fn tick(&mut self, now: Instant) {
        self.drain_reports(now);
        for firing in self.timers.poll(now) {
            if self.state.is_stable {
                break;
            }
            match firing.class {
                TimerClass::Glitch => {
                    let burst = self.picker.pick_burst(self.state.chaos_level);
                    self.sink.emit(ChaosEvent::GlitchBurst(burst));
                    self.sink.emit(ChaosEvent::Sound(SoundCue::Glitch));
                    self.arm_glitch(now);
                }
                TimerClass::ThemeSwitch => {
                    self.switch_theme();
                    self.arm_theme(now);
                }
                TimerClass::Flicker => {
                    if self.picker.chance(FLICKER_CHANCE) {
                        self.sink.emit(ChaosEvent::Flicker);
                    }
                    self.arm_flicker(now);
                }
                TimerClass::Rearm => {
                    self.notify("The chaos returns...", NotificationKind::Error);
                    self.arm_glitch(now);
                }
            }
        }
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn drain_reports(&mut self, now: Instant) {
        // Collect first: handling a report needs &mut self.
        let pending: Vec<PuzzleReport> = self.reports_rx.try_iter().collect();
        for report in pending {
            match report.kind {
                ReportKind::Solved => self.report_solved(&report.id),
                ReportKind::ChaosDelta(amount) => self.increase_chaos(amount, now),
            }
        }
    }

    fn victory(&mut self) {
        self.state.stabilize();
        self.timers.cancel_all();
        self.persist();
        self.sink.emit(ChaosEvent::ClearGlitches);
        self.sink.emit(ChaosEvent::ChaosMeter(0.0));
        self.sink.emit(ChaosEvent::VictoryDeclared);
        self.notify(
            "SYSTEM FULLY STABILIZED — YOU WIN!",
            NotificationKind::Victory,
        );
        tracing::info!("victory: all registered puzzles solved");
    }

    fn switch_theme(&mut self) {
        let options: Vec<Theme> = Theme::ALL
            .into_iter()
            .filter(|t| *t != self.state.theme)
            .collect();
        let Some(next) = self.picker.choose(&options).copied() else {
            return;
        };
        self.state.theme = next;
        self.sink.emit(ChaosEvent::ThemeChanged(next));
        self.sink.emit(ChaosEvent::Sound(SoundCue::Glitch));
        self.notify(
            format!("THEME CORRUPTION: {} MODE", next.name().to_uppercase()),
            NotificationKind::Warning,
        );
    }

    fn persist(&mut self) {
        let progress = SavedProgress {
            solved_puzzles: self.state.solved.iter().cloned().collect(),
            chaos_level: self.state.chaos_level,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        // Write-through; a failed save degrades to an in-memory session.
        if let Err(e) = self.store.save(&progress) {
            tracing::warn!(error = %e, "progress save failed");
        }
    }

    fn notify(&self, message: impl Into<String>, kind: NotificationKind) {
        self.sink.emit(ChaosEvent::Notification {
            message: message.into(),
            kind,
        });
    }

    fn cancel_glitch_family(&mut self) {
        self.timers.cancel_class(TimerClass::Glitch);
        self.timers.cancel_class(TimerClass::Flicker);
        self.timers.cancel_class(TimerClass::ThemeSwitch);
        self.timers.cancel_class(TimerClass::Rearm);
    }

    fn arm_glitch(&mut self, now: Instant) {
        if self.state.is_stable || self.timers.count_class(TimerClass::Glitch) > 0 {
            return;
        }
        let spread_ms = GLITCH_DELAY_SPREAD_MS / self.state.chaos_level.max(1.0);
        let delay = self
            .picker
            .jittered(GLITCH_DELAY_BASE, Duration::from_millis(spread_ms as u64));
        self.timers.schedule(TimerClass::Glitch, now + delay);
    }

    fn arm_theme(&mut self, now: Instant) {
        if self.state.is_stable || self.timers.count_class(TimerClass::ThemeSwitch) > 0 {
            return;
        }
        let delay = self.picker.jittered(THEME_DELAY_BASE, THEME_DELAY_SPREAD);
        self.timers.schedule(TimerClass::ThemeSwitch, now + delay);
    }

    fn arm_flicker(&mut self, now: Instant) {
        if self.state.is_stable || self.timers.count_class(TimerClass::Flicker) > 0 {
            return;
        }
        self.timers.schedule(TimerClass::Flicker, now + FLICKER_INTERVAL);
    }

    #[cfg(test)]
    fn timers(&self) -> &TimerSet {
        &self.timers
    }
}

impl std::fmt::Debug for ChaosEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaosEngine")
            .field("level", &self.state.chaos_level)
            .field("theme", &self.state.theme)
            .field("stable", &self.state.is_stable)
            .field("registered", &self.registry.len())
            .field("solved", &self.state.solved.len())
            .field("timers", &self.timers.len())
            .finish()
    }
}
