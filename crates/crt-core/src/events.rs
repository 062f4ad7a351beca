//! Structured intent events emitted by the engine.
//!
//! The engine never mutates a display surface directly. It emits *intent*
//! ("switch to the glitch theme", "fire these effects") through an
//! [`EventSink`], and the presentation layer owns how each intent looks.
//! This keeps the state machine fully testable without a terminal.

use std::sync::Mutex;
use std::time::Duration;

use crate::effects::GlitchEffect;
use crate::state::Theme;

// ─────────────────────────────────────────────────────────────────────────────
// Event types
// ─────────────────────────────────────────────────────────────────────────────

/// Severity class of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    System,
    Success,
    Warning,
    Error,
    Victory,
}

/// Named sound cues. Playback is best-effort; failures are swallowed by the
/// presentation layer and never surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Glitch,
    Error,
    Success,
    Typing,
}

/// One effect within a burst, with its stagger offset from the burst start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaggeredEffect {
    pub effect: GlitchEffect,
    pub offset: Duration,
}

/// Everything the engine can ask the outside world to do.
#[derive(Clone, Debug, PartialEq)]
pub enum ChaosEvent {
    /// Show an auto-dismissing notification.
    Notification {
        message: String,
        kind: NotificationKind,
    },
    /// The active theme changed.
    ThemeChanged(Theme),
    /// Fire a layered batch of transient glitch effects.
    GlitchBurst(Vec<StaggeredEffect>),
    /// A brief screen flicker.
    Flicker,
    /// Clear any transient glitch styling immediately.
    ClearGlitches,
    /// Play a sound, best-effort.
    Sound(SoundCue),
    /// The chaos level changed; update any meter display.
    ChaosMeter(f64),
    /// Every registered puzzle is solved. Terminal.
    VictoryDeclared,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sinks
// ─────────────────────────────────────────────────────────────────────────────

/// Consumer of engine intent events.
///
/// Implementations must not call back into the engine from `emit`; events
/// are fire-and-forget from the engine's perspective.
pub trait EventSink {
    fn emit(&self, event: ChaosEvent);
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: ChaosEvent) {
        (**self).emit(event);
    }
}

/// Discards every event. Useful for headless tests of pure state behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ChaosEvent) {}
}

/// Buffers events for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ChaosEvent>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything emitted so far.
    pub fn take(&self) -> Vec<ChaosEvent> {
        self.events.lock().map(|mut g| std::mem::take(&mut *g)).unwrap_or_default()
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map(|g| g.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: ChaosEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_buffers_in_order() {
        let sink = CollectingSink::new();
        sink.emit(ChaosEvent::Flicker);
        sink.emit(ChaosEvent::ChaosMeter(4.0));

        let events = sink.take();
        assert_eq!(events, vec![ChaosEvent::Flicker, ChaosEvent::ChaosMeter(4.0)]);
        assert!(sink.is_empty());
    }

    #[test]
    fn null_sink_discards() {
        // Just exercising the path; nothing observable to assert.
        NullSink.emit(ChaosEvent::VictoryDeclared);
    }

    #[test]
    fn arc_sink_forwards() {
        let sink = std::sync::Arc::new(CollectingSink::new());
        sink.emit(ChaosEvent::Flicker);
        assert_eq!(sink.len(), 1);
    }
}
