//! Cancellable timer bookkeeping for the engine's schedulers.
//!
//! All waiting in the system is expressed as scheduled deadlines polled from
//! a single thread; nothing blocks. Every timer is tracked by handle and
//! class so teardown paths (`calm_down`, `stop_all_glitches`, victory,
//! emergency reset) can cancel *exhaustively* rather than selectively — a
//! timer firing after its owner was torn down is the bug class this module
//! exists to prevent.
//!
//! Ordering between timers due at the same instant is not guaranteed and
//! must not be relied upon for correctness, only for approximate pacing.

use std::time::Instant;

/// Identifies one scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What a timer firing means to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerClass {
    /// An ambient glitch burst is due.
    Glitch,
    /// A theme corruption is due.
    ThemeSwitch,
    /// A flicker roll is due.
    Flicker,
    /// Delayed resumption of glitch scheduling after calm/stop.
    Rearm,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    handle: TimerHandle,
    class: TimerClass,
    due: Instant,
}

/// A due timer returned from [`TimerSet::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Firing {
    pub handle: TimerHandle,
    pub class: TimerClass,
}

/// Owns every outstanding timer the engine has scheduled.
#[derive(Debug, Default)]
pub struct TimerSet {
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer of `class` due at `due`.
    pub fn schedule(&mut self, class: TimerClass, due: Instant) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { handle, class, due });
        tracing::trace!(?class, id = handle.0, "timer scheduled");
        handle
    }

    /// Cancel one timer. No-op if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    /// Cancel every timer of the given class.
    pub fn cancel_class(&mut self, class: TimerClass) {
        let before = self.entries.len();
        self.entries.retain(|e| e.class != class);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::trace!(?class, removed, "timer class cancelled");
        }
    }

    /// Cancel everything outstanding.
    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            tracing::trace!(count = self.entries.len(), "all timers cancelled");
        }
        self.entries.clear();
    }

    /// Remove and return every timer due at or before `now`, ordered by
    /// deadline.
    pub fn poll(&mut self, now: Instant) -> Vec<Firing> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due <= now {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.due);
        due.into_iter()
            .map(|e| Firing {
                handle: e.handle,
                class: e.class,
            })
            .collect()
    }

    /// The earliest outstanding deadline, for loop pacing.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Number of outstanding timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of outstanding timers of one class.
    #[must_use]
    pub fn count_class(&self, class: TimerClass) -> usize {
        self.entries.iter().filter(|e| e.class == class).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn schedule_and_poll_fires_due_timers() {
        let mut timers = TimerSet::new();
        let now = Instant::now();
        timers.schedule(TimerClass::Glitch, now + Duration::from_millis(10));
        timers.schedule(TimerClass::ThemeSwitch, now + Duration::from_secs(60));

        let fired = timers.poll(now + Duration::from_millis(20));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].class, TimerClass::Glitch);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn poll_orders_by_deadline() {
        let mut timers = TimerSet::new();
        let now = Instant::now();
        timers.schedule(TimerClass::ThemeSwitch, now + Duration::from_millis(30));
        timers.schedule(TimerClass::Glitch, now + Duration::from_millis(10));
        timers.schedule(TimerClass::Flicker, now + Duration::from_millis(20));

        let fired = timers.poll(now + Duration::from_millis(40));
        let classes: Vec<_> = fired.iter().map(|f| f.class).collect();
        assert_eq!(
            classes,
            vec![TimerClass::Glitch, TimerClass::Flicker, TimerClass::ThemeSwitch]
        );
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerSet::new();
        let now = Instant::now();
        let handle = timers.schedule(TimerClass::Glitch, now);
        timers.cancel(handle);
        assert!(timers.poll(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn cancel_class_leaves_other_classes() {
        let mut timers = TimerSet::new();
        let now = Instant::now();
        timers.schedule(TimerClass::Glitch, now);
        timers.schedule(TimerClass::Glitch, now + Duration::from_secs(1));
        timers.schedule(TimerClass::Flicker, now);

        timers.cancel_class(TimerClass::Glitch);
        assert_eq!(timers.count_class(TimerClass::Glitch), 0);
        assert_eq!(timers.count_class(TimerClass::Flicker), 1);
    }

    #[test]
    fn cancel_all_is_exhaustive() {
        let mut timers = TimerSet::new();
        let now = Instant::now();
        for class in [
            TimerClass::Glitch,
            TimerClass::ThemeSwitch,
            TimerClass::Flicker,
            TimerClass::Rearm,
        ] {
            timers.schedule(class, now);
        }
        timers.cancel_all();
        assert!(timers.is_empty());
        assert!(timers.poll(now + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn next_deadline_is_earliest() {
        let mut timers = TimerSet::new();
        let now = Instant::now();
        timers.schedule(TimerClass::ThemeSwitch, now + Duration::from_secs(30));
        timers.schedule(TimerClass::Glitch, now + Duration::from_secs(2));
        assert_eq!(timers.next_deadline(), Some(now + Duration::from_secs(2)));
    }

    #[test]
    fn handles_are_unique() {
        let mut timers = TimerSet::new();
        let now = Instant::now();
        let a = timers.schedule(TimerClass::Glitch, now);
        let b = timers.schedule(TimerClass::Glitch, now);
        assert_ne!(a, b);
    }

    #[test]
    fn empty_poll_is_empty() {
        let mut timers = TimerSet::new();
        assert!(timers.poll(Instant::now()).is_empty());
        assert_eq!(timers.next_deadline(), None);
    }
}
