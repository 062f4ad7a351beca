//! Property tests over whole-session behavior: whatever sequence of solves,
//! destabilizations, and recovery controls arrives, the core invariants
//! hold.

use std::time::{Duration, Instant};

use proptest::prelude::*;

use crt_core::state::{BASELINE_CHAOS, MAX_CHAOS};
use crt_core::{ChaosEngine, MemoryProgress, NullSink, Puzzle, PuzzleInput};

struct StubPuzzle {
    id: &'static str,
    active: bool,
    solved: bool,
}

impl StubPuzzle {
    fn boxed(id: &'static str) -> Box<dyn Puzzle> {
        Box::new(Self {
            id,
            active: false,
            solved: false,
        })
    }
}

impl Puzzle for StubPuzzle {
    fn id(&self) -> &str {
        self.id
    }
    fn activate(&mut self) {
        self.active = true;
    }
    fn handle(&mut self, _input: PuzzleInput) {}
    fn close(&mut self) {
        self.active = false;
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn is_solved(&self) -> bool {
        self.solved
    }
}

const IDS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn engine_with_stubs(now: Instant) -> ChaosEngine {
    let mut engine = ChaosEngine::with_seed(
        Box::new(MemoryProgress::new()),
        Box::new(NullSink),
        99,
        now,
    );
    for id in IDS {
        engine.register_puzzle(id, StubPuzzle::boxed(id));
    }
    engine
}

#[derive(Clone, Debug)]
enum Action {
    Solve(usize),
    Increase(f64),
    Calm,
    Stop,
    Tick(u64),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..IDS.len()).prop_map(Action::Solve),
        (0.0f64..4.0).prop_map(Action::Increase),
        Just(Action::Calm),
        Just(Action::Stop),
        (0u64..5_000).prop_map(Action::Tick),
    ]
}

proptest! {
    /// Chaos never leaves `[1, 10]`, no matter the interleaving.
    #[test]
    fn chaos_level_stays_in_range(actions in prop::collection::vec(action_strategy(), 0..60)) {
        let start = Instant::now();
        let mut engine = engine_with_stubs(start);
        let mut now = start;

        for action in actions {
            match action {
                Action::Solve(i) => engine.report_solved(IDS[i]),
                Action::Increase(amount) => engine.increase_chaos(amount, now),
                Action::Calm => engine.calm_down(now),
                Action::Stop => engine.stop_all_glitches(now),
                Action::Tick(ms) => {
                    now += Duration::from_millis(ms);
                    engine.tick(now);
                }
            }
            let level = engine.chaos_level();
            prop_assert!(level.is_finite());
            if engine.is_stable() {
                prop_assert_eq!(level, 0.0);
            } else {
                prop_assert!((1.0..=MAX_CHAOS).contains(&level), "level {level} out of range");
            }
        }
    }

    /// Re-solving an already-solved puzzle never changes the level again.
    #[test]
    fn solving_is_idempotent(
        order in Just([0usize, 1, 2, 3]).prop_shuffle(),
        repeats in prop::collection::vec(0..IDS.len(), 0..20),
    ) {
        let start = Instant::now();
        let mut engine = engine_with_stubs(start);
        engine.increase_chaos(5.0, start);

        for i in order {
            engine.report_solved(IDS[i]);
        }
        let settled = engine.chaos_level();
        let solved = engine.solved_count();

        for i in repeats {
            engine.report_solved(IDS[i]);
            prop_assert_eq!(engine.chaos_level(), settled);
            prop_assert_eq!(engine.solved_count(), solved);
        }
    }

    /// Victory depends only on the set of solved puzzles, not the order.
    #[test]
    fn victory_is_order_independent(order in Just([0usize, 1, 2, 3]).prop_shuffle()) {
        let start = Instant::now();
        let mut engine = engine_with_stubs(start);

        for (n, i) in order.into_iter().enumerate() {
            prop_assert!(!engine.is_stable());
            engine.report_solved(IDS[i]);
            prop_assert_eq!(engine.solved_count(), n + 1);
        }
        prop_assert!(engine.is_stable());
    }

    /// Once stable, nothing destabilizes the session short of a reset.
    #[test]
    fn stability_is_sticky(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let start = Instant::now();
        let mut engine = engine_with_stubs(start);
        for id in IDS {
            engine.report_solved(id);
        }
        prop_assert!(engine.is_stable());

        let mut now = start;
        for action in actions {
            match action {
                Action::Solve(i) => engine.report_solved(IDS[i]),
                Action::Increase(amount) => engine.increase_chaos(amount, now),
                Action::Calm => engine.calm_down(now),
                Action::Stop => engine.stop_all_glitches(now),
                Action::Tick(ms) => {
                    now += Duration::from_millis(ms);
                    engine.tick(now);
                }
            }
            prop_assert!(engine.is_stable());
        }
    }
}

#[test]
fn reset_returns_to_baseline_and_rearms() {
    let start = Instant::now();
    let mut engine = engine_with_stubs(start);
    for id in IDS {
        engine.report_solved(id);
    }
    assert!(engine.is_stable());

    engine.emergency_reset(start);
    assert!(!engine.is_stable());
    assert_eq!(engine.chaos_level(), BASELINE_CHAOS);
    assert_eq!(engine.solved_count(), 0);
    assert!(engine.next_deadline().is_some(), "glitch scheduling re-armed");
}
