//! End-to-end playthrough: the full roster registered into a live engine,
//! every puzzle solved through its own interface, victory declared.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crt_core::{
    register_all, ChaosEvent, CollectingSink, MemoryProgress, PuzzleBay, PuzzleInput,
};
use crt_puzzles::{deposit_all, ALL_PUZZLE_IDS};

fn drive(engine: &mut crt_core::ChaosEngine, id: &str, inputs: Vec<PuzzleInput>) {
    assert!(engine.activate_puzzle(id), "{id} should activate");
    let puzzle = engine.puzzle_mut(id).unwrap();
    for input in inputs {
        puzzle.handle(input);
    }
    assert!(engine.puzzle_mut(id).unwrap().is_solved(), "{id} should be solved");
    engine.close_puzzle(id);
}

fn text(s: &str) -> PuzzleInput {
    PuzzleInput::Text(s.to_string())
}

fn select(s: &str) -> PuzzleInput {
    PuzzleInput::Select(s.to_string())
}

#[test]
fn solving_every_puzzle_restores_stability() {
    let now = Instant::now();
    let sink = Arc::new(CollectingSink::new());
    let mut engine = crt_core::ChaosEngine::with_seed(
        Box::new(MemoryProgress::new()),
        Box::new(Arc::clone(&sink)),
        11,
        now,
    );

    let mut bay = PuzzleBay::new();
    deposit_all(&mut bay);
    assert_eq!(register_all(&mut bay, &mut engine), ALL_PUZZLE_IDS.len());
    for id in ALL_PUZZLE_IDS {
        assert!(engine.is_registered(id));
    }

    drive(
        &mut engine,
        "sentient-terminal",
        vec![
            text("i respect you"),
            text("i respect you"),
            text("i respect you"),
            text("fix yourself"),
        ],
    );

    drive(&mut engine, "paranoid-password", vec![text("trustno1")]);

    // Enough halving syncs always converge from the seeded offsets.
    drive(
        &mut engine,
        "time-clock",
        std::iter::repeat_with(|| select("sync")).take(16).collect(),
    );

    drive(
        &mut engine,
        "drunk-nav",
        std::iter::repeat_with(|| select("sobriety-test"))
            .take(10)
            .collect(),
    );

    drive(&mut engine, "conspiracy-search", vec![text("the truth")]);

    drive(&mut engine, "existential-error", vec![text("you have purpose")]);

    drive(
        &mut engine,
        "mime-modal",
        ["👋", "🚪", "🔓", "🎉"].iter().map(|g| select(g)).collect(),
    );

    drive(
        &mut engine,
        "iframe-maze",
        ["alpha", "gamma", "beta", "delta", "omega", "escape"]
            .iter()
            .map(|p| select(p))
            .collect(),
    );

    // One tick drains all queued solved/chaos reports.
    engine.tick(now + Duration::from_millis(1));

    assert_eq!(engine.solved_count(), ALL_PUZZLE_IDS.len());
    assert!(engine.unsolved_ids().is_empty());
    assert!(engine.is_stable(), "full roster solved means victory");

    let events = sink.take();
    assert!(
        events.iter().any(|e| *e == ChaosEvent::VictoryDeclared),
        "victory event should have been emitted"
    );
}

#[test]
fn a_lost_session_stays_unstable() {
    let now = Instant::now();
    let mut engine = crt_core::ChaosEngine::with_seed(
        Box::new(MemoryProgress::new()),
        Box::new(crt_core::NullSink),
        11,
        now,
    );
    let mut bay = PuzzleBay::new();
    deposit_all(&mut bay);
    register_all(&mut bay, &mut engine);

    // Solve all but one.
    drive(&mut engine, "paranoid-password", vec![text("trustno1")]);
    drive(&mut engine, "conspiracy-search", vec![text("wake up")]);
    engine.tick(now + Duration::from_millis(1));

    assert_eq!(engine.solved_count(), 2);
    assert!(!engine.is_stable());
    assert_eq!(engine.unsolved_ids().len(), ALL_PUZZLE_IDS.len() - 2);
}
