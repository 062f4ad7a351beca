//! A clock rendered in four divergent time streams. Paused streams fall
//! behind the others; sync attempts pull everything back toward consensus.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crt_core::{EngineHandle, Puzzle, PuzzleCore, PuzzleInput};

pub const PUZZLE_ID: &str = "time-clock";

pub const STREAMS: [&str; 4] = ["unix", "binary", "hex", "roman"];

/// Offsets are seeded uniformly in `[-OFFSET_SPREAD_MS, OFFSET_SPREAD_MS)`.
const OFFSET_SPREAD_MS: f64 = 5_000.0;

/// Time modelled as passing per `Tick` for running streams.
const TICK_MS: f64 = 250.0;

/// Above this divergence a sync attempt fails outright and destabilizes
/// the session.
const DESYNC_LIMIT_MS: f64 = 10_000.0;
const DESYNC_CHAOS: f64 = 1.0;

/// Divergence below which the streams count as synchronized.
const SYNC_TOLERANCE_MS: f64 = 500.0;

#[derive(Clone, Copy, Debug)]
struct Stream {
    offset_ms: f64,
    running: bool,
}

pub struct TimeClock {
    core: PuzzleCore,
    streams: [Stream; 4],
    rng: SmallRng,
}

impl TimeClock {
    #[must_use]
    pub fn new(engine: EngineHandle) -> Self {
        Self::with_seed(engine, rand::random())
    }

    /// Deterministic variant for tests.
    #[must_use]
    pub fn with_seed(engine: EngineHandle, seed: u64) -> Self {
        Self {
            core: PuzzleCore::new(PUZZLE_ID, engine),
            streams: [Stream {
                offset_ms: 0.0,
                running: true,
            }; 4],
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Standard deviation of the stream clocks, in milliseconds.
    #[must_use]
    pub fn temporal_variance(&self) -> f64 {
        let times: Vec<f64> = self.streams.iter().map(|s| s.offset_ms).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let sq = times.iter().map(|t| (t - avg).powi(2)).sum::<f64>() / times.len() as f64;
        sq.sqrt()
    }

    /// Reality coherence in `[0, 100]`, derived from the variance.
    #[must_use]
    pub fn coherence(&self) -> f64 {
        (100.0 - self.temporal_variance() / 1_000.0).clamp(0.0, 100.0)
    }

    #[must_use]
    pub fn is_running(&self, stream: &str) -> bool {
        STREAMS
            .iter()
            .position(|s| *s == stream)
            .is_some_and(|i| self.streams[i].running)
    }

    fn toggle(&mut self, stream: &str) {
        if let Some(i) = STREAMS.iter().position(|s| *s == stream) {
            self.streams[i].running = !self.streams[i].running;
        }
    }

    fn tick(&mut self) {
        for stream in &mut self.streams {
            if stream.running {
                stream.offset_ms += TICK_MS;
            }
        }
    }

    fn attempt_sync(&mut self) {
        let variance = self.temporal_variance();
        if variance > DESYNC_LIMIT_MS {
            tracing::debug!(variance, "sync failed, streams too divergent");
            self.core.raise_chaos(DESYNC_CHAOS);
            return;
        }
        // Each attempt pulls every stream halfway toward consensus.
        let avg =
            self.streams.iter().map(|s| s.offset_ms).sum::<f64>() / self.streams.len() as f64;
        for stream in &mut self.streams {
            stream.offset_ms = (stream.offset_ms + avg) / 2.0;
        }
        if self.temporal_variance() < SYNC_TOLERANCE_MS {
            self.core.mark_solved();
        }
    }
}

impl Puzzle for TimeClock {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn activate(&mut self) {
        for stream in &mut self.streams {
            stream.offset_ms = self.rng.gen_range(-OFFSET_SPREAD_MS..OFFSET_SPREAD_MS);
            stream.running = true;
        }
        self.core.begin_run();
    }

    fn handle(&mut self, input: PuzzleInput) {
        if !self.core.is_active() || self.core.is_solved() {
            return;
        }
        match input {
            PuzzleInput::Tick => self.tick(),
            PuzzleInput::Select(choice) if choice == "sync" => self.attempt_sync(),
            PuzzleInput::Select(stream) => self.toggle(&stream),
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
