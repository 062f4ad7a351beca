//! Glitch effect selection policy.
//!
//! *When* effects fire is the scheduler's business; *which* effects fire and
//! *how many* is decided here. Eligibility (pool and burst size) is a
//! deterministic function of the chaos level so it can be asserted without
//! invoking any visual side effect. Only the pick among eligible effects is
//! random.

use std::time::Duration;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::events::StaggeredEffect;
use crate::state::{FLICKER_THRESHOLD, THEME_SWITCH_THRESHOLD};

/// Delay between effects within a single burst, producing the "layered"
/// look at high chaos instead of one effect at a time.
pub const BURST_STAGGER: Duration = Duration::from_millis(100);

/// The fixed set of ambient glitch effects.
///
/// These are intents; the presentation layer owns what each one looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlitchEffect {
    ScreenTear,
    Pixelate,
    ColorShift,
    TextScramble,
    ElementShake,
}

impl GlitchEffect {
    /// The full effect pool, in a fixed order.
    pub const ALL: [GlitchEffect; 5] = [
        GlitchEffect::ScreenTear,
        GlitchEffect::Pixelate,
        GlitchEffect::ColorShift,
        GlitchEffect::TextScramble,
        GlitchEffect::ElementShake,
    ];
}

/// How many effects a single burst fires at the given chaos level.
///
/// Scales at the same thresholds that gate the escalating schedulers:
/// above 7 three effects layer, above 5 two, otherwise one.
#[must_use]
pub fn burst_size(chaos_level: f64) -> usize {
    if chaos_level > THEME_SWITCH_THRESHOLD {
        3
    } else if chaos_level > FLICKER_THRESHOLD {
        2
    } else {
        1
    }
}

/// The effects eligible to fire at the given chaos level.
///
/// Currently the whole pool is always eligible; eligibility is kept as an
/// explicit function so the policy has one place to narrow the pool later
/// without touching the scheduler.
#[must_use]
pub fn eligible_pool(_chaos_level: f64) -> &'static [GlitchEffect] {
    &GlitchEffect::ALL
}

/// Random selection among eligible effects.
///
/// Seedable so tests can pin the choice sequence.
pub struct GlitchPicker {
    rng: SmallRng,
}

impl GlitchPicker {
    /// Picker seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Picker with a fixed seed, for deterministic tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Assemble one burst for the given chaos level: `burst_size` uniform
    /// picks from the eligible pool (repeats allowed), staggered
    /// `BURST_STAGGER` apart.
    pub fn pick_burst(&mut self, chaos_level: f64) -> Vec<StaggeredEffect> {
        let pool = eligible_pool(chaos_level);
        let count = burst_size(chaos_level);
        (0..count)
            .map(|i| StaggeredEffect {
                effect: *pool
                    .choose(&mut self.rng)
                    .expect("effect pool is never empty"),
                offset: BURST_STAGGER * i as u32,
            })
            .collect()
    }

    /// Uniform duration in `[base, base + jitter)`.
    pub fn jittered(&mut self, base: Duration, jitter: Duration) -> Duration {
        if jitter.is_zero() {
            return base;
        }
        base + Duration::from_millis(self.rng.gen_range(0..jitter.as_millis() as u64))
    }

    /// One roll against a probability in `[0, 1]`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Pick one element from a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }
}

impl Default for GlitchPicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_size_scales_with_thresholds() {
        assert_eq!(burst_size(0.0), 1);
        assert_eq!(burst_size(3.0), 1);
        assert_eq!(burst_size(5.0), 1); // threshold is exclusive
        assert_eq!(burst_size(5.1), 2);
        assert_eq!(burst_size(7.0), 2);
        assert_eq!(burst_size(7.1), 3);
        assert_eq!(burst_size(10.0), 3);
    }

    #[test]
    fn eligibility_is_deterministic_per_level() {
        for level in [0.0, 4.0, 6.0, 9.0] {
            assert_eq!(eligible_pool(level), eligible_pool(level));
            assert_eq!(burst_size(level), burst_size(level));
        }
    }

    #[test]
    fn burst_respects_count_and_pool() {
        let mut picker = GlitchPicker::with_seed(7);
        let burst = picker.pick_burst(9.0);
        assert_eq!(burst.len(), 3);
        for (i, staggered) in burst.iter().enumerate() {
            assert!(GlitchEffect::ALL.contains(&staggered.effect));
            assert_eq!(staggered.offset, BURST_STAGGER * i as u32);
        }
    }

    #[test]
    fn seeded_picker_is_deterministic() {
        let a: Vec<_> = GlitchPicker::with_seed(42).pick_burst(8.0);
        let b: Vec<_> = GlitchPicker::with_seed(42).pick_burst(8.0);
        assert_eq!(a, b);
    }

    #[test]
    fn jittered_stays_in_band() {
        let mut picker = GlitchPicker::with_seed(1);
        let base = Duration::from_secs(1);
        let jitter = Duration::from_secs(2);
        for _ in 0..100 {
            let d = picker.jittered(base, jitter);
            assert!(d >= base && d < base + jitter);
        }
    }

    #[test]
    fn jittered_zero_jitter_is_base() {
        let mut picker = GlitchPicker::with_seed(1);
        assert_eq!(
            picker.jittered(Duration::from_secs(3), Duration::ZERO),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn chance_clamps_probability() {
        let mut picker = GlitchPicker::with_seed(1);
        assert!(picker.chance(2.0));
        assert!(!picker.chance(-1.0));
    }
}
