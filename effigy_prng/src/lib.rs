// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256** (Blackman & Vigna, 2018) with SplitMix64 seeding.
// Hand-rolled with zero external dependencies so that output is identical
// across platforms and compiler versions.
//
// This crate is the single source of randomness for the effigy engine:
// weighted summon selection, lightning-strike and escort counts, spawn
// delays, and ring placement all draw from a `SummonRng` owned by the
// registry and seeded by the host. Nothing in the engine touches OS entropy
// or a process-global generator, which keeps summon outcomes reproducible
// in tests: seed the generator, replay the calls, get the same creatures.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state. No floating-point accumulation in the
// core generator, no stdlib RNG, no system time.

use serde::{Deserialize, Serialize};

/// Xoshiro256** PRNG — the engine's sole source of randomness.
///
/// The state serializes with serde so a host that snapshots engine state can
/// resume mid-stream and continue the identical sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummonRng {
    s: [u64; 4],
}

impl SummonRng {
    /// Create a new generator seeded from a `u64`.
    ///
    /// SplitMix64 expands the seed into the 256-bit internal state, per the
    /// xoshiro authors' recommendation. Equal seeds give equal sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = self.s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Takes the upper 53 bits of a `u64` — the full mantissa width of an
    /// IEEE 754 double (52 explicit bits + 1 implicit).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform `f64` in `[low, high)`, or exactly `low` when the
    /// bounds coincide (a configured range may legitimately be degenerate,
    /// e.g. `min_range == max_range`).
    ///
    /// Panics if `low > high`.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        assert!(low <= high, "range_f64: low must not exceed high");
        low + self.next_f64() * (high - low)
    }

    /// Roll a count in `[min, max]` as `min + round(u * (max - min))`.
    ///
    /// The rounding gives the two endpoints half the probability mass of the
    /// interior values; strike and escort counts have always been rolled this
    /// way and configurations are tuned against it.
    ///
    /// Panics if `min > max`.
    pub fn roll_between(&mut self, min: u32, max: u32) -> u32 {
        assert!(min <= max, "roll_between: min must not exceed max");
        min + (self.next_f64() * f64::from(max - min)).round() as u32
    }
}

/// SplitMix64 — used only to expand a `u64` seed into the xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
