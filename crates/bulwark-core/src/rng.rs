//! Seeded randomness contract.
//!
//! Every probabilistic mechanic derives every draw from an explicit seed
//! carried in the [`PhaseContext`](crate::phase::PhaseContext). No RNG state
//! is ever stored: two calls with the same seed and inputs are
//! interchangeable, which is what makes battles replayable bit-for-bit.
//!
//! Stream derivation uses a SplitMix64-style finalizer (fast, good
//! avalanche); the actual [0, 1) draw goes through `ChaCha8Rng`, whose
//! output is specified and therefore stable across platforms and Rust
//! versions; `DefaultHasher` offers no such guarantee.

use rand::{Rng as _, SeedableRng as _};
use rand_chacha::ChaCha8Rng;

const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;
const MIX_M1: u64 = 0xbf58_476d_1ce4_e5b9;
const MIX_M2: u64 = 0x94d0_49bb_1331_11eb;

/// Derives a sub-seed from `seed` and a caller-chosen `salt`.
///
/// Used wherever one phase invocation needs several independent draws (one
/// per riposte check, one per (effect, target) contagion pair, and so on).
/// Pure: same inputs, same output.
#[must_use]
pub fn mix(seed: u64, salt: u64) -> u64 {
    let mut z = (seed ^ salt.wrapping_mul(GOLDEN)).wrapping_add(GOLDEN);
    z = (z ^ (z >> 30)).wrapping_mul(MIX_M1);
    z = (z ^ (z >> 27)).wrapping_mul(MIX_M2);
    z ^ (z >> 31)
}

/// Folds several salts into one sub-seed, left to right.
#[must_use]
pub fn mix_many(seed: u64, salts: &[u64]) -> u64 {
    salts.iter().fold(seed, |acc, &s| mix(acc, s))
}

/// One reproducible draw in `[0, 1)` for the given seed.
#[must_use]
pub fn roll(seed: u64) -> f64 {
    ChaCha8Rng::seed_from_u64(seed).gen::<f64>()
}

/// True if the seeded draw lands under `chance`.
///
/// `chance <= 0.0` never succeeds; `chance >= 1.0` always does.
#[must_use]
pub fn roll_under(seed: u64, chance: f64) -> bool {
    roll(seed) < chance
}
