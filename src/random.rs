//! Seeded random number generation.
//!
//! Every engine owns a private [`StdRng`]. Trials and agents that run on
//! worker threads derive their own seeds from a base seed with
//! [`derive_seed`], so a fixed base seed reproduces the same search no matter
//! how the work is scheduled.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a deterministic RNG from a 64-bit seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates an RNG from `seed`, or from OS entropy when `None`.
pub fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => create_rng(s),
        None => create_rng(rand::random()),
    }
}

/// Derives an independent seed for stream `stream` of a base seed.
///
/// SplitMix64 finalizer over `base + stream * golden_gamma`.
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut z = base.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
