//! Inspirational quotes.

use rand::Rng;
use rand::seq::SliceRandom;

/// The fixed quote list.
pub const QUOTES: [&str; 4] = [
    "Dream big, start small -- but start.",
    "Stay curious, stay humble, keep building.",
    "Every expert was once a beginner.",
    "Small wins build momentum.",
];

/// Pick a quote uniformly at random.
pub fn pick() -> &'static str {
    pick_with(&mut rand::thread_rng())
}

/// Pick a quote using the given RNG.
pub fn pick_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    // QUOTES is a non-empty const array.
    QUOTES.choose(rng).copied().unwrap_or(QUOTES[0])
}
