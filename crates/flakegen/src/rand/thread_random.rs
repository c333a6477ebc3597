use rand::{Rng, rng};

use crate::RandSource;

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This type does **not** store the RNG itself; it accesses the thread-local
/// generator on each call, so it is a zero-sized value that may be freely
/// shared across threads.
///
/// Only used to pick secret keys. The keys are an obfuscation aid, so the
/// quality of this source carries no security weight.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource<u64> for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_vary() {
        let rng = ThreadRandom;
        let draws: Vec<u64> = (0..8).map(|_| rng.rand()).collect();
        assert!(draws.windows(2).any(|w| w[0] != w[1]));
    }
}
