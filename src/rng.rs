use crate::catalog::ItemId;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Uniform integers and shuffles, kept behind a trait so rounds can be
/// replayed deterministically.
pub(crate) trait RandomSource {
    /// Uniform in `lo..=hi`. Callers guarantee `lo <= hi`.
    fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize;
    fn shuffle(&mut self, items: &mut [ItemId]);
}

pub(crate) struct RngSource<R>(pub(crate) R);

impl RngSource<StdRng> {
    pub(crate) fn from_seed_or_entropy(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self(StdRng::seed_from_u64(s)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize {
        self.0.gen_range(lo..=hi)
    }

    fn shuffle(&mut self, items: &mut [ItemId]) {
        items.shuffle(&mut self.0);
    }
}

/// `count` distinct items from `pool`, uniformly without replacement.
pub(crate) fn sample_distinct(
    rng: &mut dyn RandomSource,
    pool: &[ItemId],
    count: usize,
) -> Vec<ItemId> {
    let mut picked = pool.to_vec();
    rng.shuffle(&mut picked);
    picked.truncate(count);
    picked
}
