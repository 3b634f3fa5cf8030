use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{FeedbackRecord, Sentiment};

/// Source of uniform indices for sampling.
pub trait RandomSource {
    /// Returns an index in `0..upper`. `upper` is never zero.
    fn pick_index(&mut self, upper: usize) -> usize;
}

pub struct EntropyRandom {
    rng: StdRng,
}

impl EntropyRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn pick_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

/// Picks one record with the given sentiment, or `None` when nothing matches.
pub fn random_feedback<'a>(
    records: &[&'a FeedbackRecord],
    sentiment: &Sentiment,
    random: &mut dyn RandomSource,
) -> Option<&'a FeedbackRecord> {
    let candidates: Vec<&'a FeedbackRecord> = records
        .iter()
        .copied()
        .filter(|record| &record.sentiment == sentiment)
        .collect();

    if candidates.is_empty() {
        return None;
    }
    let index = random.pick_index(candidates.len());
    candidates.get(index).copied()
}
