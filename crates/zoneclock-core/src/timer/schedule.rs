//! Micro-break interval sampling.
//!
//! Intervals are drawn uniformly from the configured `[min, max)` range, or
//! are exactly `min` when the range is collapsed. A fixed seed makes the
//! sequence reproducible.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

use crate::settings::MicroBreakInterval;

#[derive(Debug, Clone)]
pub struct IntervalSampler {
    rng: Mcg128Xsl64,
}

impl IntervalSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }

    /// Seconds until the next micro-break.
    pub fn next(&mut self, range: &MicroBreakInterval) -> u32 {
        if range.max <= range.min {
            return range.min;
        }
        self.rng.gen_range(range.min..range.max)
    }
}

impl Default for IntervalSampler {
    fn default() -> Self {
        Self::new(None)
    }
}
