//! Decorative jitter for banner sparkles and tag delays
//!
//! Output is purely cosmetic and never feeds playback state. A fixed seed
//! makes it reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One decorative particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// 0..100
    pub left_percent: f64,
    /// 0..100
    pub top_percent: f64,
    pub duration_secs: f64,
    pub delay_secs: f64,
}

pub struct Jitter {
    rng: StdRng,
}

impl Jitter {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Pulse delay for a balloon tag, 0..1.5s
    pub fn tag_delay(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.5)
    }

    pub fn particles(&mut self, count: usize) -> Vec<Particle> {
        (0..count)
            .map(|_| Particle {
                left_percent: self.rng.gen_range(0.0..100.0),
                top_percent: self.rng.gen_range(0.0..100.0),
                duration_secs: 4.0 + self.rng.gen_range(0.0..3.0),
                delay_secs: self.rng.gen_range(0.0..15.0),
            })
            .collect()
    }
}
