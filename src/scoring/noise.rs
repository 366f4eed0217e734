use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::observation::Disease;

/// Default half-width of the jitter added to rule-based scores.
pub const DEFAULT_JITTER: f64 = 0.05;

/// Source of the small perturbation added to every rule-based score.
pub trait NoiseSource {
    /// Draw one offset. Implementations stay within their configured amplitude.
    fn sample(&mut self) -> f64;
}

/// Disabled jitter: always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl NoiseSource for NoJitter {
    fn sample(&mut self) -> f64 {
        0.0
    }
}

/// Uniform offset in `[-amplitude, amplitude]`.
#[derive(Debug, Clone)]
pub struct UniformJitter {
    amplitude: f64,
    rng: StdRng,
}

impl UniformJitter {
    pub fn new(amplitude: f64) -> Self {
        Self {
            amplitude,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(amplitude: f64, seed: u64) -> Self {
        Self {
            amplitude,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for UniformJitter {
    fn sample(&mut self) -> f64 {
        if self.amplitude.is_finite() && self.amplitude > 0.0 {
            self.rng.gen_range(-self.amplitude..=self.amplitude)
        } else {
            0.0
        }
    }
}

/// How an engine builds noise sources for each scoring call.
///
/// A fixed seed makes every call for the same disease draw the same offset,
/// so identical observations score bit-identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterPolicy {
    pub amplitude: f64,
    pub seed: Option<u64>,
}

impl Default for JitterPolicy {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_JITTER,
            seed: None,
        }
    }
}

impl JitterPolicy {
    pub fn disabled() -> Self {
        Self {
            amplitude: 0.0,
            seed: None,
        }
    }

    pub fn seeded(amplitude: f64, seed: u64) -> Self {
        Self {
            amplitude,
            seed: Some(seed),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.amplitude.is_finite() && self.amplitude > 0.0
    }

    /// Fresh noise source for scoring one disease.
    pub fn source_for(&self, disease: Disease) -> Box<dyn NoiseSource + Send> {
        if !self.is_enabled() {
            return Box::new(NoJitter);
        }
        match self.seed {
            Some(seed) => Box::new(UniformJitter::seeded(
                self.amplitude,
                seed.wrapping_add(disease.index() as u64),
            )),
            None => Box::new(UniformJitter::new(self.amplitude)),
        }
    }
}
