//! Per-sample noise kernels.
//!
//! Each kernel advances its state by exactly one sample per call. The filters
//! run in `f64` and hand out `f32` samples.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The three noise colors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NoiseKind {
    White,
    Pink,
    Brown,
}

impl NoiseKind {
    pub const ALL: [NoiseKind; 3] = [NoiseKind::White, NoiseKind::Pink, NoiseKind::Brown];

    /// Display name, e.g. `"PinkNoise"`.
    pub fn name(self) -> &'static str {
        match self {
            NoiseKind::White => "WhiteNoise",
            NoiseKind::Pink => "PinkNoise",
            NoiseKind::Brown => "BrownNoise",
        }
    }
}

/// Map a uniform `[0, 1)` draw onto `[-1, 1)`.
#[inline]
fn bipolar(u: f64) -> f64 {
    u * 2.0 - 1.0
}

/// Seven-tap pink filter (Paul Kellet's refined coefficients).
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct PinkFilter {
    b: [f64; 7],
}

impl PinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one white sample, get one pink sample.
    #[inline]
    pub fn process(&mut self, white: f64) -> f64 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.0555179;
        b[1] = 0.99332 * b[1] + white * 0.0750759;
        b[2] = 0.96900 * b[2] + white * 0.1538520;
        b[3] = 0.86650 * b[3] + white * 0.3104856;
        b[4] = 0.55000 * b[4] + white * 0.5329522;
        b[5] = -0.7616 * b[5] - white * 0.0168980;

        // b6 is read before it is replaced: one sample of delay.
        let out = (b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362) * 0.11;
        b[6] = white * 0.115926;
        out
    }

    pub fn taps(&self) -> &[f64; 7] {
        &self.b
    }
}

/// Leaky integrator of white noise.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct BrownFilter {
    last_out: f64,
}

impl BrownFilter {
    /// Makeup gain; the integrator alone is far quieter than white or pink.
    pub const GAIN: f64 = 3.5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one white sample, get one brown sample. Not clipped.
    #[inline]
    pub fn process(&mut self, white: f64) -> f64 {
        self.last_out = (self.last_out + 0.02 * white) / 1.02;
        self.last_out * Self::GAIN
    }

    pub fn last_out(&self) -> f64 {
        self.last_out
    }
}

/// Filter state for one noise color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Filter {
    White,
    Pink(PinkFilter),
    Brown(BrownFilter),
}

impl Filter {
    /// Zeroed state for `kind`.
    pub fn new(kind: NoiseKind) -> Self {
        match kind {
            NoiseKind::White => Filter::White,
            NoiseKind::Pink => Filter::Pink(PinkFilter::new()),
            NoiseKind::Brown => Filter::Brown(BrownFilter::new()),
        }
    }

    #[inline]
    pub fn process(&mut self, white: f64) -> f64 {
        match self {
            Filter::White => white,
            Filter::Pink(f) => f.process(white),
            Filter::Brown(f) => f.process(white),
        }
    }

    pub fn kind(&self) -> NoiseKind {
        match self {
            Filter::White => NoiseKind::White,
            Filter::Pink(_) => NoiseKind::Pink,
            Filter::Brown(_) => NoiseKind::Brown,
        }
    }
}

/// A noise color plus its own random source.
pub struct NoiseKernel {
    filter: Filter,
    rng: StdRng,
}

impl NoiseKernel {
    /// Kernel seeded from the operating system.
    pub fn new(kind: NoiseKind) -> Self {
        Self {
            filter: Filter::new(kind),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Kernel with a reproducible sequence.
    pub fn seeded(kind: NoiseKind, seed: u64) -> Self {
        Self {
            filter: Filter::new(kind),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let white = bipolar(self.rng.random::<f64>());
        self.filter.process(white) as f32
    }

    pub fn fill(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn kind(&self) -> NoiseKind {
        self.filter.kind()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}
