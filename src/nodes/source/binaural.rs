//! Binaural oscillator pair

use core::f64::consts::TAU;

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};
use crate::param::FrequencyPair;

/// Two sine oscillators, one per ear.
///
/// Output 0 is the left channel at the base frequency, output 1 the right
/// channel at base + beat. A beat of zero gives identical tones; a negative
/// beat puts the right ear below the base.
///
/// Frequencies come from a shared [`FrequencyPair`], read at the start of
/// every block. A change is a hard jump: both phases carry on from where they
/// were.
pub struct Binaural {
    frequency: FrequencyPair,
    base: f64,
    beat: f64,
    left_phase: f64,
    right_phase: f64,
}

impl Binaural {
    /// A pair with its own fixed frequencies.
    pub fn new(base: f32, beat: f32) -> Self {
        Self::with_frequency(FrequencyPair::new(base, beat))
    }

    /// A pair that follows `frequency`.
    pub fn with_frequency(frequency: FrequencyPair) -> Self {
        let (base, beat) = frequency.get();
        Self {
            frequency,
            base: base as f64,
            beat: beat as f64,
            left_phase: 0.0,
            right_phase: 0.0,
        }
    }

    #[inline]
    pub fn base_frequency(&self) -> f32 {
        self.base as f32
    }

    #[inline]
    pub fn beat_frequency(&self) -> f32 {
        self.beat as f32
    }

    #[inline]
    pub fn left_frequency(&self) -> f64 {
        self.base
    }

    #[inline]
    pub fn right_frequency(&self) -> f64 {
        self.base + self.beat
    }

    /// Current (left, right) phases in radians, each in `[0, 2π)`.
    #[inline]
    pub fn phases(&self) -> (f64, f64) {
        (self.left_phase, self.right_phase)
    }
}

/// One sample step of a phase accumulator, wrapped into `[0, 2π)`.
#[inline]
fn advance(phase: f64, frequency: f64, sample_rate: f64) -> f64 {
    let next = (phase + TAU * frequency / sample_rate).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if next >= TAU { 0.0 } else { next }
}

impl AudioNode for Binaural {
    fn process(&mut self, ctx: &ProcessContext, _inputs: &[Input], outputs: &mut [Buffer]) {
        let (base, beat) = self.frequency.get();
        self.base = base as f64;
        self.beat = beat as f64;

        // Always given two buffers; see `num_outputs`
        let [left, right, ..] = outputs else {
            return;
        };

        let sample_rate = ctx.sample_rate as f64;
        let left_freq = self.left_frequency();
        let right_freq = self.right_frequency();

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l = self.left_phase.sin() as f32;
            *r = self.right_phase.sin() as f32;
            self.left_phase = advance(self.left_phase, left_freq, sample_rate);
            self.right_phase = advance(self.right_phase, right_freq, sample_rate);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}
