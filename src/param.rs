//! Settings shared between the control side and the render graph.
//!
//! Each parameter holds only its latest value. A write from the control side
//! replaces whatever was there and is picked up by the node at the start of
//! its next block, so a burst of changes can never fill up or be dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use atomic_float::AtomicF32;

/// A single `f32` setting, such as a gain.
#[derive(Clone, Debug)]
pub struct Level(Arc<AtomicF32>);

impl Level {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicF32::new(value)))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// A binaural base/beat pair.
///
/// Both halves live in one word, so a reader never sees the base of one write
/// with the beat of another.
#[derive(Clone, Debug)]
pub struct FrequencyPair(Arc<AtomicU64>);

#[inline]
fn pack(base: f32, beat: f32) -> u64 {
    ((base.to_bits() as u64) << 32) | beat.to_bits() as u64
}

impl FrequencyPair {
    pub fn new(base: f32, beat: f32) -> Self {
        Self(Arc::new(AtomicU64::new(pack(base, beat))))
    }

    /// `(base, beat)` in Hz.
    #[inline]
    pub fn get(&self) -> (f32, f32) {
        let bits = self.0.load(Ordering::Relaxed);
        (f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
    }

    #[inline]
    pub fn set(&self, base: f32, beat: f32) {
        self.0.store(pack(base, beat), Ordering::Relaxed);
    }
}
