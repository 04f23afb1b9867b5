//! Gain/volume stage

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};
use crate::param::Level;

/// Scales its input by a shared [`Level`].
///
/// The level is read once per block, so a change takes effect at the first
/// sample of the next block, with no ramp. Output is stereo; a mono input
/// feeds both channels.
pub struct Gain {
    level: Level,
}

impl Gain {
    /// A gain stage with its own fixed level.
    pub fn new(gain: f32) -> Self {
        Self::with_level(Level::new(gain))
    }

    /// A gain stage that follows `level`.
    pub fn with_level(level: Level) -> Self {
        Self { level }
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.level.get()
    }
}

impl AudioNode for Gain {
    fn process(&mut self, _ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]) {
        let in_buffers = inputs.first().map(|input| input.buffers()).unwrap_or(&[]);

        let Some(last) = in_buffers.last() else {
            for buffer in outputs.iter_mut() {
                buffer.iter_mut().for_each(|s| *s = 0.0);
            }
            return;
        };

        let gain = self.level.get();
        for (ch, out_buffer) in outputs.iter_mut().enumerate() {
            let in_buffer = in_buffers.get(ch).unwrap_or(last);
            for (out_sample, &in_sample) in out_buffer.iter_mut().zip(in_buffer.iter()) {
                *out_sample = in_sample * gain;
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}
