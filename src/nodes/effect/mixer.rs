//! Master mix - sums every connected voice

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// Sums all of its inputs with equal weight.
///
/// Sits at the end of every render graph; with nothing connected it outputs
/// silence. Mono inputs are spread over every output channel.
pub struct Mixer {
    channels: usize,
}

impl Mixer {
    pub fn new(channels: usize) -> Self {
        Self { channels: channels.max(1) }
    }

    pub fn stereo() -> Self {
        Self::new(2)
    }
}

impl AudioNode for Mixer {
    fn process(&mut self, _ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]) {
        for buf in outputs.iter_mut() {
            buf.iter_mut().for_each(|s| *s = 0.0);
        }

        for input in inputs {
            let in_buffers = input.buffers();
            let Some(last) = in_buffers.last() else {
                continue;
            };

            for (ch, out_buf) in outputs.iter_mut().enumerate() {
                let in_buf = in_buffers.get(ch).unwrap_or(last);
                for (out_sample, in_sample) in out_buf.iter_mut().zip(in_buf.iter()) {
                    *out_sample += *in_sample;
                }
            }
        }
    }

    fn num_inputs(&self) -> usize {
        usize::MAX
    }

    fn num_outputs(&self) -> usize {
        self.channels
    }
}
