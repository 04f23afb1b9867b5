//! Colored noise source

use dasp_graph::{Buffer, Input};

use crate::kernel::{NoiseKernel, NoiseKind};
use crate::node::{AudioNode, ProcessContext};

/// A mono noise source backed by one [`NoiseKernel`].
///
/// Has no parameters: volume lives in the gain stage after it, and a new
/// color means a new node.
pub struct Noise {
    kernel: NoiseKernel,
}

impl Noise {
    pub fn new(kind: NoiseKind) -> Self {
        Self { kernel: NoiseKernel::new(kind) }
    }

    /// A source whose sample sequence is fixed by `seed`.
    pub fn seeded(kind: NoiseKind, seed: u64) -> Self {
        Self { kernel: NoiseKernel::seeded(kind, seed) }
    }

    #[inline]
    pub fn kind(&self) -> NoiseKind {
        self.kernel.kind()
    }

    #[inline]
    pub fn kernel(&self) -> &NoiseKernel {
        &self.kernel
    }
}

impl AudioNode for Noise {
    fn process(&mut self, _ctx: &ProcessContext, _inputs: &[Input], outputs: &mut [Buffer]) {
        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        self.kernel.fill(first);

        // One noise stream, duplicated if more than one channel was asked for
        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(&first[..]);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 1 }
}
