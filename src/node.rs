//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Information available while rendering a block.
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the output in Hz
    pub sample_rate: u32,
    /// Frames per block (always 64, the `dasp_graph` buffer length)
    pub buffer_size: usize,
}

impl ProcessContext {
    pub const BLOCK_LEN: usize = 64;

    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            buffer_size: Self::BLOCK_LEN,
        }
    }
}

/// Identifies a node inside an [`Output`](crate::Output)'s render graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// A unit of the render graph: a noise source, an oscillator pair, a gain
/// stage or the master mix.
///
/// Nodes are built on the control thread and then moved into the render
/// domain, where only [`process`](Self::process) is ever called. Settings
/// that change while playing are shared through a [`param`](crate::param)
/// and read once per block:
///
/// ```
/// use rauschen::param::Level;
/// use rauschen::{AudioNode, ProcessContext};
/// use dasp_graph::{Buffer, Input};
///
/// struct Dc {
///     level: Level,
/// }
///
/// impl AudioNode for Dc {
///     fn process(&mut self, _ctx: &ProcessContext, _inputs: &[Input], outputs: &mut [Buffer]) {
///         let level = self.level.get();
///         for sample in outputs[0].iter_mut() {
///             *sample = level;
///         }
///     }
/// }
/// ```
pub trait AudioNode: Send + 'static {
    /// Render one block.
    ///
    /// Read `inputs` and fill `outputs`. This runs on the render thread: no
    /// allocation, no locking, no panics.
    fn process(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]);

    /// Number of audio input channels (0 for sources).
    fn num_inputs(&self) -> usize { 0 }

    /// Number of audio output channels.
    fn num_outputs(&self) -> usize { 1 }
}
