//! Render side of an output: applies graph commands and fills device buffers.

use dasp_graph::Buffer;
use rtrb::{Consumer, Producer};

use crate::graph::{AudioGraph, PreparedNode, Slot};
use crate::node::{NodeId, ProcessContext};

/// The two nodes that make up one playing generator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Voice {
    pub source: NodeId,
    pub gain: NodeId,
}

/// Structural changes published by the control side.
///
/// Each command is applied whole at a block boundary, so the render side never
/// sees a half-wired voice.
pub(crate) enum GraphCommand {
    /// Insert a source and its gain stage: source → gain → master.
    Attach {
        voice: Voice,
        source: PreparedNode,
        gain: PreparedNode,
    },
    /// Unwire a voice and hand its nodes back for dropping.
    Detach(Voice),
}

/// Renders an output's graph into interleaved sample buffers.
///
/// Lives on the device's callback thread, or with whoever pulls samples from
/// an [`Output::offline`](crate::Output::offline) output. Never allocates,
/// locks or blocks.
pub struct Renderer {
    graph: AudioGraph,
    master: NodeId,
    commands: Consumer<GraphCommand>,
    retired: Producer<Slot>,
    channels: usize,
    /// Next frame of the current master block to hand out
    cursor: usize,
}

impl Renderer {
    pub(crate) fn new(
        graph: AudioGraph,
        master: NodeId,
        commands: Consumer<GraphCommand>,
        retired: Producer<Slot>,
        channels: usize,
    ) -> Self {
        Self {
            graph,
            master,
            commands,
            retired,
            channels: channels.max(1),
            // Forces a fresh block on the first call
            cursor: ProcessContext::BLOCK_LEN,
        }
    }

    /// Interleaved channel count of the buffers this renderer fills.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Fill an interleaved `f32` buffer.
    pub fn render(&mut self, data: &mut [f32]) {
        self.render_with(data, |s| s);
    }

    /// Fill an interleaved buffer of any sample type.
    ///
    /// Samples reach `convert` already finite; non-finite samples become silence.
    pub fn render_with<T>(&mut self, data: &mut [T], mut convert: impl FnMut(f32) -> T) {
        let channels = self.channels;
        for frame in data.chunks_mut(channels) {
            if self.cursor >= ProcessContext::BLOCK_LEN {
                self.next_block();
            }

            let (left, right) = self.master_frame(self.cursor);
            if channels == 1 {
                frame[0] = convert((left + right) * 0.5);
            } else {
                for (ch, sample) in frame.iter_mut().enumerate() {
                    *sample = convert(if ch == 0 { left } else { right });
                }
            }
            self.cursor += 1;
        }
    }

    /// Render `frames` frames into a new buffer.
    ///
    /// For offline use; the device callback uses [`render`](Self::render).
    pub fn render_frames(&mut self, frames: usize) -> Vec<f32> {
        let mut data = vec![0.0; frames * self.channels];
        self.render(&mut data);
        data
    }

    fn master_frame(&self, index: usize) -> (f32, f32) {
        let buffers = self.graph.terminal_buffers();
        let sample = |buffer: Option<&Buffer>| buffer.map(|b| sanitize(b[index])).unwrap_or(0.0);
        let left = sample(buffers.first());
        let right = sample(buffers.get(1).or(buffers.first()));
        (left, right)
    }

    fn next_block(&mut self) {
        while let Ok(command) = self.commands.pop() {
            self.apply(command);
        }
        self.graph.process();
        self.cursor = 0;
    }

    fn apply(&mut self, command: GraphCommand) {
        match command {
            GraphCommand::Attach { voice, source, gain } => {
                self.graph.insert(source);
                self.graph.insert(gain);
                self.graph.connect(voice.source, voice.gain);
                self.graph.connect(voice.gain, self.master);
            }
            GraphCommand::Detach(voice) => {
                self.graph.disconnect(voice.source, voice.gain);
                self.graph.disconnect(voice.gain, self.master);
                for id in [voice.source, voice.gain] {
                    if let Some(slot) = self.graph.remove(id) {
                        // If the return queue is full the slot is dropped here instead
                        let _ = self.retired.push(slot);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.graph.len()
    }
}

/// Replace non-finite samples with silence.
#[inline]
pub(crate) fn sanitize(sample: f32) -> f32 {
    if sample.is_finite() { sample } else { 0.0 }
}
