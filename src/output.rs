//! Output handles - the control side of a render graph

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::debug;

use crate::graph::{self, AudioGraph, PreparedNode, Slot};
use crate::node::{AudioNode, NodeId, ProcessContext};
use crate::nodes::Mixer;
use crate::render::{GraphCommand, Renderer, Voice};

/// Settings for opening an output.
#[derive(Clone, Debug)]
pub struct OutputConfig {
    /// Device buffer size in frames; `None` lets the backend choose
    pub buffer_frames: Option<u32>,
    /// Slots in the graph command queue. Every playing voice keeps one slot
    /// back for its detach, so at most `command_capacity - 1` voices can play.
    pub command_capacity: usize,
    /// Nodes the render graph can hold before it has to grow
    pub max_nodes: usize,
    /// How long to wait for the device stream to come up
    pub init_timeout: Duration,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            buffer_frames: None,
            command_capacity: 64,
            max_nodes: 64,
            init_timeout: Duration::from_secs(2),
        }
    }
}

impl OutputConfig {
    /// Ask the device for a fixed buffer size, in frames.
    pub fn with_buffer_frames(mut self, frames: u32) -> Self {
        self.buffer_frames = Some(frames);
        self
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(2);
        self
    }

    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = nodes.max(1);
        self
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }
}

/// Keeps the thread that owns a device stream alive; dropping it stops the stream.
pub(crate) struct StreamGuard {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl StreamGuard {
    pub(crate) fn new(shutdown: Arc<AtomicBool>, thread: JoinHandle<()>) -> Self {
        Self { shutdown, thread: Some(thread) }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            let _ = thread.join();
        }
    }
}

/// The graph command producer, with one slot held back per attached voice.
///
/// Keeping `producer.slots() >= reserved` means a voice that was attached can
/// always be detached without waiting.
struct CommandQueue {
    producer: Producer<GraphCommand>,
    reserved: usize,
}

struct Inner {
    name: String,
    ctx: ProcessContext,
    channels: u16,
    config: OutputConfig,
    next_node_id: AtomicU32,
    commands: Mutex<CommandQueue>,
    retired: Mutex<Consumer<Slot>>,
    /// Cleared when the device reports it has gone away
    alive: Arc<AtomicBool>,
    // Declared last: the stream stops only after everything above is dropped
    _stream: Option<StreamGuard>,
}

/// A handle to one output device and the render graph feeding it.
///
/// Cheap to clone; every clone talks to the same graph. Generators hold an
/// `Output` and attach their voices to it while they play.
#[derive(Clone)]
pub struct Output {
    inner: Arc<Inner>,
}

/// Control-side pieces of an output whose render side is still being set up.
pub(crate) struct PendingOutput {
    ctx: ProcessContext,
    channels: u16,
    config: OutputConfig,
    next_node_id: u32,
    commands: Producer<GraphCommand>,
    retired: Consumer<Slot>,
}

impl PendingOutput {
    pub(crate) fn finish(
        self,
        name: String,
        alive: Arc<AtomicBool>,
        stream: Option<StreamGuard>,
    ) -> Output {
        Output {
            inner: Arc::new(Inner {
                name,
                ctx: self.ctx,
                channels: self.channels,
                config: self.config,
                next_node_id: AtomicU32::new(self.next_node_id),
                commands: Mutex::new(CommandQueue {
                    producer: self.commands,
                    reserved: 0,
                }),
                retired: Mutex::new(self.retired),
                alive,
                _stream: stream,
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Output {
    /// Build the render graph (just the master mix) and split it into the
    /// control half and the [`Renderer`].
    pub(crate) fn split(sample_rate: u32, channels: u16, config: OutputConfig) -> (PendingOutput, Renderer) {
        let ctx = ProcessContext::new(sample_rate);
        let (commands, command_rx) = RingBuffer::new(config.command_capacity);
        // Every voice hands back two nodes
        let (retired_tx, retired) = RingBuffer::new(config.max_nodes.max(config.command_capacity * 2));

        let mut graph = AudioGraph::with_capacity(config.max_nodes);
        let master = NodeId(0);
        graph.insert(graph::prepare(Mixer::stereo(), master, ctx));
        graph.set_terminal(master);

        let renderer = Renderer::new(graph, master, command_rx, retired_tx, channels as usize);
        let pending = PendingOutput {
            ctx,
            channels,
            config,
            next_node_id: 1,
            commands,
            retired,
        };
        (pending, renderer)
    }

    /// An output with no device behind it. The caller renders by pulling
    /// buffers from the returned [`Renderer`], on any thread.
    ///
    /// ```
    /// use rauschen::{Generator, NoiseGenerator, NoiseKind, Output};
    ///
    /// let (output, mut renderer) = Output::offline(48_000, 2);
    /// let mut pink = NoiseGenerator::with_output(NoiseKind::Pink, &output);
    /// pink.start().unwrap();
    ///
    /// let samples = renderer.render_frames(4096);
    /// assert_eq!(samples.len(), 8192);
    /// ```
    pub fn offline(sample_rate: u32, channels: u16) -> (Self, Renderer) {
        Self::offline_with(sample_rate, channels, OutputConfig::default())
    }

    pub fn offline_with(sample_rate: u32, channels: u16, config: OutputConfig) -> (Self, Renderer) {
        let (pending, renderer) = Self::split(sample_rate, channels, config);
        let output = pending.finish("offline".into(), Arc::new(AtomicBool::new(true)), None);
        (output, renderer)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.ctx.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.inner.channels
    }

    pub fn config(&self) -> &OutputConfig {
        &self.inner.config
    }

    /// `false` once the device has failed or the renderer has been dropped.
    pub fn is_available(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire) && !lock(&self.inner.commands).producer.is_abandoned()
    }

    /// Wrap a node for this output's graph.
    pub(crate) fn prepare<N: AudioNode>(&self, node: N) -> PreparedNode {
        let id = NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed));
        graph::prepare(node, id, self.inner.ctx)
    }

    /// Publish a voice: `source` → `gain` → master.
    ///
    /// Returns `false` without publishing if the renderer is gone or there is
    /// no room left for both this attach and the voice's later detach.
    pub(crate) fn attach(&self, voice: Voice, source: PreparedNode, gain: PreparedNode) -> bool {
        let mut queue = lock(&self.inner.commands);
        if queue.producer.is_abandoned() || queue.producer.slots() < queue.reserved + 2 {
            debug!(output = %self.name(), reserved = queue.reserved, "no room for another voice");
            return false;
        }
        if queue.producer.push(GraphCommand::Attach { voice, source, gain }).is_err() {
            return false;
        }
        queue.reserved += 1;
        true
    }

    /// Unpublish a voice accepted by [`attach`](Self::attach). Never waits.
    pub(crate) fn detach(&self, voice: Voice) {
        let mut queue = lock(&self.inner.commands);
        queue.reserved = queue.reserved.saturating_sub(1);
        // Only fails once the renderer is gone, and the voice with it
        if queue.producer.push(GraphCommand::Detach(voice)).is_err() {
            debug!(output = %self.name(), "renderer gone, nothing to detach from");
        }
    }

    /// Drop nodes the renderer has finished with. Returns how many there were.
    pub(crate) fn collect_retired(&self) -> usize {
        let mut retired = lock(&self.inner.retired);
        let mut count = 0;
        while let Ok(slot) = retired.pop() {
            drop(slot);
            count += 1;
        }
        if count > 0 {
            debug!(output = %self.name(), count, "released retired nodes");
        }
        count
    }

    /// `true` if both handles refer to the same output.
    pub fn same_as(&self, other: &Output) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("name", &self.inner.name)
            .field("sample_rate", &self.inner.ctx.sample_rate)
            .field("channels", &self.inner.channels)
            .finish()
    }
}
