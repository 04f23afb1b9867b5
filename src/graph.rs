//! Render graph - owns the nodes of every attached voice
//!
//! Nodes are wrapped on the control thread ([`prepare`]) and inserted on the
//! render thread. The graph is a `StableGraph` so that removing a finished
//! voice never shifts the indices of the nodes still playing.

use dasp_graph::{Buffer, Input, NodeData, Processor};
use hashbrown::HashMap;
use petgraph::stable_graph::{NodeIndex, StableGraph};

use crate::node::{AudioNode, NodeId, ProcessContext};

// Type-erased wrapper so heterogeneous nodes share one graph
trait ErasedNode: Send {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]);
}

impl<N: AudioNode> ErasedNode for N {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]) {
        self.process(ctx, inputs, outputs);
    }
}

pub(crate) struct DaspAdapter {
    node: Box<dyn ErasedNode>,
    ctx: ProcessContext,
}

impl dasp_graph::Node for DaspAdapter {
    fn process(&mut self, inputs: &[Input], outputs: &mut [Buffer]) {
        self.node.process_erased(&self.ctx, inputs, outputs);
    }
}

/// A node plus its output buffers, as stored in the graph.
pub(crate) type Slot = NodeData<DaspAdapter>;

/// A node that has been boxed and given buffers, but not yet inserted.
pub(crate) struct PreparedNode {
    id: NodeId,
    slot: Slot,
}

impl PreparedNode {
    pub(crate) fn id(&self) -> NodeId {
        self.id
    }
}

/// Box `node` and give it output buffers. All allocation for a node happens
/// here, on the calling (control) thread.
pub(crate) fn prepare<N: AudioNode>(node: N, id: NodeId, ctx: ProcessContext) -> PreparedNode {
    // dasp_graph wants at least one buffer even for nodes with no outputs
    let buffers = (0..node.num_outputs().max(1)).map(|_| Buffer::default()).collect();
    let adapter = DaspAdapter { node: Box::new(node), ctx };
    PreparedNode { id, slot: NodeData::new(adapter, buffers) }
}

type InnerGraph = StableGraph<Slot, ()>;

/// The graph walked by the render thread.
pub(crate) struct AudioGraph {
    graph: InnerGraph,
    processor: Processor<InnerGraph>,
    node_indices: HashMap<NodeId, NodeIndex>,
    terminal: Option<NodeIndex>,
}

impl AudioGraph {
    /// Create a graph with room for `capacity` nodes before it has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            graph: InnerGraph::with_capacity(capacity, capacity),
            processor: Processor::with_capacity(capacity),
            node_indices: HashMap::with_capacity(capacity),
            terminal: None,
        }
    }

    pub fn insert(&mut self, prepared: PreparedNode) {
        let idx = self.graph.add_node(prepared.slot);
        self.node_indices.insert(prepared.id, idx);
    }

    /// Connect the output of `from` to the input of `to`.
    ///
    /// Returns `false` if either node is unknown.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> bool {
        match (self.node_indices.get(&from), self.node_indices.get(&to)) {
            (Some(&a), Some(&b)) => {
                self.graph.add_edge(a, b, ());
                true
            }
            _ => false,
        }
    }

    /// Remove the edge from `from` to `to`, if there is one.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> bool {
        let (Some(&a), Some(&b)) = (self.node_indices.get(&from), self.node_indices.get(&to)) else {
            return false;
        };
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Take a node (and any edges touching it) out of the graph.
    pub fn remove(&mut self, id: NodeId) -> Option<Slot> {
        let idx = self.node_indices.remove(&id)?;
        if self.terminal == Some(idx) {
            self.terminal = None;
        }
        self.graph.remove_node(idx)
    }

    #[cfg(test)]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node_indices.contains_key(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Set which node to process to (the master mix)
    pub fn set_terminal(&mut self, id: NodeId) -> bool {
        match self.node_indices.get(&id) {
            Some(&idx) => {
                self.terminal = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Render one block through everything upstream of the terminal.
    pub fn process(&mut self) {
        if let Some(terminal) = self.terminal {
            self.processor.process(&mut self.graph, terminal);
        }
    }

    /// Output buffers of the terminal node from the last [`process`](Self::process).
    pub fn terminal_buffers(&self) -> &[Buffer] {
        self.terminal
            .and_then(|idx| self.graph.node_weight(idx))
            .map(|slot| slot.buffers.as_slice())
            .unwrap_or(&[])
    }
}
