//!
//! The trellis: per-position, per-state DP lattice
//!
//! One `TrellisNode` per (position, real state) plus a single synthetic
//! start node at position 0. Consecutive positions are densely linked, so
//! every step costs `O(S^2)` edges. Nodes and edges live in a
//! `petgraph::DiGraph` arena and are addressed by `NodeIndex`/`EdgeIndex`
//! everywhere; nothing owns a node except the trellis itself.
//!
//! Edges carry no probability. The log-probability of a transition is
//! derived from the active table when a pass asks for it: the initiation
//! probability if the edge leaves the start node, the transition
//! probability otherwise. This is what makes the topology reusable across
//! training iterations, which only swap the table.
//!
use super::probs::ProbTable;
use crate::alphabet::SymbolId;
use crate::common::{State, START_STATE};
use crate::prob::Prob;
use petgraph::graph::DiGraph;
pub use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::Direction;

///
/// one node of the trellis
///
#[derive(Clone, Copy, Debug)]
pub struct TrellisNode {
    /// position in the sequence (1-based; 0 is the synthetic start)
    pub pos: usize,
    /// hidden state of this node (0 only for the synthetic start)
    pub state: State,
    /// emitted symbol at this position (None only for the synthetic start)
    pub symbol: Option<SymbolId>,
}

impl TrellisNode {
    pub fn is_start(&self) -> bool {
        self.state == START_STATE
    }
}

///
/// ordered set of the nodes of one sequence offset
///
#[derive(Clone, Debug)]
pub struct Position {
    pub id: usize,
    /// one node per real state, in ascending state order
    pub nodes: Vec<NodeIndex>,
}

///
/// the whole lattice: `sequence length + 1` positions
///
#[derive(Debug)]
pub struct Trellis {
    graph: DiGraph<TrellisNode, ()>,
    positions: Vec<Position>,
}

impl Trellis {
    ///
    /// Build the trellis for an encoded symbol sequence and `n_states`
    /// real states. Built once per sequence; passes only read it.
    ///
    pub fn build(symbols: &[SymbolId], n_states: usize) -> Trellis {
        assert!(n_states >= 1);
        let mut graph = DiGraph::new();
        let mut positions = Vec::with_capacity(symbols.len() + 1);

        // synthetic start position
        let start = graph.add_node(TrellisNode {
            pos: 0,
            state: START_STATE,
            symbol: None,
        });
        positions.push(Position {
            id: 0,
            nodes: vec![start],
        });

        for (offset, &symbol) in symbols.iter().enumerate() {
            let pos = offset + 1;
            let nodes: Vec<NodeIndex> = (1..=n_states)
                .map(|state| {
                    graph.add_node(TrellisNode {
                        pos,
                        state,
                        symbol: Some(symbol),
                    })
                })
                .collect();
            // dense bipartite linking to the previous position
            for &node in nodes.iter() {
                for &prev in positions[pos - 1].nodes.iter() {
                    graph.add_edge(prev, node, ());
                }
            }
            positions.push(Position { id: pos, nodes });
        }

        Trellis { graph, positions }
    }

    ///
    /// number of positions, synthetic start included
    ///
    pub fn n_positions(&self) -> usize {
        self.positions.len()
    }
    ///
    /// length of the modeled symbol sequence
    ///
    pub fn n_symbols(&self) -> usize {
        self.positions.len() - 1
    }
    pub fn n_nodes(&self) -> usize {
        self.graph.node_count()
    }
    pub fn n_edges(&self) -> usize {
        self.graph.edge_count()
    }
    pub fn start_node(&self) -> NodeIndex {
        self.positions[0].nodes[0]
    }
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }
    pub fn position(&self, id: usize) -> &Position {
        &self.positions[id]
    }
    pub fn last_position(&self) -> &Position {
        self.positions.last().unwrap()
    }
    pub fn node(&self, v: NodeIndex) -> &TrellisNode {
        self.graph.node_weight(v).unwrap()
    }
    ///
    /// iterate incoming transitions of a node as `(edge, parent)`
    ///
    pub fn parents(&self, v: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        use petgraph::visit::EdgeRef;
        self.graph
            .edges_directed(v, Direction::Incoming)
            .map(|e| (e.id(), e.source()))
    }
    ///
    /// iterate outgoing transitions of a node as `(edge, child)`
    ///
    pub fn childs(&self, v: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        use petgraph::visit::EdgeRef;
        self.graph
            .edges_directed(v, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
    }
    pub fn edge_endpoints(&self, e: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.graph.edge_endpoints(e).unwrap()
    }
    ///
    /// log-probability of a transition under the given table:
    /// initiation if the edge leaves the start node, transition otherwise
    ///
    pub fn trans_log_prob(&self, e: EdgeIndex, table: &ProbTable) -> Prob {
        let (source, target) = self.edge_endpoints(e);
        let source = self.node(source);
        let target = self.node(target);
        if source.is_start() {
            table.init_prob(target.state)
        } else {
            table.trans_prob(source.state, target.state)
        }
    }
    ///
    /// log emission probability of a node under the given table
    /// (panics on the symbol-less start node)
    ///
    pub fn emit_log_prob(&self, v: NodeIndex, table: &ProbTable) -> Prob {
        let node = self.node(v);
        let symbol = node
            .symbol
            .unwrap_or_else(|| panic!("start node has no emission"));
        table.emit_prob(node.state, symbol)
    }
}

//
// tests
//
