//!
//! Node/transition posteriors and sequence log-likelihood
//!
//! Combines one forward and one backward pass into the quantities
//! Baum-Welch re-estimates from:
//!
//! * gamma — P(state at a position | whole sequence), normalized per
//!   position
//! * epsilon — P(transition between two positions | whole sequence),
//!   normalized per position over that position's outgoing transitions
//!
use super::backward::BackwardOutput;
use super::common::Hmm;
use super::forward::ForwardOutput;
use super::trellis::{EdgeIndex, NodeIndex};
use crate::prob::Prob;

///
/// gamma per node and epsilon per edge, for one iteration.
///
/// The synthetic start node and its outgoing transitions carry no
/// posterior and stay at log-zero.
///
#[derive(Debug, Clone)]
pub struct PosteriorOutput {
    pub gamma: Vec<Prob>,
    pub epsilon: Vec<Prob>,
}

impl PosteriorOutput {
    pub fn gamma(&self, v: NodeIndex) -> Prob {
        self.gamma[v.index()]
    }
    pub fn epsilon(&self, e: EdgeIndex) -> Prob {
        self.epsilon[e.index()]
    }
}

impl Hmm {
    ///
    /// Compute gamma and epsilon from a forward and a backward pass.
    ///
    pub fn posterior(&self, forward: &ForwardOutput, backward: &BackwardOutput) -> PosteriorOutput {
        let trellis = self.trellis();
        let table = self.table();
        let mut gamma = vec![Prob::zero(); trellis.n_nodes()];
        let mut epsilon = vec![Prob::zero(); trellis.n_edges()];

        // gamma: forward * backward, normalized within each position
        for position in trellis.positions().iter().skip(1) {
            let mut normalizer = Prob::zero();
            for &v in position.nodes.iter() {
                let raw = forward.prob(v) * backward.prob(v);
                gamma[v.index()] = raw;
                normalizer += raw;
            }
            if normalizer.is_zero() {
                continue;
            }
            for &v in position.nodes.iter() {
                gamma[v.index()] = gamma[v.index()] / normalizer;
            }
        }

        // epsilon: forward(src) * trans * emit(dst) * backward(dst),
        // normalized within each position's outgoing transition set.
        // The start node's outgoing set is skipped; the last position has
        // no outgoing transitions.
        for position in trellis.positions().iter().skip(1) {
            let mut normalizer = Prob::zero();
            let mut edges = Vec::new();
            for &v in position.nodes.iter() {
                for (e, child) in trellis.childs(v) {
                    let raw = forward.prob(v)
                        * trellis.trans_log_prob(e, table)
                        * trellis.emit_log_prob(child, table)
                        * backward.prob(child);
                    epsilon[e.index()] = raw;
                    normalizer += raw;
                    edges.push(e);
                }
            }
            if normalizer.is_zero() {
                continue;
            }
            for e in edges {
                epsilon[e.index()] = epsilon[e.index()] / normalizer;
            }
        }

        PosteriorOutput { gamma, epsilon }
    }

    ///
    /// Log-likelihood of the whole sequence: sum of forward probabilities
    /// over the last position. Log-zero for the start-only trellis.
    ///
    pub fn log_likelihood(&self, forward: &ForwardOutput) -> Prob {
        let trellis = self.trellis();
        if trellis.n_symbols() == 0 {
            return Prob::zero();
        }
        trellis
            .last_position()
            .nodes
            .iter()
            .map(|&v| forward.prob(v))
            .sum()
    }

    ///
    /// The same likelihood derived from the backward side:
    /// `sum over first-position states of initiation * emission * backward`.
    /// Must agree with `log_likelihood` within numerical tolerance; the
    /// pair is the standard self-check of the two passes.
    ///
    pub fn log_likelihood_backward(&self, backward: &BackwardOutput) -> Prob {
        let trellis = self.trellis();
        let table = self.table();
        if trellis.n_symbols() == 0 {
            return Prob::zero();
        }
        trellis
            .position(1)
            .nodes
            .iter()
            .map(|&v| {
                let state = trellis.node(v).state;
                table.init_prob(state) * trellis.emit_log_prob(v, table) * backward.prob(v)
            })
            .sum()
    }
}

//
// tests
//
