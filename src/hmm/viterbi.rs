//!
//! Viterbi pass: highest-weight path through the trellis
//!
use super::common::Hmm;
use super::trellis::NodeIndex;
use crate::common::State;
use crate::prob::Prob;

///
/// Per-node result of one Viterbi pass.
///
/// `weights[v]` is the log-probability of the best path from the start
/// node to `v`; `preds[v]` is the predecessor on that path. Both are
/// recomputed by every pass and must not be read across passes.
///
#[derive(Debug, Clone)]
pub struct ViterbiOutput {
    pub weights: Vec<Prob>,
    pub preds: Vec<Option<NodeIndex>>,
}

impl ViterbiOutput {
    pub fn weight(&self, v: NodeIndex) -> Prob {
        self.weights[v.index()]
    }
    pub fn pred(&self, v: NodeIndex) -> Option<NodeIndex> {
        self.preds[v.index()]
    }
}

impl Hmm {
    ///
    /// Run the Viterbi pass left to right.
    ///
    /// For every node, over its incoming transitions:
    /// `score = pred weight * transition prob * emission prob`
    /// (log space), keeping the maximum and its predecessor. The start
    /// node's weight is fixed at log 1. Ties keep the first-encountered
    /// incoming transition; the rule is fixed for reproducibility but not
    /// a guarantee of the interface.
    ///
    pub fn viterbi(&self) -> ViterbiOutput {
        let trellis = self.trellis();
        let table = self.table();
        let mut weights = vec![Prob::zero(); trellis.n_nodes()];
        let mut preds: Vec<Option<NodeIndex>> = vec![None; trellis.n_nodes()];
        weights[trellis.start_node().index()] = Prob::one();

        for position in trellis.positions().iter().skip(1) {
            for &v in position.nodes.iter() {
                let emit = trellis.emit_log_prob(v, table);
                let mut best = Prob::zero();
                let mut best_pred = None;
                for (e, parent) in trellis.parents(v) {
                    let score = weights[parent.index()] * trellis.trans_log_prob(e, table) * emit;
                    if score > best || best_pred.is_none() {
                        best = score;
                        best_pred = Some(parent);
                    }
                }
                weights[v.index()] = best;
                preds[v.index()] = best_pred;
            }
        }

        ViterbiOutput { weights, preds }
    }

    ///
    /// the node with the maximum weight at the last position
    /// (first-encountered node wins ties; None on the empty trellis)
    ///
    pub fn best_last_node(&self, out: &ViterbiOutput) -> Option<NodeIndex> {
        let trellis = self.trellis();
        if trellis.n_symbols() == 0 {
            return None;
        }
        let mut best: Option<NodeIndex> = None;
        for &v in trellis.last_position().nodes.iter() {
            match best {
                None => best = Some(v),
                Some(b) => {
                    if out.weight(v) > out.weight(b) {
                        best = Some(v);
                    }
                }
            }
        }
        best
    }

    ///
    /// Decode the optimal state path by walking `preds` backward from the
    /// best last-position node. Returned in sequence order: `path[i]` is
    /// the state at position `i + 1`. Empty for the start-only trellis.
    ///
    pub fn decode(&self, out: &ViterbiOutput) -> Vec<State> {
        let trellis = self.trellis();
        let mut path = Vec::with_capacity(trellis.n_symbols());
        let mut v = match self.best_last_node(out) {
            Some(v) => v,
            None => return path,
        };
        while !trellis.node(v).is_start() {
            path.push(trellis.node(v).state);
            v = out
                .pred(v)
                .unwrap_or_else(|| panic!("viterbi path broken at position {}", trellis.node(v).pos));
        }
        path.reverse();
        path
    }
}

//
// tests
//
