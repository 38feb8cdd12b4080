//!
//! Backward pass
//!
use super::common::Hmm;
use super::trellis::NodeIndex;
use crate::prob::Prob;

///
/// Per-node backward log-probabilities of one pass.
///
/// `probs[v]` = P(emitting the symbols after the node's position | being
/// in the node's state there). Recomputed every pass. The start node's
/// entry is unused.
///
#[derive(Debug, Clone)]
pub struct BackwardOutput {
    pub probs: Vec<Prob>,
}

impl BackwardOutput {
    pub fn prob(&self, v: NodeIndex) -> Prob {
        self.probs[v.index()]
    }
}

impl Hmm {
    ///
    /// Run the backward pass right to left.
    ///
    /// Every node of the last position carries log 1; walking backward,
    /// each node sums `transition * emission(child) * backward(child)`
    /// over its outgoing transitions, in log space.
    ///
    pub fn backward(&self) -> BackwardOutput {
        let trellis = self.trellis();
        let table = self.table();
        let mut probs = vec![Prob::zero(); trellis.n_nodes()];
        if trellis.n_symbols() == 0 {
            return BackwardOutput { probs };
        }

        for &v in trellis.last_position().nodes.iter() {
            probs[v.index()] = Prob::one();
        }
        for position in trellis.positions().iter().rev().skip(1) {
            if position.id == 0 {
                break;
            }
            for &v in position.nodes.iter() {
                let beta: Prob = trellis
                    .childs(v)
                    .map(|(e, child)| {
                        trellis.trans_log_prob(e, table)
                            * trellis.emit_log_prob(child, table)
                            * probs[child.index()]
                    })
                    .sum();
                probs[v.index()] = beta;
            }
        }

        BackwardOutput { probs }
    }
}

//
// tests
//
