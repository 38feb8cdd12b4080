//!
//! Forward pass
//!
use super::common::Hmm;
use super::trellis::NodeIndex;
use crate::prob::Prob;

///
/// Per-node forward log-probabilities of one pass.
///
/// `probs[v]` = P(emitting the symbols up to and including the node's
/// position, and being in the node's state there). Recomputed every pass.
///
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    pub probs: Vec<Prob>,
}

impl ForwardOutput {
    pub fn prob(&self, v: NodeIndex) -> Prob {
        self.probs[v.index()]
    }
}

impl Hmm {
    ///
    /// Run the forward pass left to right.
    ///
    /// The start node carries log 1, so the first real position reduces
    /// to `initiation * emission` and every later position is
    /// `(sum over parents of forward * transition) * emission`, all in
    /// log space.
    ///
    pub fn forward(&self) -> ForwardOutput {
        let trellis = self.trellis();
        let table = self.table();
        let mut probs = vec![Prob::zero(); trellis.n_nodes()];
        probs[trellis.start_node().index()] = Prob::one();

        for position in trellis.positions().iter().skip(1) {
            for &v in position.nodes.iter() {
                let alpha: Prob = trellis
                    .parents(v)
                    .map(|(e, parent)| probs[parent.index()] * trellis.trans_log_prob(e, table))
                    .sum();
                probs[v.index()] = alpha * trellis.emit_log_prob(v, table);
            }
        }

        ForwardOutput { probs }
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::probs::ProbTable;
    use crate::topology::StateTopology;

    #[test]
    fn forward_first_position() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::toy());
        hmm.build(b"G").unwrap();
        let out = hmm.forward();
        let trellis = hmm.trellis();
        // alpha_1(s) = init(s) * emit(s, G)
        let v1 = trellis.position(1).nodes[0];
        let v2 = trellis.position(1).nodes[1];
        assert_abs_diff_eq!(out.prob(v1).to_value(), 0.5 * 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(out.prob(v2).to_value(), 0.5 * 0.2, epsilon = 1e-12);
    }

    #[test]
    fn forward_sums_over_paths() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::toy());
        hmm.build(b"GA").unwrap();
        let out = hmm.forward();
        let trellis = hmm.trellis();
        // alpha_2(1) = (alpha_1(1) t11 + alpha_1(2) t21) e1(A)
        let a11 = 0.5 * 0.3;
        let a12 = 0.5 * 0.2;
        let expected = (a11 * 0.5 + a12 * 0.4) * 0.2;
        let v = trellis.position(2).nodes[0];
        assert_abs_diff_eq!(out.prob(v).to_value(), expected, epsilon = 1e-12);
    }
}
