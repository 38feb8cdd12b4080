//!
//! Training loops
//!
//! * Viterbi training: a fixed number of decode / collect / re-estimate
//!   rounds; only transition probabilities are re-estimated.
//! * Baum-Welch: forward / backward / posteriors / re-estimate all three
//!   probability families, repeated until the log-likelihood (in bits)
//!   stabilizes or the iteration ceiling is hit.
//!
use super::common::Hmm;
use super::probs::ProbTable;
use super::result::ViterbiIterationResult;
use crate::prob::Prob;
use crate::report::xml_result;
use log::{info, warn};

///
/// Knobs of the Baum-Welch loop.
///
/// The reference procedure stops on the likelihood delta alone; the
/// ceiling bounds pathological inputs and surfaces non-convergence in
/// the summary instead of looping forever.
///
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// stop when |delta log-likelihood| drops below this many bits
    pub threshold_bits: f64,
    /// hard iteration ceiling
    pub max_iterations: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            threshold_bits: 0.1,
            max_iterations: 1000,
        }
    }
}

///
/// Outcome of one Baum-Welch run.
///
#[derive(Clone, Debug)]
pub struct BaumWelchSummary {
    pub iterations: usize,
    /// log-likelihood (bits) of the final iteration
    pub log_likelihood_bits: f64,
    /// log-likelihood (bits) after each iteration, in order
    pub history: Vec<f64>,
    pub converged: bool,
}

impl BaumWelchSummary {
    ///
    /// `<result type="EM_result">` block: iteration count, final
    /// likelihood, convergence flag and the final table
    ///
    pub fn results_string(&self, table: &ProbTable) -> String {
        let mut out = String::new();
        out.push_str("    <result type=\"EM_result\">\n");
        out.push_str(&xml_result("iterations", &self.iterations.to_string()));
        out.push_str(&xml_result(
            "log_likelihood",
            &format!("{:.5}", self.log_likelihood_bits),
        ));
        out.push_str(&xml_result("converged", &self.converged.to_string()));
        out.push_str(&table.results_string());
        out.push_str("    </result>\n");
        out
    }
}

impl Hmm {
    ///
    /// Viterbi training for a fixed number of iterations.
    ///
    /// Each iteration decodes the best path under the active table,
    /// gathers its statistics, and replaces the table with the
    /// re-estimated one. Results are returned in iteration order.
    ///
    pub fn viterbi_training(&mut self, n_iterations: usize) -> Vec<ViterbiIterationResult> {
        let mut results = Vec::with_capacity(n_iterations);
        for iteration in 1..=n_iterations {
            let out = self.viterbi();
            let result = ViterbiIterationResult::gather(self, &out, iteration);
            info!(
                "viterbi iteration={} states={:?}",
                iteration,
                &result.state_counts[1..]
            );
            self.replace_table(result.table.clone());
            results.push(result);
        }
        results
    }

    ///
    /// Baum-Welch training to convergence (or the iteration ceiling).
    ///
    pub fn baum_welch(&mut self, config: &TrainConfig) -> BaumWelchSummary {
        let mut history = Vec::new();
        let mut previous_bits: Option<f64> = None;
        let mut converged = false;

        let mut iterations = 0;
        while iterations < config.max_iterations {
            let forward = self.forward();
            let backward = self.backward();
            let posterior = self.posterior(&forward, &backward);
            let bits = self.log_likelihood(&forward).to_bits();

            let table = self.reestimate_from_posteriors(&posterior);
            self.replace_table(table);

            iterations += 1;
            history.push(bits);
            info!("baum-welch iteration={} log_likelihood={:.5}", iterations, bits);

            if let Some(previous) = previous_bits {
                if (previous - bits).abs() < config.threshold_bits {
                    converged = true;
                    break;
                }
            }
            previous_bits = Some(bits);
        }

        if !converged {
            warn!(
                "baum-welch stopped at the iteration ceiling ({}) without converging",
                config.max_iterations
            );
        }
        BaumWelchSummary {
            iterations,
            log_likelihood_bits: history.last().copied().unwrap_or(f64::NEG_INFINITY),
            history,
            converged,
        }
    }

    ///
    /// E-step re-estimation: a fresh table from node and transition
    /// posteriors. A state whose denominator stays log-zero was never
    /// visited under the current table; its previous entries are kept so
    /// the sentinel cannot leak into later passes.
    ///
    fn reestimate_from_posteriors(
        &self,
        posterior: &super::posterior::PosteriorOutput,
    ) -> ProbTable {
        let trellis = self.trellis();
        let previous = self.table();
        let n_states = previous.n_states();
        let n_symbols = previous.alphabet().n_symbols();
        let mut table = ProbTable::new(n_states, previous.alphabet().clone());

        // emission: numerator per (state, symbol), denominator per state,
        // over all real positions
        let mut emit_num = vec![vec![Prob::zero(); n_symbols]; n_states + 1];
        let mut emit_denom = vec![Prob::zero(); n_states + 1];
        for position in trellis.positions().iter().skip(1) {
            for &v in position.nodes.iter() {
                let node = trellis.node(v);
                let gamma = posterior.gamma(v);
                emit_num[node.state][node.symbol.unwrap()] += gamma;
                emit_denom[node.state] += gamma;
            }
        }
        for state in 1..=n_states {
            if emit_denom[state].is_zero() {
                warn!("state {} unreachable; emission row kept", state);
                for symbol in 0..n_symbols {
                    table.set_emit_prob(state, symbol, previous.emit_prob(state, symbol));
                }
                continue;
            }
            for symbol in 0..n_symbols {
                table.set_emit_prob(state, symbol, emit_num[state][symbol] / emit_denom[state]);
            }
        }

        // initiation: gamma at the first real position
        if trellis.n_symbols() > 0 {
            for &v in trellis.position(1).nodes.iter() {
                table.set_init_prob(trellis.node(v).state, posterior.gamma(v));
            }
        } else {
            for state in 1..=n_states {
                table.set_init_prob(state, previous.init_prob(state));
            }
        }

        // transition: epsilon per (state, state), gamma per state over
        // positions with outgoing transitions (the last one has none)
        let mut trans_num = vec![vec![Prob::zero(); n_states + 1]; n_states + 1];
        let mut trans_denom = vec![Prob::zero(); n_states + 1];
        for position in trellis.positions().iter().skip(1) {
            if position.id == trellis.n_symbols() {
                continue;
            }
            for &v in position.nodes.iter() {
                let from = trellis.node(v).state;
                trans_denom[from] += posterior.gamma(v);
                for (e, child) in trellis.childs(v) {
                    let to = trellis.node(child).state;
                    trans_num[from][to] += posterior.epsilon(e);
                }
            }
        }
        for from in 1..=n_states {
            if trans_denom[from].is_zero() {
                warn!("state {} unreachable; transition row kept", from);
                for to in 1..=n_states {
                    table.set_trans_prob(from, to, previous.trans_prob(from, to));
                }
                continue;
            }
            for to in 1..=n_states {
                table.set_trans_prob(from, to, trans_num[from][to] / trans_denom[from]);
            }
        }

        table
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::result::PathIntervals;
    use crate::topology::StateTopology;

    #[test]
    fn viterbi_training_replaces_transitions_only() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::toy());
        hmm.build(b"GGCACTGAA").unwrap();
        let initial = hmm.table().clone();
        let results = hmm.viterbi_training(1);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.iteration, 1);
        // path 111222222
        assert_eq!(result.state_counts[1], 3);
        assert_eq!(result.state_counts[2], 6);
        assert_eq!(result.transition_counts[1][1], 2);
        assert_eq!(result.transition_counts[1][2], 1);
        assert_eq!(result.transition_counts[2][2], 5);
        // active table was replaced with the re-estimated one
        assert_abs_diff_eq!(
            hmm.table().trans_prob(1, 1).to_value(),
            2.0 / 3.0,
            epsilon = 1e-12
        );
        // emission and initiation kept
        assert_eq!(hmm.table().init_prob(1), initial.init_prob(1));
        assert_eq!(hmm.table().emit_prob(1, 0), initial.emit_prob(1, 0));
    }

    #[test]
    fn viterbi_training_rows_normalize() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::initial_gc());
        hmm.build(b"GGGGCCCCGGGGATATATATATAT").unwrap();
        let results = hmm.viterbi_training(3);
        for result in results.iter() {
            for s in result.table.states() {
                let outgoing: usize = result.transition_counts[s].iter().sum();
                if outgoing == 0 {
                    continue;
                }
                let row: f64 = result
                    .table
                    .states()
                    .map(|t| result.table.trans_prob(s, t).to_value())
                    .sum();
                assert_abs_diff_eq!(row, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn baum_welch_likelihood_is_monotone_on_uniform_input() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::initial_gc());
        hmm.build(&vec![b'A'; 40]).unwrap();
        let summary = hmm.baum_welch(&TrainConfig::default());
        assert!(summary.iterations >= 1);
        for pair in summary.history.windows(2) {
            assert!(
                pair[1] >= pair[0] - 1e-9,
                "likelihood decreased: {} -> {}",
                pair[0],
                pair[1]
            );
        }
        assert!(summary.converged);
    }

    #[test]
    fn baum_welch_reestimated_rows_normalize() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::initial_gc());
        hmm.build(b"GGCACTGAAGGCACTGAA").unwrap();
        hmm.baum_welch(&TrainConfig {
            threshold_bits: 0.1,
            max_iterations: 5,
        });
        let table = hmm.table();
        let init: f64 = table.states().map(|s| table.init_prob(s).to_value()).sum();
        assert_abs_diff_eq!(init, 1.0, epsilon = 1e-6);
        for s in table.states() {
            let trans: f64 = table
                .states()
                .map(|t| table.trans_prob(s, t).to_value())
                .sum();
            assert_abs_diff_eq!(trans, 1.0, epsilon = 1e-6);
            let emit: f64 = (0..4).map(|a| table.emit_prob(s, a).to_value()).sum();
            assert_abs_diff_eq!(emit, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn baum_welch_iteration_ceiling() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::initial_gc());
        hmm.build(b"GGCACTGAAGGCACTGAA").unwrap();
        let summary = hmm.baum_welch(&TrainConfig {
            // an impossible threshold forces the ceiling
            threshold_bits: 0.0,
            max_iterations: 4,
        });
        assert_eq!(summary.iterations, 4);
        assert!(!summary.converged);
        assert_eq!(summary.history.len(), 4);
    }

    #[test]
    fn forward_backward_likelihoods_agree_across_iterations() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::initial_gc());
        hmm.build(b"GGGGCCCCATATATGGGGCCCC").unwrap();
        for _ in 0..4 {
            let forward = hmm.forward();
            let backward = hmm.backward();
            let lf = hmm.log_likelihood(&forward).to_bits();
            let lb = hmm.log_likelihood_backward(&backward).to_bits();
            assert!((lf - lb).abs() < 1e-6);
            let posterior = hmm.posterior(&forward, &backward);
            let table = hmm.reestimate_from_posteriors(&posterior);
            hmm.replace_table(table);
        }
    }

    #[test]
    fn training_report_shapes() {
        let mut hmm = Hmm::new(StateTopology::gc_two_state(), ProbTable::initial_gc());
        hmm.build(b"GGGGCCCCATATAT").unwrap();
        let results = hmm.viterbi_training(2);
        let report = crate::hmm::result::training_results_string(&results);
        // one iteration block per iteration, interval list only once
        assert_eq!(report.matches("type=\"viterbi_iteration\"").count(), 2);
        assert_eq!(report.matches("type=\"segment_list\"").count(), 2); // one per state, last iteration only
        match &results[0].intervals {
            PathIntervals::Segments { .. } => {}
            _ => panic!("gc topology reports segments"),
        }
    }
}
