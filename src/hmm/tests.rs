//!
//! Engine-level tests that cross module boundaries
//!
use super::probs::ProbTable;
use super::training::TrainConfig;
use crate::common::State;
use crate::mocks::{mock_gc_hmm, mock_toy_hmm, random_sequence};
use crate::prob::Prob;
use itertools::Itertools;

///
/// log-probability of one complete path, computed directly from the
/// table (init * emit at position 1, then trans * emit at each step)
///
fn path_log_prob(table: &ProbTable, seq: &[u8], path: &[State]) -> Prob {
    let alphabet = table.alphabet();
    let symbols = alphabet.encode(seq).unwrap();
    assert_eq!(symbols.len(), path.len());
    let mut prob = table.init_prob(path[0]) * table.emit_prob(path[0], symbols[0]);
    for i in 1..path.len() {
        prob = prob * table.trans_prob(path[i - 1], path[i]) * table.emit_prob(path[i], symbols[i]);
    }
    prob
}

#[test]
fn viterbi_weight_dominates_every_path() {
    // brute-force check on a short sequence: the winning weight is the
    // maximum over all S^N complete paths
    let seq = b"GGCAC";
    let mut hmm = mock_toy_hmm();
    hmm.build(seq).unwrap();
    let out = hmm.viterbi();
    let best = hmm.best_last_node(&out).unwrap();
    let winning = out.weight(best);

    let mut max_over_paths = Prob::zero();
    for path in (0..seq.len())
        .map(|_| vec![1 as State, 2])
        .multi_cartesian_product()
    {
        let prob = path_log_prob(hmm.table(), seq, &path);
        assert!(winning >= prob || (winning.to_log_value() - prob.to_log_value()).abs() < 1e-9);
        if prob > max_over_paths {
            max_over_paths = prob;
        }
    }
    assert_abs_diff_eq!(
        winning.to_log_value(),
        max_over_paths.to_log_value(),
        epsilon = 1e-9
    );
}

#[test]
fn decoded_path_scores_the_winning_weight() {
    let seq = b"GGCACTGAA";
    let mut hmm = mock_toy_hmm();
    hmm.build(seq).unwrap();
    let out = hmm.viterbi();
    let path = hmm.decode(&out);
    let best = hmm.best_last_node(&out).unwrap();
    assert_abs_diff_eq!(
        path_log_prob(hmm.table(), seq, &path).to_log_value(),
        out.weight(best).to_log_value(),
        epsilon = 1e-9
    );
}

#[test]
fn forward_backward_agreement_on_random_sequences() {
    for seed in 0..5 {
        let seq = random_sequence(200, seed);
        let mut hmm = mock_gc_hmm();
        hmm.build(&seq).unwrap();
        let forward = hmm.forward();
        let backward = hmm.backward();
        let lf = hmm.log_likelihood(&forward).to_bits();
        let lb = hmm.log_likelihood_backward(&backward).to_bits();
        assert!(
            (lf - lb).abs() < 1e-6,
            "seed {}: forward {} bits vs backward {} bits",
            seed,
            lf,
            lb
        );
    }
}

#[test]
fn posteriors_normalize_on_random_sequences() {
    let seq = random_sequence(100, 7);
    let mut hmm = mock_gc_hmm();
    hmm.build(&seq).unwrap();
    let forward = hmm.forward();
    let backward = hmm.backward();
    let posterior = hmm.posterior(&forward, &backward);
    for position in hmm.trellis().positions().iter().skip(1) {
        let total: f64 = position
            .nodes
            .iter()
            .map(|&v| posterior.gamma(v).to_value())
            .sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn trellis_is_reused_across_iterations() {
    let mut hmm = mock_gc_hmm();
    hmm.build(b"GGGGCCCCATAT").unwrap();
    let n_nodes = hmm.trellis().n_nodes();
    let n_edges = hmm.trellis().n_edges();
    hmm.viterbi_training(3);
    // training swaps tables; the lattice topology is untouched
    assert_eq!(hmm.trellis().n_nodes(), n_nodes);
    assert_eq!(hmm.trellis().n_edges(), n_edges);
}

#[test]
fn gc_training_finds_the_gc_island() {
    // AT background with one GC-rich island in the middle
    let mut seq = Vec::new();
    seq.extend_from_slice(&b"AT".repeat(30));
    seq.extend_from_slice(&b"GC".repeat(20));
    seq.extend_from_slice(&b"AT".repeat(30));
    let mut hmm = mock_gc_hmm();
    hmm.build(&seq).unwrap();
    let out = hmm.viterbi();
    let path = hmm.decode(&out);
    // island positions decode to the GC-rich state
    assert_eq!(path[70], 2);
    assert_eq!(path[0], 1);
    assert_eq!(path[119], 1);
}

#[test]
fn baum_welch_on_empty_sequence_is_a_noop() {
    let mut hmm = mock_gc_hmm();
    hmm.build(b"").unwrap();
    let before = hmm.table().clone();
    let summary = hmm.baum_welch(&TrainConfig {
        threshold_bits: 0.1,
        max_iterations: 2,
    });
    // likelihood is log-zero (undefined) and the table survives unchanged
    assert_eq!(summary.log_likelihood_bits, f64::NEG_INFINITY);
    for s in before.states() {
        assert_eq!(hmm.table().init_prob(s), before.init_prob(s));
        for t in before.states() {
            assert_eq!(hmm.table().trans_prob(s, t), before.trans_prob(s, t));
        }
    }
}
