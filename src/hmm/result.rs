//!
//! Per-iteration results of Viterbi training
//!
//! Derived from one decoded path: state occurrence counts, transition
//! occurrence counts and the path's intervals (contiguous per-state
//! segments, or strand-tagged genes, depending on the topology's result
//! mode), plus the table re-estimated from them. A result is created
//! once per iteration and never mutated afterwards.
//!
use super::common::Hmm;
use super::probs::ProbTable;
use super::viterbi::ViterbiOutput;
use crate::common::State;
use crate::report::{xml_result, xml_result_with_attrs};
use crate::topology::{ResultMode, StateLabel, StateTopology, Strand};

///
/// a gene call: 1-based inclusive positions and the strand
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gene {
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
}

///
/// intervals extracted from one decoded path
///
#[derive(Clone, Debug, PartialEq)]
pub enum PathIntervals {
    /// contiguous runs of one state; `per_state[s]` lists the runs of
    /// state `s` in sequence order (`per_state[0]` unused)
    Segments {
        per_state: Vec<Vec<(usize, usize)>>,
        counts: Vec<usize>,
    },
    /// contiguous runs of gene states of one strand, in sequence order
    Genes {
        genes: Vec<Gene>,
        top: usize,
        bottom: usize,
    },
}

impl PathIntervals {
    ///
    /// Extract intervals from a decoded path (`path[i]` = state at
    /// position `i + 1`). A segment closes when the state changes; a gene
    /// closes when the state label (gene membership or strand) changes.
    ///
    pub fn from_path(path: &[State], topology: &StateTopology) -> PathIntervals {
        match topology.mode() {
            ResultMode::Segments => {
                let mut per_state = vec![Vec::new(); topology.n_states() + 1];
                let mut counts = vec![0; topology.n_states() + 1];
                for (state, start, end) in runs(path, |&s| s) {
                    per_state[state].push((start, end));
                    counts[state] += 1;
                }
                PathIntervals::Segments { per_state, counts }
            }
            ResultMode::Genes => {
                let mut genes = Vec::new();
                let mut top = 0;
                let mut bottom = 0;
                for (label, start, end) in runs(path, |&s| topology.label(s)) {
                    if let StateLabel::Gene(strand) = label {
                        genes.push(Gene { start, end, strand });
                        match strand {
                            Strand::Top => top += 1,
                            Strand::Bottom => bottom += 1,
                        }
                    }
                }
                PathIntervals::Genes { genes, top, bottom }
            }
        }
    }
}

///
/// contiguous runs of an identical key along the path, as
/// `(key, start position, end position)` with 1-based inclusive bounds
///
fn runs<K, F>(path: &[State], key_of: F) -> Vec<(K, usize, usize)>
where
    K: PartialEq + Copy,
    F: Fn(&State) -> K,
{
    let mut out = Vec::new();
    let mut iter = path.iter().enumerate();
    let (_, first) = match iter.next() {
        Some(first) => first,
        None => return out,
    };
    let mut current = (key_of(first), 1, 1);
    for (i, state) in iter {
        let key = key_of(state);
        if key == current.0 {
            current.2 = i + 1;
        } else {
            out.push(current);
            current = (key, i + 1, i + 1);
        }
    }
    out.push(current);
    out
}

///
/// Results of one Viterbi-training iteration.
///
#[derive(Clone, Debug)]
pub struct ViterbiIterationResult {
    pub iteration: usize,
    /// occurrences of each state on the path (`[0]` unused)
    pub state_counts: Vec<usize>,
    /// occurrences of each state-to-state step on the path
    pub transition_counts: Vec<Vec<usize>>,
    pub intervals: PathIntervals,
    /// the table re-estimated from this path
    pub table: ProbTable,
}

impl ViterbiIterationResult {
    ///
    /// Decode the path of a Viterbi pass and accumulate its statistics,
    /// then re-estimate the table for the next iteration.
    ///
    pub fn gather(hmm: &Hmm, out: &ViterbiOutput, iteration: usize) -> ViterbiIterationResult {
        let path = hmm.decode(out);
        let topology = hmm.topology();
        let n_states = topology.n_states();

        let mut state_counts = vec![0; n_states + 1];
        for &state in path.iter() {
            state_counts[state] += 1;
        }
        let mut transition_counts = vec![vec![0; n_states + 1]; n_states + 1];
        for pair in path.windows(2) {
            transition_counts[pair[0]][pair[1]] += 1;
        }
        let intervals = PathIntervals::from_path(&path, topology);
        let table = reestimate(hmm.table(), &transition_counts);

        ViterbiIterationResult {
            iteration,
            state_counts,
            transition_counts,
            intervals,
            table,
        }
    }

    //
    // reports
    //

    ///
    /// iteration block without the interval list: state histogram,
    /// segment/gene histogram, re-estimated table
    ///
    pub fn results_without_intervals(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "    <result type=\"viterbi_iteration\" iteration=\"{}\">\n",
            self.iteration
        ));
        out.push_str(&self.state_histogram_string());
        out.push_str(&self.interval_histogram_string());
        out.push_str(&self.table.results_string());
        out.push_str("    </result>\n");
        out
    }
    ///
    /// iteration block plus the full interval list (used for the final
    /// iteration only)
    ///
    pub fn all_results(&self) -> String {
        let mut out = self.results_without_intervals();
        out.push_str(&self.interval_list_string());
        out
    }

    fn state_histogram_string(&self) -> String {
        let fields: Vec<String> = (1..self.state_counts.len())
            .map(|s| format!("{}={}", s, self.state_counts[s]))
            .collect();
        xml_result("state_histogram", &fields.join(","))
    }
    fn interval_histogram_string(&self) -> String {
        match &self.intervals {
            PathIntervals::Segments { counts, .. } => {
                let fields: Vec<String> = (1..counts.len())
                    .map(|s| format!("{}={}", s, counts[s]))
                    .collect();
                xml_result("segment_histogram", &fields.join(","))
            }
            PathIntervals::Genes { top, bottom, .. } => xml_result(
                "gene_histogram",
                &format!("top_strand_genes={},bottom_strand_genes={}", top, bottom),
            ),
        }
    }
    fn interval_list_string(&self) -> String {
        match &self.intervals {
            PathIntervals::Segments { per_state, .. } => {
                let mut out = String::new();
                for (state, segments) in per_state.iter().enumerate().skip(1) {
                    let content = interval_fields(
                        segments.iter().map(|&(start, end)| format!("({},{})", start, end)),
                    );
                    out.push_str(&xml_result_with_attrs(
                        "segment_list",
                        &[("state", state.to_string())],
                        &content,
                    ));
                }
                out
            }
            PathIntervals::Genes { genes, .. } => {
                let content = interval_fields(
                    genes
                        .iter()
                        .map(|gene| format!("({},{},{})", gene.start, gene.end, gene.strand)),
                );
                xml_result("gene_list", &content)
            }
        }
    }
}

/// comma-joined interval fields, broken every 5 entries
fn interval_fields<I: Iterator<Item = String>>(iter: I) -> String {
    let mut out = String::new();
    for (i, field) in iter.enumerate() {
        if i > 0 {
            out.push(',');
            if i % 5 == 0 {
                out.push('\n');
            }
        }
        out.push_str(&field);
    }
    out
}

///
/// Re-estimate the table from a decoded path.
///
/// Initiation and emission probabilities are carried over unchanged (the
/// training deliberately re-estimates transitions only); the transition
/// probability `s -> t` is the observed step count divided by the
/// outgoing occurrences of `s` on the path, so each visited row sums
/// to 1. A state with no outgoing occurrence keeps its previous row.
///
fn reestimate(previous: &ProbTable, transition_counts: &[Vec<usize>]) -> ProbTable {
    let mut table = previous.clone();
    for from in table.states() {
        let outgoing: usize = transition_counts[from].iter().sum();
        if outgoing == 0 {
            continue;
        }
        for to in previous.states() {
            let value = transition_counts[from][to] as f64 / outgoing as f64;
            table.set_trans(from, to, value).unwrap();
        }
    }
    table
}

///
/// Report of a whole Viterbi training run: every iteration without its
/// interval list, except the last which carries the full list.
///
pub fn training_results_string(results: &[ViterbiIterationResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if i + 1 < results.len() {
            out.push_str(&result.results_without_intervals());
        } else {
            out.push_str(&result.all_results());
        }
    }
    out
}

//
// tests
//
