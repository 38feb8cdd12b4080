//!
//! State topology of the model
//!
//! Describes how many hidden states the model has, what each state means
//! (intergenic, or part of a gene on one strand), and which kind of
//! intervals are extracted from a decoded path. The 2-state GC-content
//! model and the 13-state gene model are the same engine configured with
//! different topologies.
//!
use crate::common::State;

///
/// DNA strand of a gene state
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strand {
    Top,
    Bottom,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Strand::Top => write!(f, "top"),
            Strand::Bottom => write!(f, "bottom"),
        }
    }
}

///
/// biological meaning of a hidden state
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateLabel {
    /// not part of a gene (background / intergenic composition state)
    Intergenic,
    /// part of a gene on the given strand
    Gene(Strand),
}

///
/// which intervals a decoded path is summarized into
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultMode {
    /// contiguous runs of a single state, per state
    Segments,
    /// contiguous runs of gene states of one strand
    Genes,
}

///
/// Hidden-state topology: per-state labels and the result mode.
///
/// State ids are 1-based; state 0 is the virtual start state of the
/// trellis and carries no label.
///
#[derive(Clone, Debug)]
pub struct StateTopology {
    labels: Vec<StateLabel>,
    mode: ResultMode,
}

impl StateTopology {
    pub fn new(labels: Vec<StateLabel>, mode: ResultMode) -> StateTopology {
        assert!(!labels.is_empty(), "topology must have at least one state");
        StateTopology { labels, mode }
    }
    ///
    /// 2-state GC-content topology: AT-rich background vs GC-rich,
    /// summarized as per-state segments.
    ///
    pub fn gc_two_state() -> StateTopology {
        StateTopology::new(
            vec![StateLabel::Intergenic, StateLabel::Intergenic],
            ResultMode::Segments,
        )
    }
    ///
    /// 13-state gene topology over codons: one intergenic state plus six
    /// gene states per strand, summarized as directional genes.
    ///
    pub fn gene_thirteen_state() -> StateTopology {
        let mut labels = vec![StateLabel::Intergenic];
        labels.extend(std::iter::repeat(StateLabel::Gene(Strand::Top)).take(6));
        labels.extend(std::iter::repeat(StateLabel::Gene(Strand::Bottom)).take(6));
        StateTopology::new(labels, ResultMode::Genes)
    }
    ///
    /// number of real states (the virtual start state is not counted)
    ///
    pub fn n_states(&self) -> usize {
        self.labels.len()
    }
    ///
    /// iterate over real state ids `1..=n_states`
    ///
    pub fn states(&self) -> impl Iterator<Item = State> {
        1..=self.n_states()
    }
    ///
    /// label of a real state (panics on state 0 / out-of-range)
    ///
    pub fn label(&self, state: State) -> StateLabel {
        assert!(
            state >= 1 && state <= self.n_states(),
            "state {} is not a real state of this topology",
            state
        );
        self.labels[state - 1]
    }
    pub fn mode(&self) -> ResultMode {
        self.mode
    }
}

//
// tests
//
