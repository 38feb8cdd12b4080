//!
//! The model engine
//!
//! Owns the active probability table and the trellis built from one
//! sequence. The trellis topology is built once; training iterations only
//! replace the table and re-run the passes, so the `O(N * S^2)` edge
//! construction is paid a single time. The engine is single-threaded and
//! processes one sequence end to end.
//!
use super::probs::ProbTable;
use super::trellis::Trellis;
use crate::error::HmmError;
use crate::topology::StateTopology;

///
/// Hidden Markov model over one symbol sequence.
///
pub struct Hmm {
    topology: StateTopology,
    table: ProbTable,
    trellis: Option<Trellis>,
}

impl Hmm {
    ///
    /// engine with no trellis yet; call `build` before any pass
    ///
    pub fn new(topology: StateTopology, table: ProbTable) -> Hmm {
        assert_eq!(
            topology.n_states(),
            table.n_states(),
            "topology and table disagree on the number of states"
        );
        Hmm {
            topology,
            table,
            trellis: None,
        }
    }
    ///
    /// Encode the sequence with the table's alphabet and build the
    /// trellis. An empty sequence yields the start-only trellis.
    ///
    pub fn build(&mut self, sequence: &[u8]) -> Result<(), HmmError> {
        let symbols = self.table.alphabet().encode(sequence)?;
        self.trellis = Some(Trellis::build(&symbols, self.table.n_states()));
        Ok(())
    }
    ///
    /// the built trellis (panics if `build` has not run)
    ///
    pub fn trellis(&self) -> &Trellis {
        self.trellis
            .as_ref()
            .unwrap_or_else(|| panic!("model not built: call build() first"))
    }
    pub fn is_built(&self) -> bool {
        self.trellis.is_some()
    }
    pub fn table(&self) -> &ProbTable {
        &self.table
    }
    pub fn topology(&self) -> &StateTopology {
        &self.topology
    }
    ///
    /// Replace the active table wholesale (between iterations only; a
    /// table is never mutated while a pass is reading it).
    ///
    pub fn replace_table(&mut self, table: ProbTable) {
        assert_eq!(table.n_states(), self.topology.n_states());
        self.table = table;
    }
}

//
// tests
//
