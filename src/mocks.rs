//!
//! Mock models and sequences for tests
//!
use crate::common::{Sequence, VALID_BASES};
use crate::hmm::{Hmm, ProbTable};
use crate::topology::StateTopology;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

///
/// 2-state GC-content model with the standard starting probabilities
///
pub fn mock_gc_hmm() -> Hmm {
    Hmm::new(StateTopology::gc_two_state(), ProbTable::initial_gc())
}

///
/// the textbook 2-state toy model
///
pub fn mock_toy_hmm() -> Hmm {
    Hmm::new(StateTopology::gc_two_state(), ProbTable::toy())
}

///
/// 13-state gene model over codons, uniform starting probabilities
///
pub fn mock_gene_hmm() -> Hmm {
    let topology = StateTopology::gene_thirteen_state();
    let table = ProbTable::uniform(topology.n_states(), crate::alphabet::Alphabet::codon());
    Hmm::new(topology, table)
}

///
/// deterministic random bases of the given length from a seed
///
pub fn random_sequence(length: usize, seed: u64) -> Sequence {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut seq: Sequence = Vec::with_capacity(length);
    for _ in 0..length {
        let base = VALID_BASES.choose(&mut rng).unwrap();
        seq.push(*base);
    }
    seq
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_sequence_is_deterministic() {
        let a = random_sequence(50, 0);
        let b = random_sequence(50, 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.iter().all(|base| VALID_BASES.contains(base)));
        let c = random_sequence(50, 1);
        assert_ne!(a, c);
    }

    #[test]
    fn mock_models() {
        assert_eq!(mock_gc_hmm().table().n_states(), 2);
        assert_eq!(mock_toy_hmm().table().n_states(), 2);
        let gene = mock_gene_hmm();
        assert_eq!(gene.table().n_states(), 13);
        assert_eq!(gene.table().alphabet().width(), 3);
    }
}
