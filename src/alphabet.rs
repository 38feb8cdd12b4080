//!
//! Emission-symbol alphabet
//!
//! A symbol is a fixed-width chunk of bases: a single nucleotide for the
//! GC-content model, or a trinucleotide (codon) for the gene model.
//! Symbols are addressed by a dense `SymbolId` so that emission tables
//! can be plain vectors.
//!
use crate::common::{Sequence, VALID_BASES};
use crate::error::HmmError;
use fnv::FnvHashMap as HashMap;
use itertools::iproduct;

/// dense index of a symbol in an alphabet
pub type SymbolId = usize;

///
/// Fixed-width emission alphabet with symbol <-> dense index mapping.
///
/// Symbols are enumerated in ascending alphabetic order (`A < C < G < T`),
/// which is also the order emission probabilities are reported in.
///
#[derive(Clone, Debug)]
pub struct Alphabet {
    width: usize,
    symbols: Vec<Sequence>,
    index: HashMap<Sequence, SymbolId>,
}

impl Alphabet {
    fn from_symbols(width: usize, symbols: Vec<Sequence>) -> Alphabet {
        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (symbol.clone(), i))
            .collect();
        Alphabet {
            width,
            symbols,
            index,
        }
    }
    ///
    /// single-nucleotide alphabet `A,C,G,T`
    ///
    pub fn nucleotide() -> Alphabet {
        let symbols = VALID_BASES.iter().map(|&base| vec![base]).collect();
        Alphabet::from_symbols(1, symbols)
    }
    ///
    /// trinucleotide (codon) alphabet, all 64 codons
    ///
    pub fn codon() -> Alphabet {
        let symbols = iproduct!(&VALID_BASES, &VALID_BASES, &VALID_BASES)
            .map(|(&a, &b, &c)| vec![a, b, c])
            .collect();
        Alphabet::from_symbols(3, symbols)
    }
    ///
    /// number of bases per symbol
    ///
    pub fn width(&self) -> usize {
        self.width
    }
    ///
    /// number of symbols in the alphabet
    ///
    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }
    ///
    /// the symbol for an id (panics on out-of-range id)
    ///
    pub fn symbol(&self, id: SymbolId) -> &[u8] {
        &self.symbols[id]
    }
    ///
    /// symbol as &str, for reports
    ///
    pub fn symbol_as_str(&self, id: SymbolId) -> &str {
        std::str::from_utf8(self.symbol(id)).unwrap()
    }
    ///
    /// look up the dense id of a symbol
    ///
    pub fn index_of(&self, symbol: &[u8]) -> Option<SymbolId> {
        self.index.get(symbol).copied()
    }
    ///
    /// iterate over `(SymbolId, symbol)` in report order
    ///
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &[u8])> + '_ {
        self.symbols.iter().enumerate().map(|(i, s)| (i, &s[..]))
    }
    ///
    /// Chunk a sequence into symbols and map each to its id.
    ///
    /// Fails on a symbol the alphabet does not model and on a trailing
    /// partial chunk (sequence length not a multiple of the width).
    ///
    pub fn encode(&self, seq: &[u8]) -> Result<Vec<SymbolId>, HmmError> {
        if seq.len() % self.width != 0 {
            return Err(HmmError::UnknownSymbol {
                symbol: String::from_utf8_lossy(&seq[seq.len() - seq.len() % self.width..])
                    .into_owned(),
                offset: seq.len() / self.width,
            });
        }
        seq.chunks(self.width)
            .enumerate()
            .map(|(offset, chunk)| {
                self.index_of(chunk).ok_or_else(|| HmmError::UnknownSymbol {
                    symbol: String::from_utf8_lossy(chunk).into_owned(),
                    offset,
                })
            })
            .collect()
    }
}

//
// tests
//
