//!
//! Error types of the HMM core
//!
///
/// Errors raised by the probability primitives and the tables.
///
/// Lookups of unmodeled states/symbols on a constructed table are
/// programmer errors and panic instead of returning one of these.
///
#[derive(Clone, Debug, PartialEq)]
pub enum HmmError {
    /// extended logarithm was asked for a negative value
    NegativeProbability(f64),
    /// probability setter was given a value outside `[0, 1]`
    InvalidProbability(f64),
    /// the sequence contains a symbol that the alphabet does not model
    UnknownSymbol { symbol: String, offset: usize },
}

impl std::fmt::Display for HmmError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            HmmError::NegativeProbability(value) => {
                write!(f, "log of negative value {}", value)
            }
            HmmError::InvalidProbability(value) => {
                write!(f, "probability {} is outside [0, 1]", value)
            }
            HmmError::UnknownSymbol { symbol, offset } => {
                write!(f, "unknown symbol {} at offset {}", symbol, offset)
            }
        }
    }
}

impl std::error::Error for HmmError {}
