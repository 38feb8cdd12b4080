//!
//! The HMM engine: trellis construction, decoding passes and training
//!
//! * `probs` — initiation/transition/emission probability table
//! * `trellis` — the per-position, per-state DP lattice
//! * `viterbi` — highest-weight path and its decoding
//! * `forward` / `backward` — log-space probability passes
//! * `posterior` — node/transition posteriors and log-likelihood
//! * `result` — per-iteration accumulation from a decoded path
//! * `training` — Viterbi training and Baum-Welch
//!
pub mod backward;
pub mod common;
pub mod forward;
pub mod posterior;
pub mod probs;
pub mod result;
pub mod training;
pub mod trellis;
pub mod viterbi;

#[cfg(test)]
mod tests;

pub use common::Hmm;
pub use probs::ProbTable;
pub use training::TrainConfig;
