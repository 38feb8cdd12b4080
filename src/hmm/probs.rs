//!
//! Probability table of the model
//!
//! Holds initiation, transition and emission probabilities for a fixed
//! number of states over a fixed emission alphabet. All probabilities are
//! stored as [`Prob`] (log space), so the table can be read directly by
//! the passes; the linear value is recovered with `to_value()` only at
//! report time.
//!
//! Tables are replaced wholesale between training iterations and never
//! mutated while a pass is running.
//!
use crate::alphabet::{Alphabet, SymbolId};
use crate::common::State;
use crate::error::HmmError;
use crate::prob::Prob;
use crate::report::prob_fmt;

///
/// Initiation/transition/emission probabilities for `n_states` real
/// states (state ids `1..=n_states`; index 0 is the virtual start state
/// and stays at probability zero).
///
#[derive(Clone, Debug)]
pub struct ProbTable {
    alphabet: Alphabet,
    init: Vec<Prob>,
    trans: Vec<Vec<Prob>>,
    emit: Vec<Vec<Prob>>,
}

impl ProbTable {
    ///
    /// table with all probabilities zero
    ///
    pub fn new(n_states: usize, alphabet: Alphabet) -> ProbTable {
        assert!(n_states >= 1, "table needs at least one real state");
        let n_symbols = alphabet.n_symbols();
        ProbTable {
            alphabet,
            init: vec![Prob::zero(); n_states + 1],
            trans: vec![vec![Prob::zero(); n_states + 1]; n_states + 1],
            emit: vec![vec![Prob::zero(); n_symbols]; n_states + 1],
        }
    }
    ///
    /// table with uniform initiation, transition and emission rows
    ///
    pub fn uniform(n_states: usize, alphabet: Alphabet) -> ProbTable {
        let mut table = ProbTable::new(n_states, alphabet);
        let p_init = 1.0 / n_states as f64;
        let p_emit = 1.0 / table.alphabet.n_symbols() as f64;
        for s in 1..=n_states {
            table.set_init(s, p_init).unwrap();
            for t in 1..=n_states {
                table.set_trans(s, t, p_init).unwrap();
            }
            for symbol in 0..table.alphabet.n_symbols() {
                table.set_emit(s, symbol, p_emit).unwrap();
            }
        }
        table
    }
    ///
    /// Starting probabilities of the 2-state GC-content model:
    /// state 1 is the AT-rich background, state 2 the GC-rich islands.
    ///
    pub fn initial_gc() -> ProbTable {
        let mut table = ProbTable::new(2, Alphabet::nucleotide());
        table.set_init(1, 0.996).unwrap();
        table.set_init(2, 0.004).unwrap();
        table.set_trans(1, 1, 0.999).unwrap();
        table.set_trans(1, 2, 0.001).unwrap();
        table.set_trans(2, 1, 0.01).unwrap();
        table.set_trans(2, 2, 0.99).unwrap();
        table.set_emit_base(1, b'A', 0.291).unwrap();
        table.set_emit_base(1, b'T', 0.291).unwrap();
        table.set_emit_base(1, b'C', 0.209).unwrap();
        table.set_emit_base(1, b'G', 0.209).unwrap();
        table.set_emit_base(2, b'A', 0.169).unwrap();
        table.set_emit_base(2, b'T', 0.169).unwrap();
        table.set_emit_base(2, b'C', 0.331).unwrap();
        table.set_emit_base(2, b'G', 0.331).unwrap();
        table
    }
    ///
    /// The textbook two-state toy example (state 1 = H, state 2 = L).
    ///
    pub fn toy() -> ProbTable {
        let mut table = ProbTable::new(2, Alphabet::nucleotide());
        table.set_init(1, 0.5).unwrap();
        table.set_init(2, 0.5).unwrap();
        table.set_trans(1, 1, 0.5).unwrap();
        table.set_trans(1, 2, 0.5).unwrap();
        table.set_trans(2, 1, 0.4).unwrap();
        table.set_trans(2, 2, 0.6).unwrap();
        table.set_emit_base(1, b'A', 0.2).unwrap();
        table.set_emit_base(1, b'T', 0.2).unwrap();
        table.set_emit_base(1, b'C', 0.3).unwrap();
        table.set_emit_base(1, b'G', 0.3).unwrap();
        table.set_emit_base(2, b'A', 0.3).unwrap();
        table.set_emit_base(2, b'T', 0.3).unwrap();
        table.set_emit_base(2, b'C', 0.2).unwrap();
        table.set_emit_base(2, b'G', 0.2).unwrap();
        table
    }

    pub fn n_states(&self) -> usize {
        self.init.len() - 1
    }
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
    ///
    /// iterate over real state ids `1..=n_states`
    ///
    pub fn states(&self) -> impl Iterator<Item = State> {
        1..=self.n_states()
    }

    fn assert_state(&self, state: State) {
        assert!(
            state >= 1 && state <= self.n_states(),
            "state {} is not modeled (table has {} states)",
            state,
            self.n_states()
        );
    }
    fn assert_symbol(&self, symbol: SymbolId) {
        assert!(
            symbol < self.alphabet.n_symbols(),
            "symbol {} is not modeled (alphabet has {} symbols)",
            symbol,
            self.alphabet.n_symbols()
        );
    }

    //
    // getters (log space)
    //

    ///
    /// log initiation probability of a real state
    ///
    pub fn init_prob(&self, state: State) -> Prob {
        self.assert_state(state);
        self.init[state]
    }
    ///
    /// log transition probability between two real states
    ///
    pub fn trans_prob(&self, from: State, to: State) -> Prob {
        self.assert_state(from);
        self.assert_state(to);
        self.trans[from][to]
    }
    ///
    /// log emission probability of a symbol from a real state
    ///
    pub fn emit_prob(&self, state: State, symbol: SymbolId) -> Prob {
        self.assert_state(state);
        self.assert_symbol(symbol);
        self.emit[state][symbol]
    }

    //
    // setters
    //

    fn validated(value: f64) -> Result<Prob, HmmError> {
        if value > 1.0 {
            return Err(HmmError::InvalidProbability(value));
        }
        Prob::try_from_prob(value)
    }
    pub fn set_init(&mut self, state: State, value: f64) -> Result<(), HmmError> {
        self.assert_state(state);
        self.init[state] = Self::validated(value)?;
        Ok(())
    }
    pub fn set_trans(&mut self, from: State, to: State, value: f64) -> Result<(), HmmError> {
        self.assert_state(from);
        self.assert_state(to);
        self.trans[from][to] = Self::validated(value)?;
        Ok(())
    }
    pub fn set_emit(&mut self, state: State, symbol: SymbolId, value: f64) -> Result<(), HmmError> {
        self.assert_state(state);
        self.assert_symbol(symbol);
        self.emit[state][symbol] = Self::validated(value)?;
        Ok(())
    }
    ///
    /// emission setter addressed by base instead of symbol id,
    /// for single-nucleotide alphabets
    ///
    pub fn set_emit_base(&mut self, state: State, base: u8, value: f64) -> Result<(), HmmError> {
        let symbol = self
            .alphabet
            .index_of(&[base])
            .unwrap_or_else(|| panic!("base {} is not in the alphabet", base as char));
        self.set_emit(state, symbol, value)
    }

    // re-estimation writes values that are already in log space;
    // ratios of posterior sums are probabilities by construction
    pub(crate) fn set_init_prob(&mut self, state: State, p: Prob) {
        self.assert_state(state);
        self.init[state] = p;
    }
    pub(crate) fn set_trans_prob(&mut self, from: State, to: State, p: Prob) {
        self.assert_state(from);
        self.assert_state(to);
        self.trans[from][to] = p;
    }
    pub(crate) fn set_emit_prob(&mut self, state: State, symbol: SymbolId, p: Prob) {
        self.assert_state(state);
        self.assert_symbol(symbol);
        self.emit[state][symbol] = p;
    }

    //
    // reports
    //

    ///
    /// `<model type="hmm">` block: states, initiation, transitions per
    /// state, emissions per state, in this fixed order
    ///
    pub fn results_string(&self) -> String {
        let mut out = String::new();
        out.push_str("      <model type=\"hmm\">\n");
        out.push_str(&self.states_string());
        out.push_str(&self.init_string());
        for state in self.states() {
            out.push_str(&self.trans_string(state));
        }
        for state in self.states() {
            out.push_str(&self.emit_string(state));
        }
        out.push_str("      </model>\n");
        out
    }
    fn states_string(&self) -> String {
        let states: Vec<String> = self.states().map(|s| s.to_string()).collect();
        format!("        <states>{}</states>\n", states.join(","))
    }
    fn init_string(&self) -> String {
        let fields: Vec<String> = self
            .states()
            .map(|s| format!("{}={}", s, prob_fmt(self.init[s])))
            .collect();
        format!(
            "        <initial_state_probabilities>{}</initial_state_probabilities>\n",
            fields.join(",")
        )
    }
    fn trans_string(&self, state: State) -> String {
        let fields: Vec<String> = self
            .states()
            .map(|t| format!("{}={}", t, prob_fmt(self.trans[state][t])))
            .collect();
        format!(
            "        <transition_probabilities state=\"{}\">{}</transition_probabilities>\n",
            state,
            fields.join(",")
        )
    }
    fn emit_string(&self, state: State) -> String {
        let fields: Vec<String> = self
            .alphabet
            .iter()
            .map(|(id, symbol)| {
                format!(
                    "{}={}",
                    std::str::from_utf8(symbol).unwrap(),
                    prob_fmt(self.emit[state][id])
                )
            })
            .collect();
        format!(
            "        <emission_probabilities state=\"{}\">{}</emission_probabilities>\n",
            state,
            fields.join(",")
        )
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip() {
        let mut table = ProbTable::new(2, Alphabet::nucleotide());
        table.set_init(1, 0.7).unwrap();
        table.set_trans(1, 2, 0.25).unwrap();
        table.set_emit(2, 3, 0.5).unwrap();
        assert_abs_diff_eq!(table.init_prob(1).to_value(), 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(table.trans_prob(1, 2).to_value(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(table.emit_prob(2, 3).to_value(), 0.5, epsilon = 1e-12);
        // unset entries are probability zero
        assert!(table.init_prob(2).is_zero());
        assert!(table.trans_prob(2, 2).is_zero());
    }

    #[test]
    fn setters_validate() {
        let mut table = ProbTable::new(2, Alphabet::nucleotide());
        assert_eq!(
            table.set_init(1, -0.1),
            Err(HmmError::NegativeProbability(-0.1))
        );
        assert_eq!(
            table.set_trans(1, 1, 1.5),
            Err(HmmError::InvalidProbability(1.5))
        );
        // zero is a valid probability and becomes the log-zero sentinel
        table.set_emit(1, 0, 0.0).unwrap();
        assert!(table.emit_prob(1, 0).is_zero());
    }

    #[test]
    #[should_panic]
    fn unmodeled_state_lookup_panics() {
        ProbTable::new(2, Alphabet::nucleotide()).init_prob(3);
    }

    #[test]
    fn initial_gc_rows_sum_to_one() {
        let table = ProbTable::initial_gc();
        let init: f64 = table.states().map(|s| table.init_prob(s).to_value()).sum();
        assert_abs_diff_eq!(init, 1.0, epsilon = 1e-12);
        for s in table.states() {
            let row: f64 = table
                .states()
                .map(|t| table.trans_prob(s, t).to_value())
                .sum();
            assert_abs_diff_eq!(row, 1.0, epsilon = 1e-12);
            let emit: f64 = (0..4).map(|a| table.emit_prob(s, a).to_value()).sum();
            assert_abs_diff_eq!(emit, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn report_field_order() {
        let report = ProbTable::initial_gc().results_string();
        let states_at = report.find("<states>1,2</states>").unwrap();
        let init_at = report.find("<initial_state_probabilities>").unwrap();
        let trans1_at = report.find("<transition_probabilities state=\"1\">").unwrap();
        let trans2_at = report.find("<transition_probabilities state=\"2\">").unwrap();
        let emit1_at = report.find("<emission_probabilities state=\"1\">").unwrap();
        assert!(states_at < init_at);
        assert!(init_at < trans1_at);
        assert!(trans1_at < trans2_at);
        assert!(trans2_at < emit1_at);
        // emissions in A,C,G,T order with fixed precision
        assert!(report.contains("A=2.9100e-1,C=2.0900e-1,G=2.0900e-1,T=2.9100e-1"));
        assert!(report.contains("1=9.9600e-1,2=4.0000e-3"));
    }

    #[test]
    fn uniform_table() {
        let table = ProbTable::uniform(13, Alphabet::codon());
        assert_eq!(table.n_states(), 13);
        assert_abs_diff_eq!(
            table.init_prob(5).to_value(),
            1.0 / 13.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            table.emit_prob(3, 63).to_value(),
            1.0 / 64.0,
            epsilon = 1e-12
        );
    }
}
