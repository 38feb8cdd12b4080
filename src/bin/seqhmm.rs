use clap::Parser;
use log::warn;
use seqhmm::{
    common::{Sequence, VALID_BASES},
    fasta::FastaFile,
    hmm::{result::training_results_string, Hmm, ProbTable, TrainConfig},
    topology::StateTopology,
};

///
/// Infer hidden states along a DNA sequence with an HMM.
///
/// With `-n`, runs Viterbi training for that many iterations; without it,
/// runs Baum-Welch to convergence. Reports go to stdout.
///
#[derive(Parser, Debug)]
#[clap(name = "seqhmm")]
struct Opts {
    /// FASTA file with the sequence to model
    fasta: std::path::PathBuf,
    /// number of Viterbi-training iterations (omit to run Baum-Welch)
    #[clap(short = 'n', long)]
    iterations: Option<usize>,
    /// use the 13-state gene topology over codons instead of the
    /// 2-state GC-content model
    #[clap(long)]
    genes: bool,
    /// the input is single-stranded; skip the reverse complement
    #[clap(long)]
    single_strand: bool,
    /// Baum-Welch convergence threshold in bits
    #[clap(long, default_value = "0.1")]
    threshold: f64,
    /// Baum-Welch iteration ceiling
    #[clap(long, default_value = "1000")]
    max_iter: usize,
}

fn main() {
    env_logger::init();
    let opts: Opts = Opts::parse();
    println!("# started_at={}", chrono::Local::now());

    let fasta = FastaFile::from_file(&opts.fasta, !opts.single_strand).unwrap_or_else(|err| {
        eprintln!("cannot read {}: {}", opts.fasta.display(), err);
        std::process::exit(1);
    });
    print!("{}", fasta.first_line_result_string());
    print!("{}", fasta.base_counts_result_string());

    let sequence = validated_sequence(&fasta, opts.genes);
    let (topology, table) = if opts.genes {
        let topology = StateTopology::gene_thirteen_state();
        let table = ProbTable::uniform(topology.n_states(), seqhmm::alphabet::Alphabet::codon());
        (topology, table)
    } else {
        (StateTopology::gc_two_state(), ProbTable::initial_gc())
    };

    let mut hmm = Hmm::new(topology, table);
    hmm.build(&sequence).unwrap_or_else(|err| {
        eprintln!("cannot model sequence: {}", err);
        std::process::exit(1);
    });

    match opts.iterations {
        Some(n) => {
            let results = hmm.viterbi_training(n);
            print!("{}", training_results_string(&results));
        }
        None => {
            let config = TrainConfig {
                threshold_bits: opts.threshold,
                max_iterations: opts.max_iter,
            };
            let summary = hmm.baum_welch(&config);
            print!("{}", summary.results_string(hmm.table()));
        }
    }

    println!("# finished_at={}", chrono::Local::now());
}

///
/// The core assumes a validated symbol sequence: drop ambiguous bases and
/// (for the codon alphabet) a trailing partial codon.
///
fn validated_sequence(fasta: &FastaFile, codons: bool) -> Sequence {
    let mut sequence: Sequence = fasta
        .sequence()
        .iter()
        .copied()
        .filter(|base| VALID_BASES.contains(base))
        .collect();
    let dropped = fasta.sequence_length() - sequence.len();
    if dropped > 0 {
        warn!("dropped {} ambiguous bases from the sequence", dropped);
    }
    if codons {
        let tail = sequence.len() % 3;
        if tail > 0 {
            warn!("dropped a trailing partial codon of {} bases", tail);
            sequence.truncate(sequence.len() - tail);
        }
    }
    sequence
}
