//!
//! FASTA sequence source
//!
//! Reads a FASTA file and keeps its first record in memory as a flat,
//! sanitized base string plus the description line. For DNA input the
//! reverse complement is also materialized so that both strands can be
//! modeled. This is a thin collaborator of the HMM core; the core itself
//! assumes a validated symbol sequence.
//!
use crate::common::{reverse_complement, Sequence, AMBIGUOUS_BASE};
use crate::report::xml_result_with_attrs;
use bio::io::fasta;
use log::warn;
use std::io;
use std::path::Path;

///
/// normalize bases to upper-case A/C/G/T, everything else to `N`
///
pub fn sanitize_bases(seq: &[u8]) -> Sequence {
    seq.iter()
        .enumerate()
        .map(|(i, base)| match base {
            b'A' | b'a' => b'A',
            b'C' | b'c' => b'C',
            b'G' | b'g' => b'G',
            b'T' | b't' => b'T',
            b'N' | b'n' => AMBIGUOUS_BASE,
            &c => {
                warn!("informal base `{}` detected in bases[{}]", c as char, i);
                AMBIGUOUS_BASE
            }
        })
        .collect()
}

///
/// In-memory FASTA record: description line, sanitized sequence and
/// (for DNA) its reverse complement.
///
#[derive(Clone, Debug)]
pub struct FastaFile {
    file_name: String,
    first_line: String,
    sequence: Sequence,
    reverse_complement: Option<Sequence>,
}

impl FastaFile {
    ///
    /// Read the first record of a FASTA file.
    ///
    /// `dna` controls whether the reverse complement is materialized
    /// (single-stranded input does not need one).
    ///
    pub fn from_file<P: AsRef<Path>>(path: P, dna: bool) -> io::Result<FastaFile> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let reader = fasta::Reader::from_file(path)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        let record = reader
            .records()
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "empty fasta file"))??;

        let first_line = match record.desc() {
            Some(desc) => format!(">{} {}", record.id(), desc),
            None => format!(">{}", record.id()),
        };
        let sequence = sanitize_bases(record.seq());
        let reverse_complement = if dna {
            Some(reverse_complement(&sequence))
        } else {
            None
        };
        Ok(FastaFile {
            file_name,
            first_line,
            sequence,
            reverse_complement,
        })
    }
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
    pub fn first_line(&self) -> &str {
        &self.first_line
    }
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }
    pub fn sequence_length(&self) -> usize {
        self.sequence.len()
    }
    ///
    /// reverse complement of the sequence (None for single-stranded input)
    ///
    pub fn reverse_complement(&self) -> Option<&[u8]> {
        self.reverse_complement.as_deref()
    }
    ///
    /// counts of A, C, G, T and other characters, in that order
    ///
    pub fn base_counts(&self) -> [usize; 5] {
        let mut counts = [0; 5];
        for &base in &self.sequence {
            match base {
                b'A' => counts[0] += 1,
                b'C' => counts[1] += 1,
                b'G' => counts[2] += 1,
                b'T' => counts[3] += 1,
                _ => counts[4] += 1,
            }
        }
        counts
    }
    ///
    /// `<result type="first line" ...>` block
    ///
    pub fn first_line_result_string(&self) -> String {
        xml_result_with_attrs(
            "first line",
            &[("file", self.file_name.clone())],
            &self.first_line,
        )
    }
    ///
    /// `<result type="nucleotide histogram" ...>` block; the `N` field is
    /// present only when other characters occurred
    ///
    pub fn base_counts_result_string(&self) -> String {
        let counts = self.base_counts();
        let mut content = format!(
            "A={},C={},G={},T={}",
            counts[0], counts[1], counts[2], counts[3]
        );
        if counts[4] > 0 {
            content.push_str(&format!(",N={}", counts[4]));
        }
        xml_result_with_attrs(
            "nucleotide histogram",
            &[("file", self.file_name.clone())],
            &content,
        )
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fasta(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn sanitize() {
        assert_eq!(sanitize_bases(b"acgt"), b"ACGT".to_vec());
        assert_eq!(sanitize_bases(b"AXGn"), b"ANGN".to_vec());
    }

    #[test]
    fn read_fasta_file() {
        let file = write_fasta(">chr1 test sequence\nGGCA\nCTGAA\n");
        let fasta = FastaFile::from_file(file.path(), true).unwrap();
        assert_eq!(fasta.first_line(), ">chr1 test sequence");
        assert_eq!(fasta.sequence(), b"GGCACTGAA");
        assert_eq!(fasta.sequence_length(), 9);
        assert_eq!(fasta.reverse_complement().unwrap(), b"TTCAGTGCC");
        assert_eq!(fasta.base_counts(), [3, 2, 3, 1, 0]);
    }

    #[test]
    fn read_fasta_single_strand() {
        let file = write_fasta(">s\nACGT\n");
        let fasta = FastaFile::from_file(file.path(), false).unwrap();
        assert!(fasta.reverse_complement().is_none());
    }

    #[test]
    fn empty_fasta_is_an_error() {
        let file = write_fasta("");
        assert!(FastaFile::from_file(file.path(), true).is_err());
    }

    #[test]
    fn result_strings() {
        let file = write_fasta(">chr1 x\nACGTN\n");
        let fasta = FastaFile::from_file(file.path(), false).unwrap();
        let first = fasta.first_line_result_string();
        assert!(first.contains("type=\"first line\""));
        assert!(first.contains(">chr1 x"));
        let counts = fasta.base_counts_result_string();
        assert!(counts.contains("A=1,C=1,G=1,T=1,N=1"));
    }
}
