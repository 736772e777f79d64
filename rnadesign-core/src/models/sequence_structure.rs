use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, Result};

pub const STRAND_SEPARATOR: char = '&';

///
/// A sequence and its dot-bracket structure, validated to be the same length
/// and drawn from the RNA and dot-bracket alphabets. Strand separators (`&`)
/// must sit at the same positions in both strings.
///
/// Base pairing is not checked here; see [`crate::models::SecStruct`].
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceStructure {
    sequence: String,
    structure: String,
}

impl SequenceStructure {
    pub fn new(sequence: impl Into<String>, structure: impl Into<String>) -> Result<Self> {
        let sequence = sequence.into();
        let structure = structure.into();

        if sequence.len() != structure.len() {
            return Err(DesignError::InvalidArgument(format!(
                "sequence and structure differ in length: {} vs {}",
                sequence.len(),
                structure.len()
            )));
        }

        for (i, (s, ss)) in sequence.chars().zip(structure.chars()).enumerate() {
            if !matches!(s, 'A' | 'C' | 'G' | 'U' | STRAND_SEPARATOR) {
                return Err(DesignError::InvalidArgument(format!(
                    "invalid nucleotide '{}' at position {}",
                    s, i
                )));
            }
            if !matches!(ss, '(' | ')' | '.' | STRAND_SEPARATOR) {
                return Err(DesignError::InvalidArgument(format!(
                    "invalid structure character '{}' at position {}",
                    ss, i
                )));
            }
            if (s == STRAND_SEPARATOR) != (ss == STRAND_SEPARATOR) {
                return Err(DesignError::InvalidArgument(format!(
                    "strand separator mismatch between sequence and structure at position {}",
                    i
                )));
            }
        }

        Ok(SequenceStructure {
            sequence,
            structure,
        })
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn num_strands(&self) -> usize {
        self.sequence.matches(STRAND_SEPARATOR).count() + 1
    }

    /// Split into one value per strand, dropping the separators.
    pub fn split_strands(&self) -> Vec<SequenceStructure> {
        self.sequence
            .split(STRAND_SEPARATOR)
            .zip(self.structure.split(STRAND_SEPARATOR))
            .map(|(seq, ss)| SequenceStructure {
                sequence: seq.to_string(),
                structure: ss.to_string(),
            })
            .collect()
    }

    pub fn into_parts(self) -> (String, String) {
        (self.sequence, self.structure)
    }
}

impl Display for SequenceStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sequence, self.structure)
    }
}

///
/// Uppercase a user supplied sequence, strip whitespace and convert DNA `T`
/// to `U`.
///
pub fn normalize_rna(sequence: &str) -> String {
    sequence
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c.to_ascii_uppercase() {
            'T' => 'U',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_new_valid() {
        let ss = SequenceStructure::new("GGGG&CCCC", "((((&))))").unwrap();
        assert_eq!(ss.len(), 9);
        assert_eq!(ss.num_strands(), 2);
    }

    #[rstest]
    #[case("GGGA", "((..))")]
    #[case("GGXA", "(..)")]
    #[case("GGAA", "(..]")]
    #[case("GG&A", "(&.)")]
    #[case("GG&A", "((.)")]
    fn test_new_invalid(#[case] seq: &str, #[case] ss: &str) {
        assert!(matches!(
            SequenceStructure::new(seq, ss),
            Err(DesignError::InvalidArgument(_))
        ));
    }

    #[rstest]
    fn test_split_strands() {
        let ss = SequenceStructure::new("GACG&CCAC", "(..(&)..)").unwrap();
        let strands = ss.split_strands();
        assert_eq!(strands.len(), 2);
        assert_eq!(strands[0].sequence(), "GACG");
        assert_eq!(strands[1].structure(), ")..)");
    }

    #[rstest]
    fn test_normalize_rna() {
        assert_eq!(normalize_rna(" ggtt\naC"), "GGUUAC");
    }
}
