use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DesignError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MotifType {
    SingleStrand,
    Helix,
    Hairpin,
    Junction,
}

impl Display for MotifType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotifType::SingleStrand => "SINGLESTRAND",
            MotifType::Helix => "HELIX",
            MotifType::Hairpin => "HAIRPIN",
            MotifType::Junction => "JUNCTION",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MotifType {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SINGLESTRAND" | "SINGLE_STRAND" => Ok(MotifType::SingleStrand),
            "HELIX" => Ok(MotifType::Helix),
            "HAIRPIN" => Ok(MotifType::Hairpin),
            "JUNCTION" => Ok(MotifType::Junction),
            _ => Err(DesignError::InvalidArgument(format!(
                "unknown motif type: {}",
                s
            ))),
        }
    }
}

///
/// One node of the motif tree. Strands are 0-based position lists into the
/// full sequence; `sequence` and `structure` join the strands with `&`.
///
/// For a helix, `strands[0]` runs 5'->3' on the opening side and `strands[1]`
/// runs 5'->3' on the closing side, so pair `k` is
/// `(strands[0][k], strands[1][len - 1 - k])`.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Motif {
    pub id: usize,
    pub motif_type: MotifType,
    pub strands: Vec<Vec<usize>>,
    pub sequence: String,
    pub structure: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl Motif {
    pub fn is_helix(&self) -> bool {
        self.motif_type == MotifType::Helix
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of base pairs for a helix, 0 otherwise.
    pub fn num_pairs(&self) -> usize {
        if self.is_helix() {
            self.strands.first().map_or(0, |s| s.len())
        } else {
            0
        }
    }

    /// Paired positions `(5', 3')` of a helix from the outside in.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        if !self.is_helix() || self.strands.len() != 2 {
            return Vec::new();
        }
        self.strands[0]
            .iter()
            .copied()
            .zip(self.strands[1].iter().rev().copied())
            .collect()
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.strands.iter().flatten().copied()
    }

    pub fn start_pos(&self) -> usize {
        self.positions().min().unwrap_or(0)
    }

    pub fn end_pos(&self) -> usize {
        self.positions().max().unwrap_or(0)
    }

    /// First and last position of every strand.
    pub fn flanking_positions(&self) -> Vec<usize> {
        let mut flanks = Vec::with_capacity(self.strands.len() * 2);
        for strand in &self.strands {
            if let (Some(first), Some(last)) = (strand.first(), strand.last()) {
                flanks.push(*first);
                if last != first {
                    flanks.push(*last);
                }
            }
        }
        flanks
    }
}

impl Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.id, self.motif_type, self.sequence, self.structure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn helix() -> Motif {
        Motif {
            id: 0,
            motif_type: MotifType::Helix,
            strands: vec![vec![0, 1, 2], vec![9, 10, 11]],
            sequence: "GGA&UCC".to_string(),
            structure: "(((&)))".to_string(),
            parent: None,
            children: vec![1],
        }
    }

    #[rstest]
    fn test_pairs_outside_in() {
        assert_eq!(helix().pairs(), vec![(0, 11), (1, 10), (2, 9)]);
        assert_eq!(helix().num_pairs(), 3);
    }

    #[rstest]
    fn test_flanking_positions() {
        assert_eq!(helix().flanking_positions(), vec![0, 2, 9, 11]);
    }

    #[rstest]
    #[case("helix", MotifType::Helix)]
    #[case("SINGLESTRAND", MotifType::SingleStrand)]
    #[case("Hairpin", MotifType::Hairpin)]
    fn test_motif_type_from_str(#[case] input: &str, #[case] expected: MotifType) {
        assert_eq!(input.parse::<MotifType>().unwrap(), expected);
    }
}
