use std::fmt::{self, Display};
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, Result};

/// Nucleotide order used for every enumeration in this workspace.
pub const NUCLEOTIDES: [char; 4] = ['A', 'U', 'C', 'G'];

///
/// A canonical RNA base pair, written 5' base first.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum BasePair {
    AU,
    UA,
    GC,
    CG,
    GU,
    UG,
}

pub const WATSON_CRICK_PAIRS: [BasePair; 4] =
    [BasePair::AU, BasePair::UA, BasePair::GC, BasePair::CG];

pub const WOBBLE_PAIRS: [BasePair; 2] = [BasePair::GU, BasePair::UG];

pub const ALL_PAIRS: [BasePair; 6] = [
    BasePair::AU,
    BasePair::UA,
    BasePair::GC,
    BasePair::CG,
    BasePair::GU,
    BasePair::UG,
];

impl BasePair {
    pub fn from_bases(five_prime: char, three_prime: char) -> Option<Self> {
        match (five_prime, three_prime) {
            ('A', 'U') => Some(BasePair::AU),
            ('U', 'A') => Some(BasePair::UA),
            ('G', 'C') => Some(BasePair::GC),
            ('C', 'G') => Some(BasePair::CG),
            ('G', 'U') => Some(BasePair::GU),
            ('U', 'G') => Some(BasePair::UG),
            _ => None,
        }
    }

    pub fn five_prime(&self) -> char {
        match self {
            BasePair::AU => 'A',
            BasePair::UA | BasePair::UG => 'U',
            BasePair::GC | BasePair::GU => 'G',
            BasePair::CG => 'C',
        }
    }

    pub fn three_prime(&self) -> char {
        match self {
            BasePair::AU | BasePair::GU => 'U',
            BasePair::UA => 'A',
            BasePair::GC => 'C',
            BasePair::CG | BasePair::UG => 'G',
        }
    }

    /// True for G·C and C·G.
    pub fn is_gc(&self) -> bool {
        matches!(self, BasePair::GC | BasePair::CG)
    }

    pub fn is_wobble(&self) -> bool {
        matches!(self, BasePair::GU | BasePair::UG)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BasePair::AU => "AU",
            BasePair::UA => "UA",
            BasePair::GC => "GC",
            BasePair::CG => "CG",
            BasePair::GU => "GU",
            BasePair::UG => "UG",
        }
    }

    /// Valid pairs to draw from, with or without the G·U wobble pairs.
    pub fn choices(include_gu: bool) -> &'static [BasePair] {
        if include_gu {
            &ALL_PAIRS
        } else {
            &WATSON_CRICK_PAIRS
        }
    }

    ///
    /// Draw a pair uniformly from the 4 Watson-Crick pairs, or from all 6 when
    /// `include_gu` is set.
    ///
    pub fn random<R: Rng + ?Sized>(rng: &mut R, include_gu: bool) -> Self {
        *Self::choices(include_gu)
            .choose(rng)
            .unwrap_or(&BasePair::GC)
    }

    ///
    /// Draw a G·U pair with probability `gu_fraction`, otherwise a Watson-Crick
    /// pair. Each branch is uniform over its own pairs.
    ///
    pub fn random_weighted<R: Rng + ?Sized>(rng: &mut R, gu_fraction: f64) -> Self {
        let pool: &[BasePair] = if rng.random_bool(gu_fraction.clamp(0.0, 1.0)) {
            &WOBBLE_PAIRS
        } else {
            &WATSON_CRICK_PAIRS
        };
        *pool.choose(rng).unwrap_or(&BasePair::GC)
    }
}

impl Display for BasePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BasePair {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => BasePair::from_bases(
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
            )
            .ok_or_else(|| DesignError::InvalidArgument(format!("'{}' is not a valid base pair", s))),
            _ => Err(DesignError::InvalidArgument(format!(
                "'{}' is not a valid base pair",
                s
            ))),
        }
    }
}

///
/// All nucleotides other than `nucleotide`, in `A, U, C, G` order.
///
pub fn possible_nucleotide_mutations(nucleotide: char) -> Result<Vec<char>> {
    if !NUCLEOTIDES.contains(&nucleotide) {
        return Err(DesignError::InvalidArgument(format!(
            "Invalid nucleotide '{}'. Must be one of 'A', 'U', 'C', 'G'.",
            nucleotide
        )));
    }
    Ok(NUCLEOTIDES
        .iter()
        .copied()
        .filter(|&n| n != nucleotide)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::*;

    #[rstest]
    #[case('A', vec!['U', 'C', 'G'])]
    #[case('U', vec!['A', 'C', 'G'])]
    #[case('C', vec!['A', 'U', 'G'])]
    #[case('G', vec!['A', 'U', 'C'])]
    fn test_possible_nucleotide_mutations(#[case] nucleotide: char, #[case] expected: Vec<char>) {
        let result = possible_nucleotide_mutations(nucleotide).unwrap();
        assert_eq!(result, expected);
        assert_eq!(result.len(), 3);
        assert!(!result.contains(&nucleotide));
    }

    #[rstest]
    fn test_possible_nucleotide_mutations_invalid() {
        assert!(possible_nucleotide_mutations('X').is_err());
        assert!(possible_nucleotide_mutations('&').is_err());
    }

    #[rstest]
    fn test_from_bases() {
        assert_eq!(BasePair::from_bases('G', 'C'), Some(BasePair::GC));
        assert_eq!(BasePair::from_bases('U', 'G'), Some(BasePair::UG));
        assert_eq!(BasePair::from_bases('A', 'A'), None);
    }

    #[rstest]
    fn test_parse_and_display() {
        let bp: BasePair = "cg".parse().unwrap();
        assert_eq!(bp, BasePair::CG);
        assert_eq!(bp.to_string(), "CG");
        assert_eq!(bp.five_prime(), 'C');
        assert_eq!(bp.three_prime(), 'G');
        assert!("CGA".parse::<BasePair>().is_err());
    }

    #[rstest]
    fn test_random_watson_crick_only() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(!BasePair::random(&mut rng, false).is_wobble());
        }
    }

    #[rstest]
    fn test_random_weighted_extremes() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            assert!(BasePair::random_weighted(&mut rng, 1.0).is_wobble());
            assert!(!BasePair::random_weighted(&mut rng, 0.0).is_wobble());
        }
    }
}
