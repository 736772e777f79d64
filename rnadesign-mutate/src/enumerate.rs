use itertools::Itertools;
use log::debug;

use rnadesign_core::errors::{DesignError, Result};
use rnadesign_core::models::{Mutation, STRAND_SEPARATOR, possible_nucleotide_mutations};
use rnadesign_core::models::mutation::substitution_name;
use rnadesign_core::utils::{check_positions, combination_count};

use crate::config::MutateConfig;
use crate::consts::{DEFAULT_MAX_COMBINATIONS, NUCLEOTIDE_ALTERNATIVES};

///
/// Positions that may be mutated: everything not excluded and not a strand
/// separator. Excluded positions must lie inside the sequence.
///
pub fn allowed_positions(sequence: &str, exclude: &[usize]) -> Result<Vec<usize>> {
    check_positions(exclude, sequence.len())?;
    Ok(sequence
        .char_indices()
        .filter(|(i, c)| *c != STRAND_SEPARATOR && !exclude.contains(i))
        .map(|(i, _)| i)
        .collect())
}

///
/// Exhaustive point-substitution enumerator.
///
/// Position sets are drawn as combinations (never permutations) of the allowed
/// positions in ascending order, and every set is expanded into the cross
/// product of the three substitutes at each of its positions. Output order is
/// therefore stable: position sets lexicographically, then substitutes in
/// `A, U, C, G` order.
///
#[derive(Debug, Clone, Copy)]
pub struct MutationEnumerator {
    max_combinations: u64,
}

impl Default for MutationEnumerator {
    fn default() -> Self {
        MutationEnumerator {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

impl From<&MutateConfig> for MutationEnumerator {
    fn from(config: &MutateConfig) -> Self {
        MutationEnumerator::new(config.max_combinations)
    }
}

impl MutationEnumerator {
    pub fn new(max_combinations: u64) -> Self {
        MutationEnumerator { max_combinations }
    }

    /// Size of the enumeration without producing it.
    pub fn count(&self, sequence: &str, num_mutations: usize, exclude: &[usize]) -> Result<u128> {
        let allowed = allowed_positions(sequence, exclude)?;
        Ok(combination_count(allowed.len(), num_mutations, NUCLEOTIDE_ALTERNATIVES))
    }

    pub fn enumerate(
        &self,
        sequence: &str,
        num_mutations: usize,
        exclude: &[usize],
    ) -> Result<Vec<Mutation>> {
        let allowed = allowed_positions(sequence, exclude)?;
        if num_mutations == 0 || allowed.len() < num_mutations {
            return Ok(Vec::new());
        }

        let total = combination_count(allowed.len(), num_mutations, NUCLEOTIDE_ALTERNATIVES);
        if total > self.max_combinations as u128 {
            return Err(DesignError::TooManyCombinations {
                count: total,
                limit: self.max_combinations as u128,
            });
        }
        debug!(
            "enumerating {} mutants with {} changes over {} positions",
            total,
            num_mutations,
            allowed.len()
        );

        let original: Vec<char> = sequence.chars().collect();
        let mut substitutes = Vec::with_capacity(original.len());
        for &c in &original {
            substitutes.push(if c == STRAND_SEPARATOR {
                Vec::new()
            } else {
                possible_nucleotide_mutations(c)?
            });
        }

        let mut results = Vec::with_capacity(total as usize);
        for positions in allowed.iter().copied().combinations(num_mutations) {
            let per_position = positions
                .iter()
                .map(|&p| substitutes[p].iter().map(move |&n| (p, n)));
            for changes in per_position.multi_cartesian_product() {
                let mut mutant = original.clone();
                let mut names = Vec::with_capacity(changes.len());
                for &(p, n) in &changes {
                    names.push(substitution_name(original[p], p, n));
                    mutant[p] = n;
                }
                results.push(Mutation::new(
                    names.join("_"),
                    mutant.into_iter().collect::<String>(),
                ));
            }
        }
        Ok(results)
    }
}

/// Every single point mutant.
pub fn find_mutations(sequence: &str, exclude: &[usize]) -> Result<Vec<Mutation>> {
    MutationEnumerator::default().enumerate(sequence, 1, exclude)
}

/// Every double point mutant.
pub fn find_double_mutations(sequence: &str, exclude: &[usize]) -> Result<Vec<Mutation>> {
    MutationEnumerator::default().enumerate(sequence, 2, exclude)
}

pub fn find_multiple_mutations(
    sequence: &str,
    num_mutations: usize,
    exclude: &[usize],
) -> Result<Vec<Mutation>> {
    MutationEnumerator::default().enumerate(sequence, num_mutations, exclude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rnadesign_core::models::SecStruct;
    use rnadesign_core::selection::Selection;
    use rstest::*;
    use std::collections::HashSet;

    #[rstest]
    fn test_find_mutations_with_exclusion() {
        let results = find_mutations("AU", &[0]).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|m| m.sequence.starts_with('A')));
    }

    #[rstest]
    fn test_single_mutations() {
        let results = find_multiple_mutations("AUC", 1, &[]).unwrap();
        assert_eq!(results.len(), 9);
        assert_eq!(results[0].name, "A1U");
        assert_eq!(results[0].sequence, "UUC");
        assert_eq!(results[8].name, "C3G");
    }

    #[rstest]
    fn test_double_mutations() {
        let results = find_double_mutations("AUC", &[]).unwrap();
        assert_eq!(results.len(), 27);
        assert_eq!(results[0].name, "A1U_U2A");
        assert_eq!(results[0].sequence, "UAC");

        let unique: HashSet<&str> = results.iter().map(|m| m.sequence.as_str()).collect();
        assert_eq!(unique.len(), 27);
        assert!(results.iter().all(|m| m.num_changes() == 2));
    }

    #[rstest]
    #[case("GGAAAC", 1, 18)]
    #[case("GGAAAC", 2, 135)]
    #[case("GGAAAC", 3, 540)]
    #[case("GG&CC", 1, 12)]
    fn test_counts(#[case] seq: &str, #[case] k: usize, #[case] expected: usize) {
        let results = find_multiple_mutations(seq, k, &[]).unwrap();
        assert_eq!(results.len(), expected);
        assert_eq!(
            MutationEnumerator::default().count(seq, k, &[]).unwrap(),
            expected as u128
        );
    }

    #[rstest]
    fn test_separator_is_never_mutated() {
        let results = find_mutations("GG&CC", &[]).unwrap();
        assert!(results.iter().all(|m| m.sequence.chars().nth(2) == Some('&')));
    }

    #[rstest]
    fn test_degenerate_requests_are_empty() {
        assert!(find_multiple_mutations("AUC", 0, &[]).unwrap().is_empty());
        assert!(find_multiple_mutations("AUC", 2, &[0, 1]).unwrap().is_empty());
    }

    #[rstest]
    fn test_exclusion_out_of_range() {
        assert!(matches!(
            find_mutations("AUC", &[3]),
            Err(DesignError::InvalidPosition(_))
        ));
    }

    #[rstest]
    fn test_invalid_nucleotide() {
        assert!(matches!(
            find_mutations("AXC", &[]),
            Err(DesignError::InvalidArgument(_))
        ));
    }

    #[rstest]
    fn test_combination_ceiling() {
        let enumerator = MutationEnumerator::new(100);
        let err = enumerator.enumerate("GGGGAAAACCCC", 2, &[]).unwrap_err();
        assert!(matches!(
            err,
            DesignError::TooManyCombinations { count: 594, limit: 100 }
        ));
    }

    #[rstest]
    fn test_mutations_around_tetraloop_receptor() {
        let seq = "GUUGAUAUGGAUUUACUCCGAGGAGACGAACUACCACGAACAGGGGAAACUCUACCCGUGGCGUCUCCGUU\
                   UGACGAGUAAGUCCUAAGUCAACAAAGUCCGCGAGUAGCGGACAC";
        let ss = "((((((..((((((((((((((((((((.....(((((...((((....))))...))))))))))))..)\
                  ))..))))))))))...))))))...((((((.....))))))..";
        let secstruct = SecStruct::new(seq, ss).unwrap();
        let selection =
            Selection::from_yaml_str("motif:\n  name: tlr\n  extend_flank: 2\ninvert: true\n")
                .unwrap();
        let exclude = selection.resolve(&secstruct).unwrap();

        let results = find_multiple_mutations(seq, 1, &exclude).unwrap();
        assert_eq!(results.len(), 51);
        assert_eq!(results[0].name, "G4A");
    }

    #[rstest]
    fn test_repeatable() {
        let first = find_double_mutations("GGAAAC", &[2]).unwrap();
        let second = find_double_mutations("GGAAAC", &[2]).unwrap();
        assert_eq!(first, second);
    }
}
