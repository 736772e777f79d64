//!
//! Insertion and deletion of residues.
//!
//! Insertions only ever add unpaired bases, so their results are re-parsed
//! into [`SecStruct`]. Deletions are plain string edits on a
//! [`SequenceStructure`]: removing one side of a pair without its partner is
//! the caller's responsibility and is not checked here.
//!
use itertools::Itertools;

use rnadesign_core::errors::{DesignError, Result};
use rnadesign_core::models::{NUCLEOTIDES, STRAND_SEPARATOR, SecStruct, SequenceStructure};
use rnadesign_core::utils::check_positions;

/// Fillers of `count` bases: only `A...A`, or all 4^count in `A, U, C, G` order.
fn fillers(count: usize, all_nucleotides: bool) -> Vec<String> {
    if !all_nucleotides {
        return vec![NUCLEOTIDES[0].to_string().repeat(count)];
    }
    std::iter::repeat_n(NUCLEOTIDES, count)
        .multi_cartesian_product()
        .map(|bases| bases.into_iter().collect())
        .collect()
}

///
/// Insert `count` unpaired bases in front of `position` (`position == len`
/// appends).
///
pub fn add_unpaired(
    ss: &SecStruct,
    position: usize,
    count: usize,
    all_nucleotides: bool,
) -> Result<Vec<SecStruct>> {
    if count == 0 {
        return Err(DesignError::InvalidArgument(
            "insertion count must be at least 1".to_string(),
        ));
    }
    if position > ss.len() {
        return Err(DesignError::InvalidPosition(format!(
            "cannot insert at {} in a sequence of length {}",
            position,
            ss.len()
        )));
    }

    let dots = ".".repeat(count);
    fillers(count, all_nucleotides)
        .into_iter()
        .map(|filler| {
            let mut sequence = ss.sequence().to_string();
            let mut structure = ss.structure().to_string();
            sequence.insert_str(position, &filler);
            structure.insert_str(position, &dots);
            SecStruct::new(&sequence, &structure)
        })
        .collect()
}

fn unpaired_candidates(ss: &SecStruct, exclude: &[usize], skip_first: bool) -> Result<Vec<usize>> {
    check_positions(exclude, ss.len())?;
    Ok(ss
        .structure()
        .char_indices()
        .filter(|&(i, c)| c == '.' && !exclude.contains(&i) && !(skip_first && i == 0))
        .map(|(i, _)| i)
        .collect())
}

fn require(requested: usize, available: usize) -> Result<()> {
    if requested > available {
        return Err(DesignError::InsufficientPositions {
            requested,
            available,
        });
    }
    Ok(())
}

///
/// For every combination of `n_include` existing unpaired positions (never
/// position 0, never an excluded one) insert one more unpaired base in front
/// of each chosen position. The new base always joins an existing unpaired
/// run, so no insertion can leave a lone unpaired base between two pairs.
///
pub fn add_unpaired_sweep(
    ss: &SecStruct,
    n_include: usize,
    exclude: &[usize],
    all_nucleotides: bool,
) -> Result<Vec<SecStruct>> {
    let candidates = unpaired_candidates(ss, exclude, true)?;
    require(n_include, candidates.len())?;
    if n_include == 0 {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    for chosen in candidates.iter().copied().combinations(n_include) {
        for bases in fillers(n_include, all_nucleotides) {
            let mut sequence = ss.sequence().as_bytes().to_vec();
            let mut structure = ss.structure().as_bytes().to_vec();
            // highest position first so lower indices stay put
            for (&pos, base) in chosen.iter().zip(bases.bytes()).rev() {
                sequence.insert(pos, base);
                structure.insert(pos, b'.');
            }
            results.push(SecStruct::new(
                &String::from_utf8_lossy(&sequence),
                &String::from_utf8_lossy(&structure),
            )?);
        }
    }
    Ok(results)
}

///
/// Delete `positions` from sequence and structure in lock-step.
///
pub fn remove_nucleotides(
    seq_struct: &SequenceStructure,
    positions: &[usize],
) -> Result<SequenceStructure> {
    check_positions(positions, seq_struct.len())?;
    let mut positions = positions.to_vec();
    positions.sort_unstable();
    positions.dedup();

    let mut sequence = seq_struct.sequence().to_string();
    let mut structure = seq_struct.structure().to_string();
    for &pos in positions.iter().rev() {
        sequence.remove(pos);
        structure.remove(pos);
    }
    SequenceStructure::new(sequence, structure)
}

fn removal_sweep(
    seq_struct: &SequenceStructure,
    candidates: Vec<usize>,
    n_remove: usize,
) -> Result<Vec<SequenceStructure>> {
    require(n_remove, candidates.len())?;
    if n_remove == 0 {
        return Ok(Vec::new());
    }
    candidates
        .into_iter()
        .combinations(n_remove)
        .map(|chosen| remove_nucleotides(seq_struct, &chosen))
        .collect()
}

/// One deletion result per combination of `n_remove` unpaired positions.
pub fn remove_unpaired_nucleotide_sweep(
    ss: &SecStruct,
    n_remove: usize,
    exclude: &[usize],
) -> Result<Vec<SequenceStructure>> {
    let candidates = unpaired_candidates(ss, exclude, false)?;
    removal_sweep(ss.as_sequence_structure(), candidates, n_remove)
}

/// One deletion result per combination of `n_remove` positions of any kind.
pub fn remove_nucleotide_sweep(
    ss: &SecStruct,
    n_remove: usize,
    exclude: &[usize],
) -> Result<Vec<SequenceStructure>> {
    check_positions(exclude, ss.len())?;
    let candidates = ss
        .sequence()
        .char_indices()
        .filter(|&(i, c)| c != STRAND_SEPARATOR && !exclude.contains(&i))
        .map(|(i, _)| i)
        .collect();
    removal_sweep(ss.as_sequence_structure(), candidates, n_remove)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn hairpin() -> SecStruct {
        SecStruct::new("GGGAAAACCC", "(((....)))").unwrap()
    }

    #[rstest]
    fn test_add_unpaired(hairpin: SecStruct) {
        let results = add_unpaired(&hairpin, 5, 2, false).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].sequence(), "GGGAAAAAACCC");
        assert_eq!(results[0].structure(), "(((......)))");
    }

    #[rstest]
    fn test_add_unpaired_all_nucleotides(hairpin: SecStruct) {
        let results = add_unpaired(&hairpin, 0, 2, true).unwrap();
        assert_eq!(results.len(), 16);
        assert_eq!(results[0].sequence(), "AAGGGAAAACCC");
        assert_eq!(results[1].sequence(), "AUGGGAAAACCC");
        assert_eq!(results[15].sequence(), "GGGGGAAAACCC");
        assert!(results.iter().all(|r| r.structure() == "..(((....)))"));
    }

    #[rstest]
    fn test_add_unpaired_invalid(hairpin: SecStruct) {
        assert!(matches!(
            add_unpaired(&hairpin, 11, 1, false),
            Err(DesignError::InvalidPosition(_))
        ));
        assert!(matches!(
            add_unpaired(&hairpin, 3, 0, false),
            Err(DesignError::InvalidArgument(_))
        ));
    }

    #[rstest]
    fn test_add_unpaired_sweep() {
        let ss = SecStruct::new("AGGGAAAACCC", ".(((....)))").unwrap();
        // position 0 is never a candidate, leaving the four loop positions
        let results = add_unpaired_sweep(&ss, 2, &[], false).unwrap();
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.structure() == ".(((......)))"));

        let results = add_unpaired_sweep(&ss, 1, &[5, 6, 7], true).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].sequence(), "AGGGAAAAACCC");
        assert_eq!(results[1].sequence(), "AGGGUAAAACCC");
    }

    #[rstest]
    fn test_add_unpaired_sweep_grows_existing_runs() {
        let ss = SecStruct::new("GGAGGGAAAACCCCC", "((.(((....)))))").unwrap();
        let runs = |structure: &str| -> Vec<usize> {
            structure
                .split(['(', ')'])
                .filter(|run| !run.is_empty())
                .map(str::len)
                .collect()
        };
        assert_eq!(runs(ss.structure()), vec![1, 4]);

        // every candidate yields a variant; none is dropped
        let results = add_unpaired_sweep(&ss, 1, &[], false).unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].structure(), "((..(((....)))))");
        assert_eq!(runs(results[0].structure()), vec![2, 4]);
        for result in &results[1..] {
            assert_eq!(runs(result.structure()), vec![1, 5]);
        }
    }

    #[rstest]
    fn test_add_unpaired_sweep_insufficient(hairpin: SecStruct) {
        assert!(matches!(
            add_unpaired_sweep(&hairpin, 5, &[], false),
            Err(DesignError::InsufficientPositions {
                requested: 5,
                available: 4
            })
        ));
    }

    #[rstest]
    fn test_remove_nucleotides(hairpin: SecStruct) {
        let result = remove_nucleotides(hairpin.as_sequence_structure(), &[6, 3]).unwrap();
        assert_eq!(result.sequence(), "GGGAACCC");
        assert_eq!(result.structure(), "(((..)))");
    }

    #[rstest]
    fn test_remove_does_not_check_pairing(hairpin: SecStruct) {
        let result = remove_nucleotides(hairpin.as_sequence_structure(), &[0]).unwrap();
        assert_eq!(result.structure(), "((....)))");
        assert!(SecStruct::parse(result).is_err());
    }

    #[rstest]
    fn test_remove_unpaired_sweep(hairpin: SecStruct) {
        let results = remove_unpaired_nucleotide_sweep(&hairpin, 2, &[3]).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.structure() == "(((..)))"));
        assert_eq!(results[0].sequence(), "GGGAACCC");
    }

    #[rstest]
    fn test_remove_nucleotide_sweep(hairpin: SecStruct) {
        let results = remove_nucleotide_sweep(&hairpin, 1, &[]).unwrap();
        assert_eq!(results.len(), 10);
        assert_eq!(results[0].structure(), "((....)))");

        assert!(matches!(
            remove_nucleotide_sweep(&hairpin, 11, &[]),
            Err(DesignError::InsufficientPositions { .. })
        ));
    }
}
