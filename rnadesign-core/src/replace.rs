use itertools::Itertools;

use crate::errors::{DesignError, Result};
use crate::models::SequenceStructure;
use crate::models::secstruct::pair_table;

/// Half-open `[start, end)` span of each matched strand, 5' to 3'.
pub type StrandBounds = Vec<(usize, usize)>;

fn occurrences(haystack: &SequenceStructure, needle: &SequenceStructure) -> Vec<usize> {
    let n = needle.len();
    if n == 0 || n > haystack.len() {
        return Vec::new();
    }
    (0..=haystack.len() - n)
        .filter(|&i| {
            haystack.sequence()[i..i + n] == *needle.sequence()
                && haystack.structure()[i..i + n] == *needle.structure()
        })
        .collect()
}

///
/// Every placement of `sub` inside `original`. Strands of `sub` must occur in
/// order without overlapping, and every pair of `sub` must land on a pair of
/// `original`.
///
pub fn find_substructure(
    original: &SequenceStructure,
    sub: &SequenceStructure,
) -> Result<Vec<StrandBounds>> {
    let org_pairs = pair_table(original.structure())?;
    let sub_pairs = pair_table(sub.structure())?;
    let strands = sub.split_strands();

    // offset of each strand inside the sub string, separators included
    let mut sub_offsets = Vec::with_capacity(strands.len());
    let mut offset = 0;
    for strand in &strands {
        sub_offsets.push(offset);
        offset += strand.len() + 1;
    }

    let candidates: Vec<Vec<usize>> = strands.iter().map(|s| occurrences(original, s)).collect();
    if candidates.iter().any(|c| c.is_empty()) {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for starts in candidates.into_iter().multi_cartesian_product() {
        let ordered = starts
            .iter()
            .zip(strands.iter())
            .tuple_windows()
            .all(|((s1, strand1), (s2, _))| s1 + strand1.len() <= *s2);
        if !ordered {
            continue;
        }

        let map = |sub_pos: usize| -> Option<usize> {
            let k = sub_offsets.iter().rposition(|&o| o <= sub_pos)?;
            Some(starts[k] + sub_pos - sub_offsets[k])
        };
        let pairs_agree = sub_pairs.iter().enumerate().all(|(i, partner)| match partner {
            Some(j) => match (map(i), map(*j)) {
                (Some(oi), Some(oj)) => org_pairs[oi] == Some(oj),
                _ => false,
            },
            None => true,
        });
        if pairs_agree {
            found.push(
                starts
                    .iter()
                    .zip(strands.iter())
                    .map(|(&s, strand)| (s, s + strand.len()))
                    .collect(),
            );
        }
    }
    Ok(found)
}

///
/// Replace the single occurrence of `sub` in `original` with `replacement`,
/// strand by strand. `replacement` must have as many strands as `sub`.
///
pub fn replace_seq_structures(
    original: &SequenceStructure,
    sub: &SequenceStructure,
    replacement: &SequenceStructure,
) -> Result<SequenceStructure> {
    if sub.num_strands() != replacement.num_strands() {
        return Err(DesignError::InvalidArgument(format!(
            "substructure has {} strands but the replacement has {}",
            sub.num_strands(),
            replacement.num_strands()
        )));
    }

    let mut matches = find_substructure(original, sub)?;
    let bounds = match matches.len() {
        0 => {
            return Err(DesignError::InvalidArgument(format!(
                "cannot find substructure {} in {}",
                sub, original
            )));
        }
        1 => matches.remove(0),
        n => {
            return Err(DesignError::InvalidArgument(format!(
                "found {} copies of substructure {} in {}",
                n, sub, original
            )));
        }
    };

    let mut sequence = original.sequence().to_string();
    let mut structure = original.structure().to_string();
    let parts = replacement.split_strands();
    for (&(start, end), part) in bounds.iter().zip(parts.iter()).rev() {
        sequence.replace_range(start..end, part.sequence());
        structure.replace_range(start..end, part.structure());
    }
    SequenceStructure::new(sequence, structure)
}

/// Swap a GAAA tetraloop closed by G-C for a UUCG loop closed by C-G.
pub fn replace_gaaa_w_uucg(seq_struct: &SequenceStructure) -> Result<SequenceStructure> {
    let sub = SequenceStructure::new("GGAAAC", "(....)")?;
    let replacement = SequenceStructure::new("CUUCGG", "(....)")?;
    replace_seq_structures(seq_struct, &sub, &replacement)
}
