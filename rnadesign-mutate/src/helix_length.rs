//!
//! Grow or shrink helices by whole base pairs.
//!
//! A helix of `n` pairs is viewed as the list of its pairs from the outside in.
//! Shrinking keeps the first `ceil(m/2)` and the last `m - ceil(m/2)` pairs, so
//! the outermost and innermost pairs survive. Growing inserts random pairs at
//! index `ceil(n/2)`. Growing and then shrinking back therefore restores the
//! original helix exactly.
//!
use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;
use rand::Rng;

use rnadesign_core::errors::{DesignError, Result};
use rnadesign_core::models::{BasePair, Motif, SecStruct, STRAND_SEPARATOR};

fn helix_pairs(ss: &SecStruct, helix: &Motif) -> Vec<(char, char)> {
    let seq = ss.sequence().as_bytes();
    helix
        .pairs()
        .into_iter()
        .map(|(i, j)| (seq[i] as char, seq[j] as char))
        .collect()
}

fn render_helix(pairs: &[(char, char)]) -> (String, String) {
    let strand1: String = pairs.iter().map(|p| p.0).collect();
    let strand2: String = pairs.iter().rev().map(|p| p.1).collect();
    let sequence = format!("{}{}{}", strand1, STRAND_SEPARATOR, strand2);
    let structure = format!(
        "{}{}{}",
        "(".repeat(pairs.len()),
        STRAND_SEPARATOR,
        ")".repeat(pairs.len())
    );
    (sequence, structure)
}

/// Pair indices kept when shrinking `current` pairs down to `new_length`.
fn kept_pairs(helix: &Motif, current: usize, new_length: usize) -> Result<Vec<usize>> {
    if new_length == 1 {
        return match (helix.has_parent(), helix.has_children()) {
            (true, true) => Err(DesignError::AmbiguousShrink { helix_id: helix.id }),
            (false, true) => Ok(vec![current - 1]),
            _ => Ok(vec![0]),
        };
    }
    let outer = new_length.div_ceil(2);
    let inner = new_length - outer;
    Ok((0..outer).chain(current - inner..current).collect())
}

///
/// Change helix `helix_id` to `new_length` pairs. Unchanged length returns an
/// identical structure.
///
pub fn change_helix_length<R: Rng + ?Sized>(
    ss: &SecStruct,
    helix_id: usize,
    new_length: usize,
    rng: &mut R,
) -> Result<SecStruct> {
    if new_length < 1 {
        return Err(DesignError::InvalidArgument(
            "a helix needs at least one base pair".to_string(),
        ));
    }
    let helix = ss.helix(helix_id)?;
    let current = helix.num_pairs();
    if new_length == current {
        return Ok(ss.clone());
    }

    let pairs = helix_pairs(ss, helix);
    let new_pairs: Vec<(char, char)> = if new_length < current {
        kept_pairs(helix, current, new_length)?
            .into_iter()
            .map(|k| pairs[k])
            .collect()
    } else {
        let mid = current.div_ceil(2);
        let inserted = (current..new_length).map(|_| {
            let bp = BasePair::random(rng, true);
            (bp.five_prime(), bp.three_prime())
        });
        pairs[..mid]
            .iter()
            .copied()
            .chain(inserted.collect::<Vec<_>>())
            .chain(pairs[mid..].iter().copied())
            .collect()
    };

    debug!(
        "helix {}: {} -> {} pairs",
        helix_id,
        current,
        new_pairs.len()
    );
    let (sequence, structure) = render_helix(&new_pairs);
    ss.replace_motif(helix_id, &sequence, &structure)
}

///
/// One structure per length in `min_length..=max_length`, each derived from
/// the original.
///
pub fn scan_helix_lengths<R: Rng + ?Sized>(
    ss: &SecStruct,
    helix_id: usize,
    min_length: usize,
    max_length: usize,
    rng: &mut R,
) -> Result<Vec<SecStruct>> {
    if min_length > max_length {
        return Err(DesignError::InvalidArgument(format!(
            "min length {} is larger than max length {}",
            min_length, max_length
        )));
    }
    (min_length..=max_length)
        .map(|length| change_helix_length(ss, helix_id, length, rng))
        .collect()
}

///
/// Cross product of per-helix length ranges. Every combination is applied to
/// a fresh copy of the original structure.
///
pub fn scan_all_helix_lengths<R: Rng + ?Sized>(
    ss: &SecStruct,
    ranges: &BTreeMap<usize, (usize, usize)>,
    rng: &mut R,
) -> Result<Vec<SecStruct>> {
    for (&helix_id, &(min_length, max_length)) in ranges {
        ss.helix(helix_id)?;
        if min_length > max_length {
            return Err(DesignError::InvalidArgument(format!(
                "helix {}: min length {} is larger than max length {}",
                helix_id, min_length, max_length
            )));
        }
    }
    if ranges.is_empty() {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    let choices = ranges
        .iter()
        .map(|(&id, &(lo, hi))| (lo..=hi).map(move |length| (id, length)));
    for combo in choices.multi_cartesian_product() {
        let mut candidate = ss.clone();
        for (helix_id, length) in combo {
            candidate = change_helix_length(&candidate, helix_id, length, rng)?;
        }
        results.push(candidate);
    }
    Ok(results)
}
