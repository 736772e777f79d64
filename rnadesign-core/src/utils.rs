use regex::Regex;
use std::sync::OnceLock;

use crate::errors::{DesignError, Result};
use crate::models::{BasePair, Motif, SecStruct, SequenceStructure};

///
/// Longest consecutive run of each nucleotide in a sequence. Bases that never
/// occur report 0.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLengths {
    pub a: usize,
    pub c: usize,
    pub g: usize,
    pub u: usize,
}

impl RunLengths {
    pub fn get(&self, nucleotide: char) -> usize {
        match nucleotide {
            'A' => self.a,
            'C' => self.c,
            'G' => self.g,
            'U' => self.u,
            _ => 0,
        }
    }

    fn slot(&mut self, nucleotide: char) -> Option<&mut usize> {
        match nucleotide {
            'A' => Some(&mut self.a),
            'C' => Some(&mut self.c),
            'G' => Some(&mut self.g),
            'U' => Some(&mut self.u),
            _ => None,
        }
    }

    /// `(nucleotide, run)` in A, C, G, U order.
    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> {
        [('A', self.a), ('C', self.c), ('G', self.g), ('U', self.u)].into_iter()
    }

    pub fn max(&self) -> usize {
        self.a.max(self.c).max(self.g).max(self.u)
    }
}

pub fn max_repeating_nucleotides(sequence: &str) -> RunLengths {
    let mut result = RunLengths::default();
    let mut prev: Option<char> = None;
    let mut count = 0;

    for c in sequence.chars() {
        if Some(c) == prev {
            count += 1;
        } else {
            prev = Some(c);
            count = 1;
        }
        if let Some(slot) = result.slot(c) {
            *slot = (*slot).max(count);
        }
    }
    result
}

///
/// Stretch statistics for one helix given as its two strands (both 5'->3').
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelixStretches {
    pub max_gc_stretch: usize,
    pub max_stretch_1: usize,
    pub max_stretch_2: usize,
}

///
/// Longest run of consecutive G·C / C·G pairs when strand 1 is walked forward
/// and strand 2 backward, i.e. from the outside of the helix in.
///
pub fn gc_stretch(strand1: &str, strand2: &str) -> usize {
    let mut best = 0;
    let mut current = 0;
    for (a, b) in strand1.chars().zip(strand2.chars().rev()) {
        let is_gc = BasePair::from_bases(a, b).is_some_and(|bp| bp.is_gc());
        if is_gc {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

pub fn compute_stretches(strand1: &str, strand2: &str) -> HelixStretches {
    HelixStretches {
        max_gc_stretch: gc_stretch(strand1, strand2),
        max_stretch_1: max_repeating_nucleotides(strand1).max(),
        max_stretch_2: max_repeating_nucleotides(strand2).max(),
    }
}

/// GC stretch of one helix motif.
pub fn helix_gc_stretch(helix: &Motif) -> usize {
    let mut strands = helix.sequence.split('&');
    match (strands.next(), strands.next()) {
        (Some(s1), Some(s2)) => gc_stretch(s1, s2),
        _ => 0,
    }
}

///
/// Longest paired G·C run across every helix of the structure.
///
pub fn max_gc_stretch(sequence: &str, structure: &str) -> Result<usize> {
    let ss = SecStruct::new(sequence, structure)?;
    Ok(max_gc_stretch_of(&ss))
}

pub fn max_gc_stretch_of(ss: &SecStruct) -> usize {
    ss.helices().map(helix_gc_stretch).max().unwrap_or(0)
}

///
/// Can the two strands (both 5'->3') form a continuous helix of canonical or
/// wobble pairs?
///
pub fn can_form_helix(strand1: &str, strand2: &str) -> bool {
    strand1.len() == strand2.len()
        && strand1
            .chars()
            .zip(strand2.chars().rev())
            .all(|(a, b)| BasePair::from_bases(a, b).is_some())
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+),?(?:-(\d+))?").expect("valid range regex"))
}

///
/// Expand a range string such as `"1-3,5"` into `[1, 2, 3, 5]`. Numbers are
/// returned as written (no base conversion).
///
pub fn str_to_range(x: &str) -> Vec<usize> {
    let mut result = Vec::new();
    for cap in range_regex().captures_iter(x) {
        let start: Option<usize> = cap.get(1).and_then(|m| m.as_str().parse().ok());
        let end: Option<usize> = cap.get(2).and_then(|m| m.as_str().parse().ok());
        match (start, end) {
            (Some(s), Some(e)) => result.extend(s..=e),
            (Some(s), None) => result.push(s),
            _ => {}
        }
    }
    result
}

///
/// Binomial coefficient with saturation, for sizing enumerations up front.
///
pub fn n_choose_k(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result.saturating_mul((n - i) as u128) / (i as u128 + 1);
    }
    result
}

/// `C(n, k) * alternatives^k`, saturating.
pub fn combination_count(n: usize, k: usize, alternatives: usize) -> u128 {
    let per_set = (alternatives as u128).saturating_pow(k as u32);
    n_choose_k(n, k).saturating_mul(per_set)
}

///
/// Number of ways to pick `k` of the sites and one alternative at each, when
/// site `i` has `alternatives[i]` choices. Saturating.
///
pub fn mixed_combination_count(alternatives: &[usize], k: usize) -> u128 {
    if k > alternatives.len() {
        return 0;
    }
    // counts[j]: ways using j of the sites seen so far
    let mut counts = vec![0u128; k + 1];
    counts[0] = 1;
    for &a in alternatives {
        for j in (1..=k).rev() {
            counts[j] = counts[j].saturating_add(counts[j - 1].saturating_mul(a as u128));
        }
    }
    counts[k]
}

/// Validate that every position is inside a sequence of length `len`.
pub fn check_positions(positions: &[usize], len: usize) -> Result<()> {
    if let Some(&bad) = positions.iter().find(|&&p| p >= len) {
        return Err(DesignError::InvalidPosition(format!(
            "position {} is out of range for a sequence of length {}",
            bad, len
        )));
    }
    Ok(())
}

/// Positions where `needle` occurs in the sequence, all of them.
pub fn find_subsequence_positions(seq_struct: &SequenceStructure, needle: &str) -> Vec<usize> {
    let sequence = seq_struct.sequence();
    let mut positions = Vec::new();
    if needle.is_empty() {
        return positions;
    }
    let mut offset = 0;
    while let Some(found) = sequence[offset..].find(needle) {
        let start = offset + found;
        positions.extend(start..start + needle.len());
        offset = start + 1;
    }
    positions.sort_unstable();
    positions.dedup();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("", vec![])]
    #[case("1", vec![1])]
    #[case("1,2,3", vec![1, 2, 3])]
    #[case("1-3", vec![1, 2, 3])]
    #[case("1-3,5", vec![1, 2, 3, 5])]
    #[case("1-3, 5", vec![1, 2, 3, 5])]
    #[case("1-3,5-7", vec![1, 2, 3, 5, 6, 7])]
    fn test_str_to_range(#[case] input: &str, #[case] expected: Vec<usize>) {
        assert_eq!(str_to_range(input), expected);
    }

    #[rstest]
    fn test_max_repeating_empty() {
        let result = max_repeating_nucleotides("");
        assert_eq!(result, RunLengths::default());
        assert_eq!(result.max(), 0);
    }

    #[rstest]
    fn test_max_repeating_single_nucleotide() {
        let result = max_repeating_nucleotides("AAAA");
        assert_eq!(result.get('A'), 4);
        assert_eq!(result.get('C'), 0);
        assert_eq!(result.get('G'), 0);
        assert_eq!(result.get('U'), 0);
    }

    #[rstest]
    #[case("ACGUA", RunLengths { a: 2, c: 1, g: 1, u: 1 })]
    #[case("AAAGGUUCC", RunLengths { a: 3, c: 2, g: 2, u: 2 })]
    #[case("AAAGGUUCCAGGU", RunLengths { a: 3, c: 2, g: 2, u: 2 })]
    fn test_max_repeating_repeated_units(#[case] unit: &str, #[case] expected: RunLengths) {
        assert_eq!(max_repeating_nucleotides(&unit.repeat(10)), expected);
    }

    #[rstest]
    fn test_separator_breaks_runs() {
        assert_eq!(max_repeating_nucleotides("GG&GG").g, 2);
    }

    #[rstest]
    #[case("GGGGAAAACCCC", "((((....))))", 4)]
    #[case("CAGGAAAACCUG", "((((....))))", 2)]
    #[case("GGGGUUUUCCCC", "((((....))))", 4)]
    #[case("GAGGUAUUCCUC", "((((....))))", 2)]
    #[case("AAAA", "....", 0)]
    fn test_max_gc_stretch(#[case] seq: &str, #[case] ss: &str, #[case] expected: usize) {
        assert_eq!(max_gc_stretch(seq, ss).unwrap(), expected);
    }

    #[rstest]
    fn test_compute_stretches() {
        let stretches = compute_stretches("GGGA", "UCCC");
        assert_eq!(stretches.max_gc_stretch, 3);
        assert_eq!(stretches.max_stretch_1, 3);
        assert_eq!(stretches.max_stretch_2, 3);
    }

    #[rstest]
    #[case("GAC", "GUC", true)]
    #[case("AGAC", "GUCU", true)]
    #[case("GUC", "GUG", false)]
    #[case("GU", "GUC", false)]
    fn test_can_form_helix(#[case] s1: &str, #[case] s2: &str, #[case] expected: bool) {
        assert_eq!(can_form_helix(s1, s2), expected);
    }

    #[rstest]
    fn test_n_choose_k() {
        assert_eq!(n_choose_k(3, 1), 3);
        assert_eq!(n_choose_k(3, 2), 3);
        assert_eq!(n_choose_k(10, 3), 120);
        assert_eq!(n_choose_k(2, 3), 0);
        assert_eq!(combination_count(3, 2, 3), 27);
    }

    #[rstest]
    #[case(&[3, 3, 3], 2, 27)]
    #[case(&[4, 5], 1, 9)]
    #[case(&[4, 5, 6], 2, 74)]
    #[case(&[4, 5], 0, 1)]
    #[case(&[4], 2, 0)]
    fn test_mixed_combination_count(
        #[case] alternatives: &[usize],
        #[case] k: usize,
        #[case] expected: u128,
    ) {
        assert_eq!(mixed_combination_count(alternatives, k), expected);
    }

    #[rstest]
    fn test_find_subsequence_positions() {
        let ss = SequenceStructure::new("GGAAAGGAAA", "..........").unwrap();
        assert_eq!(find_subsequence_positions(&ss, "GGA"), vec![0, 1, 2, 5, 6, 7]);
        assert!(find_subsequence_positions(&ss, "UUU").is_empty());
    }
}
