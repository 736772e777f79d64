use std::fmt::{self, Display};

use crate::errors::{DesignError, Result};

use super::motif::{Motif, MotifType};
use super::sequence_structure::{STRAND_SEPARATOR, SequenceStructure};

///
/// A parsed secondary structure: the validated sequence/structure pair, its
/// pair table and the motif tree built from it.
///
/// `SecStruct` is an immutable value. Every edit, including
/// [`SecStruct::replace_motif`], returns a freshly parsed instance, so one
/// structure can feed any number of independent design attempts.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecStruct {
    seq_struct: SequenceStructure,
    pairs: Vec<Option<usize>>,
    motifs: Vec<Motif>,
}

impl SecStruct {
    pub fn new(sequence: &str, structure: &str) -> Result<Self> {
        Self::parse(SequenceStructure::new(sequence, structure)?)
    }

    pub fn parse(seq_struct: SequenceStructure) -> Result<Self> {
        let pairs = pair_table(seq_struct.structure())?;
        let motifs = MotifTreeBuilder::new(&seq_struct, &pairs).build();
        Ok(SecStruct {
            seq_struct,
            pairs,
            motifs,
        })
    }

    pub fn sequence(&self) -> &str {
        self.seq_struct.sequence()
    }

    pub fn structure(&self) -> &str {
        self.seq_struct.structure()
    }

    pub fn len(&self) -> usize {
        self.seq_struct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq_struct.is_empty()
    }

    pub fn as_sequence_structure(&self) -> &SequenceStructure {
        &self.seq_struct
    }

    pub fn into_sequence_structure(self) -> SequenceStructure {
        self.seq_struct
    }

    pub fn motifs(&self) -> &[Motif] {
        &self.motifs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Motif> {
        self.motifs.iter()
    }

    pub fn motif(&self, id: usize) -> Result<&Motif> {
        self.motifs.get(id).ok_or_else(|| {
            DesignError::InvalidPosition(format!(
                "motif id {} out of range ({} motifs)",
                id,
                self.motifs.len()
            ))
        })
    }

    /// Look up a motif and require it to be a helix.
    pub fn helix(&self, id: usize) -> Result<&Motif> {
        let motif = self.motif(id)?;
        if !motif.is_helix() {
            return Err(DesignError::InvalidPosition(format!(
                "motif {} is a {}, not a HELIX",
                id, motif.motif_type
            )));
        }
        Ok(motif)
    }

    pub fn helices(&self) -> impl Iterator<Item = &Motif> {
        self.motifs.iter().filter(|m| m.is_helix())
    }

    pub fn num_helices(&self) -> usize {
        self.helices().count()
    }

    pub fn is_paired(&self, pos: usize) -> bool {
        self.paired_partner(pos).is_some()
    }

    pub fn paired_partner(&self, pos: usize) -> Option<usize> {
        self.pairs.get(pos).copied().flatten()
    }

    pub fn pair_table(&self) -> &[Option<usize>] {
        &self.pairs
    }

    ///
    /// First and last position of each strand of every non-helix motif,
    /// sorted and deduplicated.
    ///
    pub fn flanking_positions(&self) -> Vec<usize> {
        let mut flanks: Vec<usize> = self
            .motifs
            .iter()
            .filter(|m| !m.is_helix())
            .flat_map(|m| m.flanking_positions())
            .collect();
        flanks.sort_unstable();
        flanks.dedup();
        flanks
    }

    ///
    /// Splice a new sequence/structure into one motif's strands and re-parse.
    ///
    /// `new_sequence` and `new_structure` must contain one `&`-separated part
    /// per strand of the motif. Parts may differ in length from the strands
    /// they replace.
    ///
    pub fn replace_motif(
        &self,
        id: usize,
        new_sequence: &str,
        new_structure: &str,
    ) -> Result<SecStruct> {
        let motif = self.motif(id)?;
        let seq_parts: Vec<&str> = new_sequence.split(STRAND_SEPARATOR).collect();
        let ss_parts: Vec<&str> = new_structure.split(STRAND_SEPARATOR).collect();

        if seq_parts.len() != motif.strands.len() || ss_parts.len() != motif.strands.len() {
            return Err(DesignError::InvalidArgument(format!(
                "motif {} has {} strands but the replacement has {}",
                id,
                motif.strands.len(),
                seq_parts.len().max(ss_parts.len())
            )));
        }
        for (seq, ss) in seq_parts.iter().zip(ss_parts.iter()) {
            if seq.len() != ss.len() {
                return Err(DesignError::InvalidArgument(format!(
                    "replacement strand '{}' and structure '{}' differ in length",
                    seq, ss
                )));
            }
        }

        // splice from the 3' end so earlier offsets stay valid
        let mut order: Vec<usize> = (0..motif.strands.len()).collect();
        order.sort_by_key(|&k| std::cmp::Reverse(motif.strands[k].first().copied()));

        let mut sequence = self.sequence().to_string();
        let mut structure = self.structure().to_string();
        for k in order {
            let strand = &motif.strands[k];
            let (Some(&start), Some(&end)) = (strand.first(), strand.last()) else {
                continue;
            };
            sequence.replace_range(start..=end, seq_parts[k]);
            structure.replace_range(start..=end, ss_parts[k]);
        }

        SecStruct::new(&sequence, &structure)
    }
}

impl Display for SecStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.seq_struct)
    }
}

impl<'a> IntoIterator for &'a SecStruct {
    type Item = &'a Motif;
    type IntoIter = std::slice::Iter<'a, Motif>;

    fn into_iter(self) -> Self::IntoIter {
        self.motifs.iter()
    }
}

///
/// Build a pair table from a dot-bracket string. Separators and dots are
/// unpaired.
///
pub fn pair_table(structure: &str) -> Result<Vec<Option<usize>>> {
    let mut pairs = vec![None; structure.len()];
    let mut stack = Vec::new();

    for (i, c) in structure.bytes().enumerate() {
        match c {
            b'(' => stack.push(i),
            b')' => {
                let j = stack.pop().ok_or_else(|| {
                    DesignError::InvalidArgument(format!(
                        "unmatched ')' at position {} in '{}'",
                        i, structure
                    ))
                })?;
                pairs[i] = Some(j);
                pairs[j] = Some(i);
            }
            _ => {}
        }
    }

    if let Some(i) = stack.pop() {
        return Err(DesignError::InvalidArgument(format!(
            "unmatched '(' at position {} in '{}'",
            i, structure
        )));
    }

    Ok(pairs)
}

struct MotifTreeBuilder<'a> {
    sequence: &'a [u8],
    structure: &'a [u8],
    pairs: &'a [Option<usize>],
    motifs: Vec<Motif>,
}

impl<'a> MotifTreeBuilder<'a> {
    fn new(seq_struct: &'a SequenceStructure, pairs: &'a [Option<usize>]) -> Self {
        MotifTreeBuilder {
            sequence: seq_struct.sequence().as_bytes(),
            structure: seq_struct.structure().as_bytes(),
            pairs,
            motifs: Vec::new(),
        }
    }

    fn build(mut self) -> Vec<Motif> {
        let n = self.structure.len();
        let mut i = 0;
        while i < n {
            if let Some(j) = self.pairs[i].filter(|&j| j > i) {
                self.add_helix(i, j, None);
                i = j + 1;
                continue;
            }
            if self.structure[i] != b'.' {
                i += 1;
                continue;
            }
            let start = i;
            while i < n && self.structure[i] == b'.' {
                i += 1;
            }
            self.push(MotifType::SingleStrand, vec![(start..i).collect()], None);
        }
        self.motifs
    }

    fn push(&mut self, motif_type: MotifType, strands: Vec<Vec<usize>>, parent: Option<usize>) -> usize {
        let render = |src: &[u8]| {
            strands
                .iter()
                .map(|s| s.iter().map(|&p| src[p] as char).collect::<String>())
                .collect::<Vec<_>>()
                .join("&")
        };
        let sequence = render(self.sequence);
        let structure = render(self.structure);

        let id = self.motifs.len();
        self.motifs.push(Motif {
            id,
            motif_type,
            strands,
            sequence,
            structure,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Add the helix opened by pair `(i, j)` and everything it encloses.
    fn add_helix(&mut self, i: usize, j: usize, parent: Option<usize>) -> usize {
        let mut len = 1;
        while i + len < j - len && self.pairs[i + len] == Some(j - len) {
            len += 1;
        }

        let strand1: Vec<usize> = (i..i + len).collect();
        let strand2: Vec<usize> = (j + 1 - len..=j).collect();
        let id = self.push(MotifType::Helix, vec![strand1, strand2], parent);

        if let Some(child) = self.add_loop(i + len - 1, j + 1 - len, id) {
            self.motifs[id].children.push(child);
        }
        id
    }

    /// Add the loop closed by pair `(i, j)`; a loop holding nothing but
    /// separators yields no motif.
    fn add_loop(&mut self, i: usize, j: usize, parent: usize) -> Option<usize> {
        let mut inner = Vec::new();
        let mut has_unpaired = false;
        let mut has_separator = false;

        let mut k = i + 1;
        while k < j {
            if let Some(p) = self.pairs[k].filter(|&p| p > k) {
                inner.push((k, p));
                k = p + 1;
                continue;
            }
            if self.structure[k] == STRAND_SEPARATOR as u8 {
                has_separator = true;
            } else {
                has_unpaired = true;
            }
            k += 1;
        }

        if inner.is_empty() && !has_unpaired {
            return None;
        }

        let (motif_type, segments) = if inner.is_empty() && !has_separator {
            (MotifType::Hairpin, vec![(i, j)])
        } else {
            let mut segments = Vec::with_capacity(inner.len() + 1);
            let mut start = i;
            for &(k, p) in &inner {
                segments.push((start, k));
                start = p;
            }
            segments.push((start, j));
            (MotifType::Junction, segments)
        };

        let strands: Vec<Vec<usize>> = segments
            .into_iter()
            .flat_map(|(a, b)| self.split_at_separator(a, b))
            .collect();
        let id = self.push(motif_type, strands, Some(parent));

        for (k, p) in inner {
            let child = self.add_helix(k, p, Some(id));
            self.motifs[id].children.push(child);
        }
        Some(id)
    }

    fn split_at_separator(&self, start: usize, end: usize) -> Vec<Vec<usize>> {
        let mut strands = Vec::new();
        let mut current = Vec::new();
        for p in start..=end {
            if self.structure[p] == STRAND_SEPARATOR as u8 {
                if !current.is_empty() {
                    strands.push(std::mem::take(&mut current));
                }
            } else {
                current.push(p);
            }
        }
        if !current.is_empty() {
            strands.push(current);
        }
        strands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parse_hairpin_with_tail() {
        let ss = SecStruct::new("AAGGGGAAAACCCC", "..((((....))))").unwrap();
        let motifs = ss.motifs();
        assert_eq!(motifs.len(), 3);

        assert_eq!(motifs[0].motif_type, MotifType::SingleStrand);
        assert_eq!(motifs[0].strands, vec![vec![0, 1]]);

        assert_eq!(motifs[1].motif_type, MotifType::Helix);
        assert_eq!(motifs[1].strands, vec![vec![2, 3, 4, 5], vec![10, 11, 12, 13]]);
        assert_eq!(motifs[1].sequence, "GGGG&CCCC");
        assert_eq!(motifs[1].structure, "((((&))))");
        assert_eq!(motifs[1].children, vec![2]);
        assert!(!motifs[1].has_parent());

        assert_eq!(motifs[2].motif_type, MotifType::Hairpin);
        assert_eq!(motifs[2].sequence, "GAAAAC");
        assert_eq!(motifs[2].structure, "(....)");
        assert_eq!(motifs[2].parent, Some(1));
    }

    #[rstest]
    fn test_parse_two_strand_helix() {
        let ss = SecStruct::new("GGGG&CCCC", "((((&))))").unwrap();
        assert_eq!(ss.motifs().len(), 1);
        let helix = ss.helix(0).unwrap();
        assert_eq!(helix.strands, vec![vec![0, 1, 2, 3], vec![5, 6, 7, 8]]);
        assert!(!helix.has_children());
    }

    #[rstest]
    fn test_parse_junction() {
        let ss = SecStruct::new("GGAAGGAAACCAAGGAAACCAACC", "((..((...))..((...))..))").unwrap();
        let types: Vec<MotifType> = ss.iter().map(|m| m.motif_type).collect();
        assert_eq!(
            types,
            vec![
                MotifType::Helix,
                MotifType::Junction,
                MotifType::Helix,
                MotifType::Hairpin,
                MotifType::Helix,
                MotifType::Hairpin,
            ]
        );
        let junction = ss.motif(1).unwrap();
        assert_eq!(
            junction.strands,
            vec![vec![1, 2, 3, 4], vec![10, 11, 12, 13], vec![19, 20, 21, 22]]
        );
        assert_eq!(junction.children, vec![2, 4]);
        assert_eq!(ss.motif(2).unwrap().parent, Some(1));
        assert_eq!(ss.num_helices(), 3);
    }

    #[rstest]
    fn test_pairing_lookups() {
        let ss = SecStruct::new("GGGGAAAACCCC", "((((....))))").unwrap();
        assert!(ss.is_paired(0));
        assert_eq!(ss.paired_partner(0), Some(11));
        assert_eq!(ss.paired_partner(3), Some(8));
        assert!(!ss.is_paired(5));
        assert_eq!(ss.paired_partner(100), None);
    }

    #[rstest]
    fn test_flanking_positions() {
        let ss = SecStruct::new("AAGGGGAAAACCCC", "..((((....))))").unwrap();
        assert_eq!(ss.flanking_positions(), vec![0, 1, 5, 10]);
    }

    #[rstest]
    #[case("((((...)))")]
    #[case("(((...))))")]
    #[case(")(")]
    fn test_unbalanced(#[case] structure: &str) {
        let sequence = "A".repeat(structure.len());
        assert!(matches!(
            SecStruct::new(&sequence, structure),
            Err(DesignError::InvalidArgument(_))
        ));
    }

    #[rstest]
    fn test_replace_hairpin() {
        let ss = SecStruct::new("GGGGAAAACCCC", "((((....))))").unwrap();
        let new_ss = ss.replace_motif(1, "GUUUUC", "((..))").unwrap();
        assert_eq!(new_ss.sequence(), "GGGGUUUUCCCC");
        assert_eq!(new_ss.structure(), "(((((..)))))");
        // the original is untouched
        assert_eq!(ss.structure(), "((((....))))");
    }

    #[rstest]
    fn test_replace_helix() {
        let ss = SecStruct::new("GGGGAAAACCCC", "((((....))))").unwrap();
        let new_ss = ss.replace_motif(0, "GACG&CCAC", "(..(&)..)").unwrap();
        assert_eq!(new_ss.sequence(), "GACGAAAACCAC");
        assert_eq!(new_ss.structure(), "(..(....)..)");
    }

    #[rstest]
    fn test_replace_wrong_strand_count() {
        let ss = SecStruct::new("GGGGAAAACCCC", "((((....))))").unwrap();
        assert!(ss.replace_motif(0, "GGGG", "((((").is_err());
        assert!(ss.replace_motif(9, "GGGG", "((((").is_err());
    }
}
