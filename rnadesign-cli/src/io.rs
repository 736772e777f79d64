use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use rnadesign_core::Selection;
use rnadesign_core::models::{SecStruct, normalize_rna};

#[derive(Debug, Deserialize)]
struct InputRow {
    #[serde(default)]
    name: Option<String>,
    sequence: String,
    structure: String,
}

/// One parsed input row.
#[derive(Debug, Clone)]
pub struct NamedStructure {
    pub name: String,
    pub ss: SecStruct,
}

///
/// Read a `name,sequence,structure` CSV. The `name` column is optional; rows
/// without one are called `seq_<row index>`.
///
pub fn read_structures(path: &Path) -> Result<Vec<NamedStructure>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let mut structures = Vec::new();
    for (i, row) in reader.deserialize::<InputRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed row {} in {}", i + 1, path.display()))?;
        let name = row
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("seq_{}", i));
        let ss = SecStruct::new(&normalize_rna(&row.sequence), &row.structure)
            .with_context(|| format!("Invalid structure for {}", name))?;
        structures.push(NamedStructure { name, ss });
    }
    Ok(structures)
}

/// Write rows as CSV to `output`, or to stdout when no path is given.
pub fn write_rows<T: Serialize>(output: Option<&String>, rows: &[T]) -> Result<()> {
    match output {
        Some(path) => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        None => {
            let mut writer = csv::Writer::from_writer(io::stdout().lock());
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

pub fn read_selection(path: Option<&String>) -> Result<Option<Selection>> {
    path.map(|p| {
        Selection::try_from(Path::new(p))
            .with_context(|| format!("Failed to read selection file: {}", p))
    })
    .transpose()
}

/// Positions picked by the selection, none without one.
pub fn excluded_positions(selection: Option<&Selection>, ss: &SecStruct) -> Result<Vec<usize>> {
    match selection {
        Some(selection) => Ok(selection.resolve(ss)?),
        None => Ok(Vec::new()),
    }
}

pub fn progress_bar(len: usize, message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?,
    );
    pb.set_message(message);
    Ok(pb)
}

/// One generated variant of an input structure.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VariantRow {
    pub name: String,
    pub parent: String,
    pub mutation: String,
    pub sequence: String,
    pub structure: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;
    use std::path::PathBuf;

    pub(crate) fn test_data(file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../tests/data")
            .join(file)
    }

    pub(crate) fn read_variants(path: &Path) -> Vec<VariantRow> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .collect::<std::result::Result<Vec<VariantRow>, _>>()
            .unwrap()
    }

    #[rstest]
    fn test_read_structures() {
        let structures = read_structures(&test_data("sequences.csv")).unwrap();
        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0].name, "hairpin");
        assert_eq!(structures[1].ss.structure(), "..((((....))))");
    }

    #[rstest]
    fn test_missing_names_and_dna_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "sequence,structure").unwrap();
        writeln!(file, "ggggaaaacccc,((((....))))").unwrap();
        writeln!(file, "GGGTAAAACCC,(((....)))").unwrap();
        drop(file);

        let structures = read_structures(&path).unwrap();
        assert_eq!(structures[0].name, "seq_0");
        assert_eq!(structures[0].ss.sequence(), "GGGGAAAACCCC");
        assert_eq!(structures[1].name, "seq_1");
        assert_eq!(structures[1].ss.sequence(), "GGGUAAAACCC");
    }

    #[rstest]
    fn test_bad_structure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        std::fs::write(&path, "name,sequence,structure\nbad,GGGAAACCC,(((...))\n").unwrap();
        let err = read_structures(&path).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[rstest]
    fn test_excluded_positions() {
        let structures = read_structures(&test_data("sequences.csv")).unwrap();
        let path = test_data("selection.yaml").to_string_lossy().to_string();
        let selection = read_selection(Some(&path)).unwrap();
        let excluded = excluded_positions(selection.as_ref(), &structures[1].ss).unwrap();
        assert_eq!(excluded, vec![0, 1, 2, 3, 4, 5, 6, 9, 10, 11, 12, 13]);
        assert!(excluded_positions(None, &structures[1].ss).unwrap().is_empty());
    }
}
