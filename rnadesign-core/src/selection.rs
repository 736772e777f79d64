//!
//! Turn declarative selection parameters into concrete 0-based position sets.
//!
//! Parameters are a YAML mapping. Keys are dispatched by prefix so several
//! rules of the same kind can sit side by side (`motif_1`, `motif_2`, ...):
//!
//! ```yaml
//! motif:
//!   m_type: HELIX
//!   extend_flank: 1
//! flanks: {}
//! range: "1-5,9"
//! invert: false
//! ```
//!
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;
use serde_yaml::Value;

use crate::errors::{DesignError, Result};
use crate::models::{Motif, MotifType, SecStruct};
use crate::utils::{check_positions, str_to_range};

/// Motifs that can be addressed by name instead of sequence/structure.
pub const NAMED_MOTIFS: [(&str, &str, &str); 3] = [
    ("ref_hp", "CGAGUAG", "(.....)"),
    ("gaaa_tetraloop", "GGAAAC", "(....)"),
    ("tlr", "UAUG&CUAAG", "(..(&)...)"),
];

fn named_motif(name: &str) -> Option<(&'static str, &'static str)> {
    NAMED_MOTIFS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, seq, ss)| (*seq, *ss))
}

///
/// Filter for the motifs of a structure. Every field that is set must match;
/// an empty filter selects every motif.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotifSearchParams {
    pub m_type: Option<MotifType>,
    pub sequence: Option<String>,
    pub structure: Option<String>,
    pub min_pos: Option<usize>,
    pub max_pos: Option<usize>,
    pub min_id: Option<usize>,
    pub max_id: Option<usize>,
    /// One of [`NAMED_MOTIFS`]; fills `sequence` and `structure`.
    pub name: Option<String>,
    /// Also select this many positions on either side of every strand.
    pub extend_flank: usize,
}

impl MotifSearchParams {
    /// Resolve `name` into sequence/structure filters.
    fn resolved(&self) -> Result<MotifSearchParams> {
        let mut params = self.clone();
        if let Some(name) = params.name.take() {
            let (seq, ss) = named_motif(&name).ok_or_else(|| {
                DesignError::InvalidArgument(format!("unknown named motif: {}", name))
            })?;
            params.sequence = Some(seq.to_string());
            params.structure = Some(ss.to_string());
        }
        Ok(params)
    }

    pub fn matches(&self, motif: &Motif) -> bool {
        self.m_type.is_none_or(|t| t == motif.motif_type)
            && self.sequence.as_ref().is_none_or(|s| *s == motif.sequence)
            && self.structure.as_ref().is_none_or(|s| *s == motif.structure)
            && self.min_pos.is_none_or(|p| motif.start_pos() >= p)
            && self.max_pos.is_none_or(|p| motif.end_pos() <= p)
            && self.min_id.is_none_or(|id| motif.id >= id)
            && self.max_id.is_none_or(|id| motif.id <= id)
    }

    /// Positions of every matching motif.
    pub fn select(&self, ss: &SecStruct) -> Result<Vec<usize>> {
        let params = self.resolved()?;
        let mut positions = Vec::new();
        for motif in ss.iter().filter(|m| params.matches(m)) {
            for strand in &motif.strands {
                let (Some(&first), Some(&last)) = (strand.first(), strand.last()) else {
                    continue;
                };
                let start = first.saturating_sub(params.extend_flank);
                let end = (last + params.extend_flank).min(ss.len().saturating_sub(1));
                positions.extend(start..first);
                positions.extend(strand.iter().copied());
                positions.extend(last + 1..=end);
            }
        }
        Ok(positions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRule {
    Motif(MotifSearchParams),
    /// First and last position of each strand of every non-helix motif.
    Flanks,
    /// 1-based inclusive ranges such as `"1-3,5"`.
    Range(String),
}

impl SelectionRule {
    pub fn select(&self, ss: &SecStruct) -> Result<Vec<usize>> {
        match self {
            SelectionRule::Motif(params) => params.select(ss),
            SelectionRule::Flanks => Ok(ss.flanking_positions()),
            SelectionRule::Range(range) => str_to_range(range)
                .into_iter()
                .map(|p| {
                    p.checked_sub(1).ok_or_else(|| {
                        DesignError::InvalidPosition(format!(
                            "range '{}' is 1-based, position 0 is invalid",
                            range
                        ))
                    })
                })
                .collect(),
        }
    }
}

///
/// An ordered list of rules whose results are unioned, optionally inverted.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub rules: Vec<SelectionRule>,
    pub invert: bool,
}

impl Selection {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_yaml_value(&value)
    }

    pub fn from_yaml_value(value: &Value) -> Result<Self> {
        let mapping = match value {
            Value::Mapping(m) => m,
            Value::Null => return Ok(Selection::default()),
            _ => {
                return Err(DesignError::InvalidArgument(
                    "selection parameters must be a mapping".to_string(),
                ));
            }
        };

        let mut selection = Selection::default();
        for (key, v) in mapping {
            let key = key.as_str().ok_or_else(|| {
                DesignError::InvalidArgument(format!("selection key is not a string: {:?}", key))
            })?;

            if key == "invert" {
                selection.invert = v.as_bool().ok_or_else(|| {
                    DesignError::InvalidArgument("invert must be true or false".to_string())
                })?;
            } else if key.starts_with("motif") {
                let params = match v {
                    Value::Null => MotifSearchParams::default(),
                    _ => serde_yaml::from_value(v.clone())?,
                };
                selection.rules.push(SelectionRule::Motif(params));
            } else if key.starts_with("flanks") {
                selection.rules.push(SelectionRule::Flanks);
            } else if key.starts_with("range") {
                let range = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => {
                        return Err(DesignError::InvalidArgument(format!(
                            "{} must be a range string",
                            key
                        )));
                    }
                };
                selection.rules.push(SelectionRule::Range(range));
            } else {
                debug!("ignoring unknown selection key: {}", key);
            }
        }
        Ok(selection)
    }

    ///
    /// Resolve against a structure. The result is sorted, deduplicated and
    /// validated against the sequence length.
    ///
    pub fn resolve(&self, ss: &SecStruct) -> Result<Vec<usize>> {
        let mut positions = Vec::new();
        for rule in &self.rules {
            positions.extend(rule.select(ss)?);
        }
        positions.sort_unstable();
        positions.dedup();
        check_positions(&positions, ss.len())?;

        if self.invert {
            positions = (0..ss.len())
                .filter(|p| positions.binary_search(p).is_err())
                .collect();
        }
        Ok(positions)
    }
}

impl TryFrom<&Path> for Selection {
    type Error = DesignError;

    fn try_from(value: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(value)?;
        Selection::from_yaml_str(&yaml)
    }
}

/// Resolve YAML selection parameters against a sequence/structure pair.
pub fn get_selection(sequence: &str, structure: &str, params: &Value) -> Result<Vec<usize>> {
    let ss = SecStruct::new(sequence, structure)?;
    Selection::from_yaml_value(params)?.resolve(&ss)
}
