use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::HelixDesignError;

///
/// Search budget and composition limits for the helix designer.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DesignerConfig {
    /// Hard cap on resample rounds.
    pub max_rounds: usize,
    /// Stop once this many rounds folded into the target.
    pub num_successes: usize,
    /// Draws per helix before the last draw is accepted regardless.
    pub helix_attempts: usize,
    /// Probability of drawing a G·U pair instead of a Watson-Crick pair.
    pub gu_fraction: f64,
    pub max_run_length: usize,
    pub max_gc_stretch: usize,
    /// Subsequences that are never changed, wherever they occur.
    pub exclude_sequences: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        DesignerConfig {
            max_rounds: 1000,
            num_successes: 10,
            helix_attempts: 100,
            gu_fraction: 0.3,
            max_run_length: 4,
            max_gc_stretch: 3,
            exclude_sequences: Vec::new(),
            seed: None,
        }
    }
}

impl TryFrom<&Path> for DesignerConfig {
    type Error = HelixDesignError;

    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(value)?;
        let config: DesignerConfig = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
