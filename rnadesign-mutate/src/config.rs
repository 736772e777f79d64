use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rnadesign_core::errors::DesignError;

use crate::consts::DEFAULT_MAX_COMBINATIONS;

///
/// Knobs for the enumeration engines.
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MutateConfig {
    /// Refuse exhaustive enumerations larger than this.
    pub max_combinations: u64,
    /// Allow G·U and U·G as replacement pairs.
    pub include_gu: bool,
    /// Only mutate pairs whose 5' position has paired neighbours on both sides.
    pub require_flanking_pairs: bool,
}

impl Default for MutateConfig {
    fn default() -> Self {
        MutateConfig {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            include_gu: true,
            require_flanking_pairs: false,
        }
    }
}

impl TryFrom<&Path> for MutateConfig {
    type Error = DesignError;

    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let yaml = read_to_string(value)?;
        let config: MutateConfig = serde_yaml::from_str(&yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_partial_config_keeps_defaults() {
        let config: MutateConfig = serde_yaml::from_str("include_gu: false\n").unwrap();
        assert_eq!(
            config,
            MutateConfig {
                include_gu: false,
                ..Default::default()
            }
        );
        assert_eq!(config.max_combinations, 1_000_000);
    }

    #[rstest]
    fn test_config_from_file() {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../tests/data/mutate.yaml");
        let config = MutateConfig::try_from(path.as_path()).unwrap();
        assert_eq!(config.max_combinations, 5000);
        assert!(!config.include_gu);
        assert!(!config.require_flanking_pairs);
    }
}
