//!
//! Stochastic helix redesign.
//!
//! Every round redraws the pairs of every helix, filters the candidate with
//! cheap composition checks and only then asks the folding oracle. Rounds
//! whose prediction matches the target structure count as successes; the one
//! with the lowest ensemble defect is kept.
//!
use std::fmt::{self, Display};

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rnadesign_core::constraints::{ConstraintSet, SequenceConstraint, StructureConstraint};
use rnadesign_core::models::{BasePair, SecStruct};
use rnadesign_core::utils::{check_positions, compute_stretches, find_subsequence_positions};

use crate::config::DesignerConfig;
use crate::errors::Result;
use crate::oracle::FoldingOracle;

/// Non-fatal events recorded during a design run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignWarning {
    /// No draw passed the per-helix checks; the last draw was used anyway.
    HelixRetryCapReached { helix_id: usize, round: usize },
    /// The round budget ran out before enough successes were collected.
    RoundCapReached { rounds: usize },
}

impl Display for DesignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignWarning::HelixRetryCapReached { helix_id, round } => write!(
                f,
                "helix {} accepted without passing its checks in round {}",
                helix_id, round
            ),
            DesignWarning::RoundCapReached { rounds } => {
                write!(f, "stopped after {} rounds", rounds)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignResult {
    /// Ensemble defect of the best design, `f64::INFINITY` when nothing folded correctly.
    pub score: f64,
    /// Best design, empty when nothing folded correctly.
    pub sequence: String,
    pub structure: String,
    pub rounds: usize,
    pub successes: usize,
    pub oracle_calls: usize,
    pub warnings: Vec<DesignWarning>,
}

impl DesignResult {
    fn no_solution(structure: &str) -> Self {
        DesignResult {
            score: f64::INFINITY,
            sequence: String::new(),
            structure: structure.to_string(),
            rounds: 0,
            successes: 0,
            oracle_calls: 0,
            warnings: Vec::new(),
        }
    }

    /// False when no round ever folded into the target structure.
    pub fn is_solution(&self) -> bool {
        !self.sequence.is_empty() && self.score.is_finite()
    }
}

///
/// Redesigns every helix of a structure, scoring candidates with a
/// [`FoldingOracle`].
///
/// ```rust,no_run
/// use rnadesign_core::models::SecStruct;
/// use rnadesign_helix::{DesignerConfig, HelixDesigner, ViennaOracle};
///
/// let oracle = ViennaOracle::from_env();
/// let designer = HelixDesigner::new(&oracle, DesignerConfig::default());
/// let ss = SecStruct::new("AAGGGGAAAACCCC", "..((((....))))").unwrap();
/// let result = designer.design(&ss, &[]).unwrap();
/// if result.is_solution() {
///     println!("{} {}", result.sequence, result.score);
/// }
/// ```
///
pub struct HelixDesigner<'a, O: FoldingOracle + ?Sized> {
    oracle: &'a O,
    config: DesignerConfig,
}

impl<'a, O: FoldingOracle + ?Sized> HelixDesigner<'a, O> {
    pub fn new(oracle: &'a O, config: DesignerConfig) -> Self {
        HelixDesigner { oracle, config }
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    ///
    /// Positions never changed: the caller's, the flanks of every non-helix
    /// motif and every occurrence of the configured `exclude_sequences`.
    ///
    pub fn exclusion_set(&self, ss: &SecStruct, exclude: &[usize]) -> Result<Vec<usize>> {
        check_positions(exclude, ss.len())?;
        let mut positions = exclude.to_vec();
        positions.extend(ss.flanking_positions());
        for needle in &self.config.exclude_sequences {
            positions.extend(find_subsequence_positions(ss.as_sequence_structure(), needle));
        }
        positions.sort_unstable();
        positions.dedup();
        Ok(positions)
    }

    /// Run with the configured seed, or entropy when none is set.
    pub fn design(&self, ss: &SecStruct, exclude: &[usize]) -> Result<DesignResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.design_with_rng(ss, exclude, &mut rng)
    }

    pub fn design_with_rng<R: Rng + ?Sized>(
        &self,
        ss: &SecStruct,
        exclude: &[usize],
        rng: &mut R,
    ) -> Result<DesignResult> {
        let excluded = self.exclusion_set(ss, exclude)?;
        let target = ss.structure();
        let helix_ids: Vec<usize> = ss.helices().map(|h| h.id).collect();

        if helix_ids.is_empty() {
            debug!("no helices to design in {}", ss);
            return Ok(DesignResult {
                score: 0.0,
                sequence: ss.sequence().to_string(),
                structure: target.to_string(),
                rounds: 1,
                successes: 1,
                oracle_calls: 0,
                warnings: Vec::new(),
            });
        }

        let whole = ConstraintSet::new()
            .with(SequenceConstraint::max_run_length_no_worse(
                self.config.max_run_length,
                ss.sequence(),
            ))
            .with(StructureConstraint::max_paired_gc_run_no_worse_of(
                self.config.max_gc_stretch,
                ss,
            ));

        let mut result = DesignResult::no_solution(target);
        while result.successes < self.config.num_successes
            && result.rounds < self.config.max_rounds
        {
            result.rounds += 1;
            let round = result.rounds;

            let mut candidate = ss.clone();
            for &helix_id in &helix_ids {
                let (sequence, capped) = self.draw_helix(&candidate, helix_id, &excluded, rng)?;
                if capped {
                    debug!("helix {}: retry cap reached in round {}", helix_id, round);
                    result
                        .warnings
                        .push(DesignWarning::HelixRetryCapReached { helix_id, round });
                }
                let structure = candidate.helix(helix_id)?.structure.clone();
                candidate = candidate.replace_motif(helix_id, &sequence, &structure)?;
            }

            if let Some(failed) = whole.first_failure(&candidate) {
                debug!("round {}: {} rejected ({})", round, candidate.sequence(), failed);
                continue;
            }

            result.oracle_calls += 1;
            let folded = self.oracle.predict(candidate.sequence())?;
            if folded.dot_bracket != target {
                debug!(
                    "round {}: {} folds into {}",
                    round,
                    candidate.sequence(),
                    folded.dot_bracket
                );
                continue;
            }

            result.successes += 1;
            if folded.ensemble_defect < result.score {
                debug!(
                    "round {}: new best {} ({:.4})",
                    round,
                    candidate.sequence(),
                    folded.ensemble_defect
                );
                result.score = folded.ensemble_defect;
                result.sequence = candidate.sequence().to_string();
            }
        }

        if result.successes < self.config.num_successes {
            warn!(
                "{}: only {} of {} successes after {} rounds",
                ss,
                result.successes,
                self.config.num_successes,
                result.rounds
            );
            result.warnings.push(DesignWarning::RoundCapReached {
                rounds: result.rounds,
            });
        }
        Ok(result)
    }

    ///
    /// Draw new pairs for one helix, keeping pairs that touch an excluded
    /// position. Returns the helix sequence (`s1&s2`) and whether the retry
    /// cap was hit.
    ///
    fn draw_helix<R: Rng + ?Sized>(
        &self,
        ss: &SecStruct,
        helix_id: usize,
        excluded: &[usize],
        rng: &mut R,
    ) -> Result<(String, bool)> {
        let helix = ss.helix(helix_id)?;
        let bases = ss.sequence().as_bytes();
        let pairs = helix.pairs();
        let run_limit = SequenceConstraint::max_run_length(self.config.max_run_length);
        let gc_limit = StructureConstraint::max_paired_gc_run(self.config.max_gc_stretch);

        let mut last = helix.sequence.clone();
        for _ in 0..self.config.helix_attempts.max(1) {
            let drawn: Vec<(char, char)> = pairs
                .iter()
                .map(|&(i, j)| {
                    if excluded.contains(&i) || excluded.contains(&j) {
                        (bases[i] as char, bases[j] as char)
                    } else {
                        let bp = BasePair::random_weighted(rng, self.config.gu_fraction);
                        (bp.five_prime(), bp.three_prime())
                    }
                })
                .collect();
            let strand1: String = drawn.iter().map(|p| p.0).collect();
            let strand2: String = drawn.iter().rev().map(|p| p.1).collect();

            let stretches = compute_stretches(&strand1, &strand2);
            let passes = run_limit.satisfies(&strand1)
                && run_limit.satisfies(&strand2)
                && gc_limit.accepts_stretch(stretches.max_gc_stretch);
            last = format!("{}&{}", strand1, strand2);
            if passes {
                return Ok((last, false));
            }
        }
        Ok((last, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::FoldResult;
    use crate::errors::{HelixDesignError, OracleError};
    use pretty_assertions::assert_eq;
    use rstest::*;

    /// Folds everything into `structure`; the defect is the fraction of U.
    struct StubOracle {
        structure: Option<String>,
    }

    impl StubOracle {
        fn folding_into(structure: &str) -> Self {
            StubOracle {
                structure: Some(structure.to_string()),
            }
        }

        fn unfolded() -> Self {
            StubOracle { structure: None }
        }

        fn result(&self, sequence: &str) -> FoldResult {
            let dot_bracket = match &self.structure {
                Some(s) => s.clone(),
                None => ".".repeat(sequence.len()),
            };
            let us = sequence.chars().filter(|&c| c == 'U').count();
            FoldResult {
                dot_bracket,
                mfe: -1.0,
                ensemble_defect: us as f64 / sequence.len() as f64,
            }
        }
    }

    impl FoldingOracle for StubOracle {
        fn fold(&self, sequence: &str) -> std::result::Result<FoldResult, OracleError> {
            Ok(self.result(sequence))
        }

        fn cofold(&self, sequence: &str) -> std::result::Result<FoldResult, OracleError> {
            Ok(self.result(sequence))
        }
    }

    struct FailingOracle;

    impl FoldingOracle for FailingOracle {
        fn fold(&self, _sequence: &str) -> std::result::Result<FoldResult, OracleError> {
            Err(OracleError::EmptySequence)
        }

        fn cofold(&self, _sequence: &str) -> std::result::Result<FoldResult, OracleError> {
            Err(OracleError::EmptySequence)
        }
    }

    fn config(max_rounds: usize, num_successes: usize) -> DesignerConfig {
        DesignerConfig {
            max_rounds,
            num_successes,
            seed: Some(7),
            ..DesignerConfig::default()
        }
    }

    #[fixture]
    fn hairpin() -> SecStruct {
        SecStruct::new("AAGGGGAAAACCCC", "..((((....))))").unwrap()
    }

    #[rstest]
    fn test_design_hairpin(hairpin: SecStruct) {
        let oracle = StubOracle::folding_into(hairpin.structure());
        let designer = HelixDesigner::new(&oracle, config(1000, 10));
        let result = designer.design(&hairpin, &[]).unwrap();

        assert!(result.is_solution());
        assert!(result.score < 1.0);
        assert_eq!(result.successes, 10);
        assert!(result.oracle_calls >= 10);
        assert!(!result
            .warnings
            .iter()
            .any(|w| matches!(w, DesignWarning::RoundCapReached { .. })));

        // the loop and its closing pair are flanks of the hairpin and stay put
        assert_eq!(result.sequence.len(), hairpin.len());
        assert_eq!(&result.sequence[5..11], "GAAAAC");
        assert_eq!(&result.sequence[..2], "AA");

        let designed = SecStruct::new(&result.sequence, hairpin.structure()).unwrap();
        assert_eq!(designed.structure(), hairpin.structure());
    }

    #[rstest]
    fn test_seeded_runs_repeat(hairpin: SecStruct) {
        let oracle = StubOracle::folding_into(hairpin.structure());
        let designer = HelixDesigner::new(&oracle, config(100, 3));
        let first = designer.design(&hairpin, &[]).unwrap();
        let second = designer.design(&hairpin, &[]).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_no_solution_is_reported(hairpin: SecStruct) {
        let oracle = StubOracle::unfolded();
        let designer = HelixDesigner::new(&oracle, config(25, 10));
        let result = designer.design(&hairpin, &[]).unwrap();

        assert!(!result.is_solution());
        assert_eq!(result.score, f64::INFINITY);
        assert_eq!(result.sequence, "");
        assert_eq!(result.rounds, 25);
        assert_eq!(result.successes, 0);
        assert!(result
            .warnings
            .contains(&DesignWarning::RoundCapReached { rounds: 25 }));
    }

    #[rstest]
    fn test_zero_helices() {
        let ss = SecStruct::new("AAAUUU", "......").unwrap();
        let oracle = FailingOracle;
        let designer = HelixDesigner::new(&oracle, config(1000, 10));
        let result = designer.design(&ss, &[]).unwrap();
        assert!(result.is_solution());
        assert_eq!(result.sequence, "AAAUUU");
        assert_eq!(result.rounds, 1);
        assert_eq!(result.oracle_calls, 0);
    }

    #[rstest]
    fn test_oracle_errors_propagate(hairpin: SecStruct) {
        let oracle = FailingOracle;
        let designer = HelixDesigner::new(&oracle, config(10, 1));
        assert!(matches!(
            designer.design(&hairpin, &[]),
            Err(HelixDesignError::Oracle(OracleError::EmptySequence))
        ));
    }

    #[rstest]
    fn test_exclusion_set(hairpin: SecStruct) {
        let oracle = StubOracle::unfolded();
        let designer = HelixDesigner::new(
            &oracle,
            DesignerConfig {
                exclude_sequences: vec!["GGA".to_string()],
                ..DesignerConfig::default()
            },
        );
        let excluded = designer.exclusion_set(&hairpin, &[2]).unwrap();
        assert_eq!(excluded, vec![0, 1, 2, 4, 5, 6, 10]);
        assert!(designer.exclusion_set(&hairpin, &[14]).is_err());
    }

    #[rstest]
    fn test_excluded_pairs_keep_identity(hairpin: SecStruct) {
        let oracle = StubOracle::folding_into(hairpin.structure());
        let designer = HelixDesigner::new(&oracle, config(200, 5));
        // 2 and 13 form the outermost pair
        let result = designer.design(&hairpin, &[2]).unwrap();
        assert!(result.is_solution());
        assert_eq!(&result.sequence[2..3], "G");
        assert_eq!(&result.sequence[13..14], "C");
    }

    #[rstest]
    fn test_retry_cap_is_reported(hairpin: SecStruct) {
        let oracle = StubOracle::folding_into(hairpin.structure());
        let designer = HelixDesigner::new(
            &oracle,
            DesignerConfig {
                max_rounds: 3,
                num_successes: 1,
                helix_attempts: 5,
                max_run_length: 0,
                seed: Some(1),
                ..DesignerConfig::default()
            },
        );
        let result = designer.design(&hairpin, &[]).unwrap();
        assert!(result
            .warnings
            .contains(&DesignWarning::HelixRetryCapReached {
                helix_id: 1,
                round: 1
            }));
    }

    #[rstest]
    fn test_cofold_target() {
        let ss = SecStruct::new("GGGAC&GUCCC", "((((.&.))))").unwrap();
        let oracle = StubOracle::folding_into(ss.structure());
        let designer = HelixDesigner::new(&oracle, config(500, 3));
        let result = designer.design(&ss, &[]).unwrap();
        assert!(result.is_solution());
        assert_eq!(result.sequence.chars().nth(5), Some('&'));
    }
}
