use itertools::Itertools;
use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand::seq::index::sample;

use rnadesign_core::errors::{DesignError, Result};
use rnadesign_core::models::{BasePair, Mutation, SecStruct, SequenceStructure};
use rnadesign_core::utils::{check_positions, mixed_combination_count};

use crate::config::MutateConfig;
use crate::consts::DEFAULT_MAX_COMBINATIONS;

///
/// One base pair of a structure, addressed by its 5' and 3' positions.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSite {
    pub five_prime: usize,
    pub three_prime: usize,
    pub bases: (char, char),
}

impl PairSite {
    ///
    /// Resolve the 5' position of a pair to its site. Unpaired, out of range
    /// and 3' positions are rejected.
    ///
    pub fn locate(ss: &SecStruct, position: usize) -> Result<Self> {
        check_positions(&[position], ss.len())?;
        let partner = ss.paired_partner(position).ok_or_else(|| {
            DesignError::InvalidPosition(format!("position {} is not paired", position))
        })?;
        if partner < position {
            return Err(DesignError::InvalidPosition(format!(
                "position {} is the 3' side of a pair; address it by {}",
                position, partner
            )));
        }
        let (five_prime, three_prime) = (position, partner);
        let seq = ss.sequence().as_bytes();
        Ok(PairSite {
            five_prime,
            three_prime,
            bases: (seq[five_prime] as char, seq[three_prime] as char),
        })
    }

    pub fn is(&self, pair: BasePair) -> bool {
        (pair.five_prime(), pair.three_prime()) == self.bases
    }

    /// `GC1-12AU`: old pair, 1-based positions, new pair.
    pub fn name(&self, new_pair: BasePair) -> String {
        format!(
            "{}{}{}-{}{}",
            self.bases.0,
            self.bases.1,
            self.five_prime + 1,
            self.three_prime + 1,
            new_pair
        )
    }

    fn apply(&self, sequence: &mut [u8], new_pair: BasePair) {
        sequence[self.five_prime] = new_pair.five_prime() as u8;
        sequence[self.three_prime] = new_pair.three_prime() as u8;
    }
}

///
/// Swaps the identity of base pairs while keeping the structure fixed.
///
#[derive(Debug, Clone, Copy)]
pub struct BasepairMutator {
    pub include_gu: bool,
    pub require_flanking_pairs: bool,
    pub max_combinations: u64,
}

impl Default for BasepairMutator {
    fn default() -> Self {
        BasepairMutator {
            include_gu: true,
            require_flanking_pairs: false,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

impl From<&MutateConfig> for BasepairMutator {
    fn from(config: &MutateConfig) -> Self {
        BasepairMutator {
            include_gu: config.include_gu,
            require_flanking_pairs: config.require_flanking_pairs,
            max_combinations: config.max_combinations,
        }
    }
}

impl BasepairMutator {
    /// Replacement pairs for a site, never including its current pair.
    pub fn alternatives(&self, site: &PairSite) -> Vec<BasePair> {
        BasePair::choices(self.include_gu)
            .iter()
            .copied()
            .filter(|bp| !site.is(*bp))
            .collect()
    }

    ///
    /// Replace the pair at `position` with `new_pair`, or with a random pair
    /// other than the current one when `new_pair` is `None`.
    ///
    pub fn mutate_basepair<R: Rng + ?Sized>(
        &self,
        ss: &SecStruct,
        position: usize,
        new_pair: Option<BasePair>,
        rng: &mut R,
    ) -> Result<SequenceStructure> {
        let site = PairSite::locate(ss, position)?;
        let pair = match new_pair {
            Some(pair) => pair,
            None => *self.alternatives(&site).choose(rng).ok_or_else(|| {
                DesignError::InvalidArgument("no replacement pair available".to_string())
            })?,
        };

        let mut sequence = ss.sequence().as_bytes().to_vec();
        site.apply(&mut sequence, pair);
        SequenceStructure::new(String::from_utf8_lossy(&sequence), ss.structure())
    }

    ///
    /// 5' positions of pairs eligible for batch mutation: neither side is
    /// excluded and, when `require_flanking_pairs` is set, both neighbours of
    /// the 5' position are paired.
    ///
    pub fn eligible_positions(&self, ss: &SecStruct, exclude: &[usize]) -> Result<Vec<usize>> {
        check_positions(exclude, ss.len())?;
        Ok((0..ss.len())
            .filter(|&i| match ss.paired_partner(i) {
                Some(j) if j > i => !exclude.contains(&i) && !exclude.contains(&j),
                _ => false,
            })
            .filter(|&i| {
                !self.require_flanking_pairs
                    || (i > 0 && ss.is_paired(i - 1) && ss.is_paired(i + 1))
            })
            .collect())
    }

    ///
    /// Every way to change exactly `num_pairs` eligible pairs. Position sets
    /// are combinations in ascending order; each is expanded over the
    /// replacement pairs of its sites.
    ///
    pub fn enumerate(
        &self,
        ss: &SecStruct,
        num_pairs: usize,
        exclude: &[usize],
    ) -> Result<Vec<Mutation>> {
        let eligible = self.eligible_positions(ss, exclude)?;
        if num_pairs == 0 || eligible.len() < num_pairs {
            return Ok(Vec::new());
        }

        // a site keeps all choices when its current pair is not one of them
        let mut sites = Vec::with_capacity(eligible.len());
        for &p in &eligible {
            let site = PairSite::locate(ss, p)?;
            sites.push((site, self.alternatives(&site)));
        }
        let per_site: Vec<usize> = sites.iter().map(|(_, alts)| alts.len()).collect();
        let total = mixed_combination_count(&per_site, num_pairs);
        if total > self.max_combinations as u128 {
            return Err(DesignError::TooManyCombinations {
                count: total,
                limit: self.max_combinations as u128,
            });
        }
        debug!(
            "enumerating {} base pair mutants over {} pairs",
            total,
            eligible.len()
        );

        let original = ss.sequence().as_bytes();
        let mut results = Vec::new();
        for chosen in sites.iter().combinations(num_pairs) {
            let per_site = chosen
                .iter()
                .map(|(site, alts)| alts.iter().map(move |&bp| (*site, bp)));
            for changes in per_site.multi_cartesian_product() {
                results.push(build_mutation(original, &changes));
            }
        }
        Ok(results)
    }

    ///
    /// Pick `num_pairs` distinct eligible pairs at random and give each a
    /// random new identity.
    ///
    pub fn sample<R: Rng + ?Sized>(
        &self,
        ss: &SecStruct,
        num_pairs: usize,
        exclude: &[usize],
        rng: &mut R,
    ) -> Result<Mutation> {
        let eligible = self.eligible_positions(ss, exclude)?;
        if eligible.len() < num_pairs {
            return Err(DesignError::InsufficientPositions {
                requested: num_pairs,
                available: eligible.len(),
            });
        }

        let mut picked: Vec<usize> = sample(rng, eligible.len(), num_pairs)
            .into_iter()
            .map(|i| eligible[i])
            .collect();
        picked.sort_unstable();

        let mut changes = Vec::with_capacity(picked.len());
        for p in picked {
            let site = PairSite::locate(ss, p)?;
            let pair = *self.alternatives(&site).choose(rng).ok_or_else(|| {
                DesignError::InvalidArgument("no replacement pair available".to_string())
            })?;
            changes.push((site, pair));
        }
        Ok(build_mutation(ss.sequence().as_bytes(), &changes))
    }
}

fn build_mutation(original: &[u8], changes: &[(PairSite, BasePair)]) -> Mutation {
    let mut sequence = original.to_vec();
    let mut names = Vec::with_capacity(changes.len());
    for (site, pair) in changes {
        site.apply(&mut sequence, *pair);
        names.push(site.name(*pair));
    }
    Mutation::new(names.join("_"), String::from_utf8_lossy(&sequence).into_owned())
}
