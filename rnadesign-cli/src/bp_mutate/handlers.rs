use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use rnadesign_core::models::Mutation;
use rnadesign_mutate::{BasepairMutator, MutateConfig};

use crate::io::{
    VariantRow, excluded_positions, progress_bar, read_selection, read_structures, write_rows,
};

pub fn run_bp_mutate(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to an input CSV file is required.")?;
    let num_pairs = *matches.get_one::<usize>("pairs").unwrap_or(&1);
    let sample = matches.get_one::<usize>("sample").copied();
    let seed = matches.get_one::<u64>("seed").copied();
    let selection = read_selection(matches.get_one::<String>("exclude"))?;
    let config = match matches.get_one::<String>("config") {
        Some(path) => MutateConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to read config file: {}", path))?,
        None => MutateConfig::default(),
    };
    let mutator = BasepairMutator::from(&config);

    let structures = read_structures(Path::new(input))?;
    let pb = progress_bar(structures.len(), "Mutating base pairs")?;

    let per_row = structures
        .par_iter()
        .enumerate()
        .map(|(i, row)| -> Result<Vec<VariantRow>> {
            let exclude = excluded_positions(selection.as_ref(), &row.ss)?;
            let mutants: Vec<Mutation> = match sample {
                Some(count) => {
                    let mut rng = match seed {
                        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                        None => StdRng::from_os_rng(),
                    };
                    (0..count)
                        .map(|_| mutator.sample(&row.ss, num_pairs, &exclude, &mut rng))
                        .collect::<rnadesign_core::Result<Vec<Mutation>>>()
                }
                None => mutator.enumerate(&row.ss, num_pairs, &exclude),
            }
            .with_context(|| format!("Failed to mutate base pairs of {}", row.name))?;
            pb.inc(1);

            Ok(mutants
                .into_iter()
                .enumerate()
                .map(|(k, m)| VariantRow {
                    name: match sample {
                        Some(_) => format!("{}_{}_{}", row.name, k, m.name),
                        None => format!("{}_{}", row.name, m.name),
                    },
                    parent: row.name.clone(),
                    mutation: m.name,
                    sequence: m.sequence,
                    structure: row.ss.structure().to_string(),
                })
                .collect())
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let rows: Vec<VariantRow> = per_row.into_iter().flatten().collect();
    info!("{} base pair mutants from {} sequences", rows.len(), structures.len());
    write_rows(matches.get_one::<String>("output"), &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp_mutate::cli::create_bp_mutate_cli;
    use crate::io::tests::{read_variants, test_data};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn run(extra: &[&str]) -> Result<Vec<VariantRow>> {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("bp.csv");
        let input = test_data("sequences.csv");
        let mut args = vec!["bp-mutate", input.to_str().unwrap()];
        args.extend_from_slice(extra);
        args.extend_from_slice(&["--output", output.to_str().unwrap()]);
        let matches = create_bp_mutate_cli().try_get_matches_from(args).unwrap();
        run_bp_mutate(&matches)?;
        Ok(read_variants(&output))
    }

    #[rstest]
    fn test_enumerate_single_pairs() {
        let rows = run(&[]).unwrap();
        // four pairs per row, five alternatives each
        assert_eq!(rows.len(), 40);
        assert!(rows.iter().all(|r| r.mutation.starts_with("GC")));
        assert_eq!(rows[0].name, "hairpin_GC1-12AU");
        assert_eq!(rows[0].sequence, "AGGGAAAACCCU");
    }

    #[rstest]
    fn test_watson_crick_only() {
        let config = test_data("mutate.yaml");
        let rows = run(&["--config", config.to_str().unwrap()]).unwrap();
        assert_eq!(rows.len(), 24);
    }

    #[rstest]
    fn test_sampling_is_seeded() {
        let first = run(&["-n", "2", "--sample", "3", "--seed", "9"]).unwrap();
        let second = run(&["-n", "2", "--sample", "3", "--seed", "9"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert!(first.iter().all(|r| r.mutation.split('_').count() == 2));
    }

    #[rstest]
    fn test_sampling_too_many_pairs() {
        assert!(run(&["-n", "5", "--sample", "1"]).is_err());
    }
}
