use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use rnadesign_mutate::scan_all_helix_lengths;

use crate::io::{VariantRow, progress_bar, read_structures, write_rows};

/// Parse `ID:MIN-MAX`, e.g. `2:3-6`.
pub fn parse_helix_range(range: &str) -> Result<(usize, (usize, usize))> {
    let Some((id, lengths)) = range.split_once(':') else {
        bail!("Helix range must look like ID:MIN-MAX, got '{}'", range);
    };
    let (min, max) = match lengths.split_once('-') {
        Some((min, max)) => (min, max),
        None => (lengths, lengths),
    };
    let id: usize = id
        .trim()
        .parse()
        .with_context(|| format!("Invalid helix id in '{}'", range))?;
    let min: usize = min
        .trim()
        .parse()
        .with_context(|| format!("Invalid minimum length in '{}'", range))?;
    let max: usize = max
        .trim()
        .parse()
        .with_context(|| format!("Invalid maximum length in '{}'", range))?;
    if min == 0 || min > max {
        bail!("Invalid length range in '{}'", range);
    }
    Ok((id, (min, max)))
}

pub fn run_helix_scan(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to an input CSV file is required.")?;
    let ranges = matches
        .get_many::<String>("range")
        .context("At least one --range is required.")?
        .map(|r| parse_helix_range(r))
        .collect::<Result<BTreeMap<_, _>>>()?;
    let seed = matches.get_one::<u64>("seed").copied();

    let structures = read_structures(Path::new(input))?;
    let pb = progress_bar(structures.len(), "Scanning helix lengths")?;

    let per_row = structures
        .par_iter()
        .enumerate()
        .map(|(i, row)| -> Result<Vec<VariantRow>> {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                None => StdRng::from_os_rng(),
            };
            let variants = scan_all_helix_lengths(&row.ss, &ranges, &mut rng)
                .with_context(|| format!("Failed to scan helix lengths of {}", row.name))?;
            pb.inc(1);

            Ok(variants
                .into_iter()
                .enumerate()
                .map(|(k, variant)| {
                    let lengths: Vec<String> = ranges
                        .keys()
                        .filter_map(|&id| variant.helix(id).ok())
                        .map(|h| format!("h{}={}", h.id, h.num_pairs()))
                        .collect();
                    VariantRow {
                        name: format!("{}_{}", row.name, k),
                        parent: row.name.clone(),
                        mutation: lengths.join("_"),
                        sequence: variant.sequence().to_string(),
                        structure: variant.structure().to_string(),
                    }
                })
                .collect())
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let rows: Vec<VariantRow> = per_row.into_iter().flatten().collect();
    info!("{} helix length variants", rows.len());
    write_rows(matches.get_one::<String>("output"), &rows)
}
