use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;
use rayon::prelude::*;

use rnadesign_mutate::{MutateConfig, MutationEnumerator};

use crate::io::{
    VariantRow, excluded_positions, progress_bar, read_selection, read_structures, write_rows,
};

pub fn run_mut_scan(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to an input CSV file is required.")?;
    let num_mutations = *matches.get_one::<usize>("mutations").unwrap_or(&1);
    let selection = read_selection(matches.get_one::<String>("exclude"))?;
    let config = match matches.get_one::<String>("config") {
        Some(path) => MutateConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to read config file: {}", path))?,
        None => MutateConfig::default(),
    };
    let enumerator = MutationEnumerator::from(&config);

    let structures = read_structures(Path::new(input))?;
    let pb = progress_bar(structures.len(), "Enumerating mutants")?;

    let per_row = structures
        .par_iter()
        .map(|row| -> Result<Vec<VariantRow>> {
            let exclude = excluded_positions(selection.as_ref(), &row.ss)?;
            let mutants = enumerator
                .enumerate(row.ss.sequence(), num_mutations, &exclude)
                .with_context(|| format!("Failed to enumerate mutants of {}", row.name))?;
            pb.inc(1);
            Ok(mutants
                .into_iter()
                .map(|m| VariantRow {
                    name: format!("{}_{}", row.name, m.name),
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
    info!("{} mutants from {} sequences", rows.len(), structures.len());
    write_rows(matches.get_one::<String>("output"), &rows)
}
