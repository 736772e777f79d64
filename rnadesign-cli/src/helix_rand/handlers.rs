use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use rnadesign_core::Selection;
use rnadesign_helix::{DesignerConfig, FoldingOracle, HelixDesigner, ViennaOracle};

use crate::io::{
    NamedStructure, excluded_positions, progress_bar, read_selection, read_structures, write_rows,
};

/// One design per input row. `score` is empty when nothing folded correctly.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DesignRow {
    pub name: String,
    pub original_sequence: String,
    pub sequence: String,
    pub structure: String,
    pub score: Option<f64>,
    pub solved: bool,
    pub rounds: usize,
    pub successes: usize,
    pub oracle_calls: usize,
}

pub fn run_helix_rand(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to an input CSV file is required.")?;
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => DesignerConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to read config file: {}", path))?,
        None => DesignerConfig::default(),
    };
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    let selection = read_selection(matches.get_one::<String>("exclude"))?;

    let structures = read_structures(Path::new(input))?;
    let oracle = ViennaOracle::from_env();
    let designer = HelixDesigner::new(&oracle, config);
    let rows = design_rows(&designer, &structures, selection.as_ref())?;

    let unsolved = rows.iter().filter(|r| !r.solved).count();
    if unsolved > 0 {
        warn!("{} of {} sequences have no solution", unsolved, rows.len());
    }
    info!("designed {} sequences", rows.len() - unsolved);
    write_rows(matches.get_one::<String>("output"), &rows)
}

///
/// Design every row in parallel. Rows get consecutive seeds starting at the
/// configured one, so a seeded run is reproducible regardless of scheduling.
///
pub fn design_rows<O: FoldingOracle + ?Sized>(
    designer: &HelixDesigner<'_, O>,
    structures: &[NamedStructure],
    selection: Option<&Selection>,
) -> Result<Vec<DesignRow>> {
    let seed = designer.config().seed;
    let pb = progress_bar(structures.len(), "Designing helices")?;

    let rows = structures
        .par_iter()
        .enumerate()
        .map(|(i, row)| -> Result<DesignRow> {
            let exclude = excluded_positions(selection, &row.ss)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                None => StdRng::from_os_rng(),
            };
            let result = designer
                .design_with_rng(&row.ss, &exclude, &mut rng)
                .with_context(|| format!("Design failed for {}", row.name))?;
            pb.inc(1);

            let solved = result.is_solution();
            Ok(DesignRow {
                name: row.name.clone(),
                original_sequence: row.ss.sequence().to_string(),
                sequence: result.sequence,
                structure: result.structure,
                score: solved.then_some(result.score),
                solved,
                rounds: result.rounds,
                successes: result.successes,
                oracle_calls: result.oracle_calls,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_and_clear();
    Ok(rows)
}
