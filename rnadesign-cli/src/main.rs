mod bp_mutate;
mod helix_rand;
mod helix_scan;
mod io;
mod mut_scan;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "rnadesign";
    pub const BIN_NAME: &str = "rnadesign";
    pub const DEFAULT_LOG_FILTER: &str = "info";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Enumerate, mutate and redesign RNA sequences against a target secondary structure.")
        .subcommand_required(true)
        .subcommand(mut_scan::cli::create_mut_scan_cli())
        .subcommand(helix_rand::cli::create_helix_rand_cli())
        .subcommand(helix_scan::cli::create_helix_scan_cli())
        .subcommand(bp_mutate::cli::create_bp_mutate_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(consts::DEFAULT_LOG_FILTER),
    )
    .init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // POINT MUTATIONS
        //
        Some((mut_scan::cli::MUT_SCAN_CMD, matches)) => {
            mut_scan::handlers::run_mut_scan(matches)?;
        }

        //
        // HELIX REDESIGN
        //
        Some((helix_rand::cli::HELIX_RAND_CMD, matches)) => {
            helix_rand::handlers::run_helix_rand(matches)?;
        }

        //
        // HELIX LENGTHS
        //
        Some((helix_scan::cli::HELIX_SCAN_CMD, matches)) => {
            helix_scan::handlers::run_helix_scan(matches)?;
        }

        //
        // BASE PAIR SWAPS
        //
        Some((bp_mutate::cli::BP_MUTATE_CMD, matches)) => {
            bp_mutate::handlers::run_bp_mutate(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
