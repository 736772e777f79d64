use clap::{Arg, Command, arg, value_parser};

pub const BP_MUTATE_CMD: &str = "bp-mutate";

pub fn create_bp_mutate_cli() -> Command {
    Command::new(BP_MUTATE_CMD)
        .about("Swap the identity of base pairs, exhaustively or by random sampling.")
        .arg(
            Arg::new("input")
                .required(true)
                .help("CSV file with name,sequence,structure columns"),
        )
        .arg(
            arg!(-n --pairs <N>)
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Number of base pairs changed per mutant"),
        )
        .arg(
            arg!(-s --sample <COUNT>)
                .value_parser(value_parser!(usize))
                .help("Draw COUNT random mutants instead of enumerating all of them"),
        )
        .arg(
            arg!(--seed <SEED>)
                .value_parser(value_parser!(u64))
                .help("Random seed for sampling"),
        )
        .arg(arg!(-e --exclude <YAML>).help("Selection of positions that are never mutated"))
        .arg(arg!(-c --config <YAML>).help("Mutation settings (include_gu, require_flanking_pairs, max_combinations)"))
        .arg(arg!(-o --output <OUTPUT>).help("Output CSV path (default: stdout)"))
}
