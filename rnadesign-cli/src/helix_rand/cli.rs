use clap::{Arg, Command, arg, value_parser};

pub const HELIX_RAND_CMD: &str = "helix-rand";

pub fn create_helix_rand_cli() -> Command {
    Command::new(HELIX_RAND_CMD)
        .about("Randomize every helix and keep the design that folds best into the target structure.")
        .arg(
            Arg::new("input")
                .required(true)
                .help("CSV file with name,sequence,structure columns"),
        )
        .arg(arg!(-c --config <TOML>).help("Designer settings"))
        .arg(arg!(-e --exclude <YAML>).help("Selection of positions that keep their identity"))
        .arg(
            arg!(--seed <SEED>)
                .value_parser(value_parser!(u64))
                .help("Random seed, overrides the config file"),
        )
        .arg(arg!(-o --output <OUTPUT>).help("Output CSV path (default: stdout)"))
}
