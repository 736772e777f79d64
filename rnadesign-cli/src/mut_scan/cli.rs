use clap::{Arg, Command, arg, value_parser};

pub const MUT_SCAN_CMD: &str = "mut-scan";

pub fn create_mut_scan_cli() -> Command {
    Command::new(MUT_SCAN_CMD)
        .about("Enumerate every sequence reachable by a fixed number of point substitutions.")
        .arg(
            Arg::new("input")
                .required(true)
                .help("CSV file with name,sequence,structure columns"),
        )
        .arg(
            arg!(-n --mutations <N>)
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Number of substitutions per mutant"),
        )
        .arg(arg!(-e --exclude <YAML>).help("Selection of positions that are never mutated"))
        .arg(arg!(-c --config <YAML>).help("Enumeration settings (max_combinations)"))
        .arg(arg!(-o --output <OUTPUT>).help("Output CSV path (default: stdout)"))
}
