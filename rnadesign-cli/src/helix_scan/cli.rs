use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const HELIX_SCAN_CMD: &str = "helix-scan";

pub fn create_helix_scan_cli() -> Command {
    Command::new(HELIX_SCAN_CMD)
        .about("Grow or shrink helices over a range of lengths.")
        .arg(
            Arg::new("input")
                .required(true)
                .help("CSV file with name,sequence,structure columns"),
        )
        .arg(
            arg!(-r --range <RANGE>)
                .required(true)
                .action(ArgAction::Append)
                .help("Helix motif id and inclusive length range as ID:MIN-MAX, repeatable"),
        )
        .arg(
            arg!(--seed <SEED>)
                .value_parser(value_parser!(u64))
                .help("Random seed for the pairs added when growing"),
        )
        .arg(arg!(-o --output <OUTPUT>).help("Output CSV path (default: stdout)"))
}
