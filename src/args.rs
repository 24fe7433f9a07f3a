use clap::{Parser, Subcommand};

/// This is an analysis program for constituency-level election results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, repeatable) A CSV file with election result rows in the format
    /// country,year,constituency,candidate,party,votes,elected. All the given files are
    /// loaded into the same store before the query runs. Malformed rows are skipped.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (file path, optional) A JSON description of the data set to load. The data files
    /// listed there are resolved relative to the configuration file and loaded in
    /// addition to the files given with --input.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected query output in JSON format.
    /// If provided, elstat will check that the computed output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or empty) If specified, the result of the query will be written in JSON
    /// format to the given location in addition to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Lists the countries present in the loaded data and their election years.
    Countries,
    /// Full statistics for one election: totals, constituencies and party shares.
    Stats { country: String, year: u32 },
    /// Seats per party for one election. Parties without a seat are not listed.
    Seats { country: String, year: u32 },
    /// The candidates of one election with the most votes.
    Top {
        country: String,
        year: u32,
        /// Number of candidates to report.
        #[clap(short, long, value_parser, default_value_t = 10)]
        n: usize,
    },
    /// The elected candidates of one election, best score first.
    Winners { country: String, year: u32 },
    /// Compares two elections of the same country.
    Compare {
        country: String,
        year1: u32,
        year2: u32,
    },
    /// One party's results across several election years.
    Trend {
        country: String,
        party: String,
        /// The years to report on, in the order they should appear.
        #[clap(required = true, value_parser)]
        years: Vec<u32>,
    },
}
