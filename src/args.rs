use clap::Parser;

/// Builds the county-level results document of a state, from election extracts and
/// the boundaries of its localities.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. Relative paths in this file are
    /// resolved against the directory of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory) The directory holding the extracts, one CSV or Excel file per election.
    /// Setting this option overrides the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path) The GeoJSON export of the locality boundaries.
    #[clap(short, long, value_parser)]
    pub boundary: Option<String>,

    /// (file path, 'stdout' or empty) Where the results document is written. Setting this
    /// option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference results document. If provided, the built document is compared
    /// with it and the differences are printed.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (YYYY-MM-DD, default today) The processing date written in the document. Pinning it
    /// makes successive runs over the same extracts produce identical files.
    #[clap(long, value_parser)]
    pub processed_date: Option<String>,

    /// If passed as an argument, prints a summary of the trends between the last two years.
    #[clap(long, takes_value = false)]
    pub insights: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

/// Checks that the competitiveness ratings of a results document match its vote counts.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct ValidateArgs {
    /// Rewrites the mismatched competitiveness blocks in place.
    #[clap(long, takes_value = false)]
    pub fix: bool,

    /// (file path) The results document to check.
    #[clap(long, value_parser, default_value = "Data/va_county_aggregated_results.json")]
    pub file: String,

    /// The maximum number of mismatches to print.
    #[clap(long, value_parser, default_value_t = 25)]
    pub max_print: usize,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
