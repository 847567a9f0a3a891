use clap::Parser;

/// This is a planning and counterbalancing program for usability studies.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the study: procedure plan,
    /// independent and dependent variables. For the file format, read the
    /// documentation of the counterbalance crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing an assignment summary in JSON format. If provided, studyrun will
    /// check that the computed assignments match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the assignment summary will be written in JSON format to the
    /// given location instead of the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (number or empty) How many participants to compute assignments for. Defaults to the number of
    /// participants the study design needs for one full counterbalancing block.
    #[clap(short, long, value_parser)]
    pub participants: Option<u32>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
