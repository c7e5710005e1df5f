use clap::Parser;

/// Draws the party vote shares of the 2017 German federal election per state.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the run: the results sheet, the state boundaries
    /// and optionally the layout of the sheet, the party styles and the theme.
    /// Relative paths inside the file are resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (directory) Where the maps are written. Overrides the outputDirectory of the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or 'stdout') If specified, the tidy table with one row per state will be written
    /// in JSON format to the given location. Overrides the summaryPath of the configuration.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference tidy table in JSON format. If provided, the run stops with an
    /// error when the computed table differs from it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, the plain maps (white background, no caption) are also written.
    #[clap(long, takes_value = false)]
    pub basic: bool,

    /// (party name, repeatable) Only draw the maps of these parties (CDU_CSU, SPD, LINKE, GRUENE, FDP, AFD).
    #[clap(short, long, value_parser)]
    pub party: Vec<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
