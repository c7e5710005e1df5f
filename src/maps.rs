use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use vote_shares::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::maps::config_reader::*;
use crate::maps::join::{JoinError, JoinOutcome};
use crate::maps::render::PlotVariant;

pub mod config_reader;
mod io_common;
pub mod io_shape;
pub mod io_sheet;
pub mod join;
pub mod render;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MapsError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Spreadsheet {path} has no worksheet {worksheet}"))]
    EmptyExcel { path: String, worksheet: String },
    #[snafu(display("Error opening csv file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of the csv file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display(
        "The sheet {path} has {found} columns, at least {required} are required"
    ))]
    TooFewColumns {
        path: String,
        found: usize,
        required: usize,
    },
    #[snafu(display("Unknown sheet provider {provider} for {path}"))]
    UnknownProvider { provider: String, path: String },
    #[snafu(display("Error opening shapefile {path}"))]
    OpeningShapefile {
        source: shapefile::Error,
        path: String,
    },
    #[snafu(display("Error reading shape {index} of {path}"))]
    ReadingShape {
        source: shapefile::Error,
        path: String,
        index: usize,
    },
    #[snafu(display("Shape {index} is a {shape_type}, only polygons are supported"))]
    UnsupportedShape { index: usize, shape_type: String },
    #[snafu(display("Shape {index} has no usable attribute {field}"))]
    MissingAttribute { index: usize, field: String },

    #[snafu(display("Error opening json file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing json"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Invalid configuration: {message}"))]
    InvalidConfig { message: String },

    #[snafu(display("Error building the tidy table"))]
    Transform { source: TransformError },

    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The tidy summary differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MapsResult<T> = Result<T, MapsError>;
pub type BMapsResult<T> = Result<T, Box<MapsError>>;

/// The broad families of failures of a run.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    Load,
    Config,
    Coercion,
    Derivation,
    Recode,
    Output,
    Other,
}

impl MapsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapsError::OpeningExcel { .. }
            | MapsError::EmptyExcel { .. }
            | MapsError::OpeningCsv { .. }
            | MapsError::CsvLineParse { .. }
            | MapsError::TooFewColumns { .. }
            | MapsError::UnknownProvider { .. }
            | MapsError::OpeningShapefile { .. }
            | MapsError::ReadingShape { .. }
            | MapsError::UnsupportedShape { .. }
            | MapsError::MissingAttribute { .. } => ErrorKind::Load,
            MapsError::OpeningJson { .. }
            | MapsError::ParsingJson { .. }
            | MapsError::MissingParentDir { .. }
            | MapsError::InvalidConfig { .. } => ErrorKind::Config,
            MapsError::Transform { source } => match source {
                TransformError::MissingRow { .. } => ErrorKind::Load,
                TransformError::Coercion { .. } => ErrorKind::Coercion,
                TransformError::Derivation { .. } => ErrorKind::Derivation,
                TransformError::Recode { .. } => ErrorKind::Recode,
                TransformError::InvalidLayout(_) => ErrorKind::Config,
            },
            MapsError::WritingOutput { .. } | MapsError::ReferenceMismatch { .. } => {
                ErrorKind::Output
            }
            MapsError::Whatever { .. } => ErrorKind::Other,
        }
    }
}

impl From<Box<MapsError>> for MapsError {
    fn from(e: Box<MapsError>) -> Self {
        *e
    }
}

/// Options given on the command line. They take precedence over the
/// configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub output_directory: Option<String>,
    pub summary: Option<String>,
    pub reference: Option<String>,
    pub basic: bool,
    pub parties: Vec<String>,
}

/// What a run produced.
#[derive(PartialEq, Debug, Clone)]
pub struct RunReport {
    pub states: Vec<StateResult>,
    pub written: Vec<PathBuf>,
    pub join_errors: Vec<JoinError>,
}

fn format_share(x: f64) -> String {
    format!("{:.2}", x)
}

fn states_to_json(states: &[StateResult]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for s in states.iter() {
        let mut shares: JSMap<String, JSValue> = JSMap::new();
        for (party, share) in s.shares.iter() {
            shares.insert(party.clone(), json!(format_share(*share)));
        }
        l.push(json!({
            "stateId": s.state_id,
            "stateName": s.state_name,
            "cduCsuVotes": s.cdu_csu_votes.to_string(),
            "totalVotes": s.total_votes.to_string(),
            "shares": shares
        }));
    }
    l
}

fn build_summary_js(config: &MapsConfig, states: &[StateResult]) -> JSValue {
    let c = SummaryConfig {
        contest: config.output_settings.contest_name(),
        sheet: io_common::simplify_file_name(&config.sheet_source.file_path),
        geometry: io_common::simplify_file_name(&config.geometry_source.file_path),
    };
    json!({
        "config": c,
        "results": states_to_json(states) })
}

/// Loads the sheet and builds the tidy table.
pub fn load_states(
    root_p: &Path,
    config: &MapsConfig,
    layout: &SheetLayout,
) -> MapsResult<Vec<StateResult>> {
    let sheet_p = io_common::resolve(root_p, &config.sheet_source.file_path);
    let table = io_sheet::read_raw_table(&sheet_p, &config.sheet_source, layout)?;
    info!(
        "Read {} data rows ({} columns) from {:?}",
        table.rows.len(),
        table.width(),
        sheet_p
    );
    tidy_states(&table, layout).context(TransformSnafu {})
}

/// Joins the tidy table to the boundaries and writes one map per party.
pub fn render_states(
    states: &[StateResult],
    geometries: Vec<io_shape::GeometryRecord>,
    config: &MapsConfig,
    out_dir: &Path,
    options: &RunOptions,
) -> MapsResult<(Vec<PathBuf>, Vec<JoinError>)> {
    let JoinOutcome { records, errors } = join::merge(geometries, states);
    for e in errors.iter() {
        warn!("Join error, the state will be drawn without data: {}", e);
    }

    let city_states = config.city_states();
    let paths = join::flatten(&records, &city_states);
    debug!("render_states: {} paths to draw", paths.len());

    let styles = config.party_styles()?;
    let theme = config.theme()?;
    let selected: Vec<&render::PartyStyle> = styles
        .iter()
        .filter(|s| options.parties.is_empty() || options.parties.contains(&s.party))
        .collect();
    if selected.is_empty() {
        whatever!("No party left to render after selecting {:?}", options.parties)
    }

    let mut variants = vec![PlotVariant::Styled];
    if options.basic || config.output_settings.basic_variant.unwrap_or(false) {
        variants.push(PlotVariant::Basic);
    }

    fs::create_dir_all(out_dir).context(WritingOutputSnafu {
        path: out_dir.display().to_string(),
    })?;
    let mut written: Vec<PathBuf> = Vec::new();
    for style in selected {
        for variant in variants.iter() {
            let p = render::write_map(&paths, style, &theme, *variant, out_dir)?;
            info!("Wrote {:?}", p);
            written.push(p);
        }
    }
    Ok((written, errors))
}

fn write_summary(summary_js: &JSValue, target: &str) -> MapsResult<()> {
    let pretty_js = serde_json::to_string_pretty(summary_js).context(ParsingJsonSnafu {})?;
    if target == "stdout" {
        println!("tidy:{}", pretty_js);
    } else {
        fs::write(target, pretty_js).context(WritingOutputSnafu { path: target })?;
        info!("Wrote tidy summary to {}", target);
    }
    Ok(())
}

fn check_reference(summary_js: &JSValue, reference_p: &str) -> MapsResult<()> {
    let summary_ref = read_summary(reference_p)?;
    let pretty_js_stats = serde_json::to_string_pretty(summary_js).context(ParsingJsonSnafu {})?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        return ReferenceMismatchSnafu { path: reference_p }.fail();
    }
    info!("The tidy summary matches the reference {}", reference_p);
    Ok(())
}

pub fn run_pipeline(config_path: &str, options: &RunOptions) -> MapsResult<RunReport> {
    let config_p = Path::new(config_path);
    let config = read_config(config_path)?;
    info!("config: {:?}", config);

    let layout = config.layout()?;
    layout.validate().context(TransformSnafu {})?;

    let root_p = config_p
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;

    let states = load_states(root_p, &config, &layout)?;

    let summary_js = build_summary_js(&config, &states);
    let summary_target = options
        .summary
        .clone()
        .or_else(|| config.output_settings.summary_path.clone());
    if let Some(target) = summary_target {
        let target = if target == "stdout" {
            target
        } else {
            io_common::resolve(root_p, &target)
        };
        write_summary(&summary_js, &target)?;
    }
    if let Some(reference_p) = options.reference.as_ref() {
        check_reference(&summary_js, reference_p)?;
    }

    let shp_p = io_common::resolve(root_p, &config.geometry_source.file_path);
    let geometries = io_shape::read_geometries(&shp_p, &config.geometry_source)?;
    info!("Read {} boundaries from {:?}", geometries.len(), shp_p);

    let out_dir: PathBuf = match options.output_directory.as_ref() {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(io_common::resolve(
            root_p,
            &config.output_settings.output_directory(),
        )),
    };
    let (written, join_errors) = render_states(&states, geometries, &config, &out_dir, options)?;
    if !join_errors.is_empty() {
        warn!(
            "{} boundaries could not be matched to a state and were drawn as 'no data'",
            join_errors.len()
        );
    }

    Ok(RunReport {
        states,
        written,
        join_errors,
    })
}
