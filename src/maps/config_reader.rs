use crate::maps::render::{PartyStyle, Rgb, Theme};
use crate::maps::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
    #[serde(rename = "basicVariant")]
    pub basic_variant: Option<bool>,
}

impl OutputSettings {
    pub fn contest_name(&self) -> String {
        self.contest_name
            .clone()
            .unwrap_or_else(|| "German Federal Election 2017".to_string())
    }

    pub fn output_directory(&self) -> String {
        self.output_directory
            .clone()
            .unwrap_or_else(|| "maps".to_string())
    }
}

/// The configuration block written into the tidy summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub contest: String,
    pub sheet: String,
    pub geometry: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SheetSource {
    /// "excel" or "csv". Guessed from the file extension when missing.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub delimiter: Option<String>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

impl SheetSource {
    pub fn delimiter(&self) -> MapsResult<u8> {
        match self.delimiter.as_deref() {
            None => Ok(b';'),
            Some("\\t") | Some("tab") => Ok(b'\t'),
            Some(s) if s.len() == 1 => Ok(s.as_bytes()[0]),
            Some(s) => InvalidConfigSnafu {
                message: format!("the csv delimiter must be a single character: {:?}", s),
            }
            .fail(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GeometrySource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "nameField")]
    pub name_field: Option<String>,
    /// If missing, the position of the record in the file is the state id.
    #[serde(rename = "idField")]
    pub id_field: Option<String>,
}

impl GeometrySource {
    pub fn name_field(&self) -> String {
        self.name_field.clone().unwrap_or_else(|| "NAME_1".to_string())
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartyColumnSettings {
    pub name: String,
    pub column: JSValue,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CoalitionSettings {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RecodeSettings {
    pub from: String,
    pub to: String,
}

/// Overrides of the built-in sheet layout. Every field is optional.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(rename = "headerRows")]
    pub header_rows: Option<usize>,
    #[serde(rename = "minColumns")]
    pub min_columns: Option<usize>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "nameColumnIndex")]
    pub name_column_index: Option<JSValue>,
    #[serde(rename = "stateRowIndexes")]
    pub state_row_indexes: Option<Vec<usize>>,
    #[serde(rename = "partyColumns")]
    pub party_columns: Option<Vec<PartyColumnSettings>>,
    #[serde(rename = "missingMarkers")]
    pub missing_markers: Option<Vec<String>>,
    pub coalition: Option<CoalitionSettings>,
    #[serde(rename = "trackedParties")]
    pub tracked_parties: Option<Vec<String>>,
    pub recode: Option<Vec<RecodeSettings>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartyStyleSettings {
    pub party: String,
    /// The share to colour by. Defaults to the party.
    pub field: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "lowColor")]
    pub low_color: String,
    #[serde(rename = "midColor")]
    pub mid_color: String,
    #[serde(rename = "highColor")]
    pub high_color: String,
    pub midpoint: f64,
    #[serde(rename = "legendLow")]
    pub legend_low: f64,
    #[serde(rename = "legendHigh")]
    pub legend_high: f64,
    #[serde(rename = "legendBreaks")]
    pub legend_breaks: Vec<f64>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSettings {
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(rename = "backgroundColor")]
    pub background_color: Option<String>,
    #[serde(rename = "borderColor")]
    pub border_color: Option<String>,
    #[serde(rename = "noDataColor")]
    pub no_data_color: Option<String>,
    #[serde(rename = "fontFamily")]
    pub font_family: Option<String>,
    pub caption: Option<String>,
    #[serde(rename = "captionSize")]
    pub caption_size: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "sheetSource")]
    pub sheet_source: SheetSource,
    #[serde(rename = "geometrySource")]
    pub geometry_source: GeometrySource,
    pub layout: Option<LayoutSettings>,
    pub parties: Option<Vec<PartyStyleSettings>>,
    pub theme: Option<ThemeSettings>,
    #[serde(rename = "cityStates")]
    pub city_states: Option<Vec<String>>,
}

fn invalid<T>(message: String) -> MapsResult<T> {
    InvalidConfigSnafu { message }.fail()
}

fn parse_color(s: &str) -> MapsResult<Rgb> {
    match Rgb::from_hex(s) {
        Some(c) => Ok(c),
        None => invalid(format!("not a #rrggbb colour: {:?}", s)),
    }
}

impl MapsConfig {
    /// The built-in layout, with the overrides of the configuration file.
    pub fn layout(&self) -> MapsResult<SheetLayout> {
        let mut layout = SheetLayout::default_2017();
        let ls = match self.layout.as_ref() {
            Some(ls) => ls,
            None => return Ok(layout),
        };
        if let Some(x) = ls.header_rows {
            layout.header_rows = x;
        }
        if let Some(x) = ls.min_columns {
            layout.min_columns = x;
        }
        if ls.id_column_index.is_some() {
            layout.id_column = read_js_int(&ls.id_column_index)?;
        }
        if ls.name_column_index.is_some() {
            layout.name_column = read_js_int(&ls.name_column_index)?;
        }
        if let Some(rows) = ls.state_row_indexes.as_ref() {
            layout.state_rows = rows.clone();
        }
        if let Some(pcs) = ls.party_columns.as_ref() {
            let mut party_columns: Vec<PartyColumn> = Vec::new();
            for pc in pcs.iter() {
                party_columns.push(PartyColumn {
                    name: pc.name.clone(),
                    column: read_js_int(&Some(pc.column.clone()))?,
                });
            }
            layout.party_columns = party_columns;
        }
        if let Some(markers) = ls.missing_markers.as_ref() {
            layout.missing_markers = markers.clone();
        }
        if let Some(c) = ls.coalition.as_ref() {
            layout.coalition = Coalition {
                name: c.name.clone(),
                members: c.members.clone(),
            };
        }
        if let Some(tracked) = ls.tracked_parties.as_ref() {
            layout.tracked = tracked.clone();
        }
        if let Some(entries) = ls.recode.as_ref() {
            layout.recode = RecodeTable {
                entries: entries
                    .iter()
                    .map(|e| (e.from.clone(), e.to.clone()))
                    .collect(),
            };
        }
        Ok(layout)
    }

    pub fn party_styles(&self) -> MapsResult<Vec<PartyStyle>> {
        let pss = match self.parties.as_ref() {
            Some(pss) if !pss.is_empty() => pss,
            Some(_) => return invalid("the list of parties is empty".to_string()),
            None => return Ok(PartyStyle::defaults()),
        };
        let mut res: Vec<PartyStyle> = Vec::new();
        for ps in pss.iter() {
            let label = ps.label.clone().unwrap_or_else(|| ps.party.clone());
            let mut style = PartyStyle::new(
                &ps.party,
                &label,
                parse_color(&ps.low_color)?,
                parse_color(&ps.mid_color)?,
                parse_color(&ps.high_color)?,
                ps.midpoint,
                (ps.legend_low, ps.legend_high),
                &ps.legend_breaks,
            );
            if let Some(field) = ps.field.as_ref() {
                style.field = field.clone();
            }
            if let Some(title) = ps.title.as_ref() {
                style.title = title.clone();
            }
            if let Some(subtitle) = ps.subtitle.as_ref() {
                style.subtitle = subtitle.clone();
            }
            validate_style(&style)?;
            res.push(style);
        }
        Ok(res)
    }

    pub fn theme(&self) -> MapsResult<Theme> {
        let mut theme = Theme::default();
        let ts = match self.theme.as_ref() {
            Some(ts) => ts,
            None => return Ok(theme),
        };
        if let Some(w) = ts.width {
            theme.width = w;
        }
        if let Some(h) = ts.height {
            theme.height = h;
        }
        if let Some(c) = ts.background_color.as_ref() {
            theme.background = parse_color(c)?;
        }
        if let Some(c) = ts.border_color.as_ref() {
            theme.border = parse_color(c)?;
        }
        if let Some(c) = ts.no_data_color.as_ref() {
            theme.no_data = parse_color(c)?;
        }
        if let Some(f) = ts.font_family.as_ref() {
            theme.font_family = f.clone();
        }
        if let Some(c) = ts.caption.as_ref() {
            theme.caption = c.clone();
        }
        if let Some(s) = ts.caption_size {
            theme.caption_size = s;
        }
        if theme.width < 200.0 || theme.height < 200.0 {
            return invalid(format!(
                "the figure is too small: {}x{}",
                theme.width, theme.height
            ));
        }
        Ok(theme)
    }

    /// The states drawn on top of their neighbours.
    pub fn city_states(&self) -> Vec<String> {
        self.city_states
            .clone()
            .unwrap_or_else(|| vec!["Berlin".to_string(), "Bremen".to_string()])
    }
}

fn validate_style(style: &PartyStyle) -> MapsResult<()> {
    if !(style.legend_low < style.legend_high) {
        return invalid(format!(
            "{}: the legend range {}..{} is empty",
            style.party, style.legend_low, style.legend_high
        ));
    }
    if style.midpoint < style.legend_low || style.midpoint > style.legend_high {
        return invalid(format!(
            "{}: the midpoint {} is outside of the legend range",
            style.party, style.midpoint
        ));
    }
    if style.legend_breaks.windows(2).any(|w| w[0] >= w[1]) {
        return invalid(format!(
            "{}: the legend breaks must be increasing: {:?}",
            style.party, style.legend_breaks
        ));
    }
    Ok(())
}

pub fn read_config(path: &str) -> MapsResult<MapsConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: MapsConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> MapsResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Reads a 1-indexed column or row index: a number, a string of digits or
/// an Excel-style column name ("A", "V", "GH").
fn read_js_int(x: &Option<JSValue>) -> MapsResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_uppercase()
                .bytes()
                .try_fold(0usize, |acc, b| {
                    acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)
                })
        }
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    match res {
        Some(x) if x >= 1 => Ok(x),
        _ => invalid(format!("not a valid index: {:?}", x)),
    }
}
