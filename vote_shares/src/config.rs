// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// The number of German states. The tidy table has exactly one row per state.
pub const NUM_STATES: usize = 16;

/// A single cell of the raw results sheet, as handed over by the readers.
///
/// Spreadsheet readers produce numbers directly. Text readers (CSV) keep
/// everything as text and leave the parsing to the coercion step.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => write!(f, ""),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{}", *x as i64),
            Cell::Number(x) => write!(f, "{}", x),
        }
    }
}

/// One row of the data region, addressed by position.
pub type RawRow = Vec<Cell>;

/// The data region of the sheet, after the header rows have been skipped.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
    /// Number of rows dropped in front of the data region.
    pub skipped_rows: usize,
}

impl RawTable {
    /// The widest row of the table.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// The line number in the original file (1-indexed) of a data row.
    pub fn lineno(&self, idx: usize) -> usize {
        idx + self.skipped_rows + 1
    }
}

/// A party column of the sheet. Columns are 1-indexed, as in a spreadsheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyColumn {
    pub name: String,
    pub column: usize,
}

/// Parties that are reported together.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Coalition {
    pub name: String,
    pub members: Vec<String>,
}

/// The translation from the state numbers of the sheet to the identifiers
/// of the boundary dataset.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecodeTable {
    pub entries: Vec<(String, String)>,
}

impl RecodeTable {
    pub fn new(entries: &[(&str, &str)]) -> RecodeTable {
        RecodeTable {
            entries: entries
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn recode(&self, raw_id: &str) -> Result<String, TransformError> {
        self.entries
            .iter()
            .find(|(from, _)| from == raw_id)
            .map(|(_, to)| to.clone())
            .ok_or_else(|| TransformError::Recode {
                id: raw_id.to_string(),
            })
    }

    /// True if every source id maps to exactly one target id and no two
    /// sources share a target.
    pub fn is_bijection(&self) -> bool {
        let sources: HashSet<&String> = self.entries.iter().map(|(a, _)| a).collect();
        let targets: HashSet<&String> = self.entries.iter().map(|(_, b)| b).collect();
        sources.len() == self.entries.len() && targets.len() == self.entries.len()
    }

    pub fn inverse(&self) -> RecodeTable {
        RecodeTable {
            entries: self
                .entries
                .iter()
                .map(|(a, b)| (b.clone(), a.clone()))
                .collect(),
        }
    }

    /// Sheet state number -> position of the state in the boundary file
    /// (alphabetical order, 0-based).
    pub fn default_2017() -> RecodeTable {
        RecodeTable::new(&[
            ("1", "14"),  // Schleswig-Holstein
            ("2", "5"),   // Hamburg
            ("3", "8"),   // Niedersachsen
            ("4", "4"),   // Bremen
            ("5", "9"),   // Nordrhein-Westfalen
            ("6", "6"),   // Hessen
            ("7", "10"),  // Rheinland-Pfalz
            ("8", "0"),   // Baden-Württemberg
            ("9", "1"),   // Bayern
            ("10", "11"), // Saarland
            ("11", "2"),  // Berlin
            ("12", "3"),  // Brandenburg
            ("13", "7"),  // Mecklenburg-Vorpommern
            ("14", "12"), // Sachsen
            ("15", "13"), // Sachsen-Anhalt
            ("16", "15"), // Thüringen
        ])
    }
}

/// Positional description of the results sheet.
///
/// The sheet has no usable header: every field is addressed by its
/// position. All positions are 1-indexed. Row positions count from the
/// first row after the header region.
#[derive(PartialEq, Debug, Clone)]
pub struct SheetLayout {
    pub header_rows: usize,
    pub min_columns: usize,
    pub id_column: usize,
    pub name_column: usize,
    pub state_rows: Vec<usize>,
    pub party_columns: Vec<PartyColumn>,
    pub missing_markers: Vec<String>,
    pub coalition: Coalition,
    pub tracked: Vec<String>,
    pub recode: RecodeTable,
}

/// Second-vote parties of the 2017 sheet, in column order.
/// The last two columns are the independent candidates and the remaining votes.
const PARTIES_2017: [&str; 43] = [
    "CDU",
    "SPD",
    "LINKE",
    "GRUENE",
    "CSU",
    "FDP",
    "AFD",
    "PIRATEN",
    "NPD",
    "FREIE_WAEHLER",
    "TIERSCHUTZPARTEI",
    "OEDP",
    "DIE_PARTEI",
    "BP",
    "VOLKSABSTIMMUNG",
    "PDV",
    "MLPD",
    "BUESO",
    "SGP",
    "DIE_RECHTE",
    "ADD",
    "TIERSCHUTZALLIANZ",
    "BERGPARTEI",
    "BGE",
    "DIB",
    "DKP",
    "DM",
    "DIE_GRAUEN",
    "DIE_URBANE",
    "MG",
    "MENSCHLICHE_WELT",
    "PDH",
    "GESUNDHEITSFORSCHUNG",
    "V_PARTEI",
    "BUENDNIS_C",
    "DIE_EINHEIT",
    "DIE_VIOLETTEN",
    "FAMILIE",
    "FRAUEN",
    "MIETERPARTEI",
    "NEUE_LIBERALE",
    "UNABHAENGIGE",
    "UEBRIGE",
];

// Each party has four columns (first votes, previous first votes, second
// votes, previous second votes). The second votes of the first party sit in
// column 22.
const FIRST_PARTY_COLUMN: usize = 22;
const PARTY_COLUMN_STRIDE: usize = 4;

impl SheetLayout {
    pub fn default_2017() -> SheetLayout {
        SheetLayout {
            header_rows: 5,
            min_columns: 190,
            id_column: 1,
            name_column: 2,
            state_rows: vec![
                14, 22, 30, 62, 66, 78, 89, 103, 169, 187, 211, 221, 238, 286, 326, 332,
            ],
            party_columns: PARTIES_2017
                .iter()
                .enumerate()
                .map(|(idx, name)| PartyColumn {
                    name: name.to_string(),
                    column: FIRST_PARTY_COLUMN + idx * PARTY_COLUMN_STRIDE,
                })
                .collect(),
            missing_markers: vec![
                "".to_string(),
                "-".to_string(),
                "–".to_string(),
                ".".to_string(),
            ],
            coalition: Coalition {
                name: "CDU_CSU".to_string(),
                members: vec!["CDU".to_string(), "CSU".to_string()],
            },
            tracked: ["CDU_CSU", "SPD", "LINKE", "GRUENE", "FDP", "AFD"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            recode: RecodeTable::default_2017(),
        }
    }

    pub fn party_names(&self) -> Vec<&str> {
        self.party_columns.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_missing_marker(&self, s: &str) -> bool {
        let t = s.trim();
        self.missing_markers.iter().any(|m| m.trim() == t)
    }

    /// Checks the internal consistency of the layout.
    pub fn validate(&self) -> Result<(), TransformError> {
        let invalid = |msg: String| Err(TransformError::InvalidLayout(msg));

        if self.state_rows.len() != NUM_STATES {
            return invalid(format!(
                "expected {} state rows, found {}",
                NUM_STATES,
                self.state_rows.len()
            ));
        }
        let rows: HashSet<usize> = self.state_rows.iter().cloned().collect();
        if rows.len() != self.state_rows.len() || rows.contains(&0) {
            return invalid(format!(
                "state rows must be distinct and start at 1: {:?}",
                self.state_rows
            ));
        }
        if self.id_column == 0 || self.name_column == 0 || self.id_column == self.name_column {
            return invalid(format!(
                "invalid id/name columns: {} {}",
                self.id_column, self.name_column
            ));
        }
        if self.party_columns.is_empty() {
            return invalid("no party columns".to_string());
        }
        let mut columns: HashSet<usize> = HashSet::new();
        let mut names: HashSet<&str> = HashSet::new();
        for pc in self.party_columns.iter() {
            if pc.column == 0 || pc.column > self.min_columns {
                return invalid(format!(
                    "party {} uses column {} outside of 1..={}",
                    pc.name, pc.column, self.min_columns
                ));
            }
            if pc.column == self.id_column || pc.column == self.name_column {
                return invalid(format!("party {} overlaps the id or name column", pc.name));
            }
            if !columns.insert(pc.column) {
                return invalid(format!("column {} is used twice", pc.column));
            }
            if !names.insert(pc.name.as_str()) {
                return invalid(format!("party {} is listed twice", pc.name));
            }
        }
        for m in self.coalition.members.iter() {
            if !names.contains(m.as_str()) {
                return invalid(format!("coalition member {} is not a party column", m));
            }
        }
        for t in self.tracked.iter() {
            if *t != self.coalition.name && !names.contains(t.as_str()) {
                return invalid(format!("tracked party {} is not a party column", t));
            }
        }
        if self.recode.len() != NUM_STATES || !self.recode.is_bijection() {
            return invalid(format!(
                "the recode table must be a bijection over {} states",
                NUM_STATES
            ));
        }
        Ok(())
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        SheetLayout::default_2017()
    }
}

// ******** Output data structures *********

/// The tidy result for one state.
#[derive(PartialEq, Debug, Clone)]
pub struct StateResult {
    /// Identifier in the numbering of the boundary dataset.
    pub state_id: String,
    /// Identifier as found in the sheet.
    pub raw_id: String,
    pub state_name: String,
    /// Votes of every party column, missing values counted as zero.
    pub votes: Vec<(String, f64)>,
    pub cdu_csu_votes: f64,
    /// Sum of all the party columns: the denominator of the shares.
    pub total_votes: f64,
    /// Percentages of the tracked parties, in tracked order.
    pub shares: Vec<(String, f64)>,
}

impl StateResult {
    pub fn share(&self, party: &str) -> Option<f64> {
        self.shares
            .iter()
            .find(|(name, _)| name == party)
            .map(|(_, p)| *p)
    }

    pub fn party_votes(&self, party: &str) -> Option<f64> {
        self.votes
            .iter()
            .find(|(name, _)| name == party)
            .map(|(_, v)| *v)
    }

    pub fn tracked_total(&self) -> f64 {
        self.shares.iter().map(|(_, p)| p).sum()
    }
}

/// Errors that prevent the tidy table from being built.
#[derive(PartialEq, Debug, Clone)]
pub enum TransformError {
    /// A state row position points past the end of the data.
    MissingRow { position: usize, available: usize },
    /// A vote cell is neither a number nor a missing marker.
    Coercion {
        lineno: usize,
        column: usize,
        field: String,
        content: String,
    },
    /// No votes at all were recorded for a state.
    Derivation { state: String },
    /// A state id that the recode table does not know.
    Recode { id: String },
    InvalidLayout(String),
}

impl Error for TransformError {}

impl Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::MissingRow {
                position,
                available,
            } => write!(
                f,
                "state row {} requested but the sheet only has {} data rows",
                position, available
            ),
            TransformError::Coercion {
                lineno,
                column,
                field,
                content,
            } => write!(
                f,
                "line {} column {} ({}): cannot read {:?} as a vote count",
                lineno, column, field, content
            ),
            TransformError::Derivation { state } => {
                write!(f, "state {}: no votes recorded, cannot compute shares", state)
            }
            TransformError::Recode { id } => {
                write!(f, "state id {:?} is missing from the recode table", id)
            }
            TransformError::InvalidLayout(msg) => write!(f, "invalid sheet layout: {}", msg),
        }
    }
}
