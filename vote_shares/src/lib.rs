mod config;
use log::{debug, info, warn};

pub use crate::config::*;

// **** Private structures ****

/// A state row after column selection and coercion.
#[derive(PartialEq, Debug, Clone)]
struct CoercedRow {
    raw_id: String,
    name: String,
    // None is a missing marker.
    votes: Vec<(String, Option<f64>)>,
}

/// The cells of a row that are kept by the layout, with their names.
#[derive(PartialEq, Debug, Clone)]
pub struct SelectedRow<'a> {
    pub id: &'a Cell,
    pub name: &'a Cell,
    pub parties: Vec<(&'a str, usize, &'a Cell)>,
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Keeps the id, the name and the party columns of a row, and drops
/// everything else (candidate votes, previous period, turnout, ...).
///
/// Cells past the end of a short row are read as empty.
pub fn select_columns<'a>(row: &'a [Cell], layout: &'a SheetLayout) -> SelectedRow<'a> {
    let get = |col: usize| row.get(col - 1).unwrap_or(&EMPTY_CELL);
    SelectedRow {
        id: get(layout.id_column),
        name: get(layout.name_column),
        parties: layout
            .party_columns
            .iter()
            .map(|pc| (pc.name.as_str(), pc.column, get(pc.column)))
            .collect(),
    }
}

/// Reads a vote count.
///
/// Returns None for a missing marker.
pub fn coerce_votes(
    cell: &Cell,
    layout: &SheetLayout,
    lineno: usize,
    column: usize,
    field: &str,
) -> Result<Option<f64>, TransformError> {
    let err = || TransformError::Coercion {
        lineno,
        column,
        field: field.to_string(),
        content: cell.to_string(),
    };
    let x = match cell {
        Cell::Empty => return Ok(None),
        Cell::Number(x) => *x,
        Cell::Text(s) if layout.is_missing_marker(s) => return Ok(None),
        Cell::Text(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '\'')
                .collect();
            cleaned.parse::<f64>().map_err(|_| err())?
        }
    };
    // Counts are whole numbers. "1.234" is a German thousands separator,
    // not a fraction of a vote.
    if !x.is_finite() || x < 0.0 || x.fract() != 0.0 {
        return Err(err());
    }
    Ok(Some(x))
}

/// Reads the state identifier. Spreadsheets store it as a number, text
/// files as a string: both end up as the same string.
fn coerce_id(cell: &Cell, lineno: usize, column: usize) -> Result<String, TransformError> {
    match cell {
        Cell::Number(x) if x.fract() == 0.0 => Ok(cell.to_string()),
        Cell::Text(s) if !s.trim().is_empty() => {
            let t = s.trim();
            // "9.0" written out by some exporters
            match t.parse::<f64>() {
                Ok(x) if x.fract() == 0.0 && x >= 0.0 => Ok((x as i64).to_string()),
                _ => Ok(t.to_string()),
            }
        }
        _ => Err(TransformError::Coercion {
            lineno,
            column,
            field: "id".to_string(),
            content: cell.to_string(),
        }),
    }
}

fn coerce_row(
    row: &[Cell],
    layout: &SheetLayout,
    lineno: usize,
) -> Result<CoercedRow, TransformError> {
    let selected = select_columns(row, layout);
    let raw_id = coerce_id(selected.id, lineno, layout.id_column)?;
    let name = selected.name.to_string().trim().to_string();
    let mut votes: Vec<(String, Option<f64>)> = Vec::with_capacity(selected.parties.len());
    for (party, column, cell) in selected.parties {
        let v = coerce_votes(cell, layout, lineno, column, party)?;
        votes.push((party.to_string(), v));
    }
    Ok(CoercedRow {
        raw_id,
        name,
        votes,
    })
}

/// The share of `votes` in `total`, in percent.
///
/// There is no share of nothing: a zero total gives None.
pub fn vote_share(votes: f64, total: f64) -> Option<f64> {
    if total > 0.0 {
        Some(votes / total * 100.0)
    } else {
        None
    }
}

fn derive_state(row: CoercedRow, layout: &SheetLayout) -> Result<StateResult, TransformError> {
    let votes: Vec<(String, f64)> = row
        .votes
        .into_iter()
        .map(|(party, v)| (party, v.unwrap_or(0.0)))
        .collect();
    let lookup = |party: &str| -> f64 {
        votes
            .iter()
            .find(|(name, _)| name == party)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    };

    let total_votes: f64 = votes.iter().map(|(_, v)| v).sum();
    let cdu_csu_votes: f64 = layout.coalition.members.iter().map(|m| lookup(m.as_str())).sum();
    debug!(
        "derive_state: {} ({}): total {} coalition {}",
        row.name, row.raw_id, total_votes, cdu_csu_votes
    );

    let mut shares: Vec<(String, f64)> = Vec::with_capacity(layout.tracked.len());
    for party in layout.tracked.iter() {
        let party_votes = if *party == layout.coalition.name {
            cdu_csu_votes
        } else {
            lookup(party.as_str())
        };
        let share = vote_share(party_votes, total_votes).ok_or_else(|| {
            TransformError::Derivation {
                state: row.name.clone(),
            }
        })?;
        shares.push((party.clone(), share));
    }

    Ok(StateResult {
        state_id: row.raw_id.clone(),
        raw_id: row.raw_id,
        state_name: row.name,
        votes,
        cdu_csu_votes,
        total_votes,
        shares,
    })
}

/// Rewrites the state ids into the numbering of the boundary dataset.
///
/// The input is left untouched.
pub fn recode_states(
    states: &[StateResult],
    table: &RecodeTable,
) -> Result<Vec<StateResult>, TransformError> {
    states
        .iter()
        .map(|s| {
            let state_id = table.recode(&s.raw_id)?;
            debug!("recode_states: {}: {} -> {}", s.state_name, s.raw_id, state_id);
            Ok(StateResult {
                state_id,
                ..s.clone()
            })
        })
        .collect()
}

/// Builds the tidy table: one row per state with the shares of the tracked
/// parties.
///
/// Arguments:
/// * `table` the data region of the sheet, header rows already removed
/// * `layout` the positions of the state rows and party columns
pub fn tidy_states(
    table: &RawTable,
    layout: &SheetLayout,
) -> Result<Vec<StateResult>, TransformError> {
    layout.validate()?;
    info!(
        "Processing {} data rows, {} state rows, {} party columns",
        table.rows.len(),
        layout.state_rows.len(),
        layout.party_columns.len()
    );

    let mut states: Vec<StateResult> = Vec::with_capacity(layout.state_rows.len());
    let mut first_derivation_error: Option<TransformError> = None;
    for position in layout.state_rows.iter().cloned() {
        let row = table
            .rows
            .get(position - 1)
            .ok_or(TransformError::MissingRow {
                position,
                available: table.rows.len(),
            })?;
        let coerced = coerce_row(row, layout, table.lineno(position - 1))?;
        match derive_state(coerced, layout) {
            Ok(s) => {
                info!("State {} ({}): {:?}", s.state_name, s.raw_id, s.shares);
                states.push(s);
            }
            Err(e @ TransformError::Derivation { .. }) => {
                // Keep going so that all the broken states get reported.
                warn!("tidy_states: row {}: {}", position, e);
                first_derivation_error.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    if let Some(e) = first_derivation_error {
        return Err(e);
    }

    recode_states(&states, &layout.recode)
}
