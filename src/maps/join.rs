// Spatial join of the tidy table with the boundaries.

use std::error::Error;
use std::fmt::Display;

use geo::LineString;

use crate::maps::io_shape::GeometryRecord;
use crate::maps::*;

/// A boundary that could not be matched to a state. It is still drawn,
/// without data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum JoinError {
    /// No state of the tidy table has the name of the boundary.
    UnmatchedName { name: String, state_id: String },
    /// The name matched, but no state carries the id of the boundary.
    UnmatchedId { name: String, state_id: String },
    /// The id of the boundary belongs to a state with another name.
    NameMismatch {
        name: String,
        state_id: String,
        found: String,
    },
}

impl Error for JoinError {}

impl Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinError::UnmatchedName { name, state_id } => {
                write!(f, "boundary {} ({}): no state with this name", name, state_id)
            }
            JoinError::UnmatchedId { name, state_id } => {
                write!(f, "boundary {} ({}): no state with this id", name, state_id)
            }
            JoinError::NameMismatch {
                name,
                state_id,
                found,
            } => write!(
                f,
                "boundary {} ({}): the id belongs to {}, check the recode table",
                name, state_id, found
            ),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct MergedRecord {
    pub geometry: GeometryRecord,
    pub attributes: Option<StateResult>,
    pub error: Option<JoinError>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct JoinOutcome {
    pub records: Vec<MergedRecord>,
    pub errors: Vec<JoinError>,
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

/// Left join of the boundaries with the tidy table.
///
/// The names are checked first, then the attributes are attached by id.
/// Every boundary is kept, matched or not.
pub fn merge(geometries: Vec<GeometryRecord>, states: &[StateResult]) -> JoinOutcome {
    let mut records: Vec<MergedRecord> = Vec::with_capacity(geometries.len());
    let mut errors: Vec<JoinError> = Vec::new();
    for geometry in geometries {
        let by_name = states
            .iter()
            .find(|s| same_name(&s.state_name, &geometry.name));
        let by_id = states.iter().find(|s| s.state_id == geometry.state_id);
        let name = geometry.name.clone();
        let state_id = geometry.state_id.clone();
        let (attributes, error) = match (by_name, by_id) {
            (None, _) => (None, Some(JoinError::UnmatchedName { name, state_id })),
            (Some(_), None) => (None, Some(JoinError::UnmatchedId { name, state_id })),
            (Some(_), Some(s)) if !same_name(&s.state_name, &name) => (
                None,
                Some(JoinError::NameMismatch {
                    name,
                    state_id,
                    found: s.state_name.clone(),
                }),
            ),
            (Some(_), Some(s)) => (Some(s.clone()), None),
        };
        if let Some(e) = error.as_ref() {
            debug!("merge: {}", e);
            errors.push(e.clone());
        }
        records.push(MergedRecord {
            geometry,
            attributes,
            error,
        });
    }

    for s in states.iter() {
        if !records
            .iter()
            .any(|r| r.attributes.as_ref().map(|a| &a.state_id) == Some(&s.state_id))
        {
            warn!(
                "merge: state {} ({}) has no boundary and will not be drawn",
                s.state_name, s.state_id
            );
        }
    }
    JoinOutcome { records, errors }
}

/// The drawing pass of a path.
#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
pub enum DrawLayer {
    Main,
    /// City-states enclosed by another state, drawn on top.
    Enclosed,
}

/// One ring of a boundary, ready to be drawn.
#[derive(PartialEq, Debug, Clone)]
pub struct DrawPath {
    pub state_id: String,
    pub state_name: String,
    /// "<state id>.<polygon>": the rings of one polygon share a group.
    pub group: String,
    /// Position of the ring in its polygon. The exterior comes first.
    pub piece: usize,
    pub hole: bool,
    pub layer: DrawLayer,
    pub ring: LineString<f64>,
    /// None when the boundary could not be joined.
    pub shares: Option<Vec<(String, f64)>>,
}

impl DrawPath {
    pub fn share(&self, field: &str) -> Option<f64> {
        self.shares
            .as_ref()
            .and_then(|shares| shares.iter().find(|(name, _)| name == field))
            .map(|(_, p)| *p)
    }
}

/// Flattens the merged boundaries into rings grouped by polygon.
///
/// All the paths of the main layer come before the paths of the enclosed
/// city-states.
pub fn flatten(records: &[MergedRecord], city_states: &[String]) -> Vec<DrawPath> {
    let mut paths: Vec<DrawPath> = Vec::new();
    for r in records.iter() {
        let layer = if city_states.iter().any(|c| same_name(c, &r.geometry.name)) {
            DrawLayer::Enclosed
        } else {
            DrawLayer::Main
        };
        let shares = r.attributes.as_ref().map(|a| a.shares.clone());
        for (poly_idx, polygon) in r.geometry.shape.0.iter().enumerate() {
            let group = format!("{}.{}", r.geometry.state_id, poly_idx);
            let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors().iter());
            for (piece, ring) in rings.enumerate() {
                paths.push(DrawPath {
                    state_id: r.geometry.state_id.clone(),
                    state_name: r.geometry.name.clone(),
                    group: group.clone(),
                    piece,
                    hole: piece > 0,
                    layer,
                    ring: ring.clone(),
                    shares: shares.clone(),
                });
            }
        }
    }
    // Stable: the order of the file is kept within a layer.
    paths.sort_by_key(|p| p.layer);
    paths
}
