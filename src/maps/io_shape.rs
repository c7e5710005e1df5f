// Reader for the state boundaries.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Reader, Shape};

use crate::maps::*;

/// One boundary of the dataset, with the join key attached.
#[derive(PartialEq, Debug, Clone)]
pub struct GeometryRecord {
    /// Position of the record in the file.
    pub index: usize,
    pub name: String,
    pub state_id: String,
    pub shape: MultiPolygon<f64>,
}

pub fn read_geometries(path: &str, source: &GeometrySource) -> BMapsResult<Vec<GeometryRecord>> {
    let mut reader = Reader::from_path(path).context(OpeningShapefileSnafu { path })?;
    let name_field = source.name_field();

    let mut res: Vec<GeometryRecord> = Vec::new();
    for (index, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.context(ReadingShapeSnafu { path, index })?;
        let polygon = match shape {
            Shape::Polygon(p) => p,
            other => {
                return Err(Box::new(MapsError::UnsupportedShape {
                    index,
                    shape_type: format!("{:?}", other.shapetype()),
                }))
            }
        };
        let name = character_field(&record, &name_field)
            .context(MissingAttributeSnafu {
                index,
                field: name_field.as_str(),
            })?;
        let state_id = match source.id_field.as_ref() {
            Some(field) => id_field(&record, field).context(MissingAttributeSnafu {
                index,
                field: field.as_str(),
            })?,
            None => index.to_string(),
        };
        let shape = shp_to_geo(&polygon);
        debug!(
            "read_geometries: {} {:?} id {} with {} polygons",
            index,
            name,
            state_id,
            shape.0.len()
        );
        res.push(GeometryRecord {
            index,
            name,
            state_id,
            shape,
        });
    }
    Ok(res)
}

fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Some(s.trim().to_string()),
        Some(FieldValue::Memo(s)) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn id_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Numeric(Some(n))) if n.fract() == 0.0 => Some((*n as i64).to_string()),
        Some(FieldValue::Numeric(Some(n))) => Some(n.to_string()),
        Some(FieldValue::Integer(i)) => Some(i.to_string()),
        _ => character_field(record, field),
    }
}

/// Get the signed area of a ring (negative for a clockwise ring).
fn signed_area(pts: &[Coord<f64>]) -> f64 {
    let mut a = 0.0;
    for w in pts.windows(2) {
        a += w[0].x * w[1].y - w[1].x * w[0].y;
    }
    a / 2.0
}

/// Convert a shapefile polygon to a geo multipolygon.
///
/// Shapefiles store outer rings clockwise, each followed by its holes.
pub fn shp_to_geo(p: &shapefile::Polygon) -> MultiPolygon<f64> {
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in p.rings().iter() {
        let mut coords: Vec<Coord<f64>> = ring
            .points()
            .iter()
            .map(|pt| Coord { x: pt.x, y: pt.y })
            .collect();
        if coords.first() != coords.last() {
            coords.push(coords[0]);
        }
        let is_exterior = signed_area(&coords) < 0.0;
        let ls = LineString(coords);
        if is_exterior {
            if let Some(ext) = current_exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(ls);
        } else {
            current_holes.push(ls);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }
    MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::{Point, PolygonRing};

    fn ring(pts: &[(f64, f64)]) -> Vec<Point> {
        pts.iter().map(|(x, y)| Point::new(*x, *y)).collect()
    }

    #[test]
    fn outer_rings_and_holes() {
        // Clockwise outer ring, counter-clockwise hole, second clockwise outer ring.
        let p = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)])),
            PolygonRing::Outer(ring(&[(20.0, 0.0), (20.0, 1.0), (21.0, 1.0), (21.0, 0.0), (20.0, 0.0)])),
        ]);
        let mp = shp_to_geo(&p);
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert_eq!(mp.0[1].interiors().len(), 0);
        assert_eq!(mp.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn signed_area_orientation() {
        let cw = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: 1.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        assert_eq!(signed_area(&cw), -1.0);
        let ccw: Vec<Coord<f64>> = cw.iter().rev().cloned().collect();
        assert_eq!(signed_area(&ccw), 1.0);
    }

    #[test]
    fn missing_shapefile() {
        let source = GeometrySource {
            file_path: "/nonexistent/DEU_adm1.shp".to_string(),
            name_field: None,
            id_field: None,
        };
        let res = read_geometries("/nonexistent/DEU_adm1.shp", &source);
        assert!(matches!(
            res.map_err(|e| *e),
            Err(MapsError::OpeningShapefile { .. })
        ));
    }
}
