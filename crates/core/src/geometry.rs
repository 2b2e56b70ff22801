//! Geometric sanity checks: coordinate ranges, coordinate order, bbox/geometry
//! consistency and the antimeridian bbox convention.
//!
//! Every check treats shapes it doesn't recognize as valid, so that drafts
//! and near-valid documents can still be linted.

use crate::{Field, StacObject};
use serde_json::{Number, Value};
use std::fmt::Display;

/// Differences at or below this are invisible when rounded to six decimal places.
pub const BBOX_TOLERANCE: f64 = 5e-7;

/// At most this many invalid coordinates are listed in a message.
pub const MAX_LISTED_COORDINATES: usize = 5;

const BBOX_LABELS: [&str; 4] = ["min longitude", "min latitude", "max longitude", "max latitude"];

/// A GeoJSON coordinates tree of arbitrary depth.
///
/// An array whose first element is a number is a position. Any other array
/// nests further coordinates, and anything else is unrecognized.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates<'a> {
    /// A single position, e.g. `[lon, lat]` or `[lon, lat, elevation]`.
    Position(&'a [Value]),

    /// A list of positions, rings, polygons, etc.
    Nested(Vec<Coordinates<'a>>),

    /// Something that isn't an array.
    Unrecognized,
}

/// A coordinate that violates the GeoJSON ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidCoordinate {
    /// The longitude, as written in the document.
    pub lon: Number,

    /// The latitude, as written in the document.
    pub lat: Number,

    /// Which range is violated.
    pub reason: CoordinateError,
}

/// The range a coordinate is outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    /// `|latitude| > 90`.
    Latitude,

    /// `|longitude| > 180`.
    Longitude,
}

/// A bbox that isn't the minimum bounding rectangle of its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BboxMismatch {
    /// `[min lon, min lat, max lon, max lat]` computed from the exterior rings.
    pub calculated: [f64; 4],

    /// The bbox as written in the document.
    pub actual: Vec<f64>,

    /// Absolute differences between `calculated` and the first four `actual` values.
    pub differences: [f64; 4],
}

/// A bbox that belts the globe instead of crossing the antimeridian.
#[derive(Debug, Clone, PartialEq)]
pub struct AntimeridianViolation {
    /// The western longitude.
    pub west: Number,

    /// The eastern longitude.
    pub east: Number,

    /// The whole bbox, as written in the document.
    pub bbox: Vec<Number>,
}

impl<'a> Coordinates<'a> {
    /// Returns the `coordinates` of an object's geometry.
    ///
    /// Returns `None` if the geometry is absent or null. A geometry without
    /// `coordinates` (e.g. a GeometryCollection) has no positions.
    pub fn from_geometry(object: &'a StacObject) -> Option<Coordinates<'a>> {
        match object.geometry() {
            Field::Present(geometry) => Some(
                geometry
                    .get("coordinates")
                    .map(Coordinates::from)
                    .unwrap_or(Coordinates::Nested(Vec::new())),
            ),
            Field::Null | Field::Absent => None,
        }
    }

    /// Returns every position in this tree that has a numeric longitude and latitude, in document order.
    pub fn lon_lats(&self) -> Vec<(&'a Number, &'a Number)> {
        let mut lon_lats = Vec::new();
        self.collect_lon_lats(&mut lon_lats);
        lon_lats
    }

    fn collect_lon_lats(&self, lon_lats: &mut Vec<(&'a Number, &'a Number)>) {
        match self {
            Coordinates::Position(position) => {
                if let [Value::Number(lon), Value::Number(lat), ..] = position {
                    lon_lats.push((lon, lat));
                }
            }
            Coordinates::Nested(children) => {
                for child in children {
                    child.collect_lon_lats(lon_lats);
                }
            }
            Coordinates::Unrecognized => {}
        }
    }
}

impl<'a> From<&'a Value> for Coordinates<'a> {
    fn from(value: &'a Value) -> Coordinates<'a> {
        match value {
            Value::Array(array) if array.first().is_some_and(Value::is_number) => {
                Coordinates::Position(array)
            }
            Value::Array(array) => Coordinates::Nested(array.iter().map(Coordinates::from).collect()),
            _ => Coordinates::Unrecognized,
        }
    }
}

/// Returns every coordinate that is outside the valid latitude or longitude range.
///
/// A coordinate with both problems is reported for its latitude.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_check::{StacObject, geometry::CoordinateError};
///
/// let object = StacObject::new(json!({
///     "type": "Feature",
///     "geometry": {"type": "Point", "coordinates": [10.0, 100.0]}
/// }))
/// .unwrap();
/// let errors = stac_check::geometry::definite_errors(&object);
/// assert_eq!(errors[0].reason, CoordinateError::Latitude);
/// ```
pub fn definite_errors(object: &StacObject) -> Vec<InvalidCoordinate> {
    let Some(coordinates) = Coordinates::from_geometry(object) else {
        return Vec::new();
    };
    coordinates
        .lon_lats()
        .into_iter()
        .filter_map(|(lon, lat)| {
            let reason = match (lon.as_f64(), lat.as_f64()) {
                (_, Some(y)) if y.abs() > 90.0 => CoordinateError::Latitude,
                (Some(x), _) if x.abs() > 180.0 => CoordinateError::Longitude,
                _ => return None,
            };
            Some(InvalidCoordinate {
                lon: lon.clone(),
                lat: lat.clone(),
                reason,
            })
        })
        .collect()
}

/// Returns true if any coordinate looks like it was written as latitude, longitude.
///
/// This is a heuristic: a position is flagged when `|first| > 90`,
/// `|second| < 90` and `|first| > 2 * |second|`. Valid coordinates far from
/// the prime meridian and close to the equator are flagged, and swapped
/// coordinates near the poles are not.
pub fn coordinates_maybe_swapped(object: &StacObject) -> bool {
    let Some(coordinates) = Coordinates::from_geometry(object) else {
        return false;
    };
    coordinates.lon_lats().into_iter().any(|(lon, lat)| {
        match (lon.as_f64(), lat.as_f64()) {
            (Some(lon), Some(lat)) => {
                lon.abs() > 90.0 && lat.abs() < 90.0 && lon.abs() > lat.abs() * 2.0
            }
            _ => false,
        }
    })
}

/// Compares a Polygon or MultiPolygon geometry's bounds with the bbox.
///
/// Only the exterior rings are read, so malformed interior rings or extra
/// position values don't stop the comparison.
///
/// Returns `None` when there's no mismatch, or when the check doesn't apply:
/// the geometry or bbox is absent or null, the geometry isn't a Polygon or
/// MultiPolygon, its exterior rings have no positions, or the bbox has fewer
/// than four numbers.
pub fn bbox_mismatch(object: &StacObject) -> Option<BboxMismatch> {
    let geometry = object.geometry().value()?;
    let actual = object.bbox()?;
    if actual.len() < 4 {
        return None;
    }
    let coordinates = geometry.get("coordinates")?.as_array()?;
    let exterior_rings: Vec<&Value> = match geometry.get("type").and_then(Value::as_str)? {
        "Polygon" => coordinates.first().into_iter().collect(),
        "MultiPolygon" => coordinates
            .iter()
            .filter_map(|polygon| polygon.as_array()?.first())
            .collect(),
        _ => return None,
    };
    let positions: Vec<(f64, f64)> = exterior_rings
        .into_iter()
        .flat_map(|ring| Coordinates::from(ring).lon_lats())
        .filter_map(|(lon, lat)| Some((lon.as_f64()?, lat.as_f64()?)))
        .collect();
    if positions.is_empty() {
        return None;
    }
    let mut calculated = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    for (lon, lat) in positions {
        calculated[0] = calculated[0].min(lon);
        calculated[1] = calculated[1].min(lat);
        calculated[2] = calculated[2].max(lon);
        calculated[3] = calculated[3].max(lat);
    }
    let mut differences = [0.0; 4];
    for (i, difference) in differences.iter_mut().enumerate() {
        *difference = (actual[i] - calculated[i]).abs();
    }
    if differences.iter().any(|&difference| difference > BBOX_TOLERANCE) {
        tracing::debug!("bbox {:?} does not match geometry bounds {:?}", actual, calculated);
        Some(BboxMismatch {
            calculated,
            actual,
            differences,
        })
    } else {
        None
    }
}

/// Checks that a bbox crossing the antimeridian uses `west > east`.
///
/// A 2D bbox is `[west, south, east, north]` and a 3D bbox is
/// `[west, south, min elevation, east, north, max elevation]`. Bboxes of
/// other lengths are not checked. A bbox with `west > east` always passes.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_check::StacObject;
///
/// let belted = StacObject::new(json!({"bbox": [-170, -10, 170, 10]})).unwrap();
/// assert!(stac_check::geometry::antimeridian_violation(&belted).is_some());
/// let crossing = StacObject::new(json!({"bbox": [170, -10, -170, 10]})).unwrap();
/// assert!(stac_check::geometry::antimeridian_violation(&crossing).is_none());
/// ```
pub fn antimeridian_violation(object: &StacObject) -> Option<AntimeridianViolation> {
    let bbox = object.bbox_numbers()?;
    let (west, east) = match bbox.as_slice() {
        [west, _, east, _] | [west, _, _, east, _, _] => (*west, *east),
        _ => return None,
    };
    let (w, e) = (west.as_f64()?, east.as_f64()?);
    if w < e && (e - w) > 180.0 {
        Some(AntimeridianViolation {
            west: west.clone(),
            east: east.clone(),
            bbox: bbox.into_iter().cloned().collect(),
        })
    } else {
        None
    }
}

impl InvalidCoordinate {
    /// Formats a list of invalid coordinates, listing at most [MAX_LISTED_COORDINATES].
    pub fn messages(invalid_coordinates: &[InvalidCoordinate]) -> Vec<String> {
        let mut messages = vec![
            "Geometry coordinates contain invalid values that violate the GeoJSON specification (latitude must be between -90 and 90, longitude between -180 and 180)".to_string(),
        ];
        messages.extend(
            invalid_coordinates
                .iter()
                .take(MAX_LISTED_COORDINATES)
                .map(|coordinate| {
                    format!(
                        "Invalid coordinate: [{}, {}] - {}",
                        coordinate.lon, coordinate.lat, coordinate.reason
                    )
                }),
        );
        if invalid_coordinates.len() > MAX_LISTED_COORDINATES {
            messages.push(format!(
                "...and {} more invalid coordinates",
                invalid_coordinates.len() - MAX_LISTED_COORDINATES
            ));
        }
        messages
    }
}

impl Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::Latitude => f.write_str("latitude > ±90°"),
            CoordinateError::Longitude => f.write_str("longitude > ±180°"),
        }
    }
}

impl BboxMismatch {
    /// Formats this mismatch, labelling each coordinate that is off by more than [BBOX_TOLERANCE].
    pub fn messages(&self) -> Vec<String> {
        let mut messages = vec![
            "The bbox field does not match the bounds of the geometry. The bbox should be the minimum bounding rectangle of the geometry.".to_string(),
            format!("Calculated bbox from geometry: [{}]", join_six_places(&self.calculated)),
            format!("Actual bbox in metadata: [{}]", join_six_places(&self.actual)),
        ];
        let details: Vec<String> = BBOX_LABELS
            .iter()
            .enumerate()
            .filter(|(i, _)| self.differences[*i] > BBOX_TOLERANCE)
            .map(|(i, label)| {
                format!(
                    "{label}: calculated={:.6}, actual={:.6}, diff={:.7}",
                    self.calculated[i], self.actual[i], self.differences[i]
                )
            })
            .collect();
        if details.is_empty() {
            messages.push(
                "Note: The differences are too small to be visible at 6 decimal places and can be ignored."
                    .to_string(),
            );
        } else {
            messages.push("Mismatched coordinates:".to_string());
            messages.extend(details);
        }
        messages
    }
}

impl AntimeridianViolation {
    /// Formats this violation.
    pub fn messages(&self) -> Vec<String> {
        let bbox = self
            .bbox
            .iter()
            .map(Number::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            format!(
                "BBox crossing the antimeridian should have west longitude > east longitude (found west={}, east={})",
                self.west, self.east
            ),
            format!(
                "Current bbox format appears to be belting the globe instead of properly crossing the antimeridian. Bbox: [{bbox}]"
            ),
        ]
    }
}

fn join_six_places(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| format!("{value:.6}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{CoordinateError, Coordinates};
    use crate::StacObject;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn polygon(bbox: Value) -> StacObject {
        StacObject::new(json!({
            "type": "Feature",
            "bbox": bbox,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[10.0, 20.0], [11.0, 20.0], [11.0, 21.0], [10.0, 21.0], [10.0, 20.0]]]
            }
        }))
        .unwrap()
    }

    fn point(coordinates: Value) -> StacObject {
        StacObject::new(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": coordinates}
        }))
        .unwrap()
    }

    #[test]
    fn coordinates_tree() {
        let value = json!([[[1, 2], [3, 4]], "nope", [[5]]]);
        let coordinates = Coordinates::from(&value);
        let Coordinates::Nested(children) = &coordinates else {
            panic!("expected nested coordinates")
        };
        assert_eq!(children[1], Coordinates::Unrecognized);
        // [5] is too short to have a latitude
        assert_eq!(coordinates.lon_lats().len(), 2);
    }

    #[test]
    fn bbox_within_tolerance() {
        let object = polygon(json!([10.0000001, 20.0000001, 11.0000001, 21.0000001]));
        assert!(super::bbox_mismatch(&object).is_none());
    }

    #[test]
    fn bbox_outside_tolerance() {
        let object = polygon(json!([10.0, 20.0, 11.000001, 21.0]));
        let mismatch = super::bbox_mismatch(&object).unwrap();
        let messages = mismatch.messages();
        assert_eq!(
            messages[1],
            "Calculated bbox from geometry: [10.000000, 20.000000, 11.000000, 21.000000]"
        );
        assert_eq!(messages[3], "Mismatched coordinates:");
        assert!(messages[4].starts_with("max longitude: calculated=11.000000, actual=11.000001, diff=0.0000010"));
        assert_eq!(messages.len(), 5);
    }

    #[test]
    fn bbox_multipolygon_uses_all_exterior_rings() {
        let object = StacObject::new(json!({
            "bbox": [0.0, 0.0, 3.0, 3.0],
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]]
                ]
            }
        }))
        .unwrap();
        assert!(super::bbox_mismatch(&object).is_none());
    }

    #[rstest]
    #[case(json!([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]))]
    #[case(json!([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]], [[0.5]]]))]
    #[case(json!([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]], [[0.2, null], [0.3, 0.3]]]))]
    #[case(json!([[[0.0, 0.0, "x"], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]))]
    fn bbox_mismatch_ignores_malformed_interiors(#[case] coordinates: Value) {
        let object = StacObject::new(json!({
            "type": "Feature",
            "bbox": [0.0, 0.0, 5.0, 5.0],
            "geometry": {"type": "Polygon", "coordinates": coordinates}
        }))
        .unwrap();
        let mismatch = super::bbox_mismatch(&object).unwrap();
        assert_eq!(mismatch.calculated, [0.0, 0.0, 1.0, 1.0]);
    }

    #[rstest]
    #[case(json!({"bbox": [0, 0, 1, 1], "geometry": null}))]
    #[case(json!({"geometry": {"type": "Polygon", "coordinates": [[[0, 0], [5, 0], [5, 5], [0, 0]]]}}))]
    #[case(json!({"bbox": [0, 0, 1, 1], "geometry": {"type": "Point", "coordinates": [30, 30]}}))]
    #[case(json!({"bbox": [0, 0, 1, 1], "geometry": {"type": "Polygon", "coordinates": "garbage"}}))]
    fn bbox_check_does_not_apply(#[case] value: Value) {
        let object = StacObject::new(value).unwrap();
        assert!(super::bbox_mismatch(&object).is_none());
    }

    #[test]
    fn latitude_out_of_range() {
        let errors = super::definite_errors(&point(json!([10.0, 100.0])));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, CoordinateError::Latitude);
        let messages = super::InvalidCoordinate::messages(&errors);
        assert_eq!(messages[1], "Invalid coordinate: [10.0, 100.0] - latitude > ±90°");
    }

    #[test]
    fn longitude_out_of_range() {
        let errors = super::definite_errors(&point(json!([200, 10])));
        assert_eq!(errors[0].reason, CoordinateError::Longitude);
    }

    #[test]
    fn more_than_five_invalid_coordinates() {
        let object = StacObject::new(json!({
            "geometry": {
                "type": "LineString",
                "coordinates": [[0, 91], [0, 92], [0, 93], [0, 94], [0, 95], [0, 96], [0, 97], [1, 1]]
            }
        }))
        .unwrap();
        let errors = super::definite_errors(&object);
        assert_eq!(errors.len(), 7);
        let messages = super::InvalidCoordinate::messages(&errors);
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[6], "...and 2 more invalid coordinates");
    }

    #[rstest]
    #[case(json!([120.0, 40.0]), true)]
    #[case(json!([-120.0, -40.0]), true)]
    #[case(json!([10.0, 40.0]), false)]
    // Valid, but flagged: far east and close to the equator.
    #[case(json!([179.0, 1.0]), true)]
    // Swapped, but not flagged: close to the pole.
    #[case(json!([80.0, 10.0]), false)]
    #[case(json!([120.0]), false)]
    fn coordinate_order_heuristic(#[case] coordinates: Value, #[case] flagged: bool) {
        assert_eq!(super::coordinates_maybe_swapped(&point(coordinates)), flagged);
    }

    #[test]
    fn swapped_but_in_range() {
        let object = point(json!([120.0, 40.0]));
        assert!(super::coordinates_maybe_swapped(&object));
        assert!(super::definite_errors(&object).is_empty());
    }

    #[rstest]
    #[case(json!([-170, -10, 170, 10]), true)]
    #[case(json!([170, -10, -170, 10]), false)]
    #[case(json!([10, -10, 20, 10]), false)]
    #[case(json!([-170, -10, 0, 170, 10, 100]), true)]
    #[case(json!([-170, -10, 170]), false)]
    #[case(json!(null), false)]
    fn antimeridian(#[case] bbox: Value, #[case] violated: bool) {
        let object = StacObject::new(json!({"bbox": bbox})).unwrap();
        assert_eq!(super::antimeridian_violation(&object).is_some(), violated);
    }

    #[test]
    fn antimeridian_messages() {
        let object = StacObject::new(json!({"bbox": [-170, -10, 170, 10]})).unwrap();
        let messages = super::antimeridian_violation(&object).unwrap().messages();
        assert_eq!(
            messages,
            vec![
                "BBox crossing the antimeridian should have west longitude > east longitude (found west=-170, east=170)",
                "Current bbox format appears to be belting the globe instead of properly crossing the antimeridian. Bbox: [-170, -10, 170, 10]",
            ]
        );
    }
}
