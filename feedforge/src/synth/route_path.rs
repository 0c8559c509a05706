use geo::{Euclidean, Length, LineString};

/// a direction-qualified trip path in flat projected (meter) coordinates.
/// immutable once built; the length is computed at construction so callers
/// can convert line fractions to distances without re-measuring.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub shape_id: String,
    pub geometry: LineString<f64>,
    /// path length in meters
    pub length: f64,
}

impl RoutePath {
    pub fn new(shape_id: String, geometry: LineString<f64>) -> RoutePath {
        let length = Euclidean.length(&geometry);
        RoutePath {
            shape_id,
            geometry,
            length,
        }
    }
}
