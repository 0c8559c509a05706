use geo::LineString;

/// a named route path from shapes.geojson, in flat projected (meter)
/// coordinates. reprojection from geographic coordinates happens upstream;
/// this crate never re-validates or converts geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoShape {
    pub shape_id: String,
    pub geometry: LineString<f64>,
}
