use geo::{Intersects, LineString, MultiPolygon, Point};

/// a polygonal region in which routes of one route type travel at a fixed
/// speed. immutable input; the geometry is in the same flat projected
/// system as the shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedZone {
    pub zone_id: String,
    pub route_type: u16,
    /// speed in kph. [f64::INFINITY] is the "unbounded" sentinel meaning no
    /// override applies here; consumers substitute their default speed.
    pub speed: f64,
    pub geometry: MultiPolygon<f64>,
}

/// zone id given to the unbounded remainder of the service area after
/// tidying (see `protofeed_ops::tidy_speed_zones`)
pub const DEFAULT_ZONE_ID: &str = "default";

impl SpeedZone {
    /// whether this zone carries no speed override of its own
    pub fn is_unbounded(&self) -> bool {
        self.speed.is_infinite()
    }

    pub fn covers(&self, point: &Point<f64>) -> bool {
        self.geometry.intersects(point)
    }

    /// all boundary rings (exterior and interior) across the zone polygons
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.geometry
            .iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
    }
}
