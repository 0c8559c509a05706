use geo::Point;
use serde::{Deserialize, Serialize};

/// a candidate stop, either read from stops.csv or generated at shape
/// endpoints. coordinates are in the same flat projected system as the
/// shapes; the GTFS column names are kept for output compatibility.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: Option<String>,
    pub stop_lon: f64,
    pub stop_lat: f64,
}

impl StopRecord {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.stop_lon, self.stop_lat)
    }
}
