use serde::{Deserialize, Serialize};

use crate::protofeed::Meta;

/// a single row from frequencies.csv as it appears on disk, before route
/// type and speed defaults are applied
#[derive(Debug, Deserialize)]
pub struct FrequencyRow {
    pub route_short_name: String,
    pub route_long_name: String,
    #[serde(default)]
    pub route_type: Option<u16>,
    pub service_window_id: String,
    /// 0, 1, or 2; 2 means trips run in both directions along the shape
    pub direction: u8,
    /// vehicles per hour during the service window
    pub frequency: u32,
    pub shape_id: String,
    /// average route speed in kph, if the feed overrides the default
    #[serde(default)]
    pub speed: Option<f64>,
}

/// a frequency specification with route type and speed resolved against the
/// feed defaults
#[derive(Serialize, Debug, Clone)]
pub struct FrequencySpec {
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: u16,
    pub service_window_id: String,
    pub direction: u8,
    pub frequency: u32,
    pub shape_id: String,
    /// average route speed in kph, used wherever no speed zone applies
    pub speed: f64,
}

/// GTFS route type assumed when frequencies.csv leaves the column blank
pub const DEFAULT_ROUTE_TYPE: u16 = 3;

impl FrequencySpec {
    pub fn resolve(row: FrequencyRow, meta: &Meta) -> FrequencySpec {
        let route_type = row.route_type.unwrap_or(DEFAULT_ROUTE_TYPE);
        let speed = row.speed.unwrap_or_else(|| meta.default_speed_for(route_type));
        FrequencySpec {
            route_short_name: row.route_short_name,
            route_long_name: row.route_long_name,
            route_type,
            service_window_id: row.service_window_id,
            direction: row.direction,
            frequency: row.frequency,
            shape_id: row.shape_id,
            speed,
        }
    }

    /// the route id derived from the short name, shared by all windows and
    /// directions of the route
    pub fn route_id(&self) -> String {
        format!("r{}", self.route_short_name)
    }
}
