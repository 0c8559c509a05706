//! the serializable rows of the seven output tables.
use serde::{Deserialize, Serialize};

/// the single row of agency.txt
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AgencyRow {
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
}

/// a row of calendar.txt: one service per distinct weekday activity pattern
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CalendarRow {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    /// yyyymmdd
    pub start_date: String,
    /// yyyymmdd
    pub end_date: String,
}

/// a row of routes.txt
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RouteRow {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: u16,
}

/// a row of shapes.txt. coordinates are written in the same flat projected
/// system the protofeed supplies; the GTFS column names are kept.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ShapeRow {
    pub shape_id: String,
    pub shape_pt_sequence: u32,
    pub shape_pt_lon: f64,
    pub shape_pt_lat: f64,
}

/// a row of trips.txt
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TripRow {
    pub route_id: String,
    pub trip_id: String,
    pub direction_id: u8,
    pub shape_id: String,
    pub service_id: String,
}

/// a row of stop_times.txt. arrival always equals departure (no dwell is
/// modeled) and the hour field of either may exceed 23.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub stop_id: String,
    /// zero-based encounter order along the trip
    pub stop_sequence: u32,
    pub arrival_time: String,
    pub departure_time: String,
    /// meters from the path start, rounded to the nearest meter
    pub shape_dist_traveled: i64,
}
