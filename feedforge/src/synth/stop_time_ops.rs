//! converts a located stop set plus a speed profile into concrete stop
//! times by piecewise integration of speed over distance.
use geo::LineLocatePoint;

use crate::protofeed::{SpeedZone, StopRecord};
use crate::synth::{RoutePath, SpeedSample};

const KPH_TO_MPS: f64 = 1000.0 / 3600.0;

/// one row of a synthesized trip's stop times, before the trip start offset
/// and output formatting are applied. times are seconds past the reference
/// start; distances are unrounded meters from the path start.
#[derive(Debug, Clone, PartialEq)]
pub struct StopTimeTemplateRow {
    pub stop_id: String,
    pub stop_sequence: u32,
    pub arrival_time: f64,
    pub departure_time: f64,
    pub distance_traveled: f64,
}

impl StopTimeTemplateRow {
    /// the same row shifted by a trip's own start time
    pub fn offset_by(&self, start_time: f64) -> StopTimeTemplateRow {
        StopTimeTemplateRow {
            stop_id: self.stop_id.clone(),
            stop_sequence: self.stop_sequence,
            arrival_time: self.arrival_time + start_time,
            departure_time: self.departure_time + start_time,
            distance_traveled: self.distance_traveled,
        }
    }
}

/// a point of the merged stop/profile sequence used during integration
struct MergedSample {
    distance: f64,
    /// speed in m/s governing the segment that starts here
    speed: f64,
    stop_id: Option<String>,
}

/// build the stop time rows of one trip traversing `path` from `start_time`
/// (seconds past midnight; 0 when computing a cache template).
///
/// the located stops are projected onto the path and merged with the speed
/// profile by distance; wherever a sample carries the unbounded sentinel the
/// `default_speed` (kph) applies. travel time is integrated piecewise over
/// distance, each merged segment contributing `length / speed_at_start`, so
/// the time between two stops reflects how far the trip moves through each
/// zone rather than a naive average of point speeds. zero-length segments
/// contribute zero duration, never NaN or infinity.
///
/// exactly one located stop yields a single row at `start_time`; zero stops
/// yield no rows.
pub fn build_stop_times_for_trip(
    stops_nearby: &[StopRecord],
    path: &RoutePath,
    zones: &[SpeedZone],
    route_type: u16,
    profile: &[SpeedSample],
    default_speed: f64,
    start_time: f64,
) -> Vec<StopTimeTemplateRow> {
    let default_mps = default_speed * KPH_TO_MPS;
    let resolve = |speed_kph: f64| {
        if speed_kph.is_finite() {
            speed_kph * KPH_TO_MPS
        } else {
            default_mps
        }
    };

    let mut merged: Vec<MergedSample> = Vec::with_capacity(stops_nearby.len() + profile.len());
    for stop in stops_nearby.iter() {
        let point = stop.point();
        let fraction = path.geometry.line_locate_point(&point).unwrap_or(0.0);
        let speed = zones
            .iter()
            .find(|z| z.route_type == route_type && z.covers(&point))
            .map(|z| z.speed)
            .unwrap_or(f64::INFINITY);
        merged.push(MergedSample {
            distance: fraction * path.length,
            speed: resolve(speed),
            stop_id: Some(stop.stop_id.clone()),
        });
    }
    for sample in profile.iter() {
        merged.push(MergedSample {
            distance: sample.distance,
            speed: resolve(sample.speed),
            stop_id: None,
        });
    }
    // stable sort keeps stops ahead of profile samples at equal distances
    merged.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    // running travel time through the merged sequence: each segment
    // contributes its length over the speed governing it
    let mut time_traveled = vec![0.0; merged.len()];
    for i in 1..merged.len() {
        let segment = merged[i].distance - merged[i - 1].distance;
        let speed = merged[i - 1].speed;
        let segment_time = if segment > 0.0 && speed > 0.0 {
            segment / speed
        } else {
            0.0
        };
        time_traveled[i] = time_traveled[i - 1] + segment_time;
    }

    // discard non-stop samples, then read off durations between stops
    let retained: Vec<(usize, &MergedSample)> = merged
        .iter()
        .enumerate()
        .filter(|(_, sample)| sample.stop_id.is_some())
        .collect();

    let mut rows = Vec::with_capacity(retained.len());
    let mut elapsed = start_time;
    for (sequence, (i, sample)) in retained.iter().enumerate() {
        if sequence > 0 {
            let (prev_i, _) = retained[sequence - 1];
            elapsed += time_traveled[*i] - time_traveled[prev_i];
        }
        if let Some(stop_id) = &sample.stop_id {
            rows.push(StopTimeTemplateRow {
                stop_id: stop_id.clone(),
                stop_sequence: sequence as u32,
                arrival_time: elapsed,
                departure_time: elapsed,
                distance_traveled: sample.distance,
            });
        }
    }
    rows
}
