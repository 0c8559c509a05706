//! assembles the output tables of a feed from a protofeed: thin builders
//! for the identity tables, and the grouped, cached stop time synthesis.
use std::collections::{BTreeMap, HashMap, HashSet};

use geo::LineString;
use itertools::Itertools;

use crate::feed::{
    AgencyRow, CalendarRow, Feed, FeedError, RouteRow, ShapeRow, StopTimeRow, TripRow,
};
use crate::protofeed::{date_codec, ProtoFeed, StopRecord};
use crate::synth::{
    build_stop_times_for_trip, build_trips, compute_shape_point_speeds, get_stops_nearby,
    time_ops, RoutePath, StopIndex, SynthError, TemplateCache, TemplateKey, TrafficSideTable,
    TripRecord,
};

/// meters to buffer trip paths by when locating stops
pub const DEFAULT_BUFFER: f64 = 10.0;

/// character joining the chunks of generated identifiers
pub const DEFAULT_SEPARATOR: &str = "-";

pub fn build_agency(pfeed: &ProtoFeed) -> AgencyRow {
    AgencyRow {
        agency_name: pfeed.meta.agency_name.clone(),
        agency_url: pfeed.meta.agency_url.clone(),
        agency_timezone: pfeed.meta.agency_timezone.clone(),
    }
}

/// one calendar row per distinct weekday activity pattern across the
/// service windows
pub fn build_calendar(pfeed: &ProtoFeed) -> Vec<CalendarRow> {
    let mut rows: BTreeMap<String, CalendarRow> = BTreeMap::new();
    for window in pfeed.service_windows.iter() {
        let service_id = window.service_id();
        rows.entry(service_id.clone()).or_insert_with(|| CalendarRow {
            service_id,
            monday: window.monday,
            tuesday: window.tuesday,
            wednesday: window.wednesday,
            thursday: window.thursday,
            friday: window.friday,
            saturday: window.saturday,
            sunday: window.sunday,
            start_date: date_codec::format_gtfs_date(&pfeed.meta.start_date),
            end_date: date_codec::format_gtfs_date(&pfeed.meta.end_date),
        });
    }
    rows.into_values().collect()
}

pub fn build_routes(pfeed: &ProtoFeed) -> Vec<RouteRow> {
    pfeed
        .frequencies
        .iter()
        .unique_by(|spec| spec.route_id())
        .map(|spec| RouteRow {
            route_id: spec.route_id(),
            route_short_name: spec.route_short_name.clone(),
            route_long_name: spec.route_long_name.clone(),
            route_type: spec.route_type,
        })
        .collect()
}

/// direction-qualified trip paths for every shape the frequencies
/// reference: a shape used in both directions yields `<id><SEP>0` traversed
/// forward and `<id><SEP>1` reversed; a single-direction shape yields one
/// forward path with that direction's suffix. unreferenced shapes are
/// skipped.
pub fn build_shape_paths(pfeed: &ProtoFeed, separator: &str) -> Vec<RoutePath> {
    let directions = pfeed.directions_by_shape();
    let mut paths = Vec::new();
    for shape in pfeed.shapes.iter() {
        let direction = match directions.get(&shape.shape_id) {
            Some(direction) => *direction,
            None => continue,
        };
        if direction == 2 {
            paths.push(RoutePath::new(
                format!("{}{}0", shape.shape_id, separator),
                shape.geometry.clone(),
            ));
            let reversed: LineString<f64> = shape.geometry.coords().rev().copied().collect();
            paths.push(RoutePath::new(
                format!("{}{}1", shape.shape_id, separator),
                reversed,
            ));
        } else {
            paths.push(RoutePath::new(
                format!("{}{}{}", shape.shape_id, separator, direction),
                shape.geometry.clone(),
            ));
        }
    }
    paths
}

pub fn shape_rows(paths: &[RoutePath]) -> Vec<ShapeRow> {
    paths
        .iter()
        .flat_map(|path| {
            path.geometry
                .coords()
                .enumerate()
                .map(|(i, coord)| ShapeRow {
                    shape_id: path.shape_id.clone(),
                    shape_pt_sequence: i as u32,
                    shape_pt_lon: coord.x,
                    shape_pt_lat: coord.y,
                })
                .collect_vec()
        })
        .collect()
}

/// the candidate stop table: the protofeed's own stops when present,
/// otherwise one auto stop at each end of every trip path, deduplicated by
/// coordinate (a looping shape gets a single stop)
pub fn build_stops(pfeed: &ProtoFeed, paths: &[RoutePath], separator: &str) -> Vec<StopRecord> {
    if let Some(stops) = &pfeed.stops {
        return stops.clone();
    }
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    let mut stops = Vec::new();
    for path in paths.iter() {
        let coords = path.geometry.coords().collect_vec();
        let endpoints = match (coords.first(), coords.last()) {
            (Some(first), Some(last)) => [**first, **last],
            _ => continue,
        };
        for (i, coord) in endpoints.iter().enumerate() {
            if seen.insert((coord.x.to_bits(), coord.y.to_bits())) {
                stops.push(StopRecord {
                    stop_id: [
                        String::from("stp"),
                        path.shape_id.clone(),
                        i.to_string(),
                    ]
                    .join(separator),
                    stop_name: Some(format!("Stop {} on shape {}", i, path.shape_id)),
                    stop_lon: coord.x,
                    stop_lat: coord.y,
                });
            }
        }
    }
    stops
}

/// synthesize the stop time table. trips are grouped by (route type, shape,
/// default speed); per group the stop locator and speed profiler run once,
/// one template is computed at start time zero (or fetched from the cache),
/// and every trip in the group receives the template offset by its own
/// start time. a group whose shape serves no stops contributes no rows.
pub fn build_stop_times(
    pfeed: &ProtoFeed,
    paths: &[RoutePath],
    stops: &[StopRecord],
    trips: &[TripRecord],
    traffic: &TrafficSideTable,
    buffer: f64,
    separator: &str,
) -> Result<Vec<StopTimeRow>, SynthError> {
    let side = traffic.side_for(&pfeed.meta.agency_timezone);
    let stop_index = StopIndex::new(stops.to_vec());
    let path_by_id: HashMap<&str, &RoutePath> = paths
        .iter()
        .map(|path| (path.shape_id.as_str(), path))
        .collect();

    let mut groups: BTreeMap<(u16, &str, u64), Vec<&TripRecord>> = BTreeMap::new();
    for trip in trips.iter() {
        groups
            .entry((trip.route_type, trip.shape_id.as_str(), trip.speed.to_bits()))
            .or_default()
            .push(trip);
    }

    let mut cache = TemplateCache::new();
    let mut rows = Vec::new();
    for ((route_type, shape_id, speed_bits), group) in groups {
        let path = path_by_id
            .get(shape_id)
            .copied()
            .ok_or_else(|| SynthError::UnknownShape(shape_id.to_string()))?;
        let nearby = get_stops_nearby(&stop_index, &path.geometry, side, buffer);
        if nearby.is_empty() {
            // this shape serves no stops; skip stop time generation for it
            log::debug!("no stops within {buffer} m of shape {shape_id}, skipping");
            continue;
        }
        let profile = compute_shape_point_speeds(path, &pfeed.speed_zones, route_type);
        let default_speed = f64::from_bits(speed_bits);
        let key = TemplateKey::new(path, &nearby, route_type, &profile, default_speed);
        let template = cache.get_or_insert_with(key, || {
            build_stop_times_for_trip(
                &nearby,
                path,
                &pfeed.speed_zones,
                route_type,
                &profile,
                default_speed,
                0.0,
            )
        });
        for trip in group {
            let trip_id = trip.key.render(separator);
            let start_time = trip.start_time();
            for row in template.iter() {
                let shifted = row.offset_by(start_time);
                rows.push(StopTimeRow {
                    trip_id: trip_id.clone(),
                    stop_id: shifted.stop_id,
                    stop_sequence: shifted.stop_sequence,
                    arrival_time: time_ops::seconds_to_timestr(shifted.arrival_time.round() as u32),
                    departure_time: time_ops::seconds_to_timestr(
                        shifted.departure_time.round() as u32,
                    ),
                    shape_dist_traveled: shifted.distance_traveled.round() as i64,
                });
            }
        }
    }
    log::info!(
        "synthesized {} stop time rows from {} templates",
        rows.len(),
        cache.len()
    );
    // release the geometry-keyed templates now the table is complete
    cache.clear();
    Ok(rows)
}

/// synthesize the whole feed from a protofeed
pub fn build_feed(pfeed: &ProtoFeed, buffer: f64, separator: &str) -> Result<Feed, FeedError> {
    let agency = build_agency(pfeed);
    let calendar = build_calendar(pfeed);
    let routes = build_routes(pfeed);
    let paths = build_shape_paths(pfeed, separator);
    let stops = build_stops(pfeed, &paths, separator);
    let trips = build_trips(&pfeed.frequencies, &pfeed.service_windows, separator)?;
    let traffic = TrafficSideTable::builtin();
    let stop_times = build_stop_times(
        pfeed, &paths, &stops, &trips, &traffic, buffer, separator,
    )?;
    let trip_rows = trips
        .iter()
        .map(|trip| TripRow {
            route_id: trip.route_id.clone(),
            trip_id: trip.key.render(separator),
            direction_id: trip.direction_id,
            shape_id: trip.shape_id.clone(),
            service_id: trip.service_id.clone(),
        })
        .collect();
    Ok(Feed {
        agency,
        calendar,
        routes,
        shapes: shape_rows(&paths),
        stops,
        trips: trip_rows,
        stop_times,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protofeed::{FrequencyRow, Meta, ProtoShape, ServiceWindow};
    use chrono::NaiveDate;
    use geo::line_string;
    use std::collections::HashMap;

    fn test_meta() -> Meta {
        Meta {
            agency_name: String::from("Flatland Transit"),
            agency_url: String::from("https://example.com"),
            agency_timezone: String::from("America/Denver"),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            extra: HashMap::new(),
        }
    }

    fn test_window() -> ServiceWindow {
        ServiceWindow {
            service_window_id: String::from("peak"),
            start_time: 6 * 3600,
            end_time: 9 * 3600,
            monday: 1,
            tuesday: 1,
            wednesday: 1,
            thursday: 1,
            friday: 1,
            saturday: 0,
            sunday: 0,
        }
    }

    fn test_frequency_row(direction: u8) -> FrequencyRow {
        FrequencyRow {
            route_short_name: String::from("51X"),
            route_long_name: String::from("Crosstown Express"),
            route_type: Some(3),
            service_window_id: String::from("peak"),
            direction,
            frequency: 4,
            shape_id: String::from("sh1"),
            // 36 kph is 10 m/s, which keeps expected durations round
            speed: Some(36.0),
        }
    }

    fn test_pfeed(direction: u8, stops: Option<Vec<StopRecord>>) -> ProtoFeed {
        ProtoFeed::new(
            test_meta(),
            vec![test_window()],
            vec![ProtoShape {
                shape_id: String::from("sh1"),
                geometry: line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)],
            }],
            vec![test_frequency_row(direction)],
            stops,
            Vec::new(),
        )
    }

    #[test]
    fn test_build_feed_end_to_end() {
        let pfeed = test_pfeed(0, None);
        let feed = build_feed(&pfeed, DEFAULT_BUFFER, DEFAULT_SEPARATOR).unwrap();

        // 4 per hour over 3 hours, one direction
        assert_eq!(feed.trips.len(), 12);
        // two auto stops at the shape endpoints, two rows per trip
        assert_eq!(feed.stops.len(), 2);
        assert_eq!(feed.stop_times.len(), 24);
        assert_eq!(feed.routes.len(), 1);
        assert_eq!(feed.calendar.len(), 1);
        assert_eq!(feed.calendar[0].service_id, "srv1111100");

        // the first trip departs at the window start and covers 1000 m at
        // 10 m/s
        let first = &feed.stop_times[0];
        let second = &feed.stop_times[1];
        assert_eq!(first.arrival_time, "06:00:00");
        assert_eq!(first.departure_time, first.arrival_time);
        assert_eq!(second.arrival_time, "06:01:40");
        assert_eq!(first.shape_dist_traveled, 0);
        assert_eq!(second.shape_dist_traveled, 1000);
    }

    #[test]
    fn test_stop_times_monotone_per_trip() {
        let pfeed = test_pfeed(2, None);
        let feed = build_feed(&pfeed, DEFAULT_BUFFER, DEFAULT_SEPARATOR).unwrap();

        // direction 2 doubles the trips, full count each way
        assert_eq!(feed.trips.len(), 24);

        let mut by_trip: HashMap<&String, Vec<&StopTimeRow>> = HashMap::new();
        for row in feed.stop_times.iter() {
            by_trip.entry(&row.trip_id).or_default().push(row);
        }
        assert_eq!(by_trip.len(), 24);
        for rows in by_trip.values() {
            for pair in rows.windows(2) {
                assert!(pair[0].shape_dist_traveled <= pair[1].shape_dist_traveled);
                assert!(pair[0].arrival_time <= pair[1].arrival_time);
                assert!(pair[0].stop_sequence < pair[1].stop_sequence);
            }
        }
    }

    #[test]
    fn test_shape_without_nearby_stops_yields_no_rows() {
        let far_stop = StopRecord {
            stop_id: String::from("nowhere"),
            stop_name: None,
            stop_lon: 5000.0,
            stop_lat: 5000.0,
        };
        let pfeed = test_pfeed(0, Some(vec![far_stop]));
        let mut feed = build_feed(&pfeed, DEFAULT_BUFFER, DEFAULT_SEPARATOR).unwrap();
        assert_eq!(feed.trips.len(), 12);
        assert!(feed.stop_times.is_empty());

        // pruning then drops the dead trips and everything they referenced
        feed.prune();
        assert!(feed.trips.is_empty());
        assert!(feed.routes.is_empty());
        assert!(feed.shapes.is_empty());
        assert!(feed.stops.is_empty());
    }

    #[test]
    fn test_build_feed_is_deterministic() {
        let pfeed = test_pfeed(2, None);
        let a = build_feed(&pfeed, DEFAULT_BUFFER, DEFAULT_SEPARATOR).unwrap();
        let b = build_feed(&pfeed, DEFAULT_BUFFER, DEFAULT_SEPARATOR).unwrap();
        for (x, y) in a.stop_times.iter().zip(b.stop_times.iter()) {
            assert_eq!(x.trip_id, y.trip_id);
            assert_eq!(x.arrival_time, y.arrival_time);
            assert_eq!(x.shape_dist_traveled, y.shape_dist_traveled);
        }
        assert_eq!(a.stop_times.len(), b.stop_times.len());
    }

    #[test]
    fn test_reversed_direction_reverses_geometry() {
        let pfeed = test_pfeed(2, None);
        let paths = build_shape_paths(&pfeed, DEFAULT_SEPARATOR);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].shape_id, "sh1-0");
        assert_eq!(paths[1].shape_id, "sh1-1");
        let forward: Vec<_> = paths[0].geometry.coords().copied().collect();
        let mut reversed: Vec<_> = paths[1].geometry.coords().copied().collect();
        reversed.reverse();
        assert_eq!(forward, reversed);
    }
}
