//! builds the distance-ordered speed profile of a path by overlaying the
//! speed zones of one route type.
use std::collections::HashSet;

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Distance, Euclidean, LineInterpolatePoint, LineLocatePoint, Point};

use crate::protofeed::SpeedZone;
use crate::synth::RoutePath;

/// meters to probe past a zone crossing when deciding which zone a boundary
/// sample belongs to
const BOUNDARY_NUDGE: f64 = 0.001;

/// where a profile sample came from. boundary samples order before vertex
/// samples at equal distance, so co-located samples have a deterministic
/// relative order and the two kinds are never confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SamplePosition {
    /// the path crossed a speed zone boundary here
    Boundary,
    /// the n-th vertex of the path polyline
    Vertex(u32),
}

/// one entry of a path's speed profile
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedSample {
    /// distance from the path start in meters
    pub distance: f64,
    pub position: SamplePosition,
    pub zone_id: String,
    /// zone speed in kph; may be the unbounded sentinel
    pub speed: f64,
}

/// build the ordered (distance, speed, zone) profile of a path from the
/// speed zones of the given route type: one sample per path vertex at its
/// cumulative distance, plus one sample per point where the path crosses a
/// zone boundary, everything joined against the zone polygons and sorted by
/// (distance, position).
///
/// returns an empty profile when no zones match the route type; the caller
/// then falls back entirely to its default speed.
pub fn compute_shape_point_speeds(
    path: &RoutePath,
    zones: &[SpeedZone],
    route_type: u16,
) -> Vec<SpeedSample> {
    let zones: Vec<&SpeedZone> = zones.iter().filter(|z| z.route_type == route_type).collect();
    if zones.is_empty() {
        return Vec::new();
    }

    let mut samples = Vec::new();

    // vertex samples at cumulative distances
    let mut cumulative = 0.0;
    let mut prev: Option<Point<f64>> = None;
    for (i, coord) in path.geometry.coords().enumerate() {
        let point = Point::from(*coord);
        if let Some(p) = prev {
            cumulative += Euclidean.distance(p, point);
        }
        prev = Some(point);
        if let Some(zone) = zones.iter().find(|z| z.covers(&point)) {
            samples.push(SpeedSample {
                distance: cumulative,
                position: SamplePosition::Vertex(i as u32),
                zone_id: zone.zone_id.clone(),
                speed: zone.speed,
            });
        }
    }

    // boundary samples where the path crosses a zone ring, projected back
    // onto the path for their distance
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    for zone in zones.iter() {
        for ring in zone.rings() {
            for ring_line in ring.lines() {
                for path_line in path.geometry.lines() {
                    let crossing = match line_intersection(path_line, ring_line) {
                        Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                        _ => continue,
                    };
                    if !seen.insert((crossing.x.to_bits(), crossing.y.to_bits())) {
                        continue;
                    }
                    let point = Point::from(crossing);
                    let fraction = match path.geometry.line_locate_point(&point) {
                        Some(fraction) => fraction,
                        None => continue,
                    };
                    let distance = fraction * path.length;
                    // the sample carries the zone being entered, so probe a
                    // nudge downstream of the crossing
                    let probe_fraction = ((distance + BOUNDARY_NUDGE) / path.length).min(1.0);
                    let probe = path
                        .geometry
                        .line_interpolate_point(probe_fraction)
                        .unwrap_or(point);
                    if let Some(zone) = zones.iter().find(|z| z.covers(&probe)) {
                        samples.push(SpeedSample {
                            distance,
                            position: SamplePosition::Boundary,
                            zone_id: zone.zone_id.clone(),
                            speed: zone.speed,
                        });
                    }
                }
            }
        }
    }

    samples.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.position.cmp(&b.position))
    });
    samples
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{line_string, polygon, MultiPolygon};

    fn zone(zone_id: &str, route_type: u16, speed: f64, x0: f64, x1: f64) -> SpeedZone {
        SpeedZone {
            zone_id: zone_id.to_string(),
            route_type,
            speed,
            geometry: MultiPolygon::new(vec![polygon![
                (x: x0, y: -10.0),
                (x: x1, y: -10.0),
                (x: x1, y: 10.0),
                (x: x0, y: 10.0),
            ]]),
        }
    }

    fn test_path() -> RoutePath {
        RoutePath::new(
            String::from("sh1-0"),
            line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)],
        )
    }

    #[test]
    fn test_no_zones_for_route_type_is_empty() {
        let zones = vec![zone("z", 1, 30.0, -10.0, 1010.0)];
        assert!(compute_shape_point_speeds(&test_path(), &zones, 3).is_empty());
    }

    #[test]
    fn test_single_zone_profile() {
        let zones = vec![zone("z", 3, 30.0, -10.0, 1010.0)];
        let profile = compute_shape_point_speeds(&test_path(), &zones, 3);
        // both vertices inside the zone, no crossings on the path itself
        let vertices: Vec<&SpeedSample> = profile
            .iter()
            .filter(|s| matches!(s.position, SamplePosition::Vertex(_)))
            .collect();
        assert_eq!(vertices.len(), 2);
        assert_relative_eq!(vertices[0].distance, 0.0);
        assert_relative_eq!(vertices[1].distance, 1000.0);
        assert!(profile.iter().all(|s| s.speed == 30.0));
    }

    #[test]
    fn test_boundary_sample_between_zones() {
        let zones = vec![
            zone("slow", 3, 10.0, -10.0, 500.0),
            zone("fast", 3, 50.0, 500.0, 1010.0),
        ];
        let profile = compute_shape_point_speeds(&test_path(), &zones, 3);

        let boundary: Vec<&SpeedSample> = profile
            .iter()
            .filter(|s| s.position == SamplePosition::Boundary)
            .collect();
        assert_eq!(boundary.len(), 1);
        assert_relative_eq!(boundary[0].distance, 500.0, max_relative = 1e-9);
        // the boundary sample carries the zone being entered
        assert_eq!(boundary[0].zone_id, "fast");
        assert_eq!(boundary[0].speed, 50.0);

        // ordered by distance with the boundary between the two vertices
        let distances: Vec<f64> = profile.iter().map(|s| s.distance).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }
}
