//! expands frequency specifications into discrete trip records.
use crate::protofeed::{FrequencySpec, ServiceWindow};
use crate::synth::{time_ops, SynthError, TripKey};

/// a generated trip: the output identity columns plus the group attributes
/// (route type, frequency, default speed) that stop time synthesis groups
/// by. created once per generation run and never mutated.
#[derive(Debug, Clone)]
pub struct TripRecord {
    pub route_id: String,
    pub key: TripKey,
    pub direction_id: u8,
    /// direction-qualified shape id, e.g. `sh1-0`
    pub shape_id: String,
    pub service_id: String,
    pub route_type: u16,
    /// vehicles per hour during the trip's service window
    pub frequency: u32,
    /// default speed (kph) applied wherever no speed zone overrides it
    pub speed: f64,
}

impl TripRecord {
    /// departure time from the start of the path in seconds past midnight:
    /// the window start plus one headway per preceding trip in the group
    pub fn start_time(&self) -> f64 {
        let headway = 3600.0 / f64::from(self.frequency);
        f64::from(self.key.window_start) + headway * f64::from(self.key.index)
    }
}

/// expand every (frequency spec, service window) combination into
/// `floor(frequency x window hours)` trips per direction. a zero frequency
/// produces no trips and no error. `direction == 2` expands into directions
/// 0 and 1, each with its own independently computed full count; the
/// doubling is deliberate.
pub fn build_trips(
    frequencies: &[FrequencySpec],
    service_windows: &[ServiceWindow],
    separator: &str,
) -> Result<Vec<TripRecord>, SynthError> {
    let mut trips = Vec::new();
    for spec in frequencies.iter() {
        if spec.frequency == 0 {
            // no trips during this service window
            continue;
        }
        let window = service_windows
            .iter()
            .find(|w| w.service_window_id == spec.service_window_id)
            .ok_or_else(|| SynthError::UnknownServiceWindow(spec.service_window_id.clone()))?;

        let route_id = spec.route_id();
        check_separator(separator, &route_id)?;
        check_separator(separator, &window.service_window_id)?;
        check_separator(separator, &time_ops::seconds_to_timestr(window.start_time))?;

        // truncation is deliberate: a fractional trailing trip is dropped
        let count = (f64::from(spec.frequency) * window.duration_hours()).floor() as u32;
        let directions: &[u8] = if spec.direction == 2 {
            &[0, 1]
        } else {
            std::slice::from_ref(&spec.direction)
        };
        for direction in directions.iter().copied() {
            let shape_id = format!("{}{}{}", spec.shape_id, separator, direction);
            for index in 0..count {
                trips.push(TripRecord {
                    route_id: route_id.clone(),
                    key: TripKey {
                        route_id: route_id.clone(),
                        service_window_id: window.service_window_id.clone(),
                        window_start: window.start_time,
                        direction,
                        index,
                    },
                    direction_id: direction,
                    shape_id: shape_id.clone(),
                    service_id: window.service_id(),
                    route_type: spec.route_type,
                    frequency: spec.frequency,
                    speed: spec.speed,
                });
            }
        }
    }
    Ok(trips)
}

/// trip ids are re-split on the separator downstream, so it may not occur
/// inside any joined field
fn check_separator(separator: &str, field: &str) -> Result<(), SynthError> {
    if field.contains(separator) {
        return Err(SynthError::SeparatorCollision(
            separator.to_string(),
            field.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn window(id: &str, start: u32, end: u32) -> ServiceWindow {
        ServiceWindow {
            service_window_id: id.to_string(),
            start_time: start,
            end_time: end,
            monday: 1,
            tuesday: 1,
            wednesday: 1,
            thursday: 1,
            friday: 1,
            saturday: 0,
            sunday: 0,
        }
    }

    fn spec(direction: u8, frequency: u32) -> FrequencySpec {
        FrequencySpec {
            route_short_name: String::from("51X"),
            route_long_name: String::from("Crosstown Express"),
            route_type: 3,
            service_window_id: String::from("peak"),
            direction,
            frequency,
            shape_id: String::from("sh1"),
            speed: 22.0,
        }
    }

    #[test]
    fn test_count_is_frequency_times_hours() {
        // 4 per hour over a 3 hour window
        let trips = build_trips(&[spec(0, 4)], &[window("peak", 6 * 3600, 9 * 3600)], "-").unwrap();
        assert_eq!(trips.len(), 12);
        assert!(trips.iter().all(|t| t.direction_id == 0));
        assert!(trips.iter().all(|t| t.shape_id == "sh1-0"));
        let indices: Vec<u32> = trips.iter().map(|t| t.key.index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_direction_two_doubles_deliberately() {
        let trips = build_trips(&[spec(2, 4)], &[window("peak", 6 * 3600, 9 * 3600)], "-").unwrap();
        assert_eq!(trips.len(), 24);
        let outbound = trips.iter().filter(|t| t.direction_id == 0).count();
        let inbound = trips.iter().filter(|t| t.direction_id == 1).count();
        assert_eq!(outbound, 12);
        assert_eq!(inbound, 12);
        assert!(trips
            .iter()
            .all(|t| t.shape_id == format!("sh1-{}", t.direction_id)));
    }

    #[test]
    fn test_zero_frequency_is_silent() {
        let trips = build_trips(&[spec(0, 0)], &[window("peak", 6 * 3600, 9 * 3600)], "-").unwrap();
        assert!(trips.is_empty());
    }

    #[test]
    fn test_fractional_count_truncates() {
        // 3 per hour over 90 minutes: 4.5 rounds down to 4
        let trips = build_trips(
            &[spec(1, 3)],
            &[window("peak", 6 * 3600, 6 * 3600 + 5400)],
            "-",
        )
        .unwrap();
        assert_eq!(trips.len(), 4);
        assert!(trips.iter().all(|t| t.direction_id == 1));
    }

    #[test]
    fn test_start_times_step_by_headway() {
        let trips = build_trips(&[spec(0, 4)], &[window("peak", 6 * 3600, 9 * 3600)], "-").unwrap();
        assert_relative_eq!(trips[0].start_time(), 6.0 * 3600.0);
        assert_relative_eq!(trips[3].start_time(), 6.0 * 3600.0 + 3.0 * 900.0);
    }

    #[test]
    fn test_unknown_window_errors() {
        assert!(build_trips(&[spec(0, 4)], &[window("offpeak", 0, 3600)], "-").is_err());
    }

    #[test]
    fn test_separator_collision_surfaces() {
        let result = build_trips(&[spec(0, 4)], &[window("peak", 6 * 3600, 9 * 3600)], "X");
        assert!(matches!(result, Err(SynthError::SeparatorCollision(_, _))));
    }
}
