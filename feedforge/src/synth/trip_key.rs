use serde::{Deserialize, Serialize};

use crate::synth::{time_ops, SynthError};

/// the structured identity of a generated trip: the route, the service
/// window it runs in, the window start time, the direction of travel, and
/// the zero-based position of the trip within its (route, window, direction)
/// group. uniqueness follows from construction.
///
/// the key renders to a separator-joined string only at the output boundary
/// (see [TripKey::render]) and decodes back exactly, so no downstream code
/// needs to re-parse partially-joined ids. the separator must not occur
/// inside any id field; that is a precondition on the input data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TripKey {
    pub route_id: String,
    pub service_window_id: String,
    /// window start time in seconds past midnight
    pub window_start: u32,
    pub direction: u8,
    /// zero-based trip index within the (route, window, direction) group
    pub index: u32,
}

impl TripKey {
    /// the literal leading chunk of every rendered trip id
    pub const TRIP_PREFIX: &str = "t";

    /// join the key into the flat trip id used in the output tables,
    /// e.g. `t-r51X-weekday-06:00:00-0-3` with the default separator.
    pub fn render(&self, sep: &str) -> String {
        [
            Self::TRIP_PREFIX.to_string(),
            self.route_id.clone(),
            self.service_window_id.clone(),
            time_ops::seconds_to_timestr(self.window_start),
            self.direction.to_string(),
            self.index.to_string(),
        ]
        .join(sep)
    }

    /// decode a rendered trip id back into its parts
    pub fn decode(trip_id: &str, sep: &str) -> Result<TripKey, SynthError> {
        let invalid = || SynthError::InvalidTripId(trip_id.to_string(), sep.to_string());
        let parts: Vec<&str> = trip_id.split(sep).collect();
        match parts[..] {
            [prefix, route_id, service_window_id, start, direction, index]
                if prefix == Self::TRIP_PREFIX =>
            {
                Ok(TripKey {
                    route_id: route_id.to_string(),
                    service_window_id: service_window_id.to_string(),
                    window_start: time_ops::timestr_to_seconds(start)?,
                    direction: direction.parse().map_err(|_| invalid())?,
                    index: index.parse().map_err(|_| invalid())?,
                })
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_decode_roundtrip() {
        let key = TripKey {
            route_id: String::from("r51X"),
            service_window_id: String::from("weekday_peak"),
            window_start: 6 * 3600,
            direction: 1,
            index: 7,
        };
        let rendered = key.render("-");
        assert_eq!(rendered, "t-r51X-weekday_peak-06:00:00-1-7");
        assert_eq!(TripKey::decode(&rendered, "-").unwrap(), key);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TripKey::decode("not a trip id", "-").is_err());
        assert!(TripKey::decode("x-r1-w-06:00:00-0-0", "-").is_err());
    }
}
