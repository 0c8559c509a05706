use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::protofeed::date_codec;

/// built-in default average speeds (kph) by GTFS route type, overridable
/// per feed via `speed_route_type_<k>` columns in meta.csv
pub const SPEED_BY_RTYPE: &[(u16, f64)] = &[
    (0, 11.0),
    (1, 30.0),
    (2, 45.0),
    (3, 22.0),
    (4, 22.0),
    (5, 13.0),
    (6, 20.0),
    (7, 18.0),
    (11, 22.0),
    (12, 65.0),
];

/// speed (kph) assumed for route types absent from [SPEED_BY_RTYPE]
pub const SPEED_FALLBACK: f64 = 22.0;

/// the single row of meta.csv: agency attributes plus the feed validity
/// period. columns of the form `speed_route_type_<k>` are captured in
/// `extra` and override the built-in default speed table.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Meta {
    pub agency_name: String,
    pub agency_url: String,
    /// tz database name, e.g. `Pacific/Auckland`; also selects the
    /// traffic side used when locating stops
    pub agency_timezone: String,
    #[serde(deserialize_with = "date_codec::deserialize_naive_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "date_codec::deserialize_naive_date")]
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

impl Meta {
    /// the default speed table with any `speed_route_type_<k>` overrides
    /// from meta.csv applied
    pub fn speed_by_route_type(&self) -> HashMap<u16, f64> {
        let mut speeds: HashMap<u16, f64> = SPEED_BY_RTYPE.iter().copied().collect();
        for (key, value) in self.extra.iter() {
            if let Some(rtype) = key.strip_prefix("speed_route_type_") {
                if let (Ok(rtype), Ok(speed)) = (rtype.parse::<u16>(), value.parse::<f64>()) {
                    speeds.insert(rtype, speed);
                }
            }
        }
        speeds
    }

    pub fn default_speed_for(&self, route_type: u16) -> f64 {
        *self
            .speed_by_route_type()
            .get(&route_type)
            .unwrap_or(&SPEED_FALLBACK)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_meta(extra: HashMap<String, String>) -> Meta {
        Meta {
            agency_name: String::from("Test Transit"),
            agency_url: String::from("https://example.com"),
            agency_timezone: String::from("Pacific/Auckland"),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            extra,
        }
    }

    #[test]
    fn test_speed_defaults() {
        let meta = test_meta(HashMap::new());
        assert_eq!(meta.default_speed_for(3), 22.0);
        assert_eq!(meta.default_speed_for(12), 65.0);
        assert_eq!(meta.default_speed_for(900), SPEED_FALLBACK);
    }

    #[test]
    fn test_speed_override() {
        let extra = HashMap::from([(String::from("speed_route_type_3"), String::from("27.5"))]);
        let meta = test_meta(extra);
        assert_eq!(meta.default_speed_for(3), 27.5);
        assert_eq!(meta.default_speed_for(1), 30.0);
    }
}
