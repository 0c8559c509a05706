use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// which side(s) of a trip path to search for stops
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrafficSide {
    Left,
    Right,
    Both,
}

/// immutable lookup from an agency timezone to the side of the street
/// vehicles keep to there. loaded once and injected into the stop locator;
/// unlisted timezones resolve to right-hand traffic.
#[derive(Debug, Clone)]
pub struct TrafficSideTable {
    left_hand_timezones: HashSet<String>,
}

impl TrafficSideTable {
    /// build the table from an explicit set of left-hand-traffic timezones
    pub fn new<I, S>(left_hand_timezones: I) -> TrafficSideTable
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrafficSideTable {
            left_hand_timezones: left_hand_timezones.into_iter().map(|s| s.into()).collect(),
        }
    }

    /// the built-in table covering the tz database zones of
    /// left-hand-traffic countries
    pub fn builtin() -> TrafficSideTable {
        TrafficSideTable::new(LEFT_HAND_TIMEZONES.iter().copied())
    }

    pub fn side_for(&self, timezone: &str) -> TrafficSide {
        if self.left_hand_timezones.contains(timezone) {
            TrafficSide::Left
        } else {
            TrafficSide::Right
        }
    }
}

/// tz database zone names located in countries that drive on the left
const LEFT_HAND_TIMEZONES: &[&str] = &[
    "Africa/Blantyre",
    "Africa/Dar_es_Salaam",
    "Africa/Gaborone",
    "Africa/Harare",
    "Africa/Johannesburg",
    "Africa/Kampala",
    "Africa/Lusaka",
    "Africa/Maputo",
    "Africa/Maseru",
    "Africa/Mbabane",
    "Africa/Nairobi",
    "Africa/Windhoek",
    "America/Antigua",
    "America/Barbados",
    "America/Dominica",
    "America/Grenada",
    "America/Guyana",
    "America/Jamaica",
    "America/Nassau",
    "America/Paramaribo",
    "America/Port_of_Spain",
    "America/St_Kitts",
    "America/St_Lucia",
    "America/St_Vincent",
    "Asia/Bangkok",
    "Asia/Brunei",
    "Asia/Colombo",
    "Asia/Dhaka",
    "Asia/Dili",
    "Asia/Famagusta",
    "Asia/Hong_Kong",
    "Asia/Jakarta",
    "Asia/Jayapura",
    "Asia/Karachi",
    "Asia/Kathmandu",
    "Asia/Kolkata",
    "Asia/Kuala_Lumpur",
    "Asia/Kuching",
    "Asia/Macau",
    "Asia/Makassar",
    "Asia/Nicosia",
    "Asia/Pontianak",
    "Asia/Singapore",
    "Asia/Thimphu",
    "Asia/Tokyo",
    "Australia/Adelaide",
    "Australia/Brisbane",
    "Australia/Broken_Hill",
    "Australia/Darwin",
    "Australia/Eucla",
    "Australia/Hobart",
    "Australia/Lindeman",
    "Australia/Lord_Howe",
    "Australia/Melbourne",
    "Australia/Perth",
    "Australia/Sydney",
    "Europe/Dublin",
    "Europe/London",
    "Europe/Malta",
    "Indian/Mahe",
    "Indian/Maldives",
    "Indian/Mauritius",
    "Pacific/Apia",
    "Pacific/Auckland",
    "Pacific/Bougainville",
    "Pacific/Chatham",
    "Pacific/Fiji",
    "Pacific/Funafuti",
    "Pacific/Guadalcanal",
    "Pacific/Kanton",
    "Pacific/Kiritimati",
    "Pacific/Nauru",
    "Pacific/Niue",
    "Pacific/Port_Moresby",
    "Pacific/Tarawa",
    "Pacific/Tongatapu",
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_side_lookup() {
        let table = TrafficSideTable::builtin();
        assert_eq!(table.side_for("Pacific/Auckland"), TrafficSide::Left);
        assert_eq!(table.side_for("Europe/London"), TrafficSide::Left);
        assert_eq!(table.side_for("America/Denver"), TrafficSide::Right);
        assert_eq!(table.side_for("not/a_zone"), TrafficSide::Right);
    }
}
