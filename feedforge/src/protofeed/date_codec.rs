//! deserializers for calendar dates in GTFS yyyymmdd format.
use chrono::NaiveDate;
use serde::{de::Error, Deserialize, Deserializer};

pub const GTFS_DATE_FORMAT: &str = "%Y%m%d";

pub fn deserialize_naive_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let date_str: String = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&date_str, GTFS_DATE_FORMAT)
        .map_err(|e| D::Error::custom(format!("Invalid date format: {e}")))
}

/// render a date back into the GTFS yyyymmdd form used in calendar.txt
pub fn format_gtfs_date(date: &NaiveDate) -> String {
    date.format(GTFS_DATE_FORMAT).to_string()
}
