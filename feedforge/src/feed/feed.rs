use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::feed::{
    AgencyRow, CalendarRow, FeedError, RouteRow, ShapeRow, StopTimeRow, TripRow,
};
use crate::protofeed::StopRecord;

/// a complete synthesized feed held in memory as its seven output tables
#[derive(Debug, Clone)]
pub struct Feed {
    pub agency: AgencyRow,
    pub calendar: Vec<CalendarRow>,
    pub routes: Vec<RouteRow>,
    pub shapes: Vec<ShapeRow>,
    pub stops: Vec<StopRecord>,
    pub trips: Vec<TripRow>,
    pub stop_times: Vec<StopTimeRow>,
}

impl Feed {
    /// drop trips that produced no stop times, then the shapes, routes,
    /// services, and stops nothing references anymore
    pub fn prune(&mut self) {
        let active_trips: HashSet<String> =
            self.stop_times.iter().map(|r| r.trip_id.clone()).collect();
        let before = self.trips.len();
        self.trips.retain(|t| active_trips.contains(&t.trip_id));
        if self.trips.len() < before {
            log::info!(
                "pruned {} trips without stop times",
                before - self.trips.len()
            );
        }

        let active_shapes: HashSet<String> = self.trips.iter().map(|t| t.shape_id.clone()).collect();
        self.shapes.retain(|s| active_shapes.contains(&s.shape_id));

        let active_routes: HashSet<String> =
            self.trips.iter().map(|t| t.route_id.clone()).collect();
        self.routes.retain(|r| active_routes.contains(&r.route_id));

        let active_services: HashSet<String> =
            self.trips.iter().map(|t| t.service_id.clone()).collect();
        self.calendar
            .retain(|c| active_services.contains(&c.service_id));

        let active_stops: HashSet<String> =
            self.stop_times.iter().map(|r| r.stop_id.clone()).collect();
        self.stops.retain(|s| active_stops.contains(&s.stop_id));
    }

    /// write the feed to the given target: a zip archive when the path ends
    /// in `.zip`, otherwise a directory of GTFS text files (created if
    /// missing)
    pub fn write(&self, target: &Path) -> Result<(), FeedError> {
        let is_zip = target
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);
        if is_zip {
            self.write_zip(target)
        } else {
            self.write_dir(target)
        }
    }

    fn write_dir(&self, dir: &Path) -> Result<(), FeedError> {
        fs::create_dir_all(dir)?;
        write_table(&dir.join("agency.txt"), std::slice::from_ref(&self.agency))?;
        write_table(&dir.join("calendar.txt"), &self.calendar)?;
        write_table(&dir.join("routes.txt"), &self.routes)?;
        write_table(&dir.join("shapes.txt"), &self.shapes)?;
        write_table(&dir.join("stops.txt"), &self.stops)?;
        write_table(&dir.join("trips.txt"), &self.trips)?;
        write_table(&dir.join("stop_times.txt"), &self.stop_times)?;
        log::info!("wrote feed to directory {}", dir.display());
        Ok(())
    }

    fn write_zip(&self, path: &Path) -> Result<(), FeedError> {
        let file = File::create(path)?;
        let mut archive = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        let tables = [
            ("agency.txt", table_bytes(std::slice::from_ref(&self.agency))?),
            ("calendar.txt", table_bytes(&self.calendar)?),
            ("routes.txt", table_bytes(&self.routes)?),
            ("shapes.txt", table_bytes(&self.shapes)?),
            ("stops.txt", table_bytes(&self.stops)?),
            ("trips.txt", table_bytes(&self.trips)?),
            ("stop_times.txt", table_bytes(&self.stop_times)?),
        ];
        for (name, bytes) in tables {
            archive.start_file(name, options)?;
            archive.write_all(&bytes)?;
        }
        archive.finish()?;
        log::info!("wrote feed archive {}", path.display());
        Ok(())
    }
}

fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), FeedError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    for row in rows.iter() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn table_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, FeedError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    for row in rows.iter() {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| FeedError::OtherError(format!("Failed to flush feed table: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;

    fn tiny_feed() -> Feed {
        Feed {
            agency: AgencyRow {
                agency_name: String::from("Flatland Transit"),
                agency_url: String::from("https://example.com"),
                agency_timezone: String::from("America/Denver"),
            },
            calendar: vec![CalendarRow {
                service_id: String::from("srv1111100"),
                monday: 1,
                tuesday: 1,
                wednesday: 1,
                thursday: 1,
                friday: 1,
                saturday: 0,
                sunday: 0,
                start_date: String::from("20240101"),
                end_date: String::from("20241231"),
            }],
            routes: vec![RouteRow {
                route_id: String::from("r51X"),
                route_short_name: String::from("51X"),
                route_long_name: String::from("Crosstown Express"),
                route_type: 3,
            }],
            shapes: vec![ShapeRow {
                shape_id: String::from("sh1-0"),
                shape_pt_sequence: 0,
                shape_pt_lon: 0.0,
                shape_pt_lat: 0.0,
            }],
            stops: vec![StopRecord {
                stop_id: String::from("stp-sh1-0-0"),
                stop_name: None,
                stop_lon: 0.0,
                stop_lat: 0.0,
            }],
            trips: vec![TripRow {
                route_id: String::from("r51X"),
                trip_id: String::from("t-r51X-peak-06:00:00-0-0"),
                direction_id: 0,
                shape_id: String::from("sh1-0"),
                service_id: String::from("srv1111100"),
            }],
            stop_times: vec![StopTimeRow {
                trip_id: String::from("t-r51X-peak-06:00:00-0-0"),
                stop_id: String::from("stp-sh1-0-0"),
                stop_sequence: 0,
                arrival_time: String::from("06:00:00"),
                departure_time: String::from("06:00:00"),
                shape_dist_traveled: 0,
            }],
        }
    }

    #[test]
    fn test_write_directory() {
        let dir = std::env::temp_dir().join(format!("feedforge-dir-test-{}", std::process::id()));
        tiny_feed().write(&dir).unwrap();
        for name in [
            "agency.txt",
            "calendar.txt",
            "routes.txt",
            "shapes.txt",
            "stops.txt",
            "trips.txt",
            "stop_times.txt",
        ] {
            assert!(dir.join(name).exists(), "missing {name}");
        }
        let agency = fs::read_to_string(dir.join("agency.txt")).unwrap();
        assert!(agency.starts_with("agency_name,agency_url,agency_timezone"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_zip_archive() {
        let path =
            std::env::temp_dir().join(format!("feedforge-zip-test-{}.zip", std::process::id()));
        tiny_feed().write(&path).unwrap();
        let file = File::open(&path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 7);
        fs::remove_file(&path).ok();
    }
}
