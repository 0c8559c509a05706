use std::path::Path;

use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::feed::{self, feed_ops};
use crate::protofeed;

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum FeedOperation {
    /// build a GTFS feed from the protofeed files in a source directory
    Build {
        /// directory containing meta.csv, service_windows.csv,
        /// frequencies.csv, shapes.geojson, and optionally stops.csv and
        /// speed_zones.geojson
        source: String,
        /// output directory, or a path ending in .zip for an archive
        target: String,
        /// meters to buffer trip paths by when locating stops
        #[arg(long, default_value_t = feed_ops::DEFAULT_BUFFER)]
        buffer: f64,
        /// separator joining the chunks of generated identifiers; must not
        /// occur inside any route or service window id
        #[arg(long, default_value_t = String::from(feed_ops::DEFAULT_SEPARATOR))]
        separator: String,
    },
}

impl FeedOperation {
    pub fn run(&self) {
        match self {
            FeedOperation::Build {
                source,
                target,
                buffer,
                separator,
            } => {
                let pfeed = protofeed::read_protofeed(Path::new(source))
                    .expect("failed reading protofeed");
                let mut built = feed::build_feed(&pfeed, *buffer, separator)
                    .expect("failed building feed");
                built.prune();
                log::info!(
                    "built feed: {} routes, {} trips, {} stops, {} stop times",
                    built.routes.len(),
                    built.trips.len(),
                    built.stops.len(),
                    built.stop_times.len()
                );
                built
                    .write(Path::new(target))
                    .unwrap_or_else(|e| panic!("failed writing feed to {target}: {e}"))
            }
        }
    }
}
