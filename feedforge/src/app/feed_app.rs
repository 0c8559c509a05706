use super::FeedOperation;
use clap::Parser;

/// command line tool for synthesizing a complete GTFS feed from a protofeed
/// of routes, frequencies, service windows, and shapes
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct FeedApp {
    #[command(subcommand)]
    pub op: FeedOperation,
}
