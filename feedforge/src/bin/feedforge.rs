//! synthesizes a complete GTFS feed from a protofeed directory.
use clap::Parser;
use feedforge::app::FeedApp;

fn main() {
    env_logger::init();
    let args = FeedApp::parse();
    args.op.run()
}
