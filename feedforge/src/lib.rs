pub mod app;
pub mod feed;
pub mod protofeed;
pub mod synth;
