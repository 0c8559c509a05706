#[allow(clippy::module_inception)]
mod feed;
mod feed_error;
pub mod feed_ops;
mod tables;

pub use feed::Feed;
pub use feed_error::FeedError;
pub use feed_ops::{build_feed, DEFAULT_BUFFER, DEFAULT_SEPARATOR};
pub use tables::{AgencyRow, CalendarRow, RouteRow, ShapeRow, StopTimeRow, TripRow};
