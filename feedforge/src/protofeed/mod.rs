pub mod date_codec;
mod frequency;
mod meta;
mod proto_feed;
mod proto_shape;
mod protofeed_error;
pub mod protofeed_ops;
mod service_window;
mod speed_zone;
mod stop;

pub use frequency::{FrequencyRow, FrequencySpec, DEFAULT_ROUTE_TYPE};
pub use meta::{Meta, SPEED_BY_RTYPE};
pub use proto_feed::ProtoFeed;
pub use proto_shape::ProtoShape;
pub use protofeed_error::ProtoFeedError;
pub use protofeed_ops::read_protofeed;
pub use service_window::ServiceWindow;
pub use speed_zone::{SpeedZone, DEFAULT_ZONE_ID};
pub use stop::StopRecord;
