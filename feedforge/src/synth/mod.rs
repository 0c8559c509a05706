pub mod corridor_ops;
mod route_path;
pub mod speed_profile_ops;
pub mod stop_time_ops;
mod synth_error;
mod template_cache;
pub mod time_ops;
mod traffic_side;
mod trip_key;
mod trip_ops;

pub use corridor_ops::{buffer_linestring, buffer_side, get_stops_nearby, CapStyle, StopIndex};
pub use route_path::RoutePath;
pub use speed_profile_ops::{compute_shape_point_speeds, SamplePosition, SpeedSample};
pub use stop_time_ops::{build_stop_times_for_trip, StopTimeTemplateRow};
pub use synth_error::SynthError;
pub use template_cache::{TemplateCache, TemplateKey};
pub use traffic_side::{TrafficSide, TrafficSideTable};
pub use trip_key::TripKey;
pub use trip_ops::{build_trips, TripRecord};
