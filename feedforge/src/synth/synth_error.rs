#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error("Invalid GTFS time string '{0}', expected HH:MM:SS")]
    InvalidTimeString(String),
    #[error("Cannot decode trip id '{0}' with separator '{1}'")]
    InvalidTripId(String, String),
    #[error("Cannot find service window ID: {0}")]
    UnknownServiceWindow(String),
    #[error("Cannot find shape ID: {0}")]
    UnknownShape(String),
    #[error("Separator '{0}' appears inside identifier '{1}'")]
    SeparatorCollision(String, String),
}
