use crate::protofeed::ProtoFeedError;
use crate::synth::SynthError;

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("{0}")]
    SynthError(#[from] SynthError),
    #[error("{0}")]
    ProtoFeedError(#[from] ProtoFeedError),
    #[error("Failed to write feed file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to serialize feed table: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Failed to write feed archive: {0}")]
    ZipError(#[from] zip::result::ZipError),
    #[error("{0}")]
    OtherError(String),
}
