#[derive(thiserror::Error, Debug)]
pub enum ProtoFeedError {
    #[error("Failed to read protofeed file {path}: {source}")]
    FileReadError {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to read CSV rows from {path}: {message}")]
    CsvReadError { path: String, message: String },
    #[error("Failed to parse GeoJSON file {path}: {message}")]
    GeoJsonReadError { path: String, message: String },
    #[error("Feature '{0}' has missing or invalid geometry: {1}")]
    InvalidGeometryError(String, String),
    #[error("Feature is missing required property '{0}'")]
    MissingPropertyError(String),
    #[error("meta.csv must contain exactly one row")]
    InvalidMetaError,
}
