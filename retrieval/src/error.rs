use std::path::PathBuf;

/// Errors raised while loading tables or resolving ranking configuration.
///
/// Query execution itself never fails: unknown terms and ids resolve to neutral
/// defaults, so nothing in the scoring path returns this type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bincode error on table {}: {source}", .path.display())]
    Bincode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
    #[error("invalid json in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown ranking preset {0:?} (expected one of: default, hybrid, precision)")]
    UnknownPreset(String),
    #[error("invalid ranking config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
