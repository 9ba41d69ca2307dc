use std::path::PathBuf;

/// Errors from the host layer: reading input, writing output, loading config.
///
/// Rendering itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
