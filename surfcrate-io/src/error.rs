//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IoResult<T> = std::result::Result<T, IoError>;

impl From<IoError> for surfcrate_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => surfcrate_core::Error::Io(e),
            IoError::FileNotFound { path } => surfcrate_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path),
            )),
            IoError::InvalidFormat { format } => surfcrate_core::Error::UnsupportedFormat(format),
            other @ IoError::ParseError { .. } => surfcrate_core::Error::InvalidData(other.to_string()),
        }
    }
}

/// Open `path` for reading, reporting a missing file as [`IoError::FileNotFound`]
pub(crate) fn open(path: &std::path::Path) -> IoResult<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => IoError::Io(e),
    })
}
