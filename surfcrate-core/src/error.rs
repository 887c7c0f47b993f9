//! Error types for surfcrate

use thiserror::Error;

/// Main error type for surfcrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    /// Geometry that makes an operator singular, such as an isolated vertex
    /// or a zero-area face.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for surfcrate operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::DegenerateGeometry("vertex 3 has no neighbors".to_string());
        assert_eq!(err.to_string(), "Degenerate geometry: vertex 3 has no neighbors");

        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "points.off").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: points.off");
    }
}
