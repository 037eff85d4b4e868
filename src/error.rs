use thiserror::Error;

/// Main error type for Taggai
#[derive(Error, Debug)]
pub enum TaggaiError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input from a caller (blank tag name, bad filter, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Video not found
    #[error("Video not found: {0}")]
    VideoNotFound(i64),

    /// Blocking database task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

/// Convenient Result type using TaggaiError
pub type Result<T> = std::result::Result<T, TaggaiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaggaiError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_video_not_found_display() {
        let err = TaggaiError::VideoNotFound(42);
        assert_eq!(err.to_string(), "Video not found: 42");
    }

    #[test]
    fn test_error_from_rusqlite() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let taggai_err: TaggaiError = rusqlite_err.into();
        assert!(matches!(taggai_err, TaggaiError::Database(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let taggai_err: TaggaiError = io_err.into();
        assert!(matches!(taggai_err, TaggaiError::Io(_)));
    }
}
