use thiserror::Error;

use crate::app::domain::conversion::ConversionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Print error: {0}")]
    Print(String),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("read-only volume"));
    }

    #[test]
    fn test_conversion_error_conversion() {
        let app_err: AppError = ConversionError::EmptyMarkdown.into();
        assert!(matches!(app_err, AppError::Conversion(_)));
        assert!(app_err.to_string().starts_with("Conversion error:"));
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");

        let err = AppError::Workspace("not a directory".to_string());
        assert_eq!(err.to_string(), "Workspace error: not a directory");

        let err = AppError::Print("no browser".to_string());
        assert_eq!(err.to_string(), "Print error: no browser");
    }
}
