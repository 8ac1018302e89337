use std::path::PathBuf;

/// Fatal errors that abort an audit run.
///
/// None of these produce a partial report: the caller either gets a complete
/// `AuditReport` or one of these.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The io error is part of the message, not a chained source, so
    /// `{:#}` prints it once.
    #[error("cannot read '{}': {error}", path.display())]
    FileSystem { path: PathBuf, error: std::io::Error },

    #[error("malformed catalog '{}': {message}", path.display())]
    CatalogFormat { path: PathBuf, message: String },

    #[error("invalid locale code '{0}'")]
    InvalidLocale(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AuditError {
    pub fn file_system(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        AuditError::FileSystem {
            path: path.into(),
            error,
        }
    }

    pub fn catalog_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AuditError::CatalogFormat {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
