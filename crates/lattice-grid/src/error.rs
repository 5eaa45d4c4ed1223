//! Error types for grid construction and configuration.
//!
//! The view pipeline itself never fails: malformed filter items, unknown sort
//! fields and out-of-range pages all degrade to "no effect". Errors only
//! arise when a grid is built or its configuration is loaded.

use std::path::PathBuf;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur while building a grid or loading its configuration.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Two columns share a field key.
    #[error("Duplicate column field '{field}'")]
    DuplicateField { field: String },

    /// A page size of zero was configured.
    #[error("Invalid page size {page_size}: must be at least 1")]
    InvalidPageSize { page_size: usize },

    /// The page size selector has no options.
    #[error("Page size options must not be empty")]
    EmptyPageSizeOptions,

    /// Configuration text could not be parsed.
    #[error("Failed to parse {format} configuration: {message}")]
    ConfigParse {
        format: &'static str,
        message: String,
    },

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Strict state-cell operation failed.
    #[error(transparent)]
    State(#[from] lattice_grid_core::Error),
}

impl GridError {
    /// Create a duplicate field error.
    pub fn duplicate_field(field: impl Into<String>) -> Self {
        Self::DuplicateField { field: field.into() }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for GridError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse {
            format: "TOML",
            message: err.message().to_string(),
        }
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse {
            format: "JSON",
            message: err.to_string(),
        }
    }
}
