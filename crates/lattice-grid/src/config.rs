//! Grid configuration.
//!
//! [`GridConfig`] gathers the switches a host usually keeps in a settings
//! file. Every field has a default, so a config file only lists what differs:
//!
//! ```
//! use lattice_grid::GridConfig;
//!
//! let config = GridConfig::from_toml_str(
//!     r#"
//!     page_size = 50
//!     page_size_options = [50, 100]
//!     checkbox_selection = true
//!     "#,
//! )?;
//! assert_eq!(config.page_size, 50);
//! assert!(config.pagination);
//! # Ok::<(), lattice_grid::GridError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::model::{LogicOperator, DEFAULT_COLUMN_WIDTH, DEFAULT_PAGE_SIZE, SELECTION_COLUMN_WIDTH};

/// Behavior switches of a grid view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Split rows into pages. When off, every filtered row is visible.
    pub pagination: bool,
    /// Initial rows per page.
    pub page_size: usize,
    /// Choices offered by the page size selector.
    pub page_size_options: Vec<usize>,
    /// Show the row selection checkbox column.
    pub checkbox_selection: bool,
    /// Ignore clicks on rows for selection purposes.
    pub disable_row_selection_on_click: bool,
    /// Turn filtering off; the filter model is kept but not applied.
    pub disable_column_filter: bool,
    /// Width of columns that do not configure one.
    pub default_column_width: f32,
    /// Width of the checkbox column.
    pub selection_column_width: f32,
    /// Logic operator of new filter models.
    pub default_logic_operator: LogicOperator,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pagination: true,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![25, 50, 100],
            checkbox_selection: false,
            disable_row_selection_on_click: false,
            disable_column_filter: false,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            selection_column_width: SELECTION_COLUMN_WIDTH,
            default_logic_operator: LogicOperator::Or,
        }
    }
}

impl GridConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| GridError::io(path, err))?;
        tracing::debug!(target: "lattice_grid::pipeline", path = %path.display(), "loading grid configuration");
        Self::from_toml_str(&source)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the page size settings.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(GridError::InvalidPageSize { page_size: 0 });
        }
        if self.page_size_options.is_empty() {
            return Err(GridError::EmptyPageSizeOptions);
        }
        if self.page_size_options.contains(&0) {
            return Err(GridError::InvalidPageSize { page_size: 0 });
        }
        if !self.page_size_options.contains(&self.page_size) {
            tracing::warn!(
                target: "lattice_grid::pagination",
                page_size = self.page_size,
                options = ?self.page_size_options,
                "page size is not one of the page size options"
            );
        }
        Ok(())
    }
}
