//! Column schema.
//!
//! A [`Column`] describes how one field of a row is read, displayed, sorted,
//! filtered and laid out. Columns are generic over the row type so that value
//! getters and cell renderers can work with application types directly.
//!
//! # Example
//!
//! ```
//! use lattice_grid::model::{CellValue, Column, ColumnType, PinnedSide};
//!
//! let columns: Vec<Column<serde_json::Value>> = vec![
//!     Column::new("id").with_type(ColumnType::Number).with_width(80.0).pinned(PinnedSide::Left),
//!     Column::new("name").with_header_name("Name"),
//!     Column::new("age")
//!         .with_type(ColumnType::Number)
//!         .with_value_formatter(|value| match value {
//!             CellValue::Null => "unknown".to_string(),
//!             other => format!("{other} years"),
//!         }),
//! ];
//! assert_eq!(columns[1].header_name(), "Name");
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::filter::{operators_for_type, Operator};
use super::row::GridRow;
use super::value::CellValue;

/// Width used for columns that do not configure one.
pub const DEFAULT_COLUMN_WIDTH: f32 = 150.0;

/// Data type of a column; selects default operators and sort comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    /// Free text (default).
    #[default]
    String,
    /// Numeric values.
    Number,
    /// True/false values.
    Boolean,
    /// Dates and timestamps.
    Date,
    /// One value out of a fixed option list.
    SingleSelect,
}

/// Edge a column is frozen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PinnedSide {
    /// Scrolls with the body (default).
    #[default]
    None,
    /// Frozen to the left edge.
    Left,
    /// Frozen to the right edge.
    Right,
}

impl PinnedSide {
    /// Returns `true` for left or right pinning.
    pub fn is_pinned(self) -> bool {
        !matches!(self, PinnedSide::None)
    }
}

/// Extracts a column's value from a row.
pub type ValueGetter<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// Turns a value into its display text.
pub type ValueFormatter = Arc<dyn Fn(&CellValue) -> String + Send + Sync>;

/// Produces a cell's content from `(row, value, field)`.
pub type CellRenderer<R> = Arc<dyn Fn(&R, &CellValue, &str) -> String + Send + Sync>;

/// Schema entry describing one field of the grid.
pub struct Column<R> {
    field: String,
    header_name: Option<String>,
    column_type: ColumnType,
    sortable: bool,
    filterable: bool,
    width: Option<f32>,
    min_width: Option<f32>,
    max_width: Option<f32>,
    pinned: PinnedSide,
    value_getter: Option<ValueGetter<R>>,
    value_formatter: Option<ValueFormatter>,
    render_cell: Option<CellRenderer<R>>,
    filter_operators: Option<Arc<[Operator]>>,
    value_options: Vec<CellValue>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            header_name: self.header_name.clone(),
            column_type: self.column_type,
            sortable: self.sortable,
            filterable: self.filterable,
            width: self.width,
            min_width: self.min_width,
            max_width: self.max_width,
            pinned: self.pinned,
            value_getter: self.value_getter.clone(),
            value_formatter: self.value_formatter.clone(),
            render_cell: self.render_cell.clone(),
            filter_operators: self.filter_operators.clone(),
            value_options: self.value_options.clone(),
        }
    }
}

impl<R: GridRow> Column<R> {
    /// Creates a string column reading `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header_name: None,
            column_type: ColumnType::String,
            sortable: true,
            filterable: true,
            width: None,
            min_width: None,
            max_width: None,
            pinned: PinnedSide::None,
            value_getter: None,
            value_formatter: None,
            render_cell: None,
            filter_operators: None,
            value_options: Vec::new(),
        }
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Sets the header text.
    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = Some(header_name.into());
        self
    }

    /// Sets the data type.
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Sets whether clicking the header cycles the sort.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets whether the column is offered in the filter panel.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets the configured width in pixels.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the minimum width in pixels.
    pub fn with_min_width(mut self, min_width: f32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    /// Sets the maximum width in pixels.
    pub fn with_max_width(mut self, max_width: f32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Freezes the column to an edge.
    pub fn pinned(mut self, side: PinnedSide) -> Self {
        self.pinned = side;
        self
    }

    /// Reads the value through a getter instead of direct field lookup.
    pub fn with_value_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.value_getter = Some(Arc::new(getter));
        self
    }

    /// Formats values for display.
    pub fn with_value_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&CellValue) -> String + Send + Sync + 'static,
    {
        self.value_formatter = Some(Arc::new(formatter));
        self
    }

    /// Renders cell content.
    pub fn with_render_cell<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&R, &CellValue, &str) -> String + Send + Sync + 'static,
    {
        self.render_cell = Some(Arc::new(renderer));
        self
    }

    /// Replaces the type's default filter operators for this column.
    pub fn with_filter_operators(mut self, operators: impl Into<Arc<[Operator]>>) -> Self {
        self.filter_operators = Some(operators.into());
        self
    }

    /// Sets the allowed values of a single-select column.
    pub fn with_value_options<V: Into<CellValue>>(mut self, options: impl IntoIterator<Item = V>) -> Self {
        self.value_options = options.into_iter().map(Into::into).collect();
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the field key.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the header text, defaulting to the field key.
    pub fn header_name(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.field)
    }

    /// Returns the data type.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns whether header clicks may change the sort.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Returns whether the column is offered for filtering.
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Returns the configured width, if any.
    pub fn width(&self) -> Option<f32> {
        self.width
    }

    /// Returns the pinned side.
    pub fn pinned_side(&self) -> PinnedSide {
        self.pinned
    }

    /// Returns the single-select options.
    pub fn value_options(&self) -> &[CellValue] {
        &self.value_options
    }

    /// Returns the per-column operator override, if any.
    pub fn filter_operator_override(&self) -> Option<&[Operator]> {
        self.filter_operators.as_deref()
    }

    /// Filter operators offered by this column: the override, or the
    /// defaults for its type.
    pub fn operators(&self) -> Arc<[Operator]> {
        self.filter_operators
            .clone()
            .unwrap_or_else(|| operators_for_type(self.column_type))
    }

    /// Width used for layout: the configured width (or `default_width`),
    /// clamped to the configured minimum and maximum.
    pub fn effective_width(&self, default_width: f32) -> f32 {
        let mut width = self.width.unwrap_or(default_width);
        if let Some(min) = self.min_width {
            width = width.max(min);
        }
        if let Some(max) = self.max_width {
            width = width.min(max);
        }
        width
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Reads this column's value from a row.
    pub fn value(&self, row: &R) -> CellValue {
        match &self.value_getter {
            Some(getter) => getter(row),
            None => row.field(&self.field),
        }
    }

    /// Formats a value for display.
    pub fn format_value(&self, value: &CellValue) -> String {
        match &self.value_formatter {
            Some(formatter) => formatter(value),
            None => value.to_display_string(),
        }
    }

    /// Produces the content of this column's cell for a row.
    ///
    /// Uses the cell renderer when present, otherwise the formatted value.
    pub fn render(&self, row: &R) -> String {
        let value = self.value(row);
        match &self.render_cell {
            Some(renderer) => renderer(row, &value, &self.field),
            None => self.format_value(&value),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("field", &self.field)
            .field("type", &self.column_type)
            .field("width", &self.width)
            .field("pinned", &self.pinned)
            .field("has_value_getter", &self.value_getter.is_some())
            .field("has_operator_override", &self.filter_operators.is_some())
            .finish_non_exhaustive()
    }
}

/// Finds a column by field key.
pub fn find_column<'a, R>(columns: &'a [Column<R>], field: &str) -> Option<&'a Column<R>> {
    columns.iter().find(|column| column.field == field)
}
