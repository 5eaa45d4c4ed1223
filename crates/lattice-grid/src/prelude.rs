//! Prelude module for Lattice Grid.
//!
//! ```ignore
//! use lattice_grid::prelude::*;
//! ```

// ============================================================================
// Engine
// ============================================================================

pub use crate::model::{GridView, GridViewBuilder, RowWindow};
pub use crate::{GridConfig, GridError};

// ============================================================================
// Schema and rows
// ============================================================================

pub use crate::model::{CellValue, Column, ColumnType, GridRow, PinnedSide, RowId};

// ============================================================================
// State models
// ============================================================================

pub use crate::model::{
    FilterItem, FilterModel, GridOverlayState, LogicOperator, Operator, PageAction, PaginationModel,
    RowSelectionModel, SelectAllState, SortDirection, SortItem, SortModel,
};

// ============================================================================
// Layout
// ============================================================================

pub use crate::model::{CellSurface, PinnedStyle};

// ============================================================================
// Signals
// ============================================================================

pub use lattice_grid_core::{ConnectionId, Signal};
