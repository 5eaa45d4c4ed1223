//! Data model and view pipeline of the grid.
//!
//! # Core Types
//!
//! - `CellValue`: A value read from a row, with the coercions operators rely on
//! - `Column`: Schema entry describing how a field is read, shown, filtered and laid out
//! - `GridRow` / `RowId`: Field access and identity of opaque rows
//! - `FilterModel`, `SortModel`, `PaginationModel`, `RowSelectionModel`: The
//!   four pieces of mutable grid state, always replaced wholesale
//! - `GridOverlayState`: Which overlay is open
//!
//! # Stages
//!
//! - [`filter`]: Operator registry and evaluator
//! - [`sort`]: Null-last, type-aware, stable ordering
//! - [`pagination`]: Page arithmetic and slicing
//! - [`selection`]: Selected row ids and the select-all rule
//! - [`pinned`]: Sticky offsets of frozen columns
//! - [`pipeline`]: `GridView`, which runs the stages and owns or mirrors the state
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │   rows   │──>│  filter  │──>│   sort   │──>│ paginate │──> visible rows
//! └──────────┘   └──────────┘   └──────────┘   └──────────┘
//!      │
//!      ├──> selection (row ids of the visible page)
//!      └──> pinned layout (column order and widths)
//! ```

mod column;
pub mod filter;
mod overlay;
pub mod pagination;
pub mod pinned;
pub mod pipeline;
mod row;
pub mod selection;
pub mod sort;
mod value;

pub use column::{
    find_column, CellRenderer, Column, ColumnType, PinnedSide, ValueFormatter, ValueGetter, DEFAULT_COLUMN_WIDTH,
};
pub use filter::{
    evaluate, filter_rows, find_operator, operators_for_type, CompiledFilter, FilterItem, FilterModel, LogicOperator,
    Operator, Predicate, PredicateFactory,
};
pub use overlay::GridOverlayState;
pub use pagination::{PageAction, PaginationModel, DEFAULT_PAGE_SIZE};
pub use pinned::{display_order, CellSurface, PinnedLayout, PinnedOffset, PinnedStyle, SELECTION_COLUMN_WIDTH};
pub use pipeline::{GridView, GridViewBuilder, RowWindow};
pub use row::{default_row_id, GridRow, RowId, RowIdGetter};
pub use selection::{RowSelectionModel, SelectAllState};
pub use sort::{compare_values, locale_compare, SortDirection, SortItem, SortModel};
pub use value::CellValue;
