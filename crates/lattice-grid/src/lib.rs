//! Lattice Grid - a data grid view engine.
//!
//! Turns rows and a column schema into exactly what a data grid displays:
//! typed filtering, null-aware stable sorting, pagination, row selection and
//! sticky offsets for pinned columns. Rendering is left to the host; the
//! engine only decides which rows appear, in which order, and where frozen
//! columns sit.
//!
//! # Example
//!
//! ```
//! use lattice_grid::prelude::*;
//! use serde_json::json;
//!
//! let view = GridView::builder(
//!     vec![
//!         Column::new("name").with_width(180.0).pinned(PinnedSide::Left),
//!         Column::new("age").with_type(ColumnType::Number),
//!     ],
//!     vec![
//!         json!({ "id": 1, "name": "Jon", "age": 35 }),
//!         json!({ "id": 2, "name": "Cersei", "age": 42 }),
//!         json!({ "id": 3, "name": "Arya", "age": 11 }),
//!     ],
//! )
//! .config(GridConfig { page_size: 2, page_size_options: vec![2, 4], ..GridConfig::default() })
//! .build()?;
//!
//! view.toggle_sort("age");
//! assert_eq!(view.visible_row_ids(), vec![RowId::from(3), RowId::from(1)]);
//! assert_eq!(view.range_label(), "1–2 of 3");
//!
//! view.next_page();
//! assert_eq!(view.visible_row_ids(), vec![RowId::from(2)]);
//! # Ok::<(), GridError>(())
//! ```
//!
//! # Logging
//!
//! Every stage logs through `tracing` with the targets listed in
//! [`lattice_grid_core::logging::targets`]. The library never installs a
//! subscriber.

mod config;
mod error;
pub mod model;
pub mod prelude;

pub use config::GridConfig;
pub use error::{GridError, Result};

pub use lattice_grid_core::{ExternalCell, OwnedCell, Signal, StateCell};
