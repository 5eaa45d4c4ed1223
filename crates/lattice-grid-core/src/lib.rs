//! Core runtime for Lattice Grid.
//!
//! This crate provides the small reactive toolkit the grid engine is built on:
//!
//! - **Property System**: Values with change detection ([`Property`])
//! - **Signal/Slot System**: Type-safe change notification ([`Signal`])
//! - **Controllable State**: Cells that are either owned by the engine or
//!   mirrored from an external owner ([`StateCell`], [`OwnedCell`], [`ExternalCell`])
//! - **Logging**: `tracing` targets and span helpers used across the workspace
//!
//! # Signal/Slot Example
//!
//! ```
//! use lattice_grid_core::Signal;
//!
//! let page_changed = Signal::<usize>::new();
//!
//! let conn_id = page_changed.connect(|page| {
//!     println!("Now showing page {}", page);
//! });
//!
//! page_changed.emit(2);
//! page_changed.disconnect(conn_id);
//! ```
//!
//! # Controllable State Example
//!
//! ```
//! use lattice_grid_core::{ExternalCell, OwnedCell, StateCell};
//!
//! // The engine owns this value and mutates it in place.
//! let owned = OwnedCell::new(10usize);
//! assert!(owned.set(25));
//! assert_eq!(owned.get(), 25);
//!
//! // The host owns this value; the engine only forwards requests.
//! let external = ExternalCell::new(10usize).with_callback(|next: usize| {
//!     println!("host asked to change page size to {}", next);
//! });
//! assert!(!external.set(25));
//! assert_eq!(external.get(), 10);
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;
pub mod state;

pub use error::{Error, Result};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionId, Signal};
pub use state::{ChangeCallback, ExternalCell, OwnedCell, StateCell};
