//! Logging facilities for Lattice Grid.
//!
//! Lattice Grid uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("lattice_grid=debug")
//!         .init();
//! }
//! ```
//!
//! Every event is emitted with one of the [`targets`] below so a single
//! pipeline stage can be traced in isolation, e.g.
//! `RUST_LOG=lattice_grid::sort=trace`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core runtime target.
    pub const CORE: &str = "lattice_grid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lattice_grid_core::signal";
    /// Controllable state cells.
    pub const STATE: &str = "lattice_grid_core::state";
    /// Filter operator registry and evaluator.
    pub const FILTER: &str = "lattice_grid::filter";
    /// Sort comparator.
    pub const SORT: &str = "lattice_grid::sort";
    /// Pagination slicer.
    pub const PAGINATION: &str = "lattice_grid::pagination";
    /// Row selection model.
    pub const SELECTION: &str = "lattice_grid::selection";
    /// Pinned column layout.
    pub const LAYOUT: &str = "lattice_grid::layout";
    /// View pipeline orchestration and memoization.
    pub const PIPELINE: &str = "lattice_grid::pipeline";
    /// Performance spans.
    pub const PERF: &str = "lattice_grid::perf";
}

/// A guard for timing an operation.
///
/// Creates an `info` span on the [`targets::PERF`] target that stays entered
/// until the guard is dropped. Subscribers configured with span timings
/// (e.g. `FmtSpan::CLOSE`) report the elapsed time.
///
/// # Example
///
/// ```
/// use lattice_grid_core::PerfSpan;
///
/// fn refresh() {
///     let _span = PerfSpan::new("refresh");
///     // ... work ...
/// }
/// # refresh();
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "lattice_grid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}
