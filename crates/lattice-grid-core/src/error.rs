//! Error types for the Lattice Grid core runtime.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by strict state-cell operations.
///
/// The lenient entry points ([`StateCell::set`](crate::StateCell::set) and
/// [`StateCell::receive`](crate::StateCell::receive)) never fail; they log and
/// report through their return value instead. The `try_*` variants surface
/// the same conditions as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An external value was pushed into a cell the engine owns.
    #[error("State cell '{name}' is internally owned and cannot receive external values")]
    NotExternal {
        /// Name of the cell.
        name: &'static str,
    },

    /// A change was requested on an external cell that has no change callback.
    #[error("State cell '{name}' is externally controlled without a change callback")]
    ReadOnly {
        /// Name of the cell.
        name: &'static str,
    },
}
