//! Controllable state cells.
//!
//! Every piece of mutable grid state (filter, sort, selection, pagination) is
//! held in a [`StateCell`]. A cell is one of two kinds, chosen once when it is
//! created and never switched afterwards:
//!
//! - [`OwnedCell`]: the engine owns the value. `set()` writes it locally and
//!   then notifies the optional change callback.
//! - [`ExternalCell`]: a host owns the value. The cell only mirrors the last
//!   value the host pushed in through `receive()`, and `set()` forwards the
//!   request to the host callback without touching the mirror. The host is
//!   expected to feed the accepted value back with `receive()`.
//!
//! Callers never branch on the kind; they talk to `dyn StateCell<T>`.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::property::Property;

/// Callback invoked with a requested (external) or applied (owned) value.
pub type ChangeCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A value plus a setter whose behavior depends on who owns the value.
pub trait StateCell<T>: Send + Sync {
    /// Returns the current value.
    fn get(&self) -> T;

    /// Requests a change.
    ///
    /// Returns `true` if the value stored in this cell changed, which only
    /// ever happens for owned cells.
    fn set(&self, next: T) -> bool;

    /// Pushes a value supplied by the external owner into the cell.
    ///
    /// Returns `false` (and leaves the value untouched) for owned cells.
    fn receive(&self, value: T) -> bool;

    /// Returns `true` when the value is owned outside the engine.
    fn is_external(&self) -> bool;

    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Like [`receive`](Self::receive), but reports owned cells as an error.
    fn try_receive(&self, value: T) -> Result<()> {
        if self.receive(value) {
            Ok(())
        } else {
            Err(Error::NotExternal { name: self.name() })
        }
    }

    /// Like [`set`](Self::set), but reports requests nobody can act on.
    fn try_set(&self, next: T) -> Result<bool> {
        Ok(self.set(next))
    }
}

/// A state cell whose value is owned by the engine.
pub struct OwnedCell<T> {
    name: &'static str,
    value: Property<T>,
    on_change: Option<ChangeCallback<T>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> OwnedCell<T> {
    /// Creates an owned cell with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            name: "state",
            value: Property::new(value),
            on_change: None,
        }
    }

    /// Sets the name used in logs and errors.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Registers a callback notified after every applied change.
    pub fn with_callback<F>(self, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.with_shared_callback(Arc::new(callback))
    }

    /// Registers an already shared callback.
    pub fn with_shared_callback(mut self, callback: ChangeCallback<T>) -> Self {
        self.on_change = Some(callback);
        self
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StateCell<T> for OwnedCell<T> {
    fn get(&self) -> T {
        self.value.get()
    }

    fn set(&self, next: T) -> bool {
        if !self.value.set(next.clone()) {
            tracing::trace!(target: "lattice_grid_core::state", cell = self.name, "value unchanged");
            return false;
        }

        tracing::debug!(target: "lattice_grid_core::state", cell = self.name, "owned value updated");
        if let Some(callback) = &self.on_change {
            callback(next);
        }
        true
    }

    fn receive(&self, _value: T) -> bool {
        tracing::warn!(
            target: "lattice_grid_core::state",
            cell = self.name,
            "ignoring external value for internally owned state"
        );
        false
    }

    fn is_external(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A state cell mirroring a value owned by the host.
pub struct ExternalCell<T> {
    name: &'static str,
    mirror: Property<T>,
    on_change: Option<ChangeCallback<T>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> ExternalCell<T> {
    /// Creates an external cell mirroring the host's current value.
    pub fn new(value: T) -> Self {
        Self {
            name: "state",
            mirror: Property::new(value),
            on_change: None,
        }
    }

    /// Sets the name used in logs and errors.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Registers the callback that receives change requests.
    pub fn with_callback<F>(self, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.with_shared_callback(Arc::new(callback))
    }

    /// Registers an already shared callback.
    pub fn with_shared_callback(mut self, callback: ChangeCallback<T>) -> Self {
        self.on_change = Some(callback);
        self
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StateCell<T> for ExternalCell<T> {
    fn get(&self) -> T {
        self.mirror.get()
    }

    fn set(&self, next: T) -> bool {
        match &self.on_change {
            Some(callback) => {
                tracing::debug!(target: "lattice_grid_core::state", cell = self.name, "forwarding change request to host");
                callback(next);
            }
            None => {
                tracing::warn!(
                    target: "lattice_grid_core::state",
                    cell = self.name,
                    "change requested on controlled state without a callback; dropped"
                );
            }
        }
        false
    }

    fn receive(&self, value: T) -> bool {
        self.mirror.set_silent(value);
        true
    }

    fn is_external(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn try_set(&self, next: T) -> Result<bool> {
        if self.on_change.is_none() {
            return Err(Error::ReadOnly { name: self.name });
        }
        Ok(self.set(next))
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for OwnedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedCell")
            .field("name", &self.name)
            .field("value", &self.value.get())
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ExternalCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalCell")
            .field("name", &self.name)
            .field("mirror", &self.mirror.get())
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(OwnedCell<Arc<Vec<u64>>>: Send, Sync);
static_assertions::assert_impl_all!(ExternalCell<Arc<Vec<u64>>>: Send, Sync);
