//! Property system for Lattice Grid.
//!
//! A [`Property<T>`] wraps a value and reports whether a write actually
//! changed it. It does not notify anyone by itself; the owner pairs it with a
//! [`Signal`](crate::Signal) and emits when `set()` returns `true`.
//!
//! # Example
//!
//! ```
//! use lattice_grid_core::{Property, Signal};
//!
//! struct Pager {
//!     page: Property<usize>,
//!     page_changed: Signal<usize>,
//! }
//!
//! impl Pager {
//!     fn set_page(&self, page: usize) {
//!         if self.page.set(page) {
//!             self.page_changed.emit(page);
//!         }
//!     }
//! }
//!
//! let pager = Pager { page: Property::new(0), page_changed: Signal::new() };
//! pager.set_page(3);
//! assert_eq!(pager.page.get(), 3);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value with change detection.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
///
/// # Example
///
/// ```
/// use lattice_grid_core::Property;
///
/// let prop = Property::new(42);
/// assert_eq!(prop.get(), 42);
///
/// // Setting same value returns false (no change)
/// assert!(!prop.set(42));
///
/// // Setting different value returns true (changed)
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

static_assertions::assert_impl_all!(Property<Vec<String>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);

        assert!(!prop.set(10));
        assert_eq!(prop.get(), 10);

        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_set_silent_skips_change_detection() {
        let prop = Property::new(1);
        prop.set_silent(5);
        assert_eq!(prop.get(), 5);
        assert!(!prop.set(5));
    }

    #[test]
    fn test_arc_values_compare_by_content() {
        let prop = Property::new(Arc::new(vec![1, 2]));

        // A fresh allocation with equal content is not a change.
        assert!(!prop.set(Arc::new(vec![1, 2])));
        assert!(prop.set(Arc::new(vec![2, 1])));
    }
}
