//! Filter operator registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use super::FilterItem;
use crate::model::column::ColumnType;
use crate::model::value::CellValue;

/// Tests one row value.
pub type Predicate = Box<dyn Fn(&CellValue) -> bool + Send + Sync>;

/// Builds a predicate for a filter item, or `None` when the item filters
/// nothing.
pub type PredicateFactory = Arc<dyn Fn(&FilterItem) -> Option<Predicate> + Send + Sync>;

/// A named filter operation offered by a column.
#[derive(Clone)]
pub struct Operator {
    id: String,
    label: String,
    requires_value: bool,
    factory: PredicateFactory,
}

impl Operator {
    fn builtin<F>(id: &str, label: &str, requires_value: bool, factory: F) -> Self
    where
        F: Fn(&FilterItem) -> Option<Predicate> + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            requires_value,
            factory: Arc::new(factory),
        }
    }

    /// Creates a host-defined operator.
    ///
    /// Like the built-in comparison operators, it filters nothing while the
    /// item's value is unspecified; see [`Operator::without_value`].
    ///
    /// # Example
    ///
    /// ```
    /// use lattice_grid::model::{CellValue, Operator, Predicate};
    ///
    /// let even = Operator::custom("isEven", "is even", |_item| {
    ///     Some(Box::new(|value: &CellValue| value.to_number() % 2.0 == 0.0) as Predicate)
    /// })
    /// .without_value();
    /// assert_eq!(even.id(), "isEven");
    /// ```
    pub fn custom<F>(id: impl Into<String>, label: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&FilterItem) -> Option<Predicate> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            requires_value: true,
            factory: Arc::new(factory),
        }
    }

    /// Marks the operator as active even when the item has no value.
    pub fn without_value(mut self) -> Self {
        self.requires_value = false;
        self
    }

    /// Returns the operator id stored in [`FilterItem::operator`].
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if the operator needs a filter value to do anything.
    pub fn requires_value(&self) -> bool {
        self.requires_value
    }

    /// Builds the predicate for `item`.
    ///
    /// `None` means the item passes every row.
    pub fn apply(&self, item: &FilterItem) -> Option<Predicate> {
        if self.requires_value && item.is_value_unspecified() {
            return None;
        }
        (self.factory)(item)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("requires_value", &self.requires_value)
            .finish_non_exhaustive()
    }
}

/// Returns the default operators for a column type, in menu order.
pub fn operators_for_type(column_type: ColumnType) -> Arc<[Operator]> {
    REGISTRY
        .get(&column_type)
        .cloned()
        .unwrap_or_else(|| Arc::from(Vec::new()))
}

/// Finds an operator by id.
pub fn find_operator<'a>(operators: &'a [Operator], id: &str) -> Option<&'a Operator> {
    operators.iter().find(|operator| operator.id == id)
}

static REGISTRY: LazyLock<HashMap<ColumnType, Arc<[Operator]>>> = LazyLock::new(|| {
    HashMap::from([
        (ColumnType::String, Arc::from(string_operators())),
        (ColumnType::Number, Arc::from(number_operators())),
        (ColumnType::Boolean, Arc::from(boolean_operators())),
        (ColumnType::Date, Arc::from(date_operators())),
        (ColumnType::SingleSelect, Arc::from(single_select_operators())),
    ])
});

fn filter_value(item: &FilterItem) -> CellValue {
    item.value.clone().unwrap_or_default()
}

fn predicate<F>(f: F) -> Option<Predicate>
where
    F: Fn(&CellValue) -> bool + Send + Sync + 'static,
{
    Some(Box::new(f))
}

// =============================================================================
// String
// =============================================================================

fn string_operators() -> Vec<Operator> {
    fn text_match(matches: fn(&str, &str) -> bool) -> impl Fn(&FilterItem) -> Option<Predicate> {
        move |item: &FilterItem| {
            let needle = filter_value(item).to_display_string().to_lowercase();
            predicate(move |value| matches(&value.to_display_string().to_lowercase(), &needle))
        }
    }

    vec![
        Operator::builtin("contains", "contains", true, text_match(|hay, needle| hay.contains(needle))),
        Operator::builtin("equals", "equals", true, text_match(|hay, needle| hay == needle)),
        Operator::builtin("startsWith", "starts with", true, text_match(|hay, needle| hay.starts_with(needle))),
        Operator::builtin("endsWith", "ends with", true, text_match(|hay, needle| hay.ends_with(needle))),
        Operator::builtin("isEmpty", "is empty", false, |_| predicate(is_blank)),
        Operator::builtin("isNotEmpty", "is not empty", false, |_| predicate(|value| !is_blank(value))),
    ]
}

fn is_blank(value: &CellValue) -> bool {
    value.is_null() || value.to_display_string().trim().is_empty()
}

// =============================================================================
// Number
// =============================================================================

fn number_operators() -> Vec<Operator> {
    fn compare(test: fn(f64, f64) -> bool) -> impl Fn(&FilterItem) -> Option<Predicate> {
        move |item: &FilterItem| {
            let target = filter_value(item).to_number();
            predicate(move |value| test(value.to_number(), target))
        }
    }

    fn is_missing(value: &CellValue) -> bool {
        value.is_null() || value.is_empty_string()
    }

    vec![
        Operator::builtin("=", "=", true, compare(|a, b| a == b)),
        Operator::builtin("!=", "!=", true, compare(|a, b| a != b)),
        Operator::builtin(">", ">", true, compare(|a, b| a > b)),
        Operator::builtin(">=", ">=", true, compare(|a, b| a >= b)),
        Operator::builtin("<", "<", true, compare(|a, b| a < b)),
        Operator::builtin("<=", "<=", true, compare(|a, b| a <= b)),
        Operator::builtin("isEmpty", "is empty", false, |_| predicate(is_missing)),
        Operator::builtin("isNotEmpty", "is not empty", false, |_| predicate(|value| !is_missing(value))),
    ]
}

// =============================================================================
// Boolean
// =============================================================================

fn boolean_operators() -> Vec<Operator> {
    vec![Operator::builtin("is", "is", true, |item| {
        let wanted = filter_value(item).to_display_string() == "true";
        predicate(move |value| value.to_bool() == wanted)
    })]
}

// =============================================================================
// Date
// =============================================================================

fn date_operators() -> Vec<Operator> {
    fn instant(test: fn(f64, f64) -> bool) -> impl Fn(&FilterItem) -> Option<Predicate> {
        move |item: &FilterItem| {
            let target = filter_value(item).to_timestamp_millis();
            predicate(move |value| test(value.to_timestamp_millis(), target))
        }
    }

    vec![
        Operator::builtin("is", "is", true, |item| {
            let day = filter_value(item).day_key();
            predicate(move |value| match (&day, value.day_key()) {
                (Some(target), Some(current)) => *target == current,
                _ => false,
            })
        }),
        Operator::builtin("after", "is after", true, instant(|a, b| a > b)),
        Operator::builtin("before", "is before", true, instant(|a, b| a < b)),
    ]
}

// =============================================================================
// Single select
// =============================================================================

fn single_select_operators() -> Vec<Operator> {
    vec![
        Operator::builtin("is", "is", true, |item| {
            let target = filter_value(item).to_display_string();
            predicate(move |value| value.to_display_string() == target)
        }),
        Operator::builtin("not", "is not", true, |item| {
            let target = filter_value(item).to_display_string();
            predicate(move |value| value.to_display_string() != target)
        }),
        Operator::builtin("isAnyOf", "is any of", true, |item| {
            let options = filter_value(item).to_string_list();
            if options.is_empty() {
                return None;
            }
            predicate(move |value| options.contains(&value.to_display_string()))
        }),
    ]
}
