//! Sorting.
//!
//! Only the first entry of a [`SortModel`] is active. Rows are ordered by
//! the active column's values using a comparator that depends on the column
//! type, and rows with a null value always go last regardless of direction.
//! The sort is stable, so ties keep their incoming order.

use std::cmp::Ordering;
use std::sync::LazyLock;

use icu::collator::options::{CollatorOptions, Strength};
use icu::collator::{Collator, CollatorBorrowed};
use serde::{Deserialize, Serialize};

use super::column::{find_column, Column, ColumnType};
use super::row::GridRow;
use super::value::CellValue;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Next state of the header click cycle: none → asc → desc → none.
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        }
    }
}

/// Sort applied to one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortItem {
    /// Field of the sorted column.
    pub field: String,
    /// Direction.
    pub sort: SortDirection,
}

impl SortItem {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: SortDirection::Desc,
        }
    }
}

/// Ordered sort list. Only the first item is applied.
pub type SortModel = Vec<SortItem>;

/// Returns the direction `model` applies to `field`, if it is the active sort.
pub fn active_direction(model: &[SortItem], field: &str) -> Option<SortDirection> {
    model.first().filter(|item| item.field == field).map(|item| item.sort)
}

/// Root collation shared by every text comparison.
///
/// `None` only if the compiled collation data fails to load.
static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> = LazyLock::new(|| {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            tracing::warn!(target: "lattice_grid::sort", error = %err, "collation data unavailable, comparing case-folded text");
            None
        }
    }
});

/// Compares two text values the way a user expects to read them sorted.
///
/// Uses Unicode collation: accents and case are secondary to the base
/// letters, and among strings that only differ in case, lowercase comes
/// before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    match COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => {
            let folded_a = a.chars().flat_map(char::to_lowercase);
            let folded_b = b.chars().flat_map(char::to_lowercase);
            folded_a.cmp(folded_b).then_with(|| b.cmp(a))
        }
    }
}

/// Precomputed comparison key of one value.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Null,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn new(value: &CellValue, column_type: ColumnType) -> Self {
        match (value, column_type) {
            (CellValue::Null, _) => SortKey::Null,
            (_, ColumnType::Number) => SortKey::Number(value.to_number()),
            (_, ColumnType::Date) => SortKey::Number(value.to_timestamp_millis()),
            _ => SortKey::Text(value.to_display_string()),
        }
    }
}

/// Orders two numbers; NaN ties with NaN and sorts after every number.
fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (SortKey::Null, SortKey::Null) => return Ordering::Equal,
        (SortKey::Null, _) => return Ordering::Greater,
        (_, SortKey::Null) => return Ordering::Less,
        (SortKey::Number(x), SortKey::Number(y)) => compare_numbers(*x, *y),
        (SortKey::Text(x), SortKey::Text(y)) => locale_compare(x, y),
        // Keys of one column always share a kind.
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Compares two cell values of a column of `column_type`.
///
/// Nulls go after every other value in both directions.
pub fn compare_values(a: &CellValue, b: &CellValue, column_type: ColumnType, direction: SortDirection) -> Ordering {
    compare_keys(&SortKey::new(a, column_type), &SortKey::new(b, column_type), direction)
}

/// Reorders `indices` (positions into `rows`) according to `model`.
///
/// Returns the indices unchanged when the model is empty or names an unknown
/// column.
#[tracing::instrument(skip_all, target = "lattice_grid::sort", level = "trace")]
pub fn sort_indices<R: GridRow>(rows: &[R], indices: &[usize], model: &[SortItem], columns: &[Column<R>]) -> Vec<usize> {
    let Some(active) = model.first() else {
        return indices.to_vec();
    };
    let Some(column) = find_column(columns, &active.field) else {
        tracing::debug!(target: "lattice_grid::sort", field = %active.field, "unknown sort column, keeping order");
        return indices.to_vec();
    };

    let column_type = column.column_type();
    let mut decorated: Vec<(usize, SortKey)> = indices
        .iter()
        .map(|&index| (index, SortKey::new(&column.value(&rows[index]), column_type)))
        .collect();
    decorated.sort_by(|(_, a), (_, b)| compare_keys(a, b, active.sort));

    tracing::debug!(
        target: "lattice_grid::sort",
        field = %active.field,
        direction = ?active.sort,
        rows = decorated.len(),
        "sorted rows"
    );
    decorated.into_iter().map(|(index, _)| index).collect()
}

/// Returns a sorted copy of `rows`.
pub fn sort<R: GridRow + Clone>(rows: &[R], model: &[SortItem], columns: &[Column<R>]) -> Vec<R> {
    let all: Vec<usize> = (0..rows.len()).collect();
    sort_indices(rows, &all, model, columns)
        .into_iter()
        .map(|index| rows[index].clone())
        .collect()
}
