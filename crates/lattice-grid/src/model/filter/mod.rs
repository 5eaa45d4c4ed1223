//! Filtering.
//!
//! A [`FilterModel`] is a list of [`FilterItem`]s combined with a
//! [`LogicOperator`]. Each item names a column, one of the column's filter
//! operators and an optional filter value. Operators come from a per-type
//! catalog (see [`operators_for_type`]) that individual columns may replace.
//!
//! Malformed items never fail: an item that references an unknown column or
//! an operator the column does not offer passes every row.

mod evaluator;
mod operators;

use serde::{Deserialize, Serialize};

use super::value::CellValue;

pub use evaluator::{evaluate, filter_rows, CompiledFilter};
pub use operators::{find_operator, operators_for_type, Operator, Predicate, PredicateFactory};

/// One filter condition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterItem {
    /// Host-assigned identifier, used to address the item in edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Field of the column the condition applies to.
    pub field: String,
    /// Operator id, e.g. `contains` or `>=`.
    pub operator: String,
    /// Filter value; `None` leaves most operators inactive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CellValue>,
}

impl FilterItem {
    /// Creates an item without a value.
    pub fn new(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            id: None,
            field: field.into(),
            operator: operator.into(),
            value: None,
        }
    }

    /// Sets the filter value.
    pub fn with_value(mut self, value: impl Into<CellValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the item id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns `true` when the value is absent, null or the empty string.
    pub fn is_value_unspecified(&self) -> bool {
        match &self.value {
            None => true,
            Some(value) => value.is_null() || value.is_empty_string(),
        }
    }
}

/// How item results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicOperator {
    /// Every item must pass.
    And,
    /// At least one item must pass (default).
    #[default]
    Or,
}

/// The complete filter state of a grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterModel {
    /// Conditions, in the order the user added them.
    #[serde(default)]
    pub items: Vec<FilterItem>,
    /// Combination rule.
    #[serde(default)]
    pub logic_operator: LogicOperator,
}

impl FilterModel {
    /// Creates a model from items with the default `or` combination.
    pub fn new(items: Vec<FilterItem>) -> Self {
        Self {
            items,
            logic_operator: LogicOperator::Or,
        }
    }

    /// Sets the combination rule.
    pub fn with_logic_operator(mut self, logic_operator: LogicOperator) -> Self {
        self.logic_operator = logic_operator;
        self
    }

    /// Returns `true` when the model filters nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns a copy with `item` inserted, replacing the item with the same
    /// id (or, for items without an id, the same field).
    pub fn upserted(&self, item: FilterItem) -> Self {
        let mut items = self.items.clone();
        let existing = items.iter().position(|current| match (current.id, item.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => current.field == item.field,
            _ => false,
        });
        match existing {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
        Self {
            items,
            logic_operator: self.logic_operator,
        }
    }

    /// Returns a copy without the item matching `id`.
    pub fn without_item(&self, id: u64) -> Self {
        Self {
            items: self.items.iter().filter(|item| item.id != Some(id)).cloned().collect(),
            logic_operator: self.logic_operator,
        }
    }

    /// Next id that is not used by any item.
    pub fn next_item_id(&self) -> u64 {
        self.items.iter().filter_map(|item| item.id).max().map_or(1, |max| max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspecified_values() {
        assert!(FilterItem::new("name", "contains").is_value_unspecified());
        assert!(FilterItem::new("name", "contains").with_value("").is_value_unspecified());
        assert!(FilterItem::new("name", "contains")
            .with_value(CellValue::Null)
            .is_value_unspecified());
        assert!(!FilterItem::new("name", "contains").with_value(" ").is_value_unspecified());
        assert!(!FilterItem::new("age", "=").with_value(0).is_value_unspecified());
    }

    #[test]
    fn test_upsert_by_id_and_field() {
        let model = FilterModel::new(vec![FilterItem::new("name", "contains").with_id(1)]);

        let replaced = model.upserted(FilterItem::new("name", "equals").with_id(1));
        assert_eq!(replaced.items.len(), 1);
        assert_eq!(replaced.items[0].operator, "equals");

        let appended = replaced.upserted(FilterItem::new("age", ">").with_id(2));
        assert_eq!(appended.items.len(), 2);
        assert_eq!(appended.next_item_id(), 3);

        let removed = appended.without_item(1);
        assert_eq!(removed.items.len(), 1);
        assert_eq!(removed.items[0].field, "age");
        // The source model is untouched.
        assert_eq!(model.items[0].operator, "contains");
    }

    #[test]
    fn test_model_json_shape() {
        let json = r#"{
            "items": [{ "field": "name", "operator": "contains", "value": "jon" }],
            "logicOperator": "and"
        }"#;
        let model: FilterModel = serde_json::from_str(json).unwrap();

        assert_eq!(model.logic_operator, LogicOperator::And);
        assert_eq!(model.items[0].value, Some(CellValue::from("jon")));
        assert_eq!(FilterModel::default().logic_operator, LogicOperator::Or);
    }
}
