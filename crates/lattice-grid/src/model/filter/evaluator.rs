//! Filter evaluation.

use super::{find_operator, FilterModel, LogicOperator, Predicate};
use crate::model::column::{find_column, Column};
use crate::model::row::GridRow;

/// A filter model resolved against a column set.
///
/// Resolving columns and building predicates happens once per model, so a
/// compiled filter is what row loops should use.
pub struct CompiledFilter<'a, R> {
    conditions: Vec<(&'a Column<R>, Predicate)>,
    logic_operator: LogicOperator,
    has_passing_item: bool,
    identity: bool,
}

impl<'a, R: GridRow> CompiledFilter<'a, R> {
    /// Resolves every item of `model` against `columns`.
    pub fn compile(model: &FilterModel, columns: &'a [Column<R>]) -> Self {
        let mut conditions = Vec::with_capacity(model.items.len());
        let mut has_passing_item = false;

        for item in &model.items {
            let Some(column) = find_column(columns, &item.field) else {
                tracing::trace!(target: "lattice_grid::filter", field = %item.field, "unknown column, item passes");
                has_passing_item = true;
                continue;
            };

            let operators = column.operators();
            let Some(operator) = find_operator(&operators, &item.operator) else {
                tracing::trace!(
                    target: "lattice_grid::filter",
                    field = %item.field,
                    operator = %item.operator,
                    "operator not offered by column, item passes"
                );
                has_passing_item = true;
                continue;
            };

            match operator.apply(item) {
                Some(predicate) => conditions.push((column, predicate)),
                None => has_passing_item = true,
            }
        }

        Self {
            conditions,
            logic_operator: model.logic_operator,
            has_passing_item,
            identity: model.items.is_empty(),
        }
    }

    /// Returns `true` when every row passes regardless of its values.
    pub fn is_identity(&self) -> bool {
        if self.identity {
            return true;
        }
        match self.logic_operator {
            LogicOperator::And => self.conditions.is_empty(),
            LogicOperator::Or => self.has_passing_item,
        }
    }

    /// Tests one row.
    pub fn matches(&self, row: &R) -> bool {
        if self.is_identity() {
            return true;
        }
        let mut results = self
            .conditions
            .iter()
            .map(|(column, predicate)| predicate(&column.value(row)));
        match self.logic_operator {
            LogicOperator::And => results.all(|passed| passed),
            LogicOperator::Or => results.any(|passed| passed),
        }
    }
}

/// Tests one row against a filter model.
///
/// Items naming an unknown column, an operator the column does not offer, or
/// no value pass. Item results are combined with `all` for
/// [`LogicOperator::And`] and `any` for [`LogicOperator::Or`]; an empty model
/// passes every row.
pub fn evaluate<R: GridRow>(row: &R, model: &FilterModel, columns: &[Column<R>]) -> bool {
    CompiledFilter::compile(model, columns).matches(row)
}

/// Returns the indices of the rows that pass `model`, in source order.
#[tracing::instrument(skip_all, target = "lattice_grid::filter", level = "trace")]
pub fn filter_rows<R: GridRow>(rows: &[R], model: &FilterModel, columns: &[Column<R>]) -> Vec<usize> {
    let filter = CompiledFilter::compile(model, columns);
    if filter.is_identity() {
        return (0..rows.len()).collect();
    }

    let kept: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filter.matches(row))
        .map(|(index, _)| index)
        .collect();
    tracing::debug!(
        target: "lattice_grid::filter",
        total = rows.len(),
        kept = kept.len(),
        items = model.items.len(),
        "filtered rows"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::ColumnType;
    use crate::model::filter::{FilterItem, Operator};
    use crate::model::value::CellValue;
    use serde_json::{json, Value};

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::new("id").with_type(ColumnType::Number),
            Column::new("name"),
            Column::new("age").with_type(ColumnType::Number),
        ]
    }

    fn rows() -> Vec<Value> {
        vec![
            json!({ "id": 1, "name": "Jon", "age": 35 }),
            json!({ "id": 2, "name": "Cersei", "age": 42 }),
            json!({ "id": 3, "name": "Jaime", "age": 42 }),
            json!({ "id": 4, "name": "Arya", "age": 11 }),
            json!({ "id": 5, "name": "Daenerys", "age": null }),
        ]
    }

    fn ids(rows: &[Value], indices: &[usize]) -> Vec<i64> {
        indices.iter().map(|&i| rows[i]["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_empty_model_is_identity() {
        let rows = rows();
        assert_eq!(filter_rows(&rows, &FilterModel::default(), &columns()), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let rows = rows();
        let model = FilterModel::new(vec![FilterItem::new("name", "contains").with_value("JON")]);

        assert_eq!(ids(&rows, &filter_rows(&rows, &model, &columns())), vec![1]);
    }

    #[test]
    fn test_and_or_composition() {
        let rows = rows();
        let items = vec![
            FilterItem::new("name", "startsWith").with_value("j"),
            FilterItem::new("age", ">").with_value(40),
        ];

        let and = FilterModel::new(items.clone()).with_logic_operator(LogicOperator::And);
        let or = FilterModel::new(items).with_logic_operator(LogicOperator::Or);

        assert_eq!(ids(&rows, &filter_rows(&rows, &and, &columns())), vec![3]);
        assert_eq!(ids(&rows, &filter_rows(&rows, &or, &columns())), vec![1, 2, 3]);
    }

    #[test]
    fn test_numeric_string_coercion() {
        let rows = vec![json!({ "age": "10" }), json!({ "age": "9" })];
        let columns: Vec<Column<Value>> = vec![Column::new("age").with_type(ColumnType::Number)];
        let model = FilterModel::new(vec![FilterItem::new("age", ">").with_value("9")]);

        assert_eq!(filter_rows(&rows, &model, &columns), vec![0]);
    }

    #[test]
    fn test_unknown_column_passes() {
        let rows = rows();
        let model = FilterModel::new(vec![
            FilterItem::new("house", "contains").with_value("Stark"),
            FilterItem::new("name", "contains").with_value("arya"),
        ])
        .with_logic_operator(LogicOperator::And);

        assert_eq!(ids(&rows, &filter_rows(&rows, &model, &columns())), vec![4]);
        assert!(evaluate(&rows[3], &model, &columns()));
    }

    #[test]
    fn test_unknown_operator_passes() {
        let rows = rows();
        let model = FilterModel::new(vec![FilterItem::new("name", "matchesRegex").with_value("^J")]);

        assert_eq!(filter_rows(&rows, &model, &columns()).len(), rows.len());
    }

    #[test]
    fn test_value_getter_is_used() {
        let rows = rows();
        let columns: Vec<Column<Value>> = vec![Column::new("decade")
            .with_type(ColumnType::Number)
            .with_value_getter(|row: &Value| {
                CellValue::from(row["age"].as_f64().map(|age| (age / 10.0).floor()))
            })];
        let model = FilterModel::new(vec![FilterItem::new("decade", "=").with_value(4)]);

        assert_eq!(ids(&rows, &filter_rows(&rows, &model, &columns)), vec![2, 3]);
    }

    #[test]
    fn test_column_operator_override() {
        let rows = rows();
        let columns: Vec<Column<Value>> = vec![Column::new("age")
            .with_type(ColumnType::Number)
            .with_filter_operators(vec![Operator::custom("isAdult", "is adult", |_item| {
                Some(Box::new(|value: &CellValue| value.to_number() >= 18.0) as Predicate)
            })
            .without_value()])];

        let custom = FilterModel::new(vec![FilterItem::new("age", "isAdult")]);
        assert_eq!(ids(&rows, &filter_rows(&rows, &custom, &columns)), vec![1, 2, 3]);

        // The type default is no longer offered.
        let default = FilterModel::new(vec![FilterItem::new("age", ">").with_value(40)]);
        assert_eq!(filter_rows(&rows, &default, &columns).len(), rows.len());
    }
}
