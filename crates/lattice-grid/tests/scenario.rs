//! End-to-end tests for the grid view pipeline.

use std::sync::Arc;

use lattice_grid::prelude::*;
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct Character {
    id: i64,
    name: &'static str,
    age: Option<u32>,
}

impl GridRow for Character {
    fn field(&self, field: &str) -> CellValue {
        match field {
            "id" => CellValue::from(self.id),
            "name" => CellValue::from(self.name),
            "age" => CellValue::from(self.age),
            _ => CellValue::Null,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lattice_grid=trace")
        .with_test_writer()
        .try_init();
}

fn characters() -> Vec<Character> {
    vec![
        Character { id: 1, name: "Jon", age: Some(35) },
        Character { id: 2, name: "Cersei", age: Some(42) },
        Character { id: 3, name: "Jaime", age: Some(42) },
        Character { id: 4, name: "Arya", age: Some(11) },
        Character { id: 5, name: "Daenerys", age: None },
    ]
}

fn columns() -> Vec<Column<Character>> {
    vec![
        Column::new("id").with_type(ColumnType::Number).with_width(80.0).pinned(PinnedSide::Left),
        Column::new("name").with_header_name("Name").with_width(180.0).pinned(PinnedSide::Left),
        Column::new("age")
            .with_type(ColumnType::Number)
            .pinned(PinnedSide::Left)
            .with_value_formatter(|value: &CellValue| match value {
                CellValue::Null => "unknown".to_string(),
                other => format!("{other} years"),
            }),
        Column::new("full")
            .with_value_getter(|row: &Character| CellValue::from(format!("{} ({})", row.name, row.id)))
            .sortable(false),
    ]
}

fn build(page_size: usize) -> GridView<Character> {
    GridView::builder(columns(), characters())
        .get_row_id(|row: &Character, _index: usize| RowId::from(row.id))
        .config(GridConfig {
            checkbox_selection: true,
            page_size,
            page_size_options: vec![page_size, 25],
            ..GridConfig::default()
        })
        .build()
        .expect("valid grid")
}

#[test]
fn filter_sort_paginate_select() {
    init_tracing();
    let view = build(2);

    view.set_filter_model(FilterModel::new(vec![FilterItem::new("name", "contains").with_value("jon")]));
    assert_eq!(view.visible_row_ids(), vec![RowId::from(1)]);

    view.set_filter_model(FilterModel::default());
    view.set_sort_model(vec![SortItem::asc("age")]);
    assert_eq!(view.filtered_row_count(), 5);
    assert_eq!(view.total_pages(), 3);

    let sorted: Vec<i64> = view.sorted_rows().iter().map(|row| row.id).collect();
    assert_eq!(sorted, vec![4, 1, 2, 3, 5]);

    let mut pages = Vec::new();
    for _ in 0..view.total_pages() {
        pages.push(view.visible_row_ids());
        view.next_page();
    }
    assert_eq!(
        pages,
        vec![
            vec![RowId::from(4), RowId::from(1)],
            vec![RowId::from(2), RowId::from(3)],
            vec![RowId::from(5)],
        ]
    );

    view.first_page();
    view.select_all_visible();
    let selection = view.row_selection_model();
    assert_eq!(selection.sorted_ids(), vec![RowId::from(1), RowId::from(4)]);
    assert!(!selection.is_selected(&RowId::from(2)));
    assert_eq!(view.select_all_state(), SelectAllState::All);

    view.select_all_visible();
    assert!(view.row_selection_model().is_empty());
}

#[test]
fn descending_sort_keeps_nulls_last() {
    let view = build(25);
    view.toggle_sort("age");
    view.toggle_sort("age");

    let ids: Vec<i64> = view.visible_rows().iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![2, 3, 1, 4, 5]);
}

#[test]
fn pinned_columns_and_cells() {
    let view = build(25);

    let offsets: Vec<Option<f32>> = ["id", "name", "age", "full"]
        .iter()
        .map(|field| view.pinned_style(field, CellSurface::Body).offset.map(|o| o.offset))
        .collect();
    assert_eq!(offsets, vec![Some(58.0), Some(138.0), Some(318.0), None]);

    let header = view.pinned_style("name", CellSurface::Header);
    let body = view.pinned_style("full", CellSurface::Body);
    assert!(header.z_index > body.z_index);

    let rows = characters();
    let daenerys = &rows[4];
    assert_eq!(view.formatted_value(daenerys, "age").as_deref(), Some("unknown"));
    assert_eq!(view.cell_content(&rows[0], "age").as_deref(), Some("35 years"));
    assert_eq!(view.cell_content(daenerys, "full").as_deref(), Some("Daenerys (5)"));
}

#[test]
fn controlled_filter_round_trip() {
    init_tracing();
    let requests: Arc<Mutex<Vec<Arc<FilterModel>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = requests.clone();

    let view = GridView::builder(columns(), characters())
        .get_row_id(|row: &Character, _index: usize| RowId::from(row.id))
        .filter_model(FilterModel::default())
        .on_filter_model_change(move |model: Arc<FilterModel>| sink.lock().push(model))
        .build()
        .expect("valid grid");
    assert!(view.is_filter_model_controlled());
    assert!(!view.is_sort_model_controlled());

    let changes = Arc::new(Mutex::new(0usize));
    let counter = changes.clone();
    view.filter_model_changed.connect(move |_| *counter.lock() += 1);

    // The request reaches the host but the view keeps showing the host's value.
    view.upsert_filter_item(FilterItem::new("age", ">").with_value(40));
    assert_eq!(requests.lock().len(), 1);
    assert!(view.filter_model().is_empty());
    assert_eq!(view.filtered_row_count(), 5);
    assert_eq!(*changes.lock(), 0);

    // The host accepts the request and feeds it back.
    let accepted = (*requests.lock()[0]).clone();
    assert_eq!(accepted.items[0].id, Some(1));
    assert!(view.receive_filter_model(accepted));
    assert_eq!(view.filtered_row_count(), 2);
    assert_eq!(*changes.lock(), 1);
}

#[test]
fn uncontrolled_state_ignores_host_values() {
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = reported.clone();
    let view = GridView::builder(columns(), characters())
        .on_pagination_model_change(move |model: PaginationModel| sink.lock().push(model))
        .build()
        .expect("valid grid");

    assert!(!view.receive_pagination_model(PaginationModel::new(3, 10)));
    assert_eq!(view.pagination_model(), PaginationModel::new(0, 25));

    view.set_page_size(50);
    assert_eq!(view.pagination_model(), PaginationModel::new(0, 50));
    assert_eq!(*reported.lock(), vec![PaginationModel::new(0, 50)]);
}

#[test]
fn filter_panel_and_row_replacement() {
    let view = build(2);
    view.last_page();
    assert_eq!(view.pagination_model().page, 2);

    view.open_filter_panel(Some("name"));
    let model = view.filter_model();
    assert_eq!(model.items.len(), 1);
    assert_eq!(model.items[0].operator, "contains");

    let item = FilterItem { value: Some(CellValue::from("a")), ..model.items[0].clone() };
    view.upsert_filter_item(item);
    assert_eq!(view.filter_model().items.len(), 1);
    assert_eq!(view.filtered_row_count(), 3);
    assert_eq!(view.pagination_model().page, 1);

    view.set_rows(characters().into_iter().take(2).collect());
    assert_eq!(view.filtered_row_count(), 0);
    assert_eq!(view.pagination_model().page, 0);
    assert_eq!(view.range_label(), "0–0 of 0");

    view.close_overlay();
    assert!(view.overlay().is_closed());
}
