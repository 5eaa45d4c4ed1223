//! The grid view pipeline.
//!
//! [`GridView`] turns rows and a column schema into what a grid shows:
//!
//! ```text
//! rows ──► filter ──► sort ──► paginate ──► visible rows
//! ```
//!
//! Selection and the pinned column layout are derived independently of the
//! row stages.
//!
//! # Controllable state
//!
//! The filter model, sort model, row selection and pagination each live in a
//! [`StateCell`]. Supplying a value for one of them at build time (for example
//! [`GridViewBuilder::filter_model`]) makes the host its owner: the view then
//! only forwards change requests to the matching callback and shows whatever
//! the host feeds back through the `receive_*` methods. Without a supplied
//! value the view owns the state, applies changes itself and still reports
//! them to the callback if one is registered. The choice is made once in
//! [`GridViewBuilder::build`].
//!
//! # Memoization
//!
//! Each stage caches its output together with the inputs it was computed
//! from. Rows, columns and the filter/sort/selection models are held behind
//! `Arc`s and replaced wholesale, so a stage is reused for as long as its
//! inputs are the same allocations.
//!
//! # Example
//!
//! ```
//! use lattice_grid::model::{Column, ColumnType, FilterItem, FilterModel, GridView, SortItem};
//! use serde_json::json;
//!
//! let view = GridView::builder(
//!     vec![Column::new("name"), Column::new("age").with_type(ColumnType::Number)],
//!     vec![
//!         json!({ "id": 1, "name": "Jon", "age": 35 }),
//!         json!({ "id": 2, "name": "Arya", "age": 11 }),
//!     ],
//! )
//! .build()?;
//!
//! view.set_sort_model(vec![SortItem::asc("age")]);
//! let names: Vec<String> = view.visible_rows().iter().map(|row| row["name"].to_string()).collect();
//! assert_eq!(names, ["\"Arya\"", "\"Jon\""]);
//!
//! view.set_filter_model(FilterModel::new(vec![FilterItem::new("name", "contains").with_value("jo")]));
//! assert_eq!(view.filtered_row_count(), 1);
//! # Ok::<(), lattice_grid::GridError>(())
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use lattice_grid_core::{ChangeCallback, ExternalCell, OwnedCell, PerfSpan, Property, Signal, StateCell};
use parking_lot::{Mutex, RwLock};

use super::column::{find_column, Column};
use super::filter::{filter_rows, FilterItem, FilterModel, LogicOperator};
use super::overlay::GridOverlayState;
use super::pagination::{self, PageAction, PaginationModel};
use super::pinned::{CellSurface, PinnedLayout, PinnedStyle};
use super::row::{default_row_id, GridRow, RowId, RowIdGetter};
use super::selection::{RowSelectionModel, SelectAllState};
use super::sort::{self, active_direction, SortDirection, SortItem, SortModel};
use crate::config::GridConfig;
use crate::error::{GridError, Result};

// =============================================================================
// Output
// =============================================================================

/// A window of rows produced by the pipeline.
///
/// Holds the row collection and the positions of the selected rows in it, so
/// producing a window never clones row data.
pub struct RowWindow<R> {
    rows: Arc<[R]>,
    indices: Arc<[usize]>,
}

impl<R> RowWindow<R> {
    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the window has no rows.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row at position `index` of the window.
    pub fn get(&self, index: usize) -> Option<&R> {
        self.indices.get(index).map(|&source| &self.rows[source])
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.indices.iter().map(|&source| &self.rows[source])
    }

    /// Rows in display order, paired with their index in the source rows.
    pub fn iter_with_source_index(&self) -> impl Iterator<Item = (usize, &R)> + '_ {
        self.indices.iter().map(|&source| (source, &self.rows[source]))
    }

    /// Positions of the window's rows in the source rows.
    pub fn source_indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<R> Clone for RowWindow<R> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            indices: self.indices.clone(),
        }
    }
}

impl<R> fmt::Debug for RowWindow<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowWindow")
            .field("indices", &self.indices)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Stage cache
// =============================================================================

struct FilterStage<R> {
    rows: Arc<[R]>,
    columns: Arc<[Column<R>]>,
    model: Arc<FilterModel>,
    enabled: bool,
    output: Arc<[usize]>,
}

struct SortStage {
    filtered: Arc<[usize]>,
    model: Arc<SortModel>,
    output: Arc<[usize]>,
}

struct PageStage {
    sorted: Arc<[usize]>,
    model: Option<PaginationModel>,
    output: Arc<[usize]>,
}

struct LayoutStage<R> {
    columns: Arc<[Column<R>]>,
    output: Arc<PinnedLayout>,
}

struct StageCache<R> {
    filter: Option<FilterStage<R>>,
    sort: Option<SortStage>,
    page: Option<PageStage>,
    layout: Option<LayoutStage<R>>,
}

impl<R> StageCache<R> {
    fn new() -> Self {
        Self {
            filter: None,
            sort: None,
            page: None,
            layout: None,
        }
    }

    fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Inputs of one pipeline evaluation, captured together.
struct Snapshot<R> {
    rows: Arc<[R]>,
    columns: Arc<[Column<R>]>,
    filter: Arc<FilterModel>,
    sort: Arc<SortModel>,
    pagination: PaginationModel,
}

// =============================================================================
// Builder
// =============================================================================

struct StateSlot<T> {
    initial: Option<T>,
    controlled: Option<T>,
    on_change: Option<ChangeCallback<T>>,
}

impl<T> Default for StateSlot<T> {
    fn default() -> Self {
        Self {
            initial: None,
            controlled: None,
            on_change: None,
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StateSlot<T> {
    fn into_cell(self, name: &'static str, default: T) -> Box<dyn StateCell<T>> {
        match self.controlled {
            Some(value) => {
                let mut cell = ExternalCell::new(value).named(name);
                if let Some(callback) = self.on_change {
                    cell = cell.with_shared_callback(callback);
                }
                Box::new(cell)
            }
            None => {
                let mut cell = OwnedCell::new(self.initial.unwrap_or(default)).named(name);
                if let Some(callback) = self.on_change {
                    cell = cell.with_shared_callback(callback);
                }
                Box::new(cell)
            }
        }
    }
}

/// Builder for [`GridView`].
pub struct GridViewBuilder<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    get_row_id: Option<RowIdGetter<R>>,
    config: GridConfig,
    filter: StateSlot<Arc<FilterModel>>,
    sort: StateSlot<Arc<SortModel>>,
    selection: StateSlot<Arc<RowSelectionModel>>,
    pagination: StateSlot<PaginationModel>,
}

impl<R: GridRow> GridViewBuilder<R> {
    fn new(columns: Vec<Column<R>>, rows: Vec<R>) -> Self {
        Self {
            columns,
            rows,
            get_row_id: None,
            config: GridConfig::default(),
            filter: StateSlot::default(),
            sort: StateSlot::default(),
            selection: StateSlot::default(),
            pagination: StateSlot::default(),
        }
    }

    /// Derives row ids with `getter` instead of the rows' `id` field.
    pub fn get_row_id<F>(mut self, getter: F) -> Self
    where
        F: Fn(&R, usize) -> RowId + Send + Sync + 'static,
    {
        self.get_row_id = Some(Arc::new(getter));
        self
    }

    /// Sets the behavior switches.
    pub fn config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Starting filter model of a view-owned filter.
    pub fn initial_filter_model(mut self, model: FilterModel) -> Self {
        self.filter.initial = Some(Arc::new(model));
        self
    }

    /// Makes the filter host-owned, starting from `model`.
    pub fn filter_model(mut self, model: FilterModel) -> Self {
        self.filter.controlled = Some(Arc::new(model));
        self
    }

    /// Receives filter model changes.
    pub fn on_filter_model_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(Arc<FilterModel>) + Send + Sync + 'static,
    {
        self.filter.on_change = Some(Arc::new(callback));
        self
    }

    /// Starting sort model of a view-owned sort.
    pub fn initial_sort_model(mut self, model: SortModel) -> Self {
        self.sort.initial = Some(Arc::new(model));
        self
    }

    /// Makes the sort host-owned, starting from `model`.
    pub fn sort_model(mut self, model: SortModel) -> Self {
        self.sort.controlled = Some(Arc::new(model));
        self
    }

    /// Receives sort model changes.
    pub fn on_sort_model_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(Arc<SortModel>) + Send + Sync + 'static,
    {
        self.sort.on_change = Some(Arc::new(callback));
        self
    }

    /// Starting selection of a view-owned selection.
    pub fn initial_row_selection_model(mut self, model: RowSelectionModel) -> Self {
        self.selection.initial = Some(Arc::new(model));
        self
    }

    /// Makes the selection host-owned, starting from `model`.
    pub fn row_selection_model(mut self, model: RowSelectionModel) -> Self {
        self.selection.controlled = Some(Arc::new(model));
        self
    }

    /// Receives selection changes.
    pub fn on_row_selection_model_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(Arc<RowSelectionModel>) + Send + Sync + 'static,
    {
        self.selection.on_change = Some(Arc::new(callback));
        self
    }

    /// Starting page and page size of view-owned pagination.
    pub fn initial_pagination_model(mut self, model: PaginationModel) -> Self {
        self.pagination.initial = Some(model);
        self
    }

    /// Makes pagination host-owned, starting from `model`.
    pub fn pagination_model(mut self, model: PaginationModel) -> Self {
        self.pagination.controlled = Some(model);
        self
    }

    /// Receives page and page size changes.
    pub fn on_pagination_model_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(PaginationModel) + Send + Sync + 'static,
    {
        self.pagination.on_change = Some(Arc::new(callback));
        self
    }

    /// Validates the configuration and column set and builds the view.
    pub fn build(self) -> Result<GridView<R>> {
        self.config.validate()?;
        check_unique_fields(&self.columns)?;
        for model in [&self.pagination.initial, &self.pagination.controlled].into_iter().flatten() {
            if model.page_size == 0 {
                return Err(GridError::InvalidPageSize { page_size: 0 });
            }
        }

        let default_filter = Arc::new(FilterModel::default().with_logic_operator(self.config.default_logic_operator));
        let default_pagination = PaginationModel::new(0, self.config.page_size);

        let get_row_id: RowIdGetter<R> = match self.get_row_id {
            Some(getter) => getter,
            None => Arc::new(default_row_id::<R>),
        };

        tracing::debug!(
            target: "lattice_grid::pipeline",
            columns = self.columns.len(),
            rows = self.rows.len(),
            controlled_filter = self.filter.controlled.is_some(),
            controlled_sort = self.sort.controlled.is_some(),
            controlled_selection = self.selection.controlled.is_some(),
            controlled_pagination = self.pagination.controlled.is_some(),
            "building grid view"
        );

        Ok(GridView {
            columns: RwLock::new(Arc::from(self.columns)),
            rows: RwLock::new(Arc::from(self.rows)),
            get_row_id,
            config: self.config,
            filter_model: self.filter.into_cell("filter_model", default_filter),
            sort_model: self.sort.into_cell("sort_model", Arc::new(Vec::new())),
            selection: self.selection.into_cell("row_selection_model", Arc::new(RowSelectionModel::new())),
            pagination: self.pagination.into_cell("pagination_model", default_pagination),
            overlay: Property::new(GridOverlayState::Closed),
            cache: Mutex::new(StageCache::new()),
            filter_model_changed: Signal::new(),
            sort_model_changed: Signal::new(),
            selection_changed: Signal::new(),
            pagination_changed: Signal::new(),
            overlay_changed: Signal::new(),
        })
    }
}

fn require_external<T>(cell: &dyn StateCell<T>) -> Result<()> {
    if cell.is_external() {
        Ok(())
    } else {
        Err(lattice_grid_core::Error::NotExternal { name: cell.name() }.into())
    }
}

fn check_unique_fields<R>(columns: &[Column<R>]) -> Result<()>
where
    R: GridRow,
{
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.field()) {
            return Err(GridError::duplicate_field(column.field()));
        }
    }
    Ok(())
}

// =============================================================================
// GridView
// =============================================================================

/// A data grid's view engine.
///
/// See the [module documentation](self) for the state ownership rules.
pub struct GridView<R: GridRow> {
    columns: RwLock<Arc<[Column<R>]>>,
    rows: RwLock<Arc<[R]>>,
    get_row_id: RowIdGetter<R>,
    config: GridConfig,
    filter_model: Box<dyn StateCell<Arc<FilterModel>>>,
    sort_model: Box<dyn StateCell<Arc<SortModel>>>,
    selection: Box<dyn StateCell<Arc<RowSelectionModel>>>,
    pagination: Box<dyn StateCell<PaginationModel>>,
    overlay: Property<GridOverlayState>,
    cache: Mutex<StageCache<R>>,

    /// Emitted when the filter model shown by the view changes.
    pub filter_model_changed: Signal<Arc<FilterModel>>,
    /// Emitted when the sort model shown by the view changes.
    pub sort_model_changed: Signal<Arc<SortModel>>,
    /// Emitted when the row selection shown by the view changes.
    pub selection_changed: Signal<Arc<RowSelectionModel>>,
    /// Emitted when the page or page size shown by the view changes.
    pub pagination_changed: Signal<PaginationModel>,
    /// Emitted when an overlay opens or closes.
    pub overlay_changed: Signal<GridOverlayState>,
}

impl<R: GridRow> GridView<R> {
    /// Starts building a view over `rows` described by `columns`.
    pub fn builder(columns: Vec<Column<R>>, rows: Vec<R>) -> GridViewBuilder<R> {
        GridViewBuilder::new(columns, rows)
    }

    // -------------------------------------------------------------------------
    // State access
    // -------------------------------------------------------------------------

    /// Current filter model.
    pub fn filter_model(&self) -> Arc<FilterModel> {
        self.filter_model.get()
    }

    /// Current sort model.
    pub fn sort_model(&self) -> Arc<SortModel> {
        self.sort_model.get()
    }

    /// Current row selection.
    pub fn row_selection_model(&self) -> Arc<RowSelectionModel> {
        self.selection.get()
    }

    /// Current pagination model, as stored.
    ///
    /// The page actually shown may be lower when filtering shrank the row set;
    /// see [`current_page`](Self::current_page).
    pub fn pagination_model(&self) -> PaginationModel {
        self.pagination.get()
    }

    /// Page actually shown.
    pub fn current_page(&self) -> usize {
        self.pagination.get().clamped(self.filtered_row_count()).page
    }

    /// Open overlay.
    pub fn overlay(&self) -> GridOverlayState {
        self.overlay.get()
    }

    /// Behavior switches.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Column schema.
    pub fn columns(&self) -> Arc<[Column<R>]> {
        self.columns.read().clone()
    }

    /// All rows, unfiltered.
    pub fn rows(&self) -> Arc<[R]> {
        self.rows.read().clone()
    }

    /// Column with field `field`.
    pub fn column(&self, field: &str) -> Option<Column<R>> {
        find_column(&self.columns.read(), field).cloned()
    }

    /// Returns `true` if the host owns the filter model.
    pub fn is_filter_model_controlled(&self) -> bool {
        self.filter_model.is_external()
    }

    /// Returns `true` if the host owns the sort model.
    pub fn is_sort_model_controlled(&self) -> bool {
        self.sort_model.is_external()
    }

    /// Returns `true` if the host owns the row selection.
    pub fn is_row_selection_controlled(&self) -> bool {
        self.selection.is_external()
    }

    /// Returns `true` if the host owns pagination.
    pub fn is_pagination_controlled(&self) -> bool {
        self.pagination.is_external()
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replaces the rows.
    pub fn set_rows(&self, rows: Vec<R>) {
        *self.rows.write() = Arc::from(rows);
        self.cache.lock().clear();
        tracing::debug!(target: "lattice_grid::pipeline", rows = self.rows.read().len(), "rows replaced");
        self.sync_page();
    }

    /// Replaces the column schema.
    pub fn set_columns(&self, columns: Vec<Column<R>>) -> Result<()> {
        check_unique_fields(&columns)?;
        *self.columns.write() = Arc::from(columns);
        self.cache.lock().clear();
        tracing::debug!(target: "lattice_grid::pipeline", "columns replaced");
        self.sync_page();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Requests a new filter model.
    ///
    /// Returns `true` if the view's filter changed, which only happens when
    /// the view owns the filter.
    pub fn set_filter_model(&self, model: FilterModel) -> bool {
        let next = Arc::new(model);
        if !self.filter_model.set(next.clone()) {
            return false;
        }
        self.filter_model_changed.emit(next);
        self.sync_page();
        true
    }

    /// Adds `item`, or replaces the item with the same id.
    ///
    /// Items without an id get the next free one.
    pub fn upsert_filter_item(&self, mut item: FilterItem) -> bool {
        let current = self.filter_model.get();
        if item.id.is_none() {
            item.id = Some(current.next_item_id());
        }
        self.set_filter_model(current.upserted(item))
    }

    /// Removes the item with id `id`.
    pub fn remove_filter_item(&self, id: u64) -> bool {
        let current = self.filter_model.get();
        self.set_filter_model(current.without_item(id))
    }

    /// Changes how filter items are combined.
    pub fn set_filter_logic_operator(&self, logic_operator: LogicOperator) -> bool {
        let current = self.filter_model.get();
        self.set_filter_model(FilterModel {
            items: current.items.clone(),
            logic_operator,
        })
    }

    /// Pushes the host's filter model into a host-owned filter.
    ///
    /// Ignored (and logged) when the view owns the filter.
    pub fn receive_filter_model(&self, model: FilterModel) -> bool {
        let next = Arc::new(model);
        let changed = *self.filter_model.get() != *next;
        if !self.filter_model.receive(next.clone()) {
            return false;
        }
        if changed {
            self.filter_model_changed.emit(next);
            self.sync_page();
        }
        true
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Requests a new sort model.
    pub fn set_sort_model(&self, model: SortModel) -> bool {
        let next = Arc::new(model);
        if !self.sort_model.set(next.clone()) {
            return false;
        }
        self.sort_model_changed.emit(next);
        true
    }

    /// Header click on `field`: cycles its sort asc → desc → none.
    ///
    /// Ignored for unknown and non-sortable columns.
    pub fn toggle_sort(&self, field: &str) -> bool {
        match self.column(field) {
            Some(column) if column.is_sortable() => {}
            _ => {
                tracing::trace!(target: "lattice_grid::sort", field, "header click on non-sortable column ignored");
                return false;
            }
        }

        let current = active_direction(&self.sort_model.get(), field);
        let next = match SortDirection::cycle(current) {
            Some(direction) => vec![SortItem {
                field: field.to_string(),
                sort: direction,
            }],
            None => Vec::new(),
        };
        self.set_sort_model(next)
    }

    /// Pushes the host's sort model into a host-owned sort.
    pub fn receive_sort_model(&self, model: SortModel) -> bool {
        let next = Arc::new(model);
        let changed = *self.sort_model.get() != *next;
        if !self.sort_model.receive(next.clone()) {
            return false;
        }
        if changed {
            self.sort_model_changed.emit(next);
        }
        true
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    fn set_selection(&self, model: RowSelectionModel) -> bool {
        let next = Arc::new(model);
        if !self.selection.set(next.clone()) {
            return false;
        }
        tracing::debug!(target: "lattice_grid::selection", selected = next.len(), "selection changed");
        self.selection_changed.emit(next);
        true
    }

    /// Requests a new row selection.
    pub fn set_row_selection_model(&self, model: RowSelectionModel) -> bool {
        self.set_selection(model)
    }

    /// Checkbox click on row `id`.
    pub fn toggle_row_selection(&self, id: RowId) -> bool {
        let mut next = (*self.selection.get()).clone();
        next.toggle(id);
        self.set_selection(next)
    }

    /// Header checkbox click: selects exactly the visible page, or clears the
    /// selection when it already is the visible page.
    pub fn select_all_visible(&self) -> bool {
        let visible = self.visible_row_ids();
        let mut next = (*self.selection.get()).clone();
        next.select_all_visible(&visible);
        self.set_selection(next)
    }

    /// Deselects every row.
    pub fn clear_selection(&self) -> bool {
        self.set_selection(RowSelectionModel::new())
    }

    /// Click on the body of row `id`.
    ///
    /// Does nothing when row clicks are disabled for selection. With the
    /// checkbox column on, the click toggles the row; otherwise the row
    /// becomes the only selected one.
    pub fn handle_row_click(&self, id: RowId) -> bool {
        if self.config.disable_row_selection_on_click {
            return false;
        }
        if self.config.checkbox_selection {
            return self.toggle_row_selection(id);
        }
        self.set_selection(std::iter::once(id).collect())
    }

    /// Pushes the host's selection into a host-owned selection.
    pub fn receive_row_selection_model(&self, model: RowSelectionModel) -> bool {
        let next = Arc::new(model);
        let changed = *self.selection.get() != *next;
        if !self.selection.receive(next.clone()) {
            return false;
        }
        if changed {
            self.selection_changed.emit(next);
        }
        true
    }

    /// Returns `true` if row `id` is selected.
    pub fn is_row_selected(&self, id: &RowId) -> bool {
        self.selection.get().is_selected(id)
    }

    /// Header checkbox state for the visible page.
    pub fn select_all_state(&self) -> SelectAllState {
        self.selection.get().select_all_state(&self.visible_row_ids())
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    fn set_pagination(&self, model: PaginationModel) -> bool {
        if !self.pagination.set(model) {
            return false;
        }
        tracing::debug!(target: "lattice_grid::pagination", page = model.page, page_size = model.page_size, "page changed");
        self.pagination_changed.emit(model);
        true
    }

    /// Applies a pagination control action.
    pub fn navigate(&self, action: PageAction) -> bool {
        let next = self.pagination.get().apply(action, self.filtered_row_count());
        self.set_pagination(next)
    }

    /// Goes to the first page.
    pub fn first_page(&self) -> bool {
        self.navigate(PageAction::First)
    }

    /// Goes back one page.
    pub fn previous_page(&self) -> bool {
        self.navigate(PageAction::Previous)
    }

    /// Goes forward one page.
    pub fn next_page(&self) -> bool {
        self.navigate(PageAction::Next)
    }

    /// Goes to the last page.
    pub fn last_page(&self) -> bool {
        self.navigate(PageAction::Last)
    }

    /// Goes to zero-based `page`, clamped into range.
    pub fn go_to_page(&self, page: usize) -> bool {
        self.navigate(PageAction::GoTo(page))
    }

    /// Changes the page size and returns to the first page.
    ///
    /// Sizes outside the configured page size options are applied but logged.
    pub fn set_page_size(&self, page_size: usize) -> bool {
        if !self.config.page_size_options.contains(&page_size) {
            tracing::warn!(
                target: "lattice_grid::pagination",
                page_size,
                options = ?self.config.page_size_options,
                "page size is not one of the page size options"
            );
        }
        self.navigate(PageAction::SetPageSize(page_size))
    }

    /// Pushes the host's pagination into host-owned pagination.
    pub fn receive_pagination_model(&self, model: PaginationModel) -> bool {
        let changed = self.pagination.get() != model;
        if !self.pagination.receive(model) {
            return false;
        }
        if changed {
            self.pagination_changed.emit(model);
        }
        true
    }

    /// Number of pages; 1 when pagination is off.
    pub fn total_pages(&self) -> usize {
        if !self.config.pagination {
            return 1;
        }
        self.pagination.get().total_pages(self.filtered_row_count())
    }

    /// Footer text such as `"1–25 of 130"`.
    pub fn range_label(&self) -> String {
        let count = self.filtered_row_count();
        let model = if self.config.pagination {
            self.pagination.get().clamped(count)
        } else {
            PaginationModel::new(0, count.max(1))
        };
        pagination::range_label(&model, count)
    }

    /// Requests a page that is in range for the current row count.
    fn sync_page(&self) {
        let current = self.pagination.get();
        let clamped = current.clamped(self.filtered_row_count());
        if clamped != current {
            tracing::debug!(
                target: "lattice_grid::pagination",
                from = current.page,
                to = clamped.page,
                "clamping page after row set shrank"
            );
            self.set_pagination(clamped);
        }
    }

    // -------------------------------------------------------------------------
    // Strict host feedback
    // -------------------------------------------------------------------------

    /// Like [`receive_filter_model`](Self::receive_filter_model), but fails
    /// when the view owns the filter.
    pub fn try_receive_filter_model(&self, model: FilterModel) -> Result<()> {
        require_external(&*self.filter_model)?;
        self.receive_filter_model(model);
        Ok(())
    }

    /// Like [`receive_sort_model`](Self::receive_sort_model), but fails when
    /// the view owns the sort.
    pub fn try_receive_sort_model(&self, model: SortModel) -> Result<()> {
        require_external(&*self.sort_model)?;
        self.receive_sort_model(model);
        Ok(())
    }

    /// Like [`receive_row_selection_model`](Self::receive_row_selection_model),
    /// but fails when the view owns the selection.
    pub fn try_receive_row_selection_model(&self, model: RowSelectionModel) -> Result<()> {
        require_external(&*self.selection)?;
        self.receive_row_selection_model(model);
        Ok(())
    }

    /// Like [`receive_pagination_model`](Self::receive_pagination_model), but
    /// fails when the view owns pagination.
    pub fn try_receive_pagination_model(&self, model: PaginationModel) -> Result<()> {
        require_external(&*self.pagination)?;
        self.receive_pagination_model(model);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Overlay
    // -------------------------------------------------------------------------

    fn set_overlay(&self, state: GridOverlayState) -> bool {
        if !self.overlay.set(state.clone()) {
            return false;
        }
        self.overlay_changed.emit(state);
        true
    }

    /// Opens the menu of column `field`.
    pub fn open_column_menu(&self, field: &str) -> bool {
        self.set_overlay(GridOverlayState::ColumnMenuOpen {
            field: field.to_string(),
        })
    }

    /// Opens the menu of column `field`, or closes it if it is already open.
    pub fn toggle_column_menu(&self, field: &str) -> bool {
        let next = self.overlay.get().toggled_column_menu(field);
        self.set_overlay(next)
    }

    /// Opens the filter panel, optionally for one column.
    ///
    /// When the filter model has no items, an empty item using the column's
    /// first operator is added so the panel has a row to edit. An existing
    /// model is left alone, since a blank item would pass every row under
    /// `or` and switch the other conditions off.
    pub fn open_filter_panel(&self, target_field: Option<&str>) -> bool {
        if let Some(field) = target_field {
            self.ensure_filter_item(field);
        }
        self.set_overlay(GridOverlayState::FilterPanelOpen {
            target_field: target_field.map(str::to_string),
        })
    }

    /// Closes any open overlay.
    pub fn close_overlay(&self) -> bool {
        self.set_overlay(GridOverlayState::Closed)
    }

    fn ensure_filter_item(&self, field: &str) {
        let current = self.filter_model.get();
        if !current.is_empty() {
            return;
        }
        let Some(column) = self.column(field) else {
            return;
        };
        let operators = column.operators();
        let Some(first) = operators.first() else {
            return;
        };
        let item = FilterItem::new(field, first.id()).with_id(current.next_item_id());
        self.set_filter_model(current.upserted(item));
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    fn snapshot(&self) -> Snapshot<R> {
        Snapshot {
            rows: self.rows.read().clone(),
            columns: self.columns.read().clone(),
            filter: self.filter_model.get(),
            sort: self.sort_model.get(),
            pagination: self.pagination.get(),
        }
    }

    #[tracing::instrument(skip_all, target = "lattice_grid::pipeline", level = "trace")]
    fn filtered_indices(&self, snapshot: &Snapshot<R>) -> Arc<[usize]> {
        let enabled = !self.config.disable_column_filter;
        if let Some(stage) = &self.cache.lock().filter {
            if Arc::ptr_eq(&stage.rows, &snapshot.rows)
                && Arc::ptr_eq(&stage.columns, &snapshot.columns)
                && Arc::ptr_eq(&stage.model, &snapshot.filter)
                && stage.enabled == enabled
            {
                return stage.output.clone();
            }
        }

        let output: Arc<[usize]> = if enabled {
            Arc::from(filter_rows(&snapshot.rows, &snapshot.filter, &snapshot.columns))
        } else {
            (0..snapshot.rows.len()).collect()
        };
        self.cache.lock().filter = Some(FilterStage {
            rows: snapshot.rows.clone(),
            columns: snapshot.columns.clone(),
            model: snapshot.filter.clone(),
            enabled,
            output: output.clone(),
        });
        output
    }

    #[tracing::instrument(skip_all, target = "lattice_grid::pipeline", level = "trace")]
    fn sorted_indices(&self, snapshot: &Snapshot<R>) -> Arc<[usize]> {
        let filtered = self.filtered_indices(snapshot);
        if let Some(stage) = &self.cache.lock().sort {
            if Arc::ptr_eq(&stage.filtered, &filtered) && Arc::ptr_eq(&stage.model, &snapshot.sort) {
                return stage.output.clone();
            }
        }

        let output: Arc<[usize]> = Arc::from(sort::sort_indices(
            &snapshot.rows,
            &filtered,
            &snapshot.sort,
            &snapshot.columns,
        ));
        self.cache.lock().sort = Some(SortStage {
            filtered,
            model: snapshot.sort.clone(),
            output: output.clone(),
        });
        output
    }

    #[tracing::instrument(skip_all, target = "lattice_grid::pipeline", level = "trace")]
    fn page_indices(&self, snapshot: &Snapshot<R>) -> Arc<[usize]> {
        let sorted = self.sorted_indices(snapshot);
        let model = self
            .config
            .pagination
            .then(|| snapshot.pagination.clamped(sorted.len()));
        if let Some(stage) = &self.cache.lock().page {
            if Arc::ptr_eq(&stage.sorted, &sorted) && stage.model == model {
                return stage.output.clone();
            }
        }

        let output: Arc<[usize]> = match &model {
            Some(model) => Arc::from(pagination::slice(&sorted, model)),
            None => sorted.clone(),
        };
        self.cache.lock().page = Some(PageStage {
            sorted,
            model,
            output: output.clone(),
        });
        output
    }

    /// Rows of the current page, filtered and sorted.
    pub fn visible_rows(&self) -> RowWindow<R> {
        let _span = PerfSpan::new("grid_view.visible_rows");
        let snapshot = self.snapshot();
        let indices = self.page_indices(&snapshot);
        RowWindow {
            rows: snapshot.rows,
            indices,
        }
    }

    /// Every row that passes the filter, sorted, ignoring pagination.
    pub fn sorted_rows(&self) -> RowWindow<R> {
        let snapshot = self.snapshot();
        let indices = self.sorted_indices(&snapshot);
        RowWindow {
            rows: snapshot.rows,
            indices,
        }
    }

    /// Ids of the rows of the current page.
    pub fn visible_row_ids(&self) -> Vec<RowId> {
        self.visible_rows()
            .iter_with_source_index()
            .map(|(index, row)| (self.get_row_id)(row, index))
            .collect()
    }

    /// Id of `row`, located at `index` in the source rows.
    pub fn row_id(&self, row: &R, index: usize) -> RowId {
        (self.get_row_id)(row, index)
    }

    /// Number of rows passing the filter.
    pub fn filtered_row_count(&self) -> usize {
        let snapshot = self.snapshot();
        self.filtered_indices(&snapshot).len()
    }

    // -------------------------------------------------------------------------
    // Cells and layout
    // -------------------------------------------------------------------------

    /// Display text of `row`'s value in column `field`.
    pub fn formatted_value(&self, row: &R, field: &str) -> Option<String> {
        let columns = self.columns.read().clone();
        find_column(&columns, field).map(|column| column.format_value(&column.value(row)))
    }

    /// Rendered content of `row`'s cell in column `field`.
    pub fn cell_content(&self, row: &R, field: &str) -> Option<String> {
        let columns = self.columns.read().clone();
        find_column(&columns, field).map(|column| column.render(row))
    }

    /// Pinned offsets of the current columns.
    pub fn pinned_layout(&self) -> Arc<PinnedLayout> {
        let columns = self.columns.read().clone();
        if let Some(stage) = &self.cache.lock().layout {
            if Arc::ptr_eq(&stage.columns, &columns) {
                return stage.output.clone();
            }
        }

        let output = Arc::new(PinnedLayout::compute_with(
            &columns,
            self.config.checkbox_selection,
            self.config.default_column_width,
            self.config.selection_column_width,
        ));
        self.cache.lock().layout = Some(LayoutStage {
            columns,
            output: output.clone(),
        });
        output
    }

    /// Positioning of a cell of column `field`.
    ///
    /// Unknown fields get the style of an unpinned column.
    pub fn pinned_style(&self, field: &str, surface: CellSurface) -> PinnedStyle {
        let index = self.columns.read().iter().position(|column| column.field() == field);
        let layout = self.pinned_layout();
        match index {
            Some(index) => layout.style(index, surface),
            None => layout.style(usize::MAX, surface),
        }
    }

    /// Positioning of a cell of the selection checkbox column.
    pub fn selection_column_style(&self, surface: CellSurface) -> PinnedStyle {
        self.pinned_layout().selection_column_style(surface)
    }
}

impl<R: GridRow> fmt::Debug for GridView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridView")
            .field("columns", &self.columns.read().len())
            .field("rows", &self.rows.read().len())
            .field("filter_model", &self.filter_model.get())
            .field("sort_model", &self.sort_model.get())
            .field("pagination", &self.pagination.get())
            .field("overlay", &self.overlay.get())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(GridView<serde_json::Value>: Send, Sync);
static_assertions::assert_impl_all!(RowWindow<serde_json::Value>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::{ColumnType, PinnedSide};
    use crate::model::value::CellValue;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::new("id").with_type(ColumnType::Number).with_width(80.0).pinned(PinnedSide::Left),
            Column::new("name").with_width(180.0).pinned(PinnedSide::Left),
            Column::new("age").with_type(ColumnType::Number).sortable(true),
            Column::new("house").sortable(false),
        ]
    }

    fn rows() -> Vec<Value> {
        vec![
            json!({ "id": 1, "name": "Jon", "age": 35, "house": "Stark" }),
            json!({ "id": 2, "name": "Cersei", "age": 42, "house": "Lannister" }),
            json!({ "id": 3, "name": "Jaime", "age": 42, "house": "Lannister" }),
            json!({ "id": 4, "name": "Arya", "age": 11, "house": "Stark" }),
            json!({ "id": 5, "name": "Daenerys", "age": null, "house": "Targaryen" }),
        ]
    }

    fn ids(window: &RowWindow<Value>) -> Vec<i64> {
        window.iter().map(|row| row["id"].as_i64().unwrap()).collect()
    }

    fn paged(page_size: usize) -> GridView<Value> {
        GridView::builder(columns(), rows())
            .initial_pagination_model(PaginationModel::new(0, page_size))
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let result = GridView::builder(vec![Column::<Value>::new("a"), Column::new("a")], Vec::new()).build();
        assert!(matches!(result, Err(GridError::DuplicateField { .. })));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = GridView::builder(columns(), rows())
            .pagination_model(PaginationModel::new(0, 0))
            .build();
        assert!(matches!(result, Err(GridError::InvalidPageSize { page_size: 0 })));
    }

    #[test]
    fn test_pipeline_order() {
        let view = paged(2);
        view.set_sort_model(vec![SortItem::asc("age")]);

        assert_eq!(ids(&view.visible_rows()), vec![4, 1]);
        assert!(view.next_page());
        assert_eq!(ids(&view.visible_rows()), vec![2, 3]);
        assert!(view.last_page());
        assert_eq!(ids(&view.visible_rows()), vec![5]);
        assert_eq!(view.total_pages(), 3);
        assert_eq!(view.range_label(), "5–5 of 5");
    }

    #[test]
    fn test_toggle_sort_cycle() {
        let view = paged(10);

        assert!(view.toggle_sort("age"));
        assert_eq!(*view.sort_model(), vec![SortItem::asc("age")]);
        assert!(view.toggle_sort("age"));
        assert_eq!(*view.sort_model(), vec![SortItem::desc("age")]);
        assert!(view.toggle_sort("age"));
        assert!(view.sort_model().is_empty());

        assert!(!view.toggle_sort("house"));
        assert!(!view.toggle_sort("missing"));
    }

    #[test]
    fn test_non_sortable_column_still_sorts_from_model() {
        let view = paged(10);
        view.set_sort_model(vec![SortItem::asc("house")]);
        assert_eq!(ids(&view.visible_rows()), vec![2, 3, 1, 4, 5]);
    }

    #[test]
    fn test_page_clamps_when_filter_shrinks() {
        let view = paged(2);
        view.last_page();
        assert_eq!(view.pagination_model().page, 2);

        view.set_filter_model(FilterModel::new(vec![FilterItem::new("house", "equals").with_value("stark")]));
        assert_eq!(view.pagination_model().page, 0);
        assert_eq!(ids(&view.visible_rows()), vec![1, 4]);
    }

    #[test]
    fn test_set_page_size_resets_page() {
        let view = paged(2);
        view.next_page();
        assert!(view.set_page_size(4));
        assert_eq!(view.pagination_model(), PaginationModel::new(0, 4));
    }

    #[test]
    fn test_set_page_size_outside_options_still_applies() {
        let view = paged(2);
        assert!(!view.config().page_size_options.contains(&3));

        assert!(view.set_page_size(3));
        assert_eq!(view.pagination_model(), PaginationModel::new(0, 3));
        assert_eq!(view.total_pages(), 2);
    }

    #[test]
    fn test_pagination_disabled_shows_everything() {
        let config = GridConfig {
            pagination: false,
            ..GridConfig::default()
        };
        let view = GridView::builder(columns(), rows())
            .config(config)
            .initial_pagination_model(PaginationModel::new(1, 2))
            .build()
            .unwrap();

        assert_eq!(view.visible_rows().len(), 5);
        assert_eq!(view.total_pages(), 1);
        assert_eq!(view.range_label(), "1–5 of 5");
    }

    #[test]
    fn test_filter_disabled_is_identity() {
        let config = GridConfig {
            disable_column_filter: true,
            ..GridConfig::default()
        };
        let view = GridView::builder(columns(), rows())
            .config(config)
            .initial_filter_model(FilterModel::new(vec![FilterItem::new("name", "equals").with_value("Jon")]))
            .build()
            .unwrap();

        assert_eq!(view.filtered_row_count(), 5);
    }

    #[test]
    fn test_stages_are_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let columns = vec![Column::<Value>::new("name").with_value_getter(move |row: &Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            CellValue::from(&row["name"])
        })];
        let view = GridView::builder(columns, rows())
            .initial_filter_model(FilterModel::new(vec![FilterItem::new("name", "contains").with_value("a")]))
            .build()
            .unwrap();

        view.visible_rows();
        let after_first = calls.load(Ordering::SeqCst);
        assert_eq!(after_first, 5);

        view.visible_rows();
        view.filtered_row_count();
        assert_eq!(calls.load(Ordering::SeqCst), after_first);

        view.set_rows(rows());
        view.visible_rows();
        assert!(calls.load(Ordering::SeqCst) > after_first);
    }

    #[test]
    fn test_row_click_modes() {
        let view = paged(10);
        view.handle_row_click(RowId::from(1));
        view.handle_row_click(RowId::from(2));
        assert_eq!(view.row_selection_model().sorted_ids(), vec![RowId::from(2)]);

        let checkbox = GridView::builder(columns(), rows())
            .config(GridConfig {
                checkbox_selection: true,
                ..GridConfig::default()
            })
            .build()
            .unwrap();
        checkbox.handle_row_click(RowId::from(1));
        checkbox.handle_row_click(RowId::from(2));
        assert_eq!(checkbox.row_selection_model().len(), 2);

        let disabled = GridView::builder(columns(), rows())
            .config(GridConfig {
                disable_row_selection_on_click: true,
                ..GridConfig::default()
            })
            .build()
            .unwrap();
        assert!(!disabled.handle_row_click(RowId::from(1)));
        assert!(disabled.row_selection_model().is_empty());
    }

    #[test]
    fn test_select_all_visible_uses_page() {
        let view = paged(2);
        view.set_sort_model(vec![SortItem::asc("age")]);

        assert!(view.select_all_visible());
        assert_eq!(view.row_selection_model().sorted_ids(), vec![RowId::from(1), RowId::from(4)]);
        assert_eq!(view.select_all_state(), SelectAllState::All);

        view.next_page();
        assert_eq!(view.select_all_state(), SelectAllState::None);
    }

    #[test]
    fn test_owned_cell_ignores_receive() {
        let view = paged(10);
        assert!(!view.receive_sort_model(vec![SortItem::asc("age")]));
        assert!(view.sort_model().is_empty());
    }

    #[test]
    fn test_strict_receive_reports_owned_state() {
        let view = paged(10);

        let err = view.try_receive_sort_model(vec![SortItem::asc("age")]).unwrap_err();
        assert!(matches!(
            err,
            GridError::State(lattice_grid_core::Error::NotExternal { name: "sort_model" })
        ));
        assert!(view.sort_model().is_empty());
        assert!(view.try_receive_pagination_model(PaginationModel::new(1, 2)).is_err());
    }

    #[test]
    fn test_strict_receive_accepts_controlled_state() {
        let view = GridView::builder(columns(), rows())
            .row_selection_model(RowSelectionModel::new())
            .build()
            .unwrap();

        let selection: RowSelectionModel = [RowId::from(2)].into_iter().collect();
        view.try_receive_row_selection_model(selection).unwrap();
        assert!(view.is_row_selected(&RowId::from(2)));
        assert!(view.try_receive_filter_model(FilterModel::default()).is_err());
    }

    #[test]
    fn test_controlled_sort_forwards_requests() {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let sink = requested.clone();
        let view = GridView::builder(columns(), rows())
            .sort_model(Vec::new())
            .on_sort_model_change(move |model: Arc<SortModel>| sink.lock().push(model))
            .build()
            .unwrap();

        let emitted = Arc::new(AtomicUsize::new(0));
        let counter = emitted.clone();
        view.sort_model_changed.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!view.toggle_sort("age"));
        assert_eq!(requested.lock().len(), 1);
        assert!(view.sort_model().is_empty());
        assert_eq!(emitted.load(Ordering::SeqCst), 0);

        let accepted = (*requested.lock()[0]).clone();
        assert!(view.receive_sort_model(accepted));
        assert_eq!(*view.sort_model(), vec![SortItem::asc("age")]);
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_open_filter_panel_adds_item() {
        let view = paged(10);
        assert!(view.open_filter_panel(Some("age")));

        let model = view.filter_model();
        assert_eq!(model.items.len(), 1);
        assert_eq!(model.items[0].operator, "=");
        assert_eq!(view.filtered_row_count(), 5);
        assert!(view.overlay().is_filter_panel_open());

        // Reopening does not add a second item.
        view.close_overlay();
        view.open_filter_panel(Some("age"));
        assert_eq!(view.filter_model().items.len(), 1);
    }

    #[test]
    fn test_open_filter_panel_keeps_active_filter() {
        let view = paged(10);
        view.set_filter_model(FilterModel::new(vec![FilterItem::new("name", "contains").with_value("jon")]));
        assert_eq!(view.filtered_row_count(), 1);

        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();
        view.filter_model_changed.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(view.open_filter_panel(Some("age")));
        assert_eq!(view.filtered_row_count(), 1);
        assert_eq!(view.filter_model().items.len(), 1);
        assert_eq!(changes.load(Ordering::SeqCst), 0);
        assert_eq!(
            view.overlay(),
            GridOverlayState::FilterPanelOpen { target_field: Some("age".to_string()) }
        );
    }

    #[test]
    fn test_open_filter_panel_sends_no_request_to_host() {
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();
        let view = GridView::builder(columns(), rows())
            .filter_model(FilterModel::new(vec![FilterItem::new("name", "contains").with_value("a")]))
            .on_filter_model_change(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        view.open_filter_panel(Some("age"));
        assert_eq!(requests.load(Ordering::SeqCst), 0);
        assert_eq!(view.filtered_row_count(), 3);
    }

    #[test]
    fn test_overlay_signal() {
        let view = paged(10);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        view.overlay_changed.connect(move |state| sink.lock().push(state.clone()));

        view.open_column_menu("name");
        view.toggle_column_menu("name");

        assert_eq!(
            *seen.lock(),
            vec![
                GridOverlayState::ColumnMenuOpen { field: "name".to_string() },
                GridOverlayState::Closed,
            ]
        );
    }

    #[test]
    fn test_pinned_style_and_cells() {
        let view = GridView::builder(columns(), rows())
            .config(GridConfig {
                checkbox_selection: true,
                ..GridConfig::default()
            })
            .build()
            .unwrap();

        let name = view.pinned_style("name", CellSurface::Body);
        assert_eq!(name.offset.map(|o| o.offset), Some(138.0));
        assert!(!view.pinned_style("age", CellSurface::Header).is_pinned());
        assert!(view.selection_column_style(CellSurface::Header).is_pinned());
        assert!(Arc::ptr_eq(&view.pinned_layout(), &view.pinned_layout()));

        let row = json!({ "id": 9, "age": null });
        assert_eq!(view.formatted_value(&row, "age").as_deref(), Some(""));
        assert_eq!(view.cell_content(&row, "id").as_deref(), Some("9"));
        assert_eq!(view.cell_content(&row, "missing"), None);
    }
}
