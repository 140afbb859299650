//! Grid shell: composes the column model, sizing, selection, editing and
//! pagination behind one cloneable handle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace, warn};

use crate::column::{ColumnDef, ColumnMenuEntry, ColumnModel, LeafColumn};
use crate::config::{GridOptions, SelectionKey};
use crate::edit::{
    CellEditController, CellKey, CommitResolution, Direction, EditState, EditTarget,
    SubmitOutcome,
};
use crate::error::{ColumnError, CommitRejected, EditError};
use crate::event::{CommitTicket, GridEvent};
use crate::pagination::{PageRequest, PageState, Paginator};
use crate::row::{CellValue, GridRow};
use crate::selection::{SelectionChange, SelectionSet};
use crate::sizing::{self, ColumnSizing, SizingTable};
use crate::view::{
    CellView, ControlsView, GridView, GroupHeaderView, HeaderCellView, HeaderView,
    PaginationView, RowView, SummaryCell,
};

/// Internal state for the grid.
#[derive(Debug)]
struct GridInner<R: GridRow> {
    options: GridOptions,
    columns: ColumnModel,
    sizing: ColumnSizing,
    /// Derived from `columns` and `sizing`; rebuilt by `resize`.
    sizes: SizingTable,
    rows: Vec<R>,
    selection: SelectionSet,
    edit: CellEditController,
    page: PageState,
    events: VecDeque<GridEvent>,
}

impl<R: GridRow> GridInner<R> {
    fn new(columns: ColumnModel, options: GridOptions) -> Self {
        let mut inner = Self {
            options,
            columns,
            sizing: ColumnSizing::new(),
            sizes: SizingTable::default(),
            rows: Vec::new(),
            selection: SelectionSet::new(),
            edit: CellEditController::new(),
            page: PageState::default(),
            events: VecDeque::new(),
        };
        inner.resize();
        inner
    }

    fn resize(&mut self) {
        self.sizes = sizing::recompute(
            &self.columns.visible_leaves(),
            self.columns.groups(),
            &self.sizing,
            &self.options.default_column,
        );
    }

    /// Re-check the edit target against the live columns and rows.
    fn revalidate_edit(&mut self) {
        let visible = self.columns.visible_leaves();
        self.edit.revalidate(&visible, self.rows.len());
    }

    fn row_key(&self, index: usize) -> Option<String> {
        match self.options.selection_key {
            SelectionKey::RowIndex => (index < self.rows.len()).then(|| index.to_string()),
            SelectionKey::RowId => self.rows.get(index).and_then(|row| row.row_id()),
        }
    }

    fn row_keys(&self) -> Vec<String> {
        (0..self.rows.len()).filter_map(|i| self.row_key(i)).collect()
    }

    fn push_selection(&mut self, changes: Vec<SelectionChange>) {
        for change in changes {
            self.events.push_back(GridEvent::SelectionToggled {
                key: change.key,
                selected: change.selected,
            });
        }
    }

    fn push_page(&mut self, request: Option<PageRequest>) -> Option<PageRequest> {
        if let Some(request) = request {
            self.events.push_back(GridEvent::PageChange(request));
        }
        request
    }

    fn submit(&mut self, value: CellValue) -> Result<SubmitOutcome, EditError> {
        let column_id = self.edit.target().map(|t| t.column_id.clone());
        let dispatch = self.options.commit_edits;
        let outcome = self.edit.submit(value, &mut self.rows, dispatch);

        match &outcome {
            Ok(SubmitOutcome::Dispatched(commit)) => {
                self.events.push_back(GridEvent::CellCommit(commit.clone()));
            }
            Err(EditError::MissingRowIdentifier { row_index }) => {
                self.events.push_back(GridEvent::MissingRowIdentifier {
                    row_index: *row_index,
                    column_id: column_id.unwrap_or_default(),
                });
            }
            _ => {}
        }
        outcome
    }

    fn submit_buffer(&mut self) -> Result<SubmitOutcome, EditError> {
        match self.edit.buffer().cloned() {
            Some(value) => self.submit(value),
            None => Ok(SubmitOutcome::Ignored),
        }
    }

    fn summary(&self) -> Vec<SummaryCell> {
        self.columns
            .visible_leaves()
            .into_iter()
            .map(|column| SummaryCell {
                column_id: column.id.clone(),
                total: column.summarizable.then(|| {
                    self.rows
                        .iter()
                        .filter_map(|row| row.cell(&column.id).as_f64())
                        .sum()
                }),
            })
            .collect()
    }

    fn view(&self) -> GridView {
        let visible = self.columns.visible_leaves();
        let width_of = |id: &str| self.sizes.get(id).map(|s| s.column_size).unwrap_or(0);
        let keys: Vec<Option<String>> = (0..self.rows.len()).map(|i| self.row_key(i)).collect();

        let groups = self
            .columns
            .groups()
            .iter()
            .filter_map(|group| {
                let leaves: Vec<String> = group
                    .leaves
                    .iter()
                    .filter(|id| self.sizes.contains(id))
                    .cloned()
                    .collect();
                (!leaves.is_empty()).then(|| GroupHeaderView {
                    id: group.id.clone(),
                    header: group.header.clone(),
                    width: self.sizes.group_size(&group.id).unwrap_or(0),
                    leaves,
                })
            })
            .collect();

        let header = HeaderView {
            all_selected: self
                .selection
                .is_all_selected(keys.iter().flatten().map(String::as_str)),
            cells: visible
                .iter()
                .map(|column| {
                    let sizes = self.sizes.get(&column.id);
                    HeaderCellView {
                        column_id: column.id.clone(),
                        header: column.header.clone(),
                        width: sizes.map(|s| s.header_size).unwrap_or(0),
                        offset: sizes.and_then(|s| s.offset),
                        pin: column.pin,
                        align: column.align,
                    }
                })
                .collect(),
        };

        let target = self.edit.target();
        let buffer = self.edit.buffer();
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                let key = keys[row_index].clone();
                RowView {
                    row_index,
                    sequence: self.page.sequence_number(row_index),
                    selected: key.as_deref().is_some_and(|k| self.selection.contains(k)),
                    key,
                    cells: visible
                        .iter()
                        .map(|column| {
                            let editing = target.is_some_and(|t| {
                                t.row_index == row_index && t.column_id == column.id
                            });
                            CellView {
                                column_id: column.id.clone(),
                                value: row.cell(&column.id),
                                width: width_of(&column.id),
                                align: column.align,
                                editable: self.options.use_editable && column.editable,
                                editing,
                                buffer: if editing { buffer.cloned() } else { None },
                            }
                        })
                        .collect(),
                }
            })
            .collect();

        GridView {
            controls: ControlsView {
                title: self.options.title.clone(),
                row_count: if self.options.use_pagination {
                    self.page.total_elements
                } else {
                    self.rows.len()
                },
                selected_count: self.selection.len(),
                search: self.options.use_search,
            },
            groups,
            header,
            rows,
            summary: self.options.use_summary.then(|| self.summary()),
            pagination: self.options.use_pagination.then(|| PaginationView {
                page_index: self.page.page_index,
                page_size: self.page.page_size,
                total_elements: self.page.total_elements,
                total_pages: self.page.total_pages(),
                can_previous: self.page.can_previous(),
                can_next: self.page.can_next(),
            }),
        }
    }
}

/// An interactive data grid.
///
/// `DataGrid<R>` is a cheap, cloneable handle. It owns the selection set and
/// the edit target; rows, page counts and column declarations come from the
/// hosting page. Every mutation the host must act on is queued as a
/// [`GridEvent`] and collected with [`DataGrid::drain_events`].
///
/// # Example
///
/// ```
/// use datagrid::{ColumnDef, DataGrid, GridEvent, GridOptions, Record};
///
/// let grid = DataGrid::new(
///     vec![ColumnDef::new("code", "Code"), ColumnDef::new("name", "Name")],
///     GridOptions::default().with_editable(true),
/// )
/// .unwrap();
/// grid.set_data(vec![Record::new().set("id", 7).set("code", "X1")]);
///
/// assert!(grid.begin_edit(0, "code"));
/// grid.submit("X2".into()).unwrap();
/// assert!(matches!(grid.drain_events()[0], GridEvent::CellCommit(_)));
/// ```
#[derive(Debug)]
pub struct DataGrid<R: GridRow> {
    inner: Arc<RwLock<GridInner<R>>>,
    /// Dirty flag for re-render.
    dirty: Arc<AtomicBool>,
}

impl<R: GridRow> Clone for DataGrid<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<R: GridRow> DataGrid<R> {
    /// Create a grid from column declarations.
    pub fn new(columns: Vec<ColumnDef>, options: GridOptions) -> Result<Self, ColumnError> {
        let model = ColumnModel::normalize(&columns, &options)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(GridInner::new(model, options))),
            dirty: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Set initial rows.
    pub fn with_rows(self, rows: Vec<R>) -> Self {
        self.set_data(rows);
        self
    }

    /// Set the initial page state.
    pub fn with_page(self, page: PageState) -> Self {
        self.set_page_state(page);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, GridInner<R>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GridInner<R>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Returns and clears the re-render flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    pub fn options(&self) -> GridOptions {
        self.read().options.clone()
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&self) -> Vec<GridEvent> {
        self.write().events.drain(..).collect()
    }

    /// Render snapshot.
    pub fn view(&self) -> GridView {
        self.read().view()
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Replace the column declarations.
    ///
    /// Overrides for columns that disappeared are dropped, and an edit on a
    /// column that is no longer visible is cancelled. On error the previous
    /// columns stay in place.
    pub fn set_columns(&self, columns: Vec<ColumnDef>) -> Result<(), ColumnError> {
        let mut guard = self.write();
        let model = ColumnModel::normalize(&columns, &guard.options)?;
        guard.columns = model;
        let ids: Vec<String> = guard.columns.leaves().iter().map(|c| c.id.clone()).collect();
        guard.sizing.retain(ids.iter().map(String::as_str));
        guard.resize();
        guard.revalidate_edit();
        self.mark_dirty();
        Ok(())
    }

    /// All leaf columns in declared order.
    pub fn columns(&self) -> Vec<LeafColumn> {
        self.read().columns.leaves().to_vec()
    }

    /// Visible leaf columns in tab order.
    pub fn visible_columns(&self) -> Vec<LeafColumn> {
        self.read()
            .columns
            .visible_leaves()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Show or hide a column. Returns true if visibility changed.
    pub fn set_column_visibility(&self, column_id: &str, visible: bool) -> bool {
        let mut guard = self.write();
        if !guard.columns.set_visibility(column_id, visible) {
            return false;
        }
        trace!("column '{}' visible: {}", column_id, visible);
        guard.resize();
        guard.revalidate_edit();
        self.mark_dirty();
        true
    }

    /// Flip a column's visibility. Returns the new visibility.
    pub fn toggle_column_visibility(&self, column_id: &str) -> Option<bool> {
        let mut guard = self.write();
        let visible = guard.columns.toggle_visibility(column_id)?;
        guard.resize();
        guard.revalidate_edit();
        self.mark_dirty();
        Some(visible)
    }

    /// Columns matching `query` for the visibility menu.
    pub fn column_menu(&self, query: &str) -> Vec<ColumnMenuEntry> {
        self.read().columns.column_menu(query)
    }

    // -------------------------------------------------------------------------
    // Sizing
    // -------------------------------------------------------------------------

    pub fn sizes(&self) -> SizingTable {
        self.read().sizes.clone()
    }

    /// Named size quantities for the rendering layer.
    pub fn size_variables(&self) -> Vec<(String, String)> {
        self.read().sizes.variables()
    }

    /// Start a resize gesture on a visible column.
    pub fn begin_resize(&self, column_id: &str) -> bool {
        let mut guard = self.write();
        let Some(width) = guard.sizes.get(column_id).map(|s| s.column_size) else {
            return false;
        };
        guard.sizing.begin_resize(column_id, width);
        true
    }

    /// Move the live gesture; widths preview immediately.
    pub fn update_resize(&self, delta_px: i64) -> bool {
        let mut guard = self.write();
        if !guard.sizing.update_resize(delta_px) {
            return false;
        }
        guard.resize();
        self.mark_dirty();
        true
    }

    /// Commit the live gesture. Returns the column and its clamped width.
    pub fn finish_resize(&self) -> Option<(String, u32)> {
        let mut guard = self.write();
        let (column_id, _) = guard.sizing.finish_resize()?;
        guard.resize();
        self.mark_dirty();
        let width = guard.sizes.get(&column_id).map(|s| s.column_size)?;
        debug!("column '{}' resized to {}px", column_id, width);
        Some((column_id, width))
    }

    pub fn cancel_resize(&self) -> bool {
        let mut guard = self.write();
        if !guard.sizing.cancel_resize() {
            return false;
        }
        guard.resize();
        self.mark_dirty();
        true
    }

    /// Resize a column in one step. Returns the clamped width.
    pub fn set_column_width(&self, column_id: &str, width: u32) -> Option<u32> {
        let mut guard = self.write();
        guard.columns.leaf(column_id)?;
        guard.sizing.set_override(column_id, width);
        guard.resize();
        self.mark_dirty();
        guard.sizes.get(column_id).map(|s| s.column_size)
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Replace the page's rows wholesale.
    ///
    /// Any edit target is dropped. An in-flight commit is left to resolve on
    /// its own. The selection is not touched; see
    /// [`DataGrid::reconcile_selection`].
    pub fn set_data(&self, rows: Vec<R>) {
        let mut guard = self.write();
        guard.rows = rows;
        if guard.edit.reset() {
            debug!("edit target reset by data replacement");
        }
        self.mark_dirty();
    }

    pub fn len(&self) -> usize {
        self.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> Option<R> {
        self.read().rows.get(index).cloned()
    }

    pub fn rows(&self) -> Vec<R> {
        self.read().rows.clone()
    }

    /// Selection key of the row at `index`.
    pub fn row_key(&self, index: usize) -> Option<String> {
        self.read().row_key(index)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Toggle a row key, applying the single-select policy when enabled.
    ///
    /// Keys not present on the current page are ignored.
    pub fn toggle_row_selection(&self, key: &str) -> Vec<SelectionChange> {
        let mut guard = self.write();
        if !guard.row_keys().iter().any(|k| k == key) {
            trace!("selection toggle ignored for unknown key {}", key);
            return Vec::new();
        }
        let enabled = guard.options.enable_single_select;
        let changes = guard.selection.toggle_with_single_select_policy(key, enabled);
        guard.push_selection(changes.clone());
        self.mark_dirty();
        changes
    }

    /// Select-all affordance. Ignored under the single-select policy.
    pub fn toggle_all(&self) -> Vec<SelectionChange> {
        let mut guard = self.write();
        if guard.options.enable_single_select {
            return Vec::new();
        }
        let keys = guard.row_keys();
        let changes = guard.selection.toggle_all(&keys);
        guard.push_selection(changes.clone());
        self.mark_dirty();
        changes
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.read().selection.contains(key)
    }

    /// Selected keys, sorted.
    pub fn selected_rows(&self) -> Vec<String> {
        self.read().selection.keys()
    }

    pub fn is_all_selected(&self) -> bool {
        let guard = self.read();
        let keys = guard.row_keys();
        guard.selection.is_all_selected(keys.iter().map(String::as_str))
    }

    /// Replace the selection from the hosting page. No events are queued.
    pub fn set_selected_rows<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write().selection = SelectionSet::from_keys(keys);
        self.mark_dirty();
    }

    /// Clear the selection from the hosting page. No events are queued.
    pub fn clear_selection(&self) {
        self.write().selection.clear();
        self.mark_dirty();
    }

    /// Drop selected keys that are not on the current page.
    pub fn reconcile_selection(&self) -> Vec<SelectionChange> {
        let mut guard = self.write();
        let keys = guard.row_keys();
        let changes = guard.selection.reconcile(keys.iter().map(String::as_str));
        guard.push_selection(changes.clone());
        if !changes.is_empty() {
            self.mark_dirty();
        }
        changes
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    pub fn edit_state(&self) -> EditState {
        self.read().edit.state().clone()
    }

    pub fn edit_target(&self) -> Option<EditTarget> {
        self.read().edit.target().cloned()
    }

    /// Ticket of the outstanding commit, if any.
    pub fn commit_in_flight(&self) -> Option<CommitTicket> {
        self.read().edit.in_flight()
    }

    /// Start editing a cell. No-op unless editing is enabled and the column
    /// is visible and editable.
    pub fn begin_edit(&self, row_index: usize, column_id: &str) -> bool {
        let mut guard = self.write();
        if !guard.options.use_editable {
            return false;
        }
        let inner = &mut *guard;
        let Some(column) = inner.columns.leaf(column_id) else {
            return false;
        };
        let started = inner.edit.begin_edit(row_index, column, &inner.rows);
        if started {
            self.mark_dirty();
        }
        started
    }

    /// Replace the buffered value while typing.
    pub fn update_buffer(&self, value: CellValue) -> bool {
        let updated = self.write().edit.update_buffer(value);
        if updated {
            self.mark_dirty();
        }
        updated
    }

    /// Submit a value for the cell under edit.
    pub fn submit(&self, value: CellValue) -> Result<SubmitOutcome, EditError> {
        let outcome = self.write().submit(value);
        self.mark_dirty();
        outcome
    }

    /// Submit the buffered value.
    pub fn submit_buffer(&self) -> Result<SubmitOutcome, EditError> {
        let outcome = self.write().submit_buffer();
        self.mark_dirty();
        outcome
    }

    /// Discard the buffered value without committing.
    pub fn cancel_edit(&self) -> bool {
        let cancelled = self.write().edit.cancel();
        if cancelled {
            self.mark_dirty();
        }
        cancelled
    }

    /// Move the edit to the adjacent visible column of the same row.
    pub fn advance(&self, direction: Direction) -> Option<EditTarget> {
        let mut guard = self.write();
        let inner = &mut *guard;
        let visible = inner.columns.visible_leaves();
        let target = inner.edit.advance(direction, &visible, &inner.rows);
        self.mark_dirty();
        target
    }

    /// Apply a key pressed in the cell editor.
    ///
    /// Returns the edit target afterwards. Tab only advances when its submit
    /// succeeded.
    pub fn handle_key(&self, key: CellKey) -> Result<Option<EditTarget>, EditError> {
        let mut guard = self.write();
        let direction = match key {
            CellKey::Enter | CellKey::Blur => {
                guard.submit_buffer()?;
                None
            }
            CellKey::Escape => {
                guard.edit.cancel();
                None
            }
            CellKey::Tab => Some(Direction::Next),
            CellKey::BackTab => Some(Direction::Prev),
        };

        if let Some(direction) = direction {
            let Some(from) = guard.edit.target().cloned() else {
                return Ok(None);
            };
            guard.submit_buffer()?;
            let inner = &mut *guard;
            let visible = inner.columns.visible_leaves();
            inner.edit.advance_from(&from, direction, &visible, &inner.rows);
        }

        self.mark_dirty();
        Ok(guard.edit.target().cloned())
    }

    /// Resolve a dispatched commit, rolling back on rejection.
    pub fn resolve_commit(
        &self,
        ticket: CommitTicket,
        result: Result<(), CommitRejected>,
    ) -> CommitResolution {
        let mut guard = self.write();
        let message = result.as_ref().err().map(|e| e.message.clone());
        let inner = &mut *guard;
        let resolution = inner.edit.resolve(ticket, result, &mut inner.rows);

        if let CommitResolution::RolledBack {
            row_id,
            column_id,
            restored,
        } = &resolution
        {
            inner.events.push_back(GridEvent::CommitRolledBack {
                ticket,
                row_id: row_id.clone(),
                column_id: column_id.clone(),
                message: message.unwrap_or_default(),
                restored: *restored,
            });
        }
        if resolution == CommitResolution::Unknown {
            warn!("ignored resolution for commit {}", ticket);
        } else {
            self.mark_dirty();
        }
        resolution
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn page_state(&self) -> PageState {
        self.read().page
    }

    /// Update the page state supplied by the hosting page.
    pub fn set_page_state(&self, page: PageState) {
        self.write().page = page;
        self.mark_dirty();
    }

    /// Request a page; out-of-range indices are clamped.
    pub fn request_page_change(&self, page_index: usize) -> Option<PageRequest> {
        let mut guard = self.write();
        let request = Paginator::new(&guard.page).request_page_change(page_index);
        guard.push_page(request)
    }

    pub fn next_page(&self) -> Option<PageRequest> {
        let mut guard = self.write();
        let request = Paginator::new(&guard.page).next_page();
        guard.push_page(request)
    }

    pub fn previous_page(&self) -> Option<PageRequest> {
        let mut guard = self.write();
        let request = Paginator::new(&guard.page).previous_page();
        guard.push_page(request)
    }

    pub fn first_page(&self) -> Option<PageRequest> {
        let mut guard = self.write();
        let request = Paginator::new(&guard.page).first_page();
        guard.push_page(request)
    }

    pub fn last_page(&self) -> Option<PageRequest> {
        let mut guard = self.write();
        let request = Paginator::new(&guard.page).last_page();
        guard.push_page(request)
    }

    pub fn set_page_size(&self, page_size: usize) -> Option<PageRequest> {
        let mut guard = self.write();
        let request = Paginator::new(&guard.page).set_page_size(page_size);
        guard.push_page(request)
    }

    // -------------------------------------------------------------------------
    // Summary
    // -------------------------------------------------------------------------

    /// Column sums over the rendered rows, when the summary row is enabled.
    pub fn summary(&self) -> Option<Vec<SummaryCell>> {
        let guard = self.read();
        guard.options.use_summary.then(|| guard.summary())
    }
}
