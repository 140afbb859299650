//! Render snapshot of a grid.
//!
//! A [`GridView`] is plain data: the rendering layer draws it however it
//! likes and never reaches back into the grid's state.

use crate::column::{Alignment, Pin};
use crate::row::CellValue;

/// Everything needed to draw one frame of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub controls: ControlsView,
    /// Group headers above the leaf header row, outermost first.
    pub groups: Vec<GroupHeaderView>,
    pub header: HeaderView,
    pub rows: Vec<RowView>,
    pub summary: Option<Vec<SummaryCell>>,
    pub pagination: Option<PaginationView>,
}

/// Title, counts, and slot flags of the controls area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsView {
    pub title: Option<String>,
    /// Total element count when paginated, rows on the page otherwise.
    pub row_count: usize,
    pub selected_count: usize,
    pub search: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHeaderView {
    pub id: String,
    pub header: String,
    pub width: u32,
    /// Visible leaves spanned, in display order.
    pub leaves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    /// Every row on the page is selected.
    pub all_selected: bool,
    pub cells: Vec<HeaderCellView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCellView {
    pub column_id: String,
    pub header: String,
    pub width: u32,
    pub offset: Option<u32>,
    pub pin: Option<Pin>,
    pub align: Alignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub row_index: usize,
    /// One-based number across pages.
    pub sequence: usize,
    /// Selection key; `None` when the row cannot be keyed.
    pub key: Option<String>,
    pub selected: bool,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub column_id: String,
    pub value: CellValue,
    pub width: u32,
    pub align: Alignment,
    pub editable: bool,
    pub editing: bool,
    /// Buffered input while the cell is under edit.
    pub buffer: Option<CellValue>,
}

/// Sum of one summarizable column; `None` for other columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCell {
    pub column_id: String,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub page_index: usize,
    pub page_size: usize,
    pub total_elements: usize,
    pub total_pages: Option<usize>,
    pub can_previous: bool,
    pub can_next: bool,
}
