//! Interactive data grid engine.
//!
//! The engine behind list pages: paginated row data, column sizing,
//! row selection with an optional single-select policy, and single-cell
//! editing with optimistic updates and rollback. It holds no rendering code;
//! [`DataGrid::view`] produces a plain snapshot and every mutation the hosting
//! page must perform is queued as a [`GridEvent`].

pub mod column;
pub mod commit;
pub mod config;
pub mod edit;
pub mod error;
pub mod event;
pub mod grid;
pub mod pagination;
pub mod row;
pub mod selection;
pub mod sizing;
pub mod view;

pub use column::{Alignment, ColumnDef, ColumnGroup, ColumnMenuEntry, ColumnModel, LeafColumn, Pin};
pub use commit::{CellCommitter, settle_commit};
pub use config::{DefaultColumn, GridOptions, NON_EDITABLE_COLUMNS, SelectionKey};
pub use edit::{
    CellEditController, CellKey, CommitResolution, Direction, EditState, EditTarget,
    SubmitOutcome,
};
pub use error::{ColumnError, CommitRejected, EditError, GridError};
pub use event::{CellCommit, CommitTicket, GridEvent};
pub use grid::DataGrid;
pub use pagination::{PageRequest, PageState, Paginator};
pub use row::{CellValue, GridRow, Record};
pub use selection::{SelectionChange, SelectionSet};
pub use sizing::{ColumnSizes, ColumnSizing, SizingTable};
pub use view::GridView;
