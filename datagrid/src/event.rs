//! Outbound events, drained by the hosting page.

use std::fmt;

use crate::pagination::PageRequest;
use crate::row::CellValue;

/// Identifies one dispatched cell commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitTicket(pub(crate) u64);

impl CommitTicket {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommitTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A changed cell value awaiting confirmation from the commit collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCommit {
    pub ticket: CommitTicket,
    pub row_id: String,
    pub column_id: String,
    pub value: CellValue,
}

/// Mutation requests and notices the grid emits for the hosting page.
///
/// The grid never acts on these itself; the host drains them with
/// [`DataGrid::drain_events`](crate::DataGrid::drain_events).
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A row key was toggled in the selection set.
    SelectionToggled { key: String, selected: bool },
    /// The user asked for another page.
    PageChange(PageRequest),
    /// A cell value changed and must be committed.
    CellCommit(CellCommit),
    /// A rejected commit was handled locally.
    CommitRolledBack {
        ticket: CommitTicket,
        row_id: String,
        column_id: String,
        message: String,
        /// False when the row no longer held the optimistic value, so nothing
        /// was restored.
        restored: bool,
    },
    /// A submit was abandoned because the row has no identifier.
    MissingRowIdentifier { row_index: usize, column_id: String },
}
