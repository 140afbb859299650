//! Cell edit controller.
//!
//! At most one cell is under edit at a time. The controller moves between
//! three states:
//!
//! ```text
//! Idle --begin_edit--> Editing --submit(changed)--> Submitting --resolve--> Idle
//!   ^                   |  ^                           |
//!   |    cancel/submit  |  |        begin_edit         |
//!   +-------------------+  +---------------------------+
//! ```
//!
//! A changed value is written to the row before the commit is dispatched, so
//! a render right after `submit` shows it. A rejected commit restores the
//! prior value in the same call that reports the rejection. Only one commit
//! may be outstanding; starting a new edit while it is in flight is allowed,
//! and the in-flight commit still resolves on its own.

use log::{debug, trace, warn};

use crate::column::LeafColumn;
use crate::error::{CommitRejected, EditError};
use crate::event::{CellCommit, CommitTicket};
use crate::row::{CellValue, GridRow};

/// The cell under edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditTarget {
    pub row_index: usize,
    pub column_id: String,
}

impl EditTarget {
    pub fn new(row_index: usize, column_id: impl Into<String>) -> Self {
        Self {
            row_index,
            column_id: column_id.into(),
        }
    }
}

/// Direction of keyboard advancement along the tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Keys the editor input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKey {
    /// Submit.
    Enter,
    /// Submit, then advance to the next column.
    Tab,
    /// Submit, then advance to the previous column.
    BackTab,
    /// Cancel.
    Escape,
    /// Focus left the editor; submit.
    Blur,
}

/// Edit controller state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        target: EditTarget,
        buffer: CellValue,
    },
    Submitting {
        target: EditTarget,
        prior_value: CellValue,
        ticket: CommitTicket,
    },
}

/// What a submit did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was being edited.
    Ignored,
    /// Value equal to the committed one; no commit.
    Unchanged,
    /// Value applied with no commit collaborator attached.
    Applied,
    /// Value applied optimistically and handed to the commit collaborator.
    Dispatched(CellCommit),
}

/// How a commit resolution was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResolution {
    Confirmed,
    RolledBack {
        row_id: String,
        column_id: String,
        /// False when the row no longer held the optimistic value.
        restored: bool,
    },
    /// The ticket does not match the outstanding commit.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    ticket: CommitTicket,
    row_id: String,
    column_id: String,
    prior_value: CellValue,
    optimistic_value: CellValue,
}

/// Next editable column along the tab order, wrapping at both ends.
///
/// `visible` is the live visible-leaf list. Non-editable columns are skipped;
/// if no other column is editable the current one is returned. Returns `None`
/// when `column_id` is not visible.
pub fn next_in_tab_order<'a>(
    visible: &[&'a LeafColumn],
    column_id: &str,
    direction: Direction,
) -> Option<&'a LeafColumn> {
    let position = visible.iter().position(|c| c.id == column_id)?;
    let count = visible.len();
    (1..=count)
        .map(|step| match direction {
            Direction::Next => (position + step) % count,
            Direction::Prev => (position + count - step % count) % count,
        })
        .map(|index| visible[index])
        .find(|column| column.editable)
}

/// Single-cell edit state machine.
#[derive(Debug, Default)]
pub struct CellEditController {
    state: EditState,
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl CellEditController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == EditState::Idle
    }

    /// The cell under edit or being submitted.
    pub fn target(&self) -> Option<&EditTarget> {
        match &self.state {
            EditState::Idle => None,
            EditState::Editing { target, .. } | EditState::Submitting { target, .. } => {
                Some(target)
            }
        }
    }

    /// The locally buffered value while editing.
    pub fn buffer(&self) -> Option<&CellValue> {
        match &self.state {
            EditState::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Ticket of the outstanding commit, if any.
    pub fn in_flight(&self) -> Option<CommitTicket> {
        self.in_flight.as_ref().map(|c| c.ticket)
    }

    /// Start editing a cell, discarding any unsaved value of another cell.
    ///
    /// Hidden or non-editable columns and rows outside the page are ignored.
    pub fn begin_edit<R: GridRow>(
        &mut self,
        row_index: usize,
        column: &LeafColumn,
        rows: &[R],
    ) -> bool {
        if !column.editable || !column.visible {
            trace!("edit ignored: column '{}' not editable", column.id);
            return false;
        }
        let Some(row) = rows.get(row_index) else {
            trace!("edit ignored: row {} outside page", row_index);
            return false;
        };

        let target = EditTarget::new(row_index, column.id.clone());
        trace!("editing ({}, {})", target.row_index, target.column_id);
        self.state = EditState::Editing {
            buffer: row.cell(&column.id),
            target,
        };
        true
    }

    /// Replace the buffered value. Only meaningful while editing.
    pub fn update_buffer(&mut self, value: CellValue) -> bool {
        match &mut self.state {
            EditState::Editing { buffer, .. } => {
                *buffer = value;
                true
            }
            _ => false,
        }
    }

    /// Submit `value` for the cell under edit.
    ///
    /// A row without an identifier fails the submit before anything else. An
    /// unchanged value then completes the edit with no commit. A changed value
    /// is written to the row immediately; with `dispatch` the controller then
    /// waits in `Submitting` for [`CellEditController::resolve`], otherwise the
    /// edit completes at once.
    pub fn submit<R: GridRow>(
        &mut self,
        value: CellValue,
        rows: &mut [R],
        dispatch: bool,
    ) -> Result<SubmitOutcome, EditError> {
        let EditState::Editing { target, .. } = &self.state else {
            return Ok(SubmitOutcome::Ignored);
        };
        let target = target.clone();

        let Some(row) = rows.get_mut(target.row_index) else {
            self.state = EditState::Idle;
            return Ok(SubmitOutcome::Ignored);
        };

        let Some(row_id) = row.row_id() else {
            warn!(
                "row {} has no identifier; discarding edit of '{}'",
                target.row_index, target.column_id
            );
            self.state = EditState::Idle;
            return Err(EditError::MissingRowIdentifier {
                row_index: target.row_index,
            });
        };

        let prior_value = row.cell(&target.column_id);
        if prior_value == value {
            trace!("unchanged value for ({}, {})", target.row_index, target.column_id);
            self.state = EditState::Idle;
            return Ok(SubmitOutcome::Unchanged);
        }

        if dispatch && self.in_flight.is_some() {
            self.state = EditState::Editing {
                target,
                buffer: value,
            };
            return Err(EditError::CommitInFlight);
        }

        row.set_cell(&target.column_id, value.clone());

        if !dispatch {
            trace!("applied ({}, {}) locally", target.row_index, target.column_id);
            self.state = EditState::Idle;
            return Ok(SubmitOutcome::Applied);
        }

        self.next_ticket += 1;
        let ticket = CommitTicket(self.next_ticket);
        let commit = CellCommit {
            ticket,
            row_id: row_id.clone(),
            column_id: target.column_id.clone(),
            value: value.clone(),
        };
        debug!("dispatching commit {} for row {} column '{}'", ticket, row_id, target.column_id);

        self.in_flight = Some(InFlight {
            ticket,
            row_id,
            column_id: target.column_id.clone(),
            prior_value: prior_value.clone(),
            optimistic_value: value,
        });
        self.state = EditState::Submitting {
            target,
            prior_value,
            ticket,
        };
        Ok(SubmitOutcome::Dispatched(commit))
    }

    /// Submit the buffered value.
    pub fn submit_buffer<R: GridRow>(
        &mut self,
        rows: &mut [R],
        dispatch: bool,
    ) -> Result<SubmitOutcome, EditError> {
        match self.buffer().cloned() {
            Some(value) => self.submit(value, rows, dispatch),
            None => Ok(SubmitOutcome::Ignored),
        }
    }

    /// Return to `Idle` without committing. An in-flight commit is unaffected.
    pub fn cancel(&mut self) -> bool {
        if self.is_idle() {
            return false;
        }
        trace!("edit cancelled");
        self.state = EditState::Idle;
        true
    }

    /// Move the edit to the adjacent column of the same row.
    pub fn advance<R: GridRow>(
        &mut self,
        direction: Direction,
        visible: &[&LeafColumn],
        rows: &[R],
    ) -> Option<EditTarget> {
        let from = self.target()?.clone();
        self.advance_from(&from, direction, visible, rows)
    }

    /// Begin editing the column next to `from` along the tab order.
    pub fn advance_from<R: GridRow>(
        &mut self,
        from: &EditTarget,
        direction: Direction,
        visible: &[&LeafColumn],
        rows: &[R],
    ) -> Option<EditTarget> {
        let column = next_in_tab_order(visible, &from.column_id, direction)?;
        if self.begin_edit(from.row_index, column, rows) {
            self.target().cloned()
        } else {
            None
        }
    }

    /// Drop the edit target if it no longer points at a visible column and a
    /// row of the page.
    pub fn revalidate(&mut self, visible: &[&LeafColumn], row_count: usize) -> bool {
        let Some(target) = self.target() else {
            return false;
        };
        let valid = target.row_index < row_count
            && visible.iter().any(|c| c.id == target.column_id);
        if !valid {
            debug!("edit target ({}, {}) no longer valid", target.row_index, target.column_id);
            self.state = EditState::Idle;
        }
        !valid
    }

    /// Resolve the outstanding commit.
    ///
    /// On rejection the prior value is restored on the row carrying the
    /// commit's row id, provided it still shows the optimistic value.
    pub fn resolve<R: GridRow>(
        &mut self,
        ticket: CommitTicket,
        result: Result<(), CommitRejected>,
        rows: &mut [R],
    ) -> CommitResolution {
        let Some(in_flight) = self.in_flight.take_if(|c| c.ticket == ticket) else {
            warn!("resolution for unknown commit {}", ticket);
            return CommitResolution::Unknown;
        };

        if matches!(&self.state, EditState::Submitting { ticket: t, .. } if *t == ticket) {
            self.state = EditState::Idle;
        }

        let Err(rejection) = result else {
            debug!("commit {} confirmed", ticket);
            return CommitResolution::Confirmed;
        };

        let row = rows
            .iter_mut()
            .find(|row| row.row_id().as_deref() == Some(in_flight.row_id.as_str()));
        let restored = match row {
            Some(row) if row.cell(&in_flight.column_id) == in_flight.optimistic_value => {
                row.set_cell(&in_flight.column_id, in_flight.prior_value);
                true
            }
            _ => false,
        };

        if restored {
            warn!(
                "commit {} rejected ({}); rolled back row {} column '{}'",
                ticket, rejection.message, in_flight.row_id, in_flight.column_id
            );
        } else {
            warn!(
                "commit {} rejected ({}); row {} changed since, nothing rolled back",
                ticket, rejection.message, in_flight.row_id
            );
        }

        CommitResolution::RolledBack {
            row_id: in_flight.row_id,
            column_id: in_flight.column_id,
            restored,
        }
    }

    /// Forget the edit target after the row data was replaced.
    pub fn reset(&mut self) -> bool {
        self.cancel()
    }
}
